//! Step sum type (spec §3: Scenario's ordered steps).

use crate::selector::Selector;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Step {
    #[serde(rename = "navigate")]
    Navigate {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        optional: Option<bool>,
    },
    #[serde(rename = "click")]
    Click {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        selector: Selector,
        #[serde(skip_serializing_if = "Option::is_none")]
        optional: Option<bool>,
    },
    #[serde(rename = "type")]
    Type {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        selector: Selector,
        value: String,
        #[serde(default)]
        sensitive: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        optional: Option<bool>,
    },
    #[serde(rename = "keypress")]
    Keypress {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        key: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        selector: Option<Selector>,
        #[serde(skip_serializing_if = "Option::is_none")]
        optional: Option<bool>,
    },
    #[serde(rename = "hover")]
    Hover {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        selector: Selector,
        #[serde(skip_serializing_if = "Option::is_none")]
        optional: Option<bool>,
    },
    #[serde(rename = "scroll")]
    Scroll {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        selector: Option<Selector>,
        #[serde(skip_serializing_if = "Option::is_none")]
        x: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        y: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        optional: Option<bool>,
    },
    #[serde(rename = "select")]
    Select {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        selector: Selector,
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        optional: Option<bool>,
    },
    #[serde(rename = "wait")]
    Wait {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        selector: Option<Selector>,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        optional: Option<bool>,
    },
    #[serde(rename = "snapshotDom")]
    SnapshotDom {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        optional: Option<bool>,
    },
    #[serde(rename = "assertElement")]
    AssertElement {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        selector: Selector,
        #[serde(skip_serializing_if = "Option::is_none")]
        expected_text: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        optional: Option<bool>,
    },
    #[serde(rename = "assertApi")]
    AssertApi {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        expected_status: Option<u16>,
        #[serde(skip_serializing_if = "Option::is_none")]
        expected_body: Option<Json>,
        #[serde(skip_serializing_if = "Option::is_none")]
        optional: Option<bool>,
    },
}

impl Step {
    pub fn id(&self) -> Option<&str> {
        match self {
            Step::Navigate { id, .. }
            | Step::Click { id, .. }
            | Step::Type { id, .. }
            | Step::Keypress { id, .. }
            | Step::Hover { id, .. }
            | Step::Scroll { id, .. }
            | Step::Select { id, .. }
            | Step::Wait { id, .. }
            | Step::SnapshotDom { id, .. }
            | Step::AssertElement { id, .. }
            | Step::AssertApi { id, .. } => id.as_deref(),
        }
    }

    pub fn is_optional(&self) -> bool {
        match self {
            Step::Navigate { optional, .. }
            | Step::Click { optional, .. }
            | Step::Type { optional, .. }
            | Step::Keypress { optional, .. }
            | Step::Hover { optional, .. }
            | Step::Scroll { optional, .. }
            | Step::Select { optional, .. }
            | Step::Wait { optional, .. }
            | Step::SnapshotDom { optional, .. }
            | Step::AssertElement { optional, .. }
            | Step::AssertApi { optional, .. } => optional.unwrap_or(false),
        }
    }

    pub fn selector(&self) -> Option<&Selector> {
        match self {
            Step::Click { selector, .. }
            | Step::Type { selector, .. }
            | Step::Hover { selector, .. }
            | Step::Select { selector, .. }
            | Step::AssertElement { selector, .. } => Some(selector),
            Step::Keypress { selector, .. } | Step::Scroll { selector, .. } | Step::Wait { selector, .. } => {
                selector.as_ref()
            }
            Step::Navigate { .. } | Step::SnapshotDom { .. } | Step::AssertApi { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Step::Navigate { .. } => "navigate",
            Step::Click { .. } => "click",
            Step::Type { .. } => "type",
            Step::Keypress { .. } => "keypress",
            Step::Hover { .. } => "hover",
            Step::Scroll { .. } => "scroll",
            Step::Select { .. } => "select",
            Step::Wait { .. } => "wait",
            Step::SnapshotDom { .. } => "snapshotDom",
            Step::AssertElement { .. } => "assertElement",
            Step::AssertApi { .. } => "assertApi",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_step_carries_sensitive_flag() {
        let step = Step::Type {
            id: None,
            selector: Selector::Css { value: "#q".into() },
            value: "secret".into(),
            sensitive: true,
            optional: None,
        };
        assert_eq!(step.kind(), "type");
        assert!(!step.is_optional());
    }

    #[test]
    fn navigate_has_no_selector() {
        let step = Step::Navigate { id: None, url: "/a".into(), optional: None };
        assert!(step.selector().is_none());
    }
}
