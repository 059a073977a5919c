//! Selector sum type (spec §3). Priority order `testId > role > css > xpath`
//! is encoded as a method rather than relied upon via enum discriminant order,
//! since discriminant order is an implementation detail that shouldn't carry
//! semantic weight.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy")]
pub enum Selector {
    #[serde(rename = "testId")]
    TestId { value: String },
    #[serde(rename = "role")]
    Role {
        role: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    #[serde(rename = "css")]
    Css { value: String },
    #[serde(rename = "xpath")]
    XPath { value: String },
}

impl Selector {
    /// Lower is higher priority; mirrors spec's `testId > role > css > xpath`.
    pub fn priority_rank(&self) -> u8 {
        match self {
            Selector::TestId { .. } => 0,
            Selector::Role { .. } => 1,
            Selector::Css { .. } => 2,
            Selector::XPath { .. } => 3,
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        match self {
            Selector::TestId { .. } => "testId",
            Selector::Role { .. } => "role",
            Selector::Css { .. } => "css",
            Selector::XPath { .. } => "xpath",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_matches_spec() {
        let test_id = Selector::TestId { value: "x".into() };
        let role = Selector::Role { role: "button".into(), name: None };
        let css = Selector::Css { value: ".x".into() };
        let xpath = Selector::XPath { value: "//div".into() };
        assert!(test_id.priority_rank() < role.priority_rank());
        assert!(role.priority_rank() < css.priority_rank());
        assert!(css.priority_rank() < xpath.priority_rank());
    }
}
