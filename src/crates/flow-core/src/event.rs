//! Raw UI interaction events recorded by the browser extension (spec §4.4).
//! These are the input the Event-to-AST Transformer reduces into `Step`s.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    /// CSS-path depth, counted by the recorder from the element to `<body>`.
    #[serde(default)]
    pub depth: usize,
    #[serde(default)]
    pub is_unique: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawEventType {
    Navigation,
    Click,
    Blur,
    Keydown,
    Hover,
    Scroll,
    Select,
    Input,
}

impl RawEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RawEventType::Navigation => "navigation",
            RawEventType::Click => "click",
            RawEventType::Blur => "blur",
            RawEventType::Keydown => "keydown",
            RawEventType::Hover => "hover",
            RawEventType::Scroll => "scroll",
            RawEventType::Select => "select",
            RawEventType::Input => "input",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: RawEventType,
    /// Epoch milliseconds (spec §6: "All timestamps are epoch-milliseconds integers").
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub is_sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_y: Option<f64>,
}
