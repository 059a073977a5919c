//! The explicit value sum type backing the variable store (spec §3:
//! "Variable Value: scalar | object | array"), and §4.3 / §9's design note
//! that variable values must not be a dynamic `any`. They are plain data
//! only, never cyclic.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;

/// A variable binding's value. Backed by `serde_json::Value` for interop
/// with the driver and repository boundaries, but the variable store only
/// ever constructs or accepts the variants below; no raw `Json::Value` of
/// an unexpected shape leaks through path traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<VarValue>),
    Object(BTreeMap<String, VarValue>),
}

impl VarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, VarValue::Null)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            VarValue::Null => true,
            VarValue::String(s) => s.is_empty(),
            VarValue::Array(a) => a.is_empty(),
            VarValue::Object(o) => o.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            VarValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            VarValue::Number(n) => n.as_f64(),
            VarValue::String(s) => s.parse::<f64>().ok(),
            VarValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[VarValue]> {
        match self {
            VarValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, VarValue>> {
        match self {
            VarValue::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut BTreeMap<String, VarValue>> {
        match self {
            VarValue::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<VarValue>> {
        match self {
            VarValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Stringify for template interpolation (spec §4.3: objects/arrays are
    /// JSON stringified, other scalars via `String(v)`).
    pub fn interpolated_string(&self) -> String {
        match self {
            VarValue::Null => String::new(),
            VarValue::Bool(b) => b.to_string(),
            VarValue::Number(n) => n.to_string(),
            VarValue::String(s) => s.clone(),
            VarValue::Array(_) | VarValue::Object(_) => self.to_json().to_string(),
        }
    }

    pub fn to_json(&self) -> Json {
        serde_json::to_value(self).unwrap_or(Json::Null)
    }

    pub fn from_json(value: Json) -> Self {
        match value {
            Json::Null => VarValue::Null,
            Json::Bool(b) => VarValue::Bool(b),
            Json::Number(n) => VarValue::Number(n),
            Json::String(s) => VarValue::String(s),
            Json::Array(a) => VarValue::Array(a.into_iter().map(VarValue::from_json).collect()),
            Json::Object(o) => VarValue::Object(
                o.into_iter()
                    .map(|(k, v)| (k, VarValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Coerce into a driver-safe primitive for `scenario` node dispatch
    /// (spec §4.1): scalars pass through; null is dropped by the caller;
    /// objects/arrays stringify as JSON.
    pub fn to_driver_primitive(&self) -> Option<Json> {
        match self {
            VarValue::Null => None,
            VarValue::Bool(_) | VarValue::Number(_) | VarValue::String(_) => Some(self.to_json()),
            VarValue::Array(_) | VarValue::Object(_) => {
                Some(Json::String(self.to_json().to_string()))
            }
        }
    }
}

impl From<&str> for VarValue {
    fn from(s: &str) -> Self {
        VarValue::String(s.to_string())
    }
}

impl From<String> for VarValue {
    fn from(s: String) -> Self {
        VarValue::String(s)
    }
}

impl From<bool> for VarValue {
    fn from(b: bool) -> Self {
        VarValue::Bool(b)
    }
}

impl From<f64> for VarValue {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n)
            .map(VarValue::Number)
            .unwrap_or(VarValue::Null)
    }
}
