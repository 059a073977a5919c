//! Condition type (spec §3). Evaluation itself lives in `variable-store`,
//! which owns the regex-safety gate; this crate only defines the shape.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
    Exists,
    IsEmpty,
}

impl ConditionOperator {
    /// `exists` and `isEmpty` take only `left` (spec §3).
    pub fn is_unary(&self) -> bool {
        matches!(self, ConditionOperator::Exists | ConditionOperator::IsEmpty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub left: String,
    pub operator: ConditionOperator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
}

/// A compound boolean condition tree (spec §4.3 `evaluateCompound`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "logic", rename_all = "lowercase")]
pub enum CompoundCondition {
    And { conditions: Vec<ConditionNode> },
    Or { conditions: Vec<ConditionNode> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    Leaf(Condition),
    Compound(Box<CompoundCondition>),
}

/// Result of evaluating a [`Condition`] (spec §4.3 `evaluateCondition`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionEvalResult {
    pub result: bool,
    pub left_value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
