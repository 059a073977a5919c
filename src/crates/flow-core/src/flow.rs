//! User Flow entity: nodes, edges, and the graph-level invariants spec §3
//! requires be checkable before the engine walks it.

use crate::condition::ConditionNode;
use crate::variable::VarValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableAssignment {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: AssignmentType,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentType {
    String,
    Number,
    Boolean,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractionSource {
    LastApiResponse,
    Url,
    Element,
    LocalStorage,
    Cookie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableExtraction {
    pub variable_name: String,
    pub source: ExtractionSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<VarValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FlowNode {
    #[serde(rename = "start")]
    Start { id: String },
    #[serde(rename = "end")]
    End { id: String },
    #[serde(rename = "scenario")]
    Scenario { id: String, scenario_id: String },
    #[serde(rename = "condition")]
    Condition { id: String, condition: ConditionNode },
    #[serde(rename = "setVariable")]
    SetVariable { id: String, assignments: Vec<VariableAssignment> },
    #[serde(rename = "extractVariable")]
    ExtractVariable { id: String, extractions: Vec<VariableExtraction> },
}

impl FlowNode {
    pub fn id(&self) -> &str {
        match self {
            FlowNode::Start { id }
            | FlowNode::End { id }
            | FlowNode::Scenario { id, .. }
            | FlowNode::Condition { id, .. }
            | FlowNode::SetVariable { id, .. }
            | FlowNode::ExtractVariable { id, .. } => id,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FlowNode::Start { .. } => "start",
            FlowNode::End { .. } => "end",
            FlowNode::Scenario { .. } => "scenario",
            FlowNode::Condition { .. } => "condition",
            FlowNode::SetVariable { .. } => "setVariable",
            FlowNode::ExtractVariable { .. } => "extractVariable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<EdgeHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeHandle {
    True,
    False,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFlow {
    pub id: String,
    pub name: String,
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_variables: Option<BTreeMap<String, VarValue>>,
}

/// Structural problems a flow can have before execution is even attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowValidationError {
    #[error("no start node found")]
    NoStartNode,
    #[error("multiple start nodes found: {0:?}")]
    MultipleStartNodes(Vec<String>),
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),
    #[error("edge references unknown node: {0}")]
    DanglingEdge(String),
    #[error("condition node '{0}' has more than one edge for handle '{1:?}'")]
    DuplicateConditionHandle(String, EdgeHandle),
}

impl UserFlow {
    /// Validates the invariants from spec §3: exactly one reachable `start`
    /// node, no duplicate node ids, every edge endpoint exists, and
    /// condition out-edges use at most one `true` and one `false` handle.
    pub fn validate(&self) -> Result<(), FlowValidationError> {
        let mut seen_ids = HashSet::new();
        for node in &self.nodes {
            if !seen_ids.insert(node.id().to_string()) {
                return Err(FlowValidationError::DuplicateNodeId(node.id().to_string()));
            }
        }

        let start_nodes: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| matches!(n, FlowNode::Start { .. }))
            .map(|n| n.id().to_string())
            .collect();
        match start_nodes.len() {
            0 => return Err(FlowValidationError::NoStartNode),
            1 => {}
            _ => return Err(FlowValidationError::MultipleStartNodes(start_nodes)),
        }

        for edge in &self.edges {
            if !seen_ids.contains(&edge.source) {
                return Err(FlowValidationError::DanglingEdge(edge.source.clone()));
            }
            if !seen_ids.contains(&edge.target) {
                return Err(FlowValidationError::DanglingEdge(edge.target.clone()));
            }
        }

        let mut handle_counts: HashMap<(String, EdgeHandle), usize> = HashMap::new();
        for edge in &self.edges {
            if let Some(handle) = edge.source_handle {
                *handle_counts.entry((edge.source.clone(), handle)).or_insert(0) += 1;
            }
        }
        for ((node_id, handle), count) in handle_counts {
            if count > 1 {
                return Err(FlowValidationError::DuplicateConditionHandle(node_id, handle));
            }
        }

        Ok(())
    }

    pub fn start_node(&self) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| matches!(n, FlowNode::Start { .. }))
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn out_edges(&self, node_id: &str) -> Vec<&FlowEdge> {
        self.edges.iter().filter(|e| e.source == node_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(nodes: Vec<FlowNode>, edges: Vec<FlowEdge>) -> UserFlow {
        UserFlow { id: "flow-1".into(), name: "t".into(), nodes, edges, initial_variables: None }
    }

    #[test]
    fn rejects_missing_start() {
        let f = flow(vec![FlowNode::End { id: "e".into() }], vec![]);
        assert_eq!(f.validate(), Err(FlowValidationError::NoStartNode));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let f = flow(
            vec![
                FlowNode::Start { id: "a".into() },
                FlowNode::Start { id: "a".into() },
            ],
            vec![],
        );
        assert!(matches!(f.validate(), Err(FlowValidationError::DuplicateNodeId(_))));
    }

    #[test]
    fn rejects_dangling_edges() {
        let f = flow(
            vec![FlowNode::Start { id: "a".into() }],
            vec![FlowEdge { source: "a".into(), target: "missing".into(), source_handle: None }],
        );
        assert!(matches!(f.validate(), Err(FlowValidationError::DanglingEdge(_))));
    }

    #[test]
    fn accepts_well_formed_flow() {
        let f = flow(
            vec![FlowNode::Start { id: "a".into() }, FlowNode::End { id: "b".into() }],
            vec![FlowEdge { source: "a".into(), target: "b".into(), source_handle: None }],
        );
        assert!(f.validate().is_ok());
    }
}
