//! Execution result types (spec §3): `ExecutionResult` (scenario),
//! `FlowExecutionResult`, `StepResult`, `NodeResult`.

use crate::condition::ConditionEvalResult;
use crate::variable::VarValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Passed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: String,
    pub index: usize,
    pub status: RunStatus,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_response: Option<Json>,
}

/// One observed API call during a scenario run, used to populate
/// `lastApiResponse` for `extractVariable` nodes (spec §4.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCall {
    pub url: String,
    pub status: u16,
    pub response_body: Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub total_steps: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub success: bool,
}

/// Result of running a single scenario against the driver (spec §3, §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioExecutionResult {
    pub status: RunStatus,
    pub total_steps: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub step_results: Vec<StepResult>,
    #[serde(default)]
    pub api_calls: Vec<ApiCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<BTreeMap<String, String>>,
    pub executed_at: DateTime<Utc>,
}

impl ScenarioExecutionResult {
    pub fn last_api_response(&self) -> Option<&Json> {
        self.api_calls.last().map(|c| &c.response_body)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionNodeResult {
    pub result: bool,
    pub left_value: Json,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_value: Option<Json>,
}

impl From<ConditionEvalResult> for ConditionNodeResult {
    fn from(r: ConditionEvalResult) -> Self {
        ConditionNodeResult { result: r.result, left_value: r.left_value, right_value: r.right_value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableNodeResult {
    pub variables: BTreeMap<String, VarValue>,
}

/// Per-node outcome recorded during a flow walk (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    pub node_id: String,
    pub node_type: String,
    pub status: RunStatus,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario_result: Option<ScenarioExecutionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_result: Option<ConditionNodeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_result: Option<VariableNodeResult>,
}

/// Aggregated result of a whole flow walk (spec §3, §4.1 "Summary aggregation").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowExecutionResult {
    pub status: RunStatus,
    pub total_nodes: usize,
    pub passed_nodes: usize,
    pub failed_nodes: usize,
    pub skipped_nodes: usize,
    pub total_steps: usize,
    pub passed_steps: usize,
    pub failed_steps: usize,
    pub skipped_steps: usize,
    pub node_results: Vec<NodeResult>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl FlowExecutionResult {
    /// Builds the aggregate from traversal-order node results, counting
    /// node/step totals **only** over `scenario`-kind results (spec §4.1).
    pub fn from_node_results(
        node_results: Vec<NodeResult>,
        status: RunStatus,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> Self {
        let mut total_nodes = 0;
        let mut passed_nodes = 0;
        let mut failed_nodes = 0;
        let mut skipped_nodes = 0;
        let mut total_steps = 0;
        let mut passed_steps = 0;
        let mut failed_steps = 0;
        let mut skipped_steps = 0;

        for nr in &node_results {
            if nr.node_type != "scenario" {
                continue;
            }
            total_nodes += 1;
            match nr.status {
                RunStatus::Passed => passed_nodes += 1,
                RunStatus::Failed => failed_nodes += 1,
                RunStatus::Skipped => skipped_nodes += 1,
            }
            if let Some(sr) = &nr.scenario_result {
                total_steps += sr.total_steps;
                passed_steps += sr.passed;
                failed_steps += sr.failed;
                skipped_steps += sr.skipped;
            }
        }

        FlowExecutionResult {
            status,
            total_nodes,
            passed_nodes,
            failed_nodes,
            skipped_nodes,
            total_steps,
            passed_steps,
            failed_steps,
            skipped_steps,
            node_results,
            started_at,
            ended_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_counts_only_scenario_nodes() {
        let start = Utc::now();
        let nrs = vec![
            NodeResult {
                node_id: "a".into(),
                node_type: "start".into(),
                status: RunStatus::Passed,
                duration_ms: 0,
                error: None,
                scenario_result: None,
                condition_result: None,
                variable_result: None,
            },
            NodeResult {
                node_id: "b".into(),
                node_type: "scenario".into(),
                status: RunStatus::Passed,
                duration_ms: 10,
                error: None,
                scenario_result: Some(ScenarioExecutionResult {
                    status: RunStatus::Passed,
                    total_steps: 3,
                    passed: 3,
                    failed: 0,
                    skipped: 0,
                    duration_ms: 10,
                    step_results: vec![],
                    api_calls: vec![],
                    environment: None,
                    executed_at: start,
                }),
                condition_result: None,
                variable_result: None,
            },
        ];
        let agg = FlowExecutionResult::from_node_results(nrs, RunStatus::Passed, start, start);
        assert_eq!(agg.total_nodes, 1);
        assert_eq!(agg.passed_nodes, 1);
        assert_eq!(agg.total_steps, 3);
    }
}
