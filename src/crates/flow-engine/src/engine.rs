//! `Execute(flow, options) → FlowExecutionResult` (spec §4.1 "Algorithm").
//!
//! The walk is iterative rather than recursively async: an explicit stack
//! of pending node ids, with successors of a dispatched node pushed in
//! reverse declaration order so the stack still pops in depth-first order.
//! A `HashSet` cycle guard makes termination unconditional regardless of
//! what the flow graph looks like.

use crate::dispatch::dispatch;
use crate::options::ExecuteOptions;
use crate::service::ScenarioService;
use chrono::Utc;
use flow_core::{EdgeHandle, FlowNode, NodeResult, RunStatus, StepError, UserFlow};
use std::collections::HashSet;
use std::time::Instant;
use variable_store::VariableStore;

pub async fn execute<S: ScenarioService + ?Sized>(
    flow: &UserFlow,
    scenario_service: &S,
    options: ExecuteOptions,
) -> flow_core::FlowExecutionResult {
    let started_at = Utc::now();

    let Some(start_node) = flow.start_node() else {
        let ended_at = Utc::now();
        let synthetic = NodeResult {
            node_id: "flow-error".to_string(),
            node_type: "flow-error".to_string(),
            status: RunStatus::Failed,
            duration_ms: 0,
            error: Some(StepError { message: "flow has no start node".to_string(), stack: None }),
            scenario_result: None,
            condition_result: None,
            variable_result: None,
        };
        return flow_core::FlowExecutionResult::from_node_results(
            vec![synthetic],
            RunStatus::Failed,
            started_at,
            ended_at,
        );
    };

    let mut store = VariableStore::from_initial(options.initial_variables.clone().unwrap_or_default());
    let mut last_api_response = None;
    let mut visited: HashSet<String> = HashSet::new();
    let mut node_results: Vec<NodeResult> = Vec::new();
    let mut stack: Vec<String> = vec![start_node.id().to_string()];
    let deadline = Instant::now() + options.max_execution_time;
    let mut timed_out = false;
    let mut aborted = false;

    while let Some(node_id) = stack.pop() {
        if Instant::now() > deadline {
            timed_out = true;
            break;
        }
        if !visited.insert(node_id.clone()) {
            tracing::debug!(node_id, "cycle guard: node already visited, not re-entering");
            continue;
        }

        let Some(node) = flow.node(&node_id) else {
            tracing::warn!(node_id, "edge target not present among flow nodes, skipping");
            continue;
        };

        let outcome = dispatch(
            node,
            &mut store,
            &mut last_api_response,
            scenario_service,
            &options.runner_options,
        )
        .await;

        if let Some(result) = &outcome.result {
            node_results.push(result.clone());
        }
        if let Some(callback) = &options.on_node_status_change {
            callback(node.id(), outcome.status, outcome.result.as_ref());
        }

        if outcome.status == RunStatus::Failed && !options.continue_on_failure {
            aborted = true;
            break;
        }

        for successor in successors(flow, node, outcome.condition_passed).into_iter().rev() {
            stack.push(successor);
        }
    }

    let ended_at = Utc::now();
    let any_scenario_failed = node_results
        .iter()
        .any(|nr| nr.node_type == "scenario" && nr.status == RunStatus::Failed);
    let status = if timed_out || aborted || any_scenario_failed {
        RunStatus::Failed
    } else {
        RunStatus::Passed
    };

    flow_core::FlowExecutionResult::from_node_results(node_results, status, started_at, ended_at)
}

/// Spec §4.1 "Successor rules": most node types fan out along every
/// out-edge in declaration order; `condition` follows only the edge whose
/// handle matches the boolean result (no match ⇒ that branch simply ends).
fn successors(flow: &UserFlow, node: &FlowNode, condition_passed: Option<bool>) -> Vec<String> {
    match node {
        FlowNode::Condition { id, .. } => {
            let Some(passed) = condition_passed else { return Vec::new() };
            let handle = if passed { EdgeHandle::True } else { EdgeHandle::False };
            flow.out_edges(id)
                .into_iter()
                .filter(|edge| edge.source_handle == Some(handle))
                .map(|edge| edge.target.clone())
                .collect()
        }
        _ => flow.out_edges(node.id()).into_iter().map(|edge| edge.target.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ScenarioService;
    use async_trait::async_trait;
    use chrono::Utc;
    use flow_core::{
        Condition, ConditionNode, ConditionOperator, CoreError, FlowEdge, RunnerOptions,
        ScenarioExecutionResult, VarValue,
    };
    use std::collections::BTreeMap;

    struct StubScenarios {
        result: Option<ScenarioExecutionResult>,
    }

    #[async_trait]
    impl ScenarioService for StubScenarios {
        async fn execute(
            &self,
            scenario_id: &str,
            _options: RunnerOptions,
            _runtime_variables: BTreeMap<String, VarValue>,
        ) -> flow_core::Result<ScenarioExecutionResult> {
            match &self.result {
                Some(r) => Ok(r.clone()),
                None => Err(CoreError::not_found(format!("scenario {scenario_id}"))),
            }
        }
    }

    fn passed_result() -> ScenarioExecutionResult {
        ScenarioExecutionResult {
            status: RunStatus::Passed,
            total_steps: 2,
            passed: 2,
            failed: 0,
            skipped: 0,
            duration_ms: 5,
            step_results: vec![],
            api_calls: vec![],
            environment: None,
            executed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_scenario_is_skipped_not_failed() {
        let flow = UserFlow {
            id: "f".into(),
            name: "t".into(),
            nodes: vec![
                FlowNode::Start { id: "start".into() },
                FlowNode::Scenario { id: "n1".into(), scenario_id: "missing".into() },
                FlowNode::End { id: "end".into() },
            ],
            edges: vec![
                FlowEdge { source: "start".into(), target: "n1".into(), source_handle: None },
                FlowEdge { source: "n1".into(), target: "end".into(), source_handle: None },
            ],
            initial_variables: None,
        };
        let service = StubScenarios { result: None };
        let result = execute(&flow, &service, ExecuteOptions::default()).await;
        assert_eq!(result.status, RunStatus::Passed);
        assert_eq!(result.skipped_nodes, 1);
    }

    #[tokio::test]
    async fn condition_node_routes_to_true_handle() {
        let flow = UserFlow {
            id: "f".into(),
            name: "t".into(),
            nodes: vec![
                FlowNode::Start { id: "start".into() },
                FlowNode::Condition {
                    id: "c1".into(),
                    condition: ConditionNode::Leaf(Condition {
                        left: "1".into(),
                        operator: ConditionOperator::Eq,
                        right: Some("1".into()),
                    }),
                },
                FlowNode::Scenario { id: "n-true".into(), scenario_id: "scn-true".into() },
                FlowNode::Scenario { id: "n-false".into(), scenario_id: "scn-false".into() },
            ],
            edges: vec![
                FlowEdge { source: "start".into(), target: "c1".into(), source_handle: None },
                FlowEdge { source: "c1".into(), target: "n-true".into(), source_handle: Some(EdgeHandle::True) },
                FlowEdge { source: "c1".into(), target: "n-false".into(), source_handle: Some(EdgeHandle::False) },
            ],
            initial_variables: None,
        };
        let service = StubScenarios { result: Some(passed_result()) };
        let result = execute(&flow, &service, ExecuteOptions::default()).await;
        assert_eq!(result.total_nodes, 1);
        assert_eq!(result.node_results.iter().find(|n| n.node_id == "n-true").unwrap().status, RunStatus::Passed);
        assert!(result.node_results.iter().all(|n| n.node_id != "n-false"));
    }

    #[tokio::test]
    async fn cycle_is_visited_at_most_once_and_run_passes() {
        // A -> B -> A: the cycle guard must stop the walk from looping
        // forever and must not record a node twice (spec §8 scenario 3).
        let flow = UserFlow {
            id: "f".into(),
            name: "t".into(),
            nodes: vec![
                FlowNode::Start { id: "start".into() },
                FlowNode::Scenario { id: "a".into(), scenario_id: "scn-a".into() },
                FlowNode::Scenario { id: "b".into(), scenario_id: "scn-b".into() },
            ],
            edges: vec![
                FlowEdge { source: "start".into(), target: "a".into(), source_handle: None },
                FlowEdge { source: "a".into(), target: "b".into(), source_handle: None },
                FlowEdge { source: "b".into(), target: "a".into(), source_handle: None },
            ],
            initial_variables: None,
        };
        let service = StubScenarios { result: Some(passed_result()) };
        let result = execute(&flow, &service, ExecuteOptions::default()).await;
        assert_eq!(result.status, RunStatus::Passed);
        assert_eq!(result.node_results.iter().filter(|n| n.node_id == "a").count(), 1);
        assert_eq!(result.node_results.iter().filter(|n| n.node_id == "b").count(), 1);
    }

    #[tokio::test]
    async fn no_start_node_yields_synthetic_flow_error() {
        let flow = UserFlow {
            id: "f".into(),
            name: "t".into(),
            nodes: vec![FlowNode::End { id: "end".into() }],
            edges: vec![],
            initial_variables: None,
        };
        let service = StubScenarios { result: None };
        let result = execute(&flow, &service, ExecuteOptions::default()).await;
        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(result.node_results[0].node_id, "flow-error");
    }
}
