//! Per-node-type dispatch (spec §4.1 "Node dispatch").

use crate::service::ScenarioService;
use flow_core::{
    AssignmentType, ConditionNodeResult, ExtractionSource, FlowNode, NodeResult, RunStatus,
    RunnerOptions, StepError, VarValue, VariableNodeResult,
};
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::time::Instant;
use variable_store::VariableStore;

pub struct DispatchOutcome {
    pub result: Option<NodeResult>,
    pub status: RunStatus,
    /// `Some(bool)` only for a successfully evaluated `condition` node,
    /// feeding successor-edge selection (spec §4.1 "Successor rules").
    pub condition_passed: Option<bool>,
}

impl DispatchOutcome {
    fn no_op() -> Self {
        DispatchOutcome { result: None, status: RunStatus::Passed, condition_passed: None }
    }
}

pub async fn dispatch<S: ScenarioService + ?Sized>(
    node: &FlowNode,
    store: &mut VariableStore,
    last_api_response: &mut Option<Json>,
    scenario_service: &S,
    runner_options: &RunnerOptions,
) -> DispatchOutcome {
    match node {
        FlowNode::Start { .. } | FlowNode::End { .. } => DispatchOutcome::no_op(),
        FlowNode::Scenario { id, scenario_id } => {
            dispatch_scenario(id, scenario_id, store, last_api_response, scenario_service, runner_options).await
        }
        FlowNode::Condition { id, condition } => dispatch_condition(id, condition, store),
        FlowNode::SetVariable { id, assignments } => dispatch_set_variable(id, assignments, store),
        FlowNode::ExtractVariable { id, extractions } => {
            dispatch_extract_variable(id, extractions, store, last_api_response)
        }
    }
}

async fn dispatch_scenario<S: ScenarioService + ?Sized>(
    id: &str,
    scenario_id: &str,
    store: &mut VariableStore,
    last_api_response: &mut Option<Json>,
    scenario_service: &S,
    runner_options: &RunnerOptions,
) -> DispatchOutcome {
    let started = Instant::now();

    // Scalars pass through; null/undefined dropped; objects/arrays
    // stringified as JSON (spec §4.1 "scenario{scenarioId}").
    let runtime_variables: BTreeMap<String, VarValue> = store
        .bindings()
        .iter()
        .filter_map(|(k, v)| v.to_driver_primitive().map(|j| (k.clone(), VarValue::from_json(j))))
        .collect();

    let outcome = scenario_service
        .execute(scenario_id, runner_options.clone(), runtime_variables)
        .await;

    match outcome {
        Ok(scenario_result) => {
            if let Some(body) = scenario_result.last_api_response() {
                store.set("lastApiResponse", VarValue::from_json(body.clone()));
                *last_api_response = Some(body.clone());
            }
            let status = if scenario_result.status == RunStatus::Passed { RunStatus::Passed } else { RunStatus::Failed };
            let node_result = NodeResult {
                node_id: id.to_string(),
                node_type: "scenario".to_string(),
                status,
                duration_ms: started.elapsed().as_millis() as u64,
                error: None,
                scenario_result: Some(scenario_result),
                condition_result: None,
                variable_result: None,
            };
            DispatchOutcome { result: Some(node_result), status, condition_passed: None }
        }
        Err(e) if e.is_not_found() => {
            let node_result = NodeResult {
                node_id: id.to_string(),
                node_type: "scenario".to_string(),
                status: RunStatus::Skipped,
                duration_ms: started.elapsed().as_millis() as u64,
                error: Some(StepError { message: format!("Scenario {scenario_id} not found"), stack: None }),
                scenario_result: None,
                condition_result: None,
                variable_result: None,
            };
            DispatchOutcome { result: Some(node_result), status: RunStatus::Skipped, condition_passed: None }
        }
        Err(e) => {
            let node_result = NodeResult {
                node_id: id.to_string(),
                node_type: "scenario".to_string(),
                status: RunStatus::Failed,
                duration_ms: started.elapsed().as_millis() as u64,
                error: Some(StepError { message: e.to_string(), stack: None }),
                scenario_result: None,
                condition_result: None,
                variable_result: None,
            };
            DispatchOutcome { result: Some(node_result), status: RunStatus::Failed, condition_passed: None }
        }
    }
}

fn dispatch_condition(
    id: &str,
    condition: &flow_core::ConditionNode,
    store: &VariableStore,
) -> DispatchOutcome {
    let started = Instant::now();
    let eval = store.evaluate_node(condition);
    let error = eval.error.clone();
    let status = if error.is_some() { RunStatus::Failed } else { RunStatus::Passed };
    let condition_passed = if error.is_some() { None } else { Some(eval.result) };

    let node_result = NodeResult {
        node_id: id.to_string(),
        node_type: "condition".to_string(),
        status,
        duration_ms: started.elapsed().as_millis() as u64,
        error: error.map(|message| StepError { message, stack: None }),
        scenario_result: None,
        condition_result: Some(ConditionNodeResult::from(eval)),
        variable_result: None,
    };
    DispatchOutcome { result: Some(node_result), status, condition_passed }
}

fn coerce_assignment(value: &str, value_type: AssignmentType) -> Result<VarValue, String> {
    match value_type {
        AssignmentType::String => Ok(VarValue::String(value.to_string())),
        AssignmentType::Number => value
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{value}' is not a valid number"))
            .and_then(|n| if n.is_nan() { Err("value is NaN".to_string()) } else { Ok(VarValue::from(n)) }),
        AssignmentType::Boolean => Ok(VarValue::Bool(value == "true" || value == "1")),
        AssignmentType::Json => serde_json::from_str::<Json>(value)
            .map(VarValue::from_json)
            .map_err(|e| e.to_string()),
    }
}

fn dispatch_set_variable(
    id: &str,
    assignments: &[flow_core::VariableAssignment],
    store: &mut VariableStore,
) -> DispatchOutcome {
    let started = Instant::now();
    let mut applied = BTreeMap::new();
    let mut failure = None;

    for assignment in assignments {
        let interpolated = match store.interpolate(&assignment.value, false) {
            Ok(s) => s,
            Err(e) => {
                failure = Some(e);
                break;
            }
        };
        match coerce_assignment(&interpolated, assignment.value_type) {
            Ok(value) => {
                store.set(&assignment.name, value.clone());
                applied.insert(assignment.name.clone(), value);
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    let status = if failure.is_some() { RunStatus::Failed } else { RunStatus::Passed };
    let node_result = NodeResult {
        node_id: id.to_string(),
        node_type: "setVariable".to_string(),
        status,
        duration_ms: started.elapsed().as_millis() as u64,
        error: failure.map(|message| StepError { message, stack: None }),
        scenario_result: None,
        condition_result: None,
        variable_result: Some(VariableNodeResult { variables: applied }),
    };
    DispatchOutcome { result: Some(node_result), status, condition_passed: None }
}

fn dispatch_extract_variable(
    id: &str,
    extractions: &[flow_core::VariableExtraction],
    store: &mut VariableStore,
    last_api_response: &Option<Json>,
) -> DispatchOutcome {
    let started = Instant::now();
    let mut applied = BTreeMap::new();

    for extraction in extractions {
        let value = match extraction.source {
            ExtractionSource::LastApiResponse => match last_api_response {
                Some(body) => {
                    let data = VarValue::from_json(body.clone());
                    match &extraction.json_path {
                        Some(path) => store
                            .extract_json_path(&data, path)
                            .or_else(|| extraction.default_value.clone())
                            .unwrap_or(VarValue::Null),
                        None => data,
                    }
                }
                None => extraction.default_value.clone().unwrap_or(VarValue::Null),
            },
            // Requires browser context the backend core does not own
            // (spec §4.1). Always falls back without failing the node.
            ExtractionSource::Url
            | ExtractionSource::Element
            | ExtractionSource::LocalStorage
            | ExtractionSource::Cookie => extraction.default_value.clone().unwrap_or(VarValue::Null),
        };
        store.set(&extraction.variable_name, value.clone());
        applied.insert(extraction.variable_name.clone(), value);
    }

    let node_result = NodeResult {
        node_id: id.to_string(),
        node_type: "extractVariable".to_string(),
        status: RunStatus::Passed,
        duration_ms: started.elapsed().as_millis() as u64,
        error: None,
        scenario_result: None,
        condition_result: None,
        variable_result: Some(VariableNodeResult { variables: applied }),
    };
    DispatchOutcome { result: Some(node_result), status: RunStatus::Passed, condition_passed: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ScenarioService;
    use async_trait::async_trait;
    use flow_core::{Condition, ConditionNode, ConditionOperator, CoreError, ScenarioExecutionResult};

    struct StubScenarios;

    #[async_trait]
    impl ScenarioService for StubScenarios {
        async fn execute(
            &self,
            scenario_id: &str,
            _options: RunnerOptions,
            _runtime_variables: BTreeMap<String, VarValue>,
        ) -> flow_core::Result<ScenarioExecutionResult> {
            Err(CoreError::not_found(format!("scenario {scenario_id}")))
        }
    }

    #[test]
    fn set_variable_boolean_only_coerces_literal_true_and_1() {
        assert_eq!(coerce_assignment("true", AssignmentType::Boolean), Ok(VarValue::Bool(true)));
        assert_eq!(coerce_assignment("1", AssignmentType::Boolean), Ok(VarValue::Bool(true)));
        assert_eq!(coerce_assignment("yes", AssignmentType::Boolean), Ok(VarValue::Bool(false)));
        assert_eq!(coerce_assignment("TRUE", AssignmentType::Boolean), Ok(VarValue::Bool(false)));
    }

    #[test]
    fn set_variable_number_rejects_nan_and_garbage() {
        assert!(coerce_assignment("not-a-number", AssignmentType::Number).is_err());
        assert_eq!(coerce_assignment("3.5", AssignmentType::Number).unwrap().as_f64(), Some(3.5));
    }

    #[test]
    fn set_variable_json_parses_composite_values() {
        let v = coerce_assignment(r#"{"a":1}"#, AssignmentType::Json).unwrap();
        assert!(v.as_object().is_some());
        assert!(coerce_assignment("{not json", AssignmentType::Json).is_err());
    }

    #[test]
    fn extract_variable_from_last_api_response_with_json_path() {
        let mut store = VariableStore::from_initial(BTreeMap::new());
        let last_api_response = Some(serde_json::json!({"auth": {"token": "abc"}}));
        let extractions = vec![flow_core::VariableExtraction {
            variable_name: "token".into(),
            source: ExtractionSource::LastApiResponse,
            json_path: Some("$.auth.token".into()),
            default_value: None,
        }];
        let outcome = dispatch_extract_variable("n1", &extractions, &mut store, &last_api_response);
        assert_eq!(outcome.status, RunStatus::Passed);
        assert_eq!(store.get("token"), Some(&VarValue::String("abc".into())));
    }

    #[test]
    fn extract_variable_unsupported_source_falls_back_to_default_without_failing() {
        let mut store = VariableStore::from_initial(BTreeMap::new());
        let extractions = vec![flow_core::VariableExtraction {
            variable_name: "x".into(),
            source: ExtractionSource::Url,
            json_path: None,
            default_value: Some(VarValue::String("fallback".into())),
        }];
        let outcome = dispatch_extract_variable("n1", &extractions, &mut store, &None);
        assert_eq!(outcome.status, RunStatus::Passed);
        assert_eq!(store.get("x"), Some(&VarValue::String("fallback".into())));
    }

    #[test]
    fn condition_dispatch_surfaces_unsafe_regex_as_failed_node() {
        let mut store = VariableStore::from_initial(BTreeMap::new());
        store.set("s", VarValue::String("hello".into()));
        let condition = ConditionNode::Leaf(Condition {
            left: "{{ s }}".into(),
            operator: ConditionOperator::Matches,
            right: Some("(a+)+".into()),
        });
        let outcome = dispatch_condition("c1", &condition, &store);
        assert_eq!(outcome.status, RunStatus::Failed);
        assert!(outcome.result.unwrap().error.unwrap().message.contains("ReDoS"));
    }

    #[tokio::test]
    async fn scenario_not_found_yields_skipped_not_failed() {
        let mut store = VariableStore::from_initial(BTreeMap::new());
        let mut last_api_response = None;
        let outcome = dispatch_scenario(
            "n1",
            "missing-scn",
            &mut store,
            &mut last_api_response,
            &StubScenarios,
            &RunnerOptions::default(),
        )
        .await;
        assert_eq!(outcome.status, RunStatus::Skipped);
        let result = outcome.result.unwrap();
        assert_eq!(result.error.unwrap().message, "Scenario missing-scn not found");
    }
}
