//! `Execute(flow, options)` inputs (spec §4.1).

use flow_core::{NodeResult, RunStatus, RunnerOptions, VarValue};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Invoked synchronously, in traversal order, after each node's result is
/// appended but before moving to successors (spec §5 "Ordering guarantees").
pub type NodeStatusCallback = Arc<dyn Fn(&str, RunStatus, Option<&NodeResult>) + Send + Sync>;

pub struct ExecuteOptions {
    pub initial_variables: Option<BTreeMap<String, VarValue>>,
    pub runner_options: RunnerOptions,
    pub max_execution_time: Duration,
    pub continue_on_failure: bool,
    pub on_node_status_change: Option<NodeStatusCallback>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        ExecuteOptions {
            initial_variables: None,
            runner_options: RunnerOptions::default(),
            max_execution_time: Duration::from_secs(5 * 60),
            continue_on_failure: false,
            on_node_status_change: None,
        }
    }
}
