//! The capability the engine awaits on at the `scenario` node (spec §5:
//! "Flow engine: only at the scenario node's await on the scenario
//! service"). `scenario-exec` implements this; tests here use a stub.

use async_trait::async_trait;
use flow_core::{Result, RunnerOptions, ScenarioExecutionResult, VarValue};
use std::collections::BTreeMap;

#[async_trait]
pub trait ScenarioService: Send + Sync {
    /// Runs scenario `scenario_id` to completion. Returns
    /// [`flow_core::CoreError::NotFound`] when no such scenario exists. The
    /// engine downgrades that to a `skipped` node result rather than failing
    /// the run (spec §4.1).
    async fn execute(
        &self,
        scenario_id: &str,
        options: RunnerOptions,
        runtime_variables: BTreeMap<String, VarValue>,
    ) -> Result<ScenarioExecutionResult>;
}
