//! Drives a single scenario end-to-end against a [`ScenarioRunner`],
//! broadcasting lifecycle events and persisting the outcome (spec §4.2).
//! A `tokio::spawn`-driven execution with a streamed progress channel,
//! generalized into a map of concurrently-live executions rather than one
//! run at a time (see [`crate::registry::ExecutionRegistry`]).

use crate::driver::DriverFactory;
use crate::events::{ExecutionEvent, Subscriber};
use crate::registry::{ExecutionRegistry, ExecutionStatus, SubscriberId};
use async_trait::async_trait;
use flow_core::{ids, CoreError, Result, RunnerOptions, ScenarioExecutionResult, VarValue};
use repository::ScenarioRepository;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Scheme+host prefix used as `baseUrl` when the caller doesn't supply one
/// (spec §4.2 step 3). Not a general URL parser, only needs the origin.
fn origin(url: &str) -> Option<String> {
    let (scheme, rest) = url.split_once("://")?;
    let host_end = rest.find('/').unwrap_or(rest.len());
    Some(format!("{scheme}://{}", &rest[..host_end]))
}

pub struct ScenarioExecutionService {
    repository: Arc<dyn ScenarioRepository>,
    driver_factory: Arc<dyn DriverFactory>,
    registry: Arc<ExecutionRegistry>,
}

impl ScenarioExecutionService {
    pub fn new(repository: Arc<dyn ScenarioRepository>, driver_factory: Arc<dyn DriverFactory>) -> Self {
        ScenarioExecutionService { repository, driver_factory, registry: Arc::new(ExecutionRegistry::new()) }
    }

    /// `Subscribe(executionId, subscriber) → bool` (spec §4.2). `None`
    /// stands for `false`, the live execution didn't exist.
    pub fn subscribe(&self, execution_id: &str, subscriber: Subscriber) -> Option<SubscriberId> {
        self.registry.subscribe(execution_id, subscriber)
    }

    pub fn unsubscribe(&self, execution_id: &str, subscriber_id: SubscriberId) {
        self.registry.unsubscribe(execution_id, subscriber_id)
    }

    pub fn status(&self, execution_id: &str) -> ExecutionStatus {
        self.registry.status(execution_id)
    }

    /// Runs the 13-step execution protocol (spec §4.2). `initial_subscriber`
    /// is attached before `started` is broadcast so it never misses the
    /// opening event.
    pub async fn execute(
        &self,
        scenario_id: &str,
        caller_options: RunnerOptions,
        initial_subscriber: Option<Subscriber>,
        runtime_variables: BTreeMap<String, VarValue>,
    ) -> Result<ScenarioExecutionResult> {
        let scenario = self
            .repository
            .get_by_id(scenario_id)
            .await
            .map_err(CoreError::from)?
            .ok_or_else(|| CoreError::not_found(format!("scenario {scenario_id}")))?;

        let mut variables = scenario.initial_variables.clone().unwrap_or_default();
        variables.extend(runtime_variables);

        let base_url = caller_options.base_url.clone().or_else(|| origin(&scenario.url));

        let execution_id = ids::new_execution_id();
        let options = RunnerOptions {
            headless: Some(caller_options.headless.unwrap_or(true)),
            screenshot_on_failure: Some(caller_options.screenshot_on_failure.unwrap_or(true)),
            continue_on_failure: Some(caller_options.continue_on_failure.unwrap_or(false)),
            base_url,
            ..caller_options
        };

        self.registry.register(&execution_id, scenario_id, initial_subscriber);

        let result = self.run_to_completion(&execution_id, &scenario, &options, &variables).await;

        self.registry.remove(&execution_id);
        result
    }

    async fn run_to_completion(
        &self,
        execution_id: &str,
        scenario: &flow_core::Scenario,
        options: &RunnerOptions,
        variables: &BTreeMap<String, VarValue>,
    ) -> Result<ScenarioExecutionResult> {
        self.registry.broadcast(
            execution_id,
            ExecutionEvent::Started {
                execution_id: execution_id.to_string(),
                scenario_id: scenario.id.clone(),
                total_steps: scenario.total_step_count(),
            },
        );

        // `close()` must run on every exit path, including an `init()`
        // failure (spec §4.2 step 13), so it is never gated behind `?` on
        // an earlier step; it always runs before the outcome is inspected.
        let mut driver = self.driver_factory.create(options.clone());
        let outcome = match driver.init().await {
            Ok(()) => driver.run(scenario, variables).await,
            Err(e) => Err(e),
        };
        if let Err(close_err) = driver.close().await {
            tracing::warn!(execution_id, error = %close_err, "driver close failed");
        }

        let result = match outcome {
            Ok(result) => result,
            Err(err) => {
                self.registry.broadcast(
                    execution_id,
                    ExecutionEvent::Error { execution_id: execution_id.to_string(), message: err.to_string() },
                );
                return Err(err);
            }
        };

        for (index, step_result) in result.step_results.iter().enumerate() {
            self.registry.broadcast(
                execution_id,
                ExecutionEvent::StepComplete {
                    execution_id: execution_id.to_string(),
                    step_index: index,
                    result: step_result.clone(),
                },
            );
        }

        self.registry.broadcast(
            execution_id,
            ExecutionEvent::Completed { execution_id: execution_id.to_string(), result: result.clone() },
        );

        self.repository
            .add_execution_result(&scenario.id, result.clone())
            .await
            .map_err(CoreError::from)?;

        Ok(result)
    }
}

#[async_trait]
impl flow_engine::ScenarioService for ScenarioExecutionService {
    async fn execute(
        &self,
        scenario_id: &str,
        options: RunnerOptions,
        runtime_variables: BTreeMap<String, VarValue>,
    ) -> Result<ScenarioExecutionResult> {
        ScenarioExecutionService::execute(self, scenario_id, options, None, runtime_variables).await
    }
}
