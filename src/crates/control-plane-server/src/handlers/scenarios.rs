//! `/api/v1/scenarios`: spec §6 "Repository capability: Scenarios".

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use flow_core::{ids, RunnerOptions, Scenario, ScenarioExecutionResult, VarValue};
use repository::ScenarioPatch;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery { page: default_page(), limit: default_limit() }
    }
}

fn default_page() -> u32 {
    0
}
fn default_limit() -> u32 {
    20
}

#[derive(Debug, Deserialize)]
pub struct CreateScenarioRequest {
    pub name: Option<String>,
    pub url: String,
    #[serde(default)]
    pub viewport: flow_core::Viewport,
    pub steps: Vec<flow_core::Step>,
    #[serde(default)]
    pub setup: Vec<flow_core::Step>,
    #[serde(default)]
    pub teardown: Vec<flow_core::Step>,
    pub initial_variables: Option<BTreeMap<String, VarValue>>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateScenarioRequest>,
) -> ApiResult<Json<Scenario>> {
    let scenario = Scenario {
        id: ids::new_scenario_id(),
        name: req.name,
        url: req.url,
        viewport: req.viewport,
        steps: req.steps,
        setup: req.setup,
        teardown: req.teardown,
        initial_variables: req.initial_variables,
        ast_schema_version: 1,
    };
    let created = state.scenario_repo.create(scenario).await?;
    Ok(Json(created))
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<Vec<Scenario>>> {
    let scenarios = state.scenario_repo.list(q.page, q.limit).await?;
    Ok(Json(scenarios))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Scenario>> {
    let scenario = state
        .scenario_repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("scenario {id}")))?;
    Ok(Json(scenario))
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateScenarioRequest {
    pub name: Option<String>,
    pub url: Option<String>,
    pub initial_variables: Option<BTreeMap<String, VarValue>>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateScenarioRequest>,
) -> ApiResult<Json<Scenario>> {
    let patch = ScenarioPatch { name: req.name, url: req.url, initial_variables: req.initial_variables };
    let updated = state.scenario_repo.update(&id, patch).await?;
    Ok(Json(updated))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.scenario_repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct ExecuteScenarioRequest {
    #[serde(default)]
    pub runner_options: RunnerOptions,
    #[serde(default)]
    pub variables: BTreeMap<String, VarValue>,
}

/// `Execute(scenarioId, options, …)` (spec §4.2) invoked synchronously over
/// HTTP. This handler's calling task is the "separate task" the design
/// note in spec §9 expects the caller to run blocking `Execute` calls in;
/// live progress is additionally available by subscribing to the
/// WebSocket for the returned `executionId` before (or racing) this call.
pub async fn execute(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ExecuteScenarioRequest>,
) -> ApiResult<Json<ScenarioExecutionResult>> {
    let result = state
        .scenario_service
        .execute(&id, req.runner_options, None, req.variables)
        .await?;
    Ok(Json(result))
}

pub async fn list_execution_results(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ScenarioExecutionResult>>> {
    let results = state.scenario_repo.list_execution_results(&id).await?;
    Ok(Json(results))
}
