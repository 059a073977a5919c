//! `/api/v1/flows`: spec §6 "Repository capability: UserFlows" plus the
//! Flow Execution Engine's `Execute`/`Flatten` entry points (spec §4.1).

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use flow_core::{ids, FlowEdge, FlowExecutionResult, FlowNode, UserFlow, VarValue};
use flow_engine::ExecuteOptions;
use repository::UserFlowPatch;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub struct CreateFlowRequest {
    pub name: String,
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    pub initial_variables: Option<BTreeMap<String, VarValue>>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateFlowRequest>,
) -> ApiResult<Json<UserFlow>> {
    let flow = UserFlow {
        id: ids::new_flow_id(),
        name: req.name,
        nodes: req.nodes,
        edges: req.edges,
        initial_variables: req.initial_variables,
    };
    flow.validate()?;
    let created = state.flow_repo.create(flow).await?;
    Ok(Json(created))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<UserFlow>>> {
    Ok(Json(state.flow_repo.list().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<UserFlow>> {
    let flow = state
        .flow_repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("flow {id}")))?;
    Ok(Json(flow))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateFlowRequest {
    pub name: Option<String>,
    pub nodes: Option<Vec<FlowNode>>,
    pub edges: Option<Vec<FlowEdge>>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateFlowRequest>,
) -> ApiResult<Json<UserFlow>> {
    let patch = UserFlowPatch { name: req.name, nodes: req.nodes, edges: req.edges };
    Ok(Json(state.flow_repo.update(&id, patch).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.flow_repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct ExecuteFlowRequest {
    pub initial_variables: Option<BTreeMap<String, VarValue>>,
    #[serde(default)]
    pub continue_on_failure: bool,
}

/// `Execute(flow, options) → FlowExecutionResult` (spec §4.1), blocking the
/// request task for the whole walk, per spec §9's synchronous-`Execute`
/// design note, streaming progress is a WebSocket subscription concern, not
/// this endpoint's.
pub async fn execute(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ExecuteFlowRequest>,
) -> ApiResult<Json<FlowExecutionResult>> {
    let flow = state
        .flow_repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("flow {id}")))?;

    let options = ExecuteOptions {
        initial_variables: req.initial_variables.or_else(|| flow.initial_variables.clone()),
        continue_on_failure: req.continue_on_failure,
        max_execution_time: state.config.max_execution_time(),
        ..ExecuteOptions::default()
    };

    let result = flow_engine::execute(&flow, state.scenario_service.as_ref(), options).await;
    state.flow_repo.add_execution_result(&id, result.clone()).await?;
    Ok(Json(result))
}

/// `Flatten(flow) → scenarioIds[]` (spec §4.1).
pub async fn flatten(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Vec<String>>> {
    let flow = state
        .flow_repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("flow {id}")))?;
    Ok(Json(flow_engine::flatten(&flow)))
}

pub async fn list_execution_results(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<FlowExecutionResult>>> {
    Ok(Json(state.flow_repo.list_execution_results(&id).await?))
}
