//! `/api/v1/sessions`: spec §6 "Repository capability: Sessions", plus a
//! `POST .../scenario` endpoint that runs the Event-to-AST Transformer
//! (spec §4.4) over a session's recorded events to produce a `Scenario`.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use flow_core::{ids, RawEvent, Scenario, Session, SessionStatus, SessionWithEvents};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: Option<String>,
    pub url: String,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> ApiResult<Json<Session>> {
    let session = Session {
        id: ids::new_session_id(),
        name: req.name,
        url: req.url,
        status: SessionStatus::Recording,
        started_at: Utc::now(),
        stopped_at: None,
    };
    Ok(Json(state.session_repo.create(session).await?))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Session>>> {
    Ok(Json(state.session_repo.list().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Session>> {
    let session = state
        .session_repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("session {id}")))?;
    Ok(Json(session))
}

pub async fn get_with_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionWithEvents>> {
    let session = state
        .session_repo
        .get_with_events(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("session {id}")))?;
    Ok(Json(session))
}

pub async fn stop(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Session>> {
    Ok(Json(state.session_repo.stop(&id).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.session_repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(events): Json<Vec<RawEvent>>,
) -> ApiResult<StatusCode> {
    state.session_repo.add_events(&id, events).await?;
    Ok(StatusCode::CREATED)
}

pub async fn get_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<RawEvent>>> {
    Ok(Json(state.session_repo.get_events(&id).await?))
}

pub async fn clear_events(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.session_repo.clear_events(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `scheme://host` prefix of a URL, or `None` if it has no `://`. Mirrors
/// the same small extraction `scenario_exec::service` keeps privately for
/// its own base-url derivation.
fn origin_of(url: &str) -> Option<String> {
    let (scheme, rest) = url.split_once("://")?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    Some(format!("{scheme}://{host}"))
}

/// Reduces a session's recorded events into a canonical `Step` sequence
/// (spec §4.4) and persists the result as a new `Scenario`.
pub async fn build_scenario(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Scenario>> {
    let with_events = state
        .session_repo
        .get_with_events(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("session {id}")))?;

    let base_origin = origin_of(&with_events.session.url);
    let steps = event_transformer::transform(&with_events.events, base_origin.as_deref());

    let scenario = Scenario {
        id: ids::new_scenario_id(),
        name: with_events.session.name.clone(),
        url: with_events.session.url.clone(),
        viewport: flow_core::Viewport::default(),
        steps,
        setup: vec![],
        teardown: vec![],
        initial_variables: None,
        ast_schema_version: 1,
    };
    Ok(Json(state.scenario_repo.create(scenario).await?))
}
