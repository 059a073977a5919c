//! End-to-end handler tests against an in-memory SQLite pool: build the
//! real collaborators, call the handler, assert on what came back.

use axum::extract::{Path, Query, State};
use axum::Json;
use control_plane_server::config::ServerConfig;
use control_plane_server::handlers::{flows, scenarios, sessions};
use control_plane_server::state::AppState;
use flow_core::{FlowEdge, FlowNode, RawEvent, RawEventType, Step, TargetInfo};
use repository::{SqliteScenarioRepository, SqliteSessionRepository, SqliteUserFlowRepository};
use scenario_exec::{ScenarioExecutionService, SyntheticDriverFactory};
use std::sync::Arc;

async fn test_state() -> AppState {
    let pool = repository::connect("sqlite::memory:").await.expect("connect");
    let scenario_repo = Arc::new(SqliteScenarioRepository::new(pool.clone()));
    let flow_repo = Arc::new(SqliteUserFlowRepository::new(pool.clone()));
    let session_repo = Arc::new(SqliteSessionRepository::new(pool.clone()));
    let scenario_service = Arc::new(ScenarioExecutionService::new(
        scenario_repo.clone(),
        Arc::new(SyntheticDriverFactory),
    ));
    AppState {
        config: Arc::new(ServerConfig::default()),
        scenario_repo,
        flow_repo,
        session_repo,
        scenario_service,
    }
}

#[tokio::test]
async fn create_and_get_scenario_round_trips() {
    let state = test_state().await;
    let req = scenarios::CreateScenarioRequest {
        name: Some("login".to_string()),
        url: "https://example.com/login".to_string(),
        viewport: Default::default(),
        steps: vec![],
        setup: vec![],
        teardown: vec![],
        initial_variables: None,
    };
    let created = scenarios::create(State(state.clone()), Json(req)).await.unwrap().0;
    assert_eq!(created.name.as_deref(), Some("login"));

    let fetched = scenarios::get(State(state), Path(created.id.clone())).await.unwrap().0;
    assert_eq!(fetched.id, created.id);
}

#[tokio::test]
async fn get_missing_scenario_is_not_found() {
    let state = test_state().await;
    let err = scenarios::get(State(state), Path("scenario-missing".to_string())).await.unwrap_err();
    assert!(matches!(err, control_plane_server::error::ApiError::NotFound(_)));
}

#[tokio::test]
async fn list_scenarios_paginates() {
    let state = test_state().await;
    for i in 0..3 {
        let req = scenarios::CreateScenarioRequest {
            name: Some(format!("s{i}")),
            url: "https://example.com".to_string(),
            viewport: Default::default(),
            steps: vec![],
            setup: vec![],
            teardown: vec![],
            initial_variables: None,
        };
        scenarios::create(State(state.clone()), Json(req)).await.unwrap();
    }
    let page = scenarios::list(State(state), Query(scenarios::ListQuery::default())).await.unwrap().0;
    assert_eq!(page.len(), 3);
}

#[tokio::test]
async fn creating_flow_with_dangling_edge_is_rejected() {
    let state = test_state().await;
    let req = flows::CreateFlowRequest {
        name: "broken".to_string(),
        nodes: vec![FlowNode::Start { id: "start".to_string() }],
        edges: vec![FlowEdge {
            source: "start".to_string(),
            target: "missing".to_string(),
            source_handle: None,
        }],
        initial_variables: None,
    };
    let err = flows::create(State(state), Json(req)).await.unwrap_err();
    assert!(matches!(err, control_plane_server::error::ApiError::Validation(_)));
}

#[tokio::test]
async fn recording_session_builds_a_scenario() {
    let state = test_state().await;
    let session = sessions::create(
        State(state.clone()),
        Json(sessions::CreateSessionRequest {
            name: Some("recording".to_string()),
            url: "https://example.com/start".to_string(),
        }),
    )
    .await
    .unwrap()
    .0;

    let events = vec![RawEvent {
        id: "evt-1".to_string(),
        event_type: RawEventType::Click,
        timestamp: 0,
        url: None,
        target: Some(TargetInfo {
            test_id: Some("submit".to_string()),
            role: None,
            aria_label: None,
            id: None,
            name: None,
            tag: Some("button".to_string()),
            text: None,
            classes: vec![],
            depth: 1,
            is_unique: true,
        }),
        value: None,
        is_sensitive: false,
        key: None,
        scroll_x: None,
        scroll_y: None,
    }];
    sessions::add_events(State(state.clone()), Path(session.id.clone()), Json(events))
        .await
        .unwrap();

    let scenario = sessions::build_scenario(State(state), Path(session.id)).await.unwrap().0;
    assert_eq!(scenario.steps.len(), 1);
    assert!(matches!(scenario.steps[0], Step::Click { .. }));
}
