//! The complete HTTP + WebSocket surface, grounded on
//! `orchestrator::api::routes::create_router`.

use crate::handlers::{flows, health, scenarios, sessions};
use crate::state::AppState;
use crate::ws::ws_handler;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Scenarios (spec §6 repository capability: Scenarios).
        .route("/api/v1/scenarios", post(scenarios::create).get(scenarios::list))
        .route(
            "/api/v1/scenarios/:id",
            get(scenarios::get).put(scenarios::update).delete(scenarios::delete),
        )
        .route("/api/v1/scenarios/:id/execute", post(scenarios::execute))
        .route(
            "/api/v1/scenarios/:id/results",
            get(scenarios::list_execution_results),
        )
        // UserFlows + the Flow Execution Engine's Execute/Flatten entry points.
        .route("/api/v1/flows", post(flows::create).get(flows::list))
        .route("/api/v1/flows/:id", get(flows::get).put(flows::update).delete(flows::delete))
        .route("/api/v1/flows/:id/execute", post(flows::execute))
        .route("/api/v1/flows/:id/flatten", get(flows::flatten))
        .route("/api/v1/flows/:id/results", get(flows::list_execution_results))
        // Sessions (spec §6 repository capability: Sessions) + the
        // Event-to-AST Transformer entry point.
        .route("/api/v1/sessions", post(sessions::create).get(sessions::list))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::get).delete(sessions::delete),
        )
        .route("/api/v1/sessions/:id/events", get(sessions::get_events).post(sessions::add_events))
        .route("/api/v1/sessions/:id/with-events", get(sessions::get_with_events))
        .route("/api/v1/sessions/:id/clear-events", post(sessions::clear_events))
        .route("/api/v1/sessions/:id/stop", post(sessions::stop))
        .route("/api/v1/sessions/:id/build-scenario", post(sessions::build_scenario))
        // Scenario execution push protocol (spec §4.2, §6).
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
