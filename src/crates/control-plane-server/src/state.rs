//! Shared application state, grounded on `orchestrator::api::routes::AppState`:
//! a small `Clone` struct of `Arc`-wrapped collaborators threaded through
//! axum's `State` extractor.

use crate::config::ServerConfig;
use repository::{ScenarioRepository, SessionRepository, UserFlowRepository};
use scenario_exec::ScenarioExecutionService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub scenario_repo: Arc<dyn ScenarioRepository>,
    pub flow_repo: Arc<dyn UserFlowRepository>,
    pub session_repo: Arc<dyn SessionRepository>,
    pub scenario_service: Arc<ScenarioExecutionService>,
}
