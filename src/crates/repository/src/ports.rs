//! Repository capability ports consumed by the core (spec §6): one trait
//! per aggregate (`Scenarios`, `Sessions`, `UserFlows`), kept separate from
//! any one storage backend so the flow engine and scenario service depend
//! only on these interfaces.

use crate::error::Result;
use async_trait::async_trait;
use flow_core::{
    RawEvent, Scenario, ScenarioExecutionResult, Session, SessionWithEvents, UserFlow,
    FlowExecutionResult,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct ScenarioPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub initial_variables: Option<BTreeMap<String, flow_core::VarValue>>,
}

#[async_trait]
pub trait ScenarioRepository: Send + Sync {
    async fn create(&self, scenario: Scenario) -> Result<Scenario>;
    async fn get_by_id(&self, id: &str) -> Result<Option<Scenario>>;
    async fn list(&self, page: u32, limit: u32) -> Result<Vec<Scenario>>;
    async fn update(&self, id: &str, patch: ScenarioPatch) -> Result<Scenario>;
    async fn delete(&self, id: &str) -> Result<()>;
    async fn add_execution_result(
        &self,
        scenario_id: &str,
        result: ScenarioExecutionResult,
    ) -> Result<()>;
    async fn list_execution_results(&self, scenario_id: &str) -> Result<Vec<ScenarioExecutionResult>>;
}

#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub name: Option<String>,
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: Session) -> Result<Session>;
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>>;
    async fn get_with_events(&self, id: &str) -> Result<Option<SessionWithEvents>>;
    async fn list(&self) -> Result<Vec<Session>>;
    async fn update(&self, id: &str, patch: SessionPatch) -> Result<Session>;
    async fn stop(&self, id: &str) -> Result<Session>;
    async fn delete(&self, id: &str) -> Result<()>;
    /// Idempotent on `event.id` (insert-or-ignore on duplicate, spec §6).
    async fn add_event(&self, session_id: &str, event: RawEvent) -> Result<()>;
    async fn add_events(&self, session_id: &str, events: Vec<RawEvent>) -> Result<()>;
    async fn get_events(&self, session_id: &str) -> Result<Vec<RawEvent>>;
    async fn clear_events(&self, session_id: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct UserFlowPatch {
    pub name: Option<String>,
    pub nodes: Option<Vec<flow_core::FlowNode>>,
    pub edges: Option<Vec<flow_core::FlowEdge>>,
}

#[async_trait]
pub trait UserFlowRepository: Send + Sync {
    async fn create(&self, flow: UserFlow) -> Result<UserFlow>;
    async fn get_by_id(&self, id: &str) -> Result<Option<UserFlow>>;
    async fn list(&self) -> Result<Vec<UserFlow>>;
    async fn update(&self, id: &str, patch: UserFlowPatch) -> Result<UserFlow>;
    async fn delete(&self, id: &str) -> Result<()>;
    async fn add_execution_result(&self, flow_id: &str, result: FlowExecutionResult) -> Result<()>;
    async fn list_execution_results(&self, flow_id: &str) -> Result<Vec<FlowExecutionResult>>;
}
