//! HTTP + WebSocket control plane wiring the flow/scenario execution core
//! (`flow-core`, `variable-store`, `selector-prioritizer`, `event-transformer`,
//! `flow-engine`, `scenario-exec`, `repository`) behind an axum API.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod ws;
