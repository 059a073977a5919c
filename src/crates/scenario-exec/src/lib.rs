//! Drives scenario executions against a pluggable browser driver, fans
//! lifecycle events out to subscribers, and persists outcomes (spec §4.2).
//! Implements [`flow_engine::ScenarioService`] so the flow engine can await
//! `scenario` nodes against it directly.

pub mod driver;
pub mod events;
pub mod registry;
pub mod service;

pub use driver::{DriverFactory, ScenarioRunner, SyntheticDriver, SyntheticDriverFactory};
pub use events::{ClientMessage, ExecutionEvent, Subscriber};
pub use registry::{ExecutionRegistry, ExecutionStatus, SubscriberId};
pub use service::ScenarioExecutionService;
