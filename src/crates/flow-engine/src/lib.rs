//! Walks a [`flow_core::UserFlow`] from its `start` node, dispatching each
//! node type and producing a [`flow_core::FlowExecutionResult`] (spec §4.1).

mod dispatch;
mod engine;
mod flatten;
mod options;
mod service;

pub use engine::execute;
pub use flatten::flatten;
pub use options::{ExecuteOptions, NodeStatusCallback};
pub use service::ScenarioService;
