//! Domain types and shared error taxonomy for the browser-test control plane.
//!
//! This crate owns no behavior. It is the vocabulary that `variable-store`,
//! `flow-engine`, `scenario-exec`, `event-transformer`, and
//! `selector-prioritizer` all share, so that flows, scenarios, and results
//! can cross crate (and wire) boundaries without re-parsing JSON ad hoc.

pub mod condition;
pub mod error;
pub mod event;
pub mod flow;
pub mod ids;
pub mod result;
pub mod scenario;
pub mod selector;
pub mod session;
pub mod step;
pub mod variable;

pub use condition::{Condition, ConditionEvalResult, ConditionNode, ConditionOperator, CompoundCondition};
pub use error::{CoreError, Result};
pub use event::{RawEvent, RawEventType, TargetInfo};
pub use flow::{
    AssignmentType, EdgeHandle, ExtractionSource, FlowEdge, FlowNode, FlowValidationError,
    UserFlow, VariableAssignment, VariableExtraction,
};
pub use result::{
    ApiCall, ConditionNodeResult, ExecutionSummary, FlowExecutionResult, NodeResult, RunStatus,
    ScenarioExecutionResult, StepError, StepResult, VariableNodeResult,
};
pub use scenario::{RunnerOptions, Scenario, Viewport};
pub use selector::Selector;
pub use session::{Session, SessionStatus, SessionWithEvents};
pub use step::Step;
pub use variable::VarValue;
