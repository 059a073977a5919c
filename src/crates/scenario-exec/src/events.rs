//! Wire event schema for the push protocol (spec §4.2, §6): a union-tagged
//! enum of every event a subscriber can receive over the execution stream.

use flow_core::{ScenarioExecutionResult, StepResult};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExecutionEvent {
    #[serde(rename = "started")]
    Started { execution_id: String, scenario_id: String, total_steps: usize },

    #[serde(rename = "step_start")]
    StepStart { execution_id: String, step_index: usize },

    #[serde(rename = "step_complete")]
    StepComplete { execution_id: String, step_index: usize, result: StepResult },

    #[serde(rename = "completed")]
    Completed { execution_id: String, result: ScenarioExecutionResult },

    #[serde(rename = "error")]
    Error { execution_id: String, message: String },

    #[serde(rename = "subscribed")]
    Subscribed { execution_id: String },

    #[serde(rename = "unsubscribed")]
    Unsubscribed { execution_id: String },

    #[serde(rename = "connected")]
    Connected { message: String },
}

/// Client control message accepted over the push channel (spec §6).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Subscribe { execution_id: String },
    Unsubscribe { execution_id: String },
}

pub type Subscriber = mpsc::UnboundedSender<ExecutionEvent>;

/// Sends `event` to `subscriber`, silently dropping it if the receiving end
/// has gone away, per "subscribers that are not in the open state are
/// skipped silently" (spec §4.2).
pub(crate) fn send_silently(subscriber: &Subscriber, event: ExecutionEvent) {
    let _ = subscriber.send(event);
}
