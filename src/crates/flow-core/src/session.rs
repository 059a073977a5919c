//! Recording Session entity (spec §3, §6): the event stream later reduced
//! by `event-transformer` into a `Scenario`'s steps.

use crate::event::RawEvent;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Recording,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub url: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<DateTime<Utc>>,
}

/// Returned by `GetWithEvents` (spec §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionWithEvents {
    pub session: Session,
    pub events: Vec<RawEvent>,
}
