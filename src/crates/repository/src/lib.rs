//! Persistence ports consumed by the core (spec §6) plus a SQLite-backed
//! implementation: a pooled connection and per-aggregate repository
//! idiom.

pub mod error;
pub mod ports;
pub mod sqlite;

pub use error::{RepoError, Result};
pub use ports::{
    ScenarioPatch, ScenarioRepository, SessionPatch, SessionRepository, UserFlowPatch,
    UserFlowRepository,
};
pub use sqlite::{connect, SqliteScenarioRepository, SqliteSessionRepository, SqliteUserFlowRepository};
