//! Repository error taxonomy: `sqlx::Error` and `serde_json::Error` convert
//! into it at the storage boundary, and it converts into
//! [`flow_core::CoreError`] at the call boundary.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepoError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        RepoError::NotFound(msg.into())
    }
}

impl From<RepoError> for flow_core::CoreError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(m) => flow_core::CoreError::NotFound(m),
            other => flow_core::CoreError::Internal(other.to_string()),
        }
    }
}
