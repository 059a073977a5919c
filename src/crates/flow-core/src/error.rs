//! Error taxonomy shared by the flow engine, scenario service, and variable store.
//!
//! Mirrors spec §7: `Validation`, `NotFound`, `ExecutionFailed`, `RegexUnsafe`,
//! `Timeout`, `Internal`. Each crate-local error converts into this taxonomy at
//! its boundary rather than inventing a parallel hierarchy.

use thiserror::Error;

/// Convenience result type using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Top-level error taxonomy for the control plane core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Bad input shape at a service boundary. Never persisted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A scenario, flow, or session lookup failed.
    #[error("not found: {0}")]
    NotFound(String),

    /// The browser driver reported a failed run.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// A `matches` condition was rejected by the regex-safety gate.
    #[error("ReDoS risk: {0}")]
    RegexUnsafe(String),

    /// A deadline (flow `maxExecutionTime`, etc.) was exceeded.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Anything unexpected. Carries a message only, the source is logged,
    /// not threaded through this boundary.
    #[error("internal error: {0}")]
    Internal(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    pub fn regex_unsafe(msg: impl Into<String>) -> Self {
        Self::RegexUnsafe(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for errors that a flow-node dispatcher should downgrade to a
    /// `skipped` node result instead of failing the whole run (spec §4.1).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
