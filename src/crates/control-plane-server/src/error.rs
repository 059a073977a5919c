//! HTTP error conversion, grounded on `orchestrator::api::error::ApiError`:
//! a thin wrapper converting [`flow_core::CoreError`] / [`repository::RepoError`]
//! / [`flow_core::FlowValidationError`] into the taxonomy of spec §7
//! (`Validation`, `NotFound`, `ExecutionFailed`, `RegexUnsafe`, `Timeout`,
//! `Internal`) with a matching HTTP status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use flow_core::{CoreError, FlowValidationError};
use repository::RepoError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    #[error("ReDoS risk: {0}")]
    RegexUnsafe(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ExecutionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RegexUnsafe(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::ExecutionFailed(_) => "EXECUTION_FAILED",
            ApiError::RegexUnsafe(_) => "REGEX_UNSAFE",
            ApiError::Internal(_) => "INTERNAL",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        tracing::warn!(%status, %code, "request failed: {}", self);
        let body = ErrorBody { success: false, error: self.to_string(), code };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Validation(m) => ApiError::Validation(m),
            CoreError::NotFound(m) => ApiError::NotFound(m),
            CoreError::ExecutionFailed(m) => ApiError::ExecutionFailed(m),
            CoreError::RegexUnsafe(m) => ApiError::RegexUnsafe(m),
            CoreError::Timeout(d) => ApiError::ExecutionFailed(format!("timed out after {d:?}")),
            CoreError::Internal(m) => ApiError::Internal(m),
            CoreError::Serialization(e) => ApiError::Validation(e.to_string()),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        CoreError::from(e).into()
    }
}

impl From<FlowValidationError> for ApiError {
    fn from(e: FlowValidationError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
