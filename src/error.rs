//! The error taxonomy every layer maps into.
//!
//! Each variant carries exactly what the client is allowed to see; internal
//! faults are logged with full detail server-side and leave the process as a
//! generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input; surfaced as 400 with per-field messages.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// Absent, malformed, or expired credential.
    #[error("{0}")]
    Unauthorized(String),

    /// The resource exists but belongs to another user.
    #[error("{0}")]
    Forbidden(String),

    /// No resource with the given id; malformed ids land here too.
    #[error("{0}")]
    NotFound(String),

    /// Anything unexpected. Logged server-side, generic message to the client.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Shorthand for a single-field validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError::new(field, message)])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "errors": errors })),
            )
                .into_response(),
            ApiError::Unauthorized(message) => envelope(StatusCode::UNAUTHORIZED, &message),
            ApiError::Forbidden(message) => envelope(StatusCode::FORBIDDEN, &message),
            ApiError::NotFound(message) => envelope(StatusCode::NOT_FOUND, &message),
            ApiError::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                envelope(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

fn envelope(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}
