// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 400 Bad Request, a required field was absent from the submission
    MissingField(&'static str),

    // 401 Unauthorized (no established participant identity)
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., answering before the session has begun)
    Conflict(String),

    // 503 No template could produce a single question for this session
    AssemblyFailure(String),

    // 500 Writing or renaming a result file failed; session is kept for retry
    PersistenceFailure(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingField(field) => write!(f, "Missing required field: {}", field),
            AppError::AssemblyFailure(msg) => write!(f, "Assembly failure: {}", msg),
            AppError::PersistenceFailure(msg) => write!(f, "Persistence failure: {}", msg),
            other => write!(f, "{:?}", other),
        }
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::PersistenceFailure(msg) => {
                tracing::error!("Failed to persist results: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to save results".to_string(),
                )
            }
            AppError::AssemblyFailure(msg) => {
                tracing::warn!("Session start aborted: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "No questions are currently available. Please contact the organisers."
                        .to_string(),
                )
            }
            AppError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                format!("Missing required field: {}", field),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on session store queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
