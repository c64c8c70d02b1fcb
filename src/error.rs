use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The single error type returned by every resource handler. Each variant maps
/// to exactly one HTTP status; the body is always a JSON object with a
/// `message`, plus the underlying `error` text for persistence failures.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed required fields.
    #[error("{0}")]
    Validation(String),
    /// No matching record (or, for grade logs, not visible to the caller).
    #[error("{0}")]
    NotFound(String),
    /// The record exists but belongs to someone else.
    #[error("{0}")]
    Forbidden(String),
    /// Save/commit failure. Any open transaction has already been rolled back.
    #[error("{message}: {source}")]
    Persistence {
        message: String,
        #[source]
        source: sqlx::Error,
    },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Builds a `map_err` adapter that wraps a repository error with context.
    pub fn persistence(message: impl Into<String>) -> impl FnOnce(sqlx::Error) -> Self {
        let message = message.into();
        move |source| Self::Persistence { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(message)
            | ApiError::NotFound(message)
            | ApiError::Forbidden(message) => json!({ "message": message }),
            ApiError::Persistence { message, source } => {
                tracing::error!(error = ?source, "{}", message);
                json!({ "message": message, "error": source.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}
