use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::streaming::{StreamError, StreamErrorKind};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("AI error: {0}")]
    Ai(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// HTTP status for a failed upstream stream. Auth kinds become 401 so the
/// front end can send the user back through sign-in.
fn stream_status(err: &StreamError) -> StatusCode {
    if err.is_auth() {
        return StatusCode::UNAUTHORIZED;
    }
    match err.kind {
        StreamErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        StreamErrorKind::QuotaExhausted => StatusCode::PAYMENT_REQUIRED,
        StreamErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "Upload exceeds the maximum allowed size".to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Stream(e) => {
                tracing::warn!("Stream error ({}): {}", e.kind.as_str(), e.message);
                (stream_status(e), e.kind.as_str(), e.message.clone())
            }
            AppError::Ai(msg) => {
                tracing::error!("AI error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "AI_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
