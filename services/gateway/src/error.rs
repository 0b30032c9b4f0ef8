use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use types::fill::Fill;

/// Central error type for the Gateway application
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The engine gave up without completing the order; carries whatever
    /// was filled before the failure
    #[error("Execution failed: {message}")]
    ExecutionFailed { message: String, fills: Vec<Fill> },

    /// Ran out of time; carries whatever was filled
    #[error("Order not fulfilled")]
    NotFulfilled { fills: Vec<Fill> },

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code, data) = match self {
            AppError::RateLimitExceeded(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, msg, "RATE_LIMIT_EXCEEDED", None)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST", None),
            AppError::ExecutionFailed { message, fills } => {
                (StatusCode::BAD_REQUEST, message, "EXECUTION_FAILED", Some(fills))
            }
            AppError::NotFulfilled { fills } => (
                StatusCode::BAD_REQUEST,
                "Order not fulfilled".to_string(),
                "NOT_FULFILLED",
                Some(fills),
            ),
            AppError::InternalError(err) => {
                tracing::error!(error = %err, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_ERROR",
                    None,
                )
            }
        };

        let body = match data {
            Some(fills) => json!({
                "error": code,
                "message": error_message,
                "data": fills,
            }),
            None => json!({
                "error": code,
                "message": error_message,
            }),
        };

        (status, Json(body)).into_response()
    }
}
