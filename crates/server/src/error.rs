use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::notify::NotifyError;
use crate::store::StoreError;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Match error: {0}")]
    Match(#[from] matcher::MatchError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ServerError::Match(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Notify(NotifyError::NoRecipient { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServerError::Notify(NotifyError::Delivery(_)) => StatusCode::BAD_GATEWAY,
            ServerError::Internal(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::NotFound(_) => "NOT_FOUND",
            ServerError::Timeout => "REQUEST_TIMEOUT",
            ServerError::Match(_) => "MATCH_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::Notify(_) => "NOTIFY_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code = %error_code, message = %message, "request failed");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: error_code,
                message,
            },
        });

        (status, body).into_response()
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        ServerError::BadRequest(err.to_string())
    }
}

impl From<lostfound::ConfigLoadError> for ServerError {
    fn from(err: lostfound::ConfigLoadError) -> Self {
        ServerError::Config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("worker task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_code_per_variant() {
        let cases = [
            (ServerError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (ServerError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (ServerError::Timeout, StatusCode::REQUEST_TIMEOUT, "REQUEST_TIMEOUT"),
            (
                ServerError::Notify(NotifyError::NoRecipient {
                    lost_id: "LOST-0001".into(),
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
                "NOTIFY_ERROR",
            ),
            (
                ServerError::Notify(NotifyError::Delivery("smtp down".into())),
                StatusCode::BAD_GATEWAY,
                "NOTIFY_ERROR",
            ),
            (ServerError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.error_code(), code);
        }
    }

    #[test]
    fn store_errors_are_bad_requests() {
        let err: ServerError = StoreError::Validation("place is required".into()).into();
        assert!(matches!(err, ServerError::BadRequest(_)));
        assert_eq!(err.to_string(), "Bad request: invalid report: place is required");
    }
}
