//! Mock service error types and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors produced by the mock service.
#[derive(Debug, Error)]
pub enum MockError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Configuration file could not be read or parsed.
    #[error("Configuration I/O error: {0}")]
    ConfigIO(String),

    /// A required request field is absent or null.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the first missing field.
        field: &'static str,
    },

    /// Request body is not a JSON object.
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// No invoice exists for the requested payment id.
    #[error("Payment not found")]
    PaymentNotFound,

    /// Listener or connection failure while serving.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl MockError {
    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            MockError::MissingField { .. } | MockError::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            MockError::PaymentNotFound => StatusCode::NOT_FOUND,
            MockError::ConfigError(_) | MockError::ConfigIO(_) | MockError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short machine-readable error kind.
    pub fn error_type(&self) -> &'static str {
        match self {
            MockError::MissingField { .. } | MockError::MalformedBody(_) => "bad_request",
            MockError::PaymentNotFound => "not_found",
            MockError::ConfigError(_) | MockError::ConfigIO(_) => "configuration_error",
            MockError::Transport(_) => "transport_error",
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": {
                "type": self.error_type(),
                "message": self.to_string(),
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}
