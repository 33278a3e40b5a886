//! Error types for the HTTP service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use line_bot_sdk::ValidationError;
use tracing::warn;

/// Callback rejections with HTTP status code mapping
///
/// Every variant maps to `400 Bad Request`: the request is not a genuine,
/// well-formed webhook and retrying it cannot succeed. Failures that happen
/// after the body is accepted (content download, storage, reply) are not
/// represented here; they are logged by the dispatcher and the callback
/// still answers `200 OK`.
///
/// The response body never echoes signature details back to the caller.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    /// The `x-line-signature` header is absent
    #[error("Missing signature header")]
    MissingSignature,

    /// The signature does not match the body, or is not valid base64
    #[error("Signature verification failed: {0}")]
    InvalidSignature(#[from] ValidationError),

    /// Signed body is not a webhook payload
    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

impl CallbackError {
    fn client_message(&self) -> &'static str {
        match self {
            Self::MissingSignature => "Missing signature",
            Self::InvalidSignature(_) => "Invalid signature",
            Self::MalformedPayload(_) => "Malformed webhook payload",
        }
    }
}

impl IntoResponse for CallbackError {
    fn into_response(self) -> Response {
        let status = StatusCode::BAD_REQUEST;

        warn!(error = %self, "Rejected webhook callback");

        let body = serde_json::json!({
            "error": self.client_message(),
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        (status, Json(body)).into_response()
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Failed to load configuration: {message}")]
    Load { message: String },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
