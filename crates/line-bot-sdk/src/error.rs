//! Error types for LINE Bot SDK operations.
//!
//! Errors are classified for callers that want to decide between retrying
//! and giving up; the SDK itself never retries.

use thiserror::Error;

/// Errors during Messaging API operations.
///
/// These errors represent failures when communicating with the reply and
/// content endpoints, including HTTP errors, oversized downloads and
/// transport failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP error response from the Messaging API.
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    /// Request to the Messaging API timed out.
    #[error("Request timeout")]
    Timeout,

    /// The request was rejected as invalid (expired or reused reply token,
    /// malformed message).
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The channel access token was rejected.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The requested message content does not exist or has expired.
    #[error("Resource not found")]
    NotFound,

    /// Downloaded content exceeded the configured size cap.
    #[error("Content too large: more than {limit} bytes")]
    ContentTooLarge { limit: usize },

    /// The client could not be built from its configuration.
    #[error("Client configuration error: {message}")]
    Configuration { message: String },

    /// Failed to serialize a request body.
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP client error (network, TLS, etc.).
    #[error("HTTP client error: {0}")]
    HttpClientError(reqwest::Error),
}

impl ApiError {
    /// Check if this error represents a transient condition that may succeed if retried.
    ///
    /// Transient conditions include:
    /// - Server errors (5xx)
    /// - Rate limiting (429)
    /// - Request timeouts
    /// - Network/transport errors
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpError { status, .. } => *status >= 500 || *status == 429,
            Self::Timeout => true,
            Self::InvalidRequest { .. } => false,
            Self::AuthenticationFailed => false,
            Self::NotFound => false,
            Self::ContentTooLarge { .. } => false,
            Self::Configuration { .. } => false,
            Self::JsonError(_) => false,
            Self::HttpClientError(_) => true,
        }
    }

    /// Map a non-success HTTP status and its body to the matching variant.
    pub(crate) fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::InvalidRequest { message },
            401 | 403 => Self::AuthenticationFailed,
            404 => Self::NotFound,
            code => Self::HttpError {
                status: code,
                message,
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::HttpClientError(error)
        }
    }
}

/// Webhook signature validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The signature header was absent or empty.
    #[error("Required field missing: {field}")]
    Required { field: String },

    /// The signature header is not valid base64.
    #[error("Invalid signature format: {message}")]
    InvalidSignatureFormat { message: String },

    /// The digest does not match the payload.
    #[error("Signature does not match payload")]
    SignatureMismatch,

    /// The HMAC could not be initialised with the channel secret.
    #[error("HMAC computation failed: {message}")]
    HmacError { message: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
