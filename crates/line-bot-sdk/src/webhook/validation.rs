//! Webhook signature validation implementation.
//!
//! The platform signs every webhook body with HMAC-SHA256 keyed by the
//! channel secret and sends the base64-encoded digest in the
//! `X-Line-Signature` header.

use crate::error::ValidationError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Validates webhook signatures using HMAC-SHA256.
///
/// # Security
///
/// - Digests are compared in constant time
/// - The channel secret never appears in `Debug` output
/// - The signature must be computed over the raw body bytes, never over
///   re-serialized JSON
///
/// # Examples
///
/// ```rust
/// use line_bot_sdk::webhook::SignatureValidator;
///
/// let validator = SignatureValidator::new("channel-secret");
/// let body = br#"{"destination":"U0","events":[]}"#;
///
/// let header = validator.sign(body);
/// assert!(validator.validate(body, &header).is_ok());
/// assert!(validator.validate(b"tampered", &header).is_err());
/// ```
#[derive(Clone)]
pub struct SignatureValidator {
    channel_secret: String,
}

impl SignatureValidator {
    /// Create a new signature validator for the given channel secret.
    pub fn new(channel_secret: impl Into<String>) -> Self {
        Self {
            channel_secret: channel_secret.into(),
        }
    }

    /// Validate a webhook signature.
    ///
    /// # Arguments
    ///
    /// * `payload` - The raw webhook body bytes
    /// * `signature` - The `X-Line-Signature` header value (base64)
    ///
    /// # Errors
    ///
    /// - [`ValidationError::Required`] when the signature is empty
    /// - [`ValidationError::InvalidSignatureFormat`] when it is not base64
    /// - [`ValidationError::SignatureMismatch`] when the digest differs
    pub fn validate(&self, payload: &[u8], signature: &str) -> Result<(), ValidationError> {
        let signature = signature.trim();
        if signature.is_empty() {
            return Err(ValidationError::Required {
                field: "X-Line-Signature".to_string(),
            });
        }

        let provided = BASE64
            .decode(signature)
            .map_err(|e| ValidationError::InvalidSignatureFormat {
                message: format!("Invalid base64 encoding in signature: {}", e),
            })?;

        let expected = self.compute_hmac(payload)?;

        // Length is not secret; the digest comparison is
        if provided.len() != expected.len() || !bool::from(provided.ct_eq(&expected)) {
            return Err(ValidationError::SignatureMismatch);
        }

        Ok(())
    }

    /// Compute the base64 signature the platform would send for `payload`.
    ///
    /// Useful for tests and for tools that replay webhooks locally.
    pub fn sign(&self, payload: &[u8]) -> String {
        match self.compute_hmac(payload) {
            Ok(digest) => BASE64.encode(digest),
            // HMAC-SHA256 accepts keys of any length
            Err(_) => String::new(),
        }
    }

    fn compute_hmac(&self, payload: &[u8]) -> Result<Vec<u8>, ValidationError> {
        let mut mac = HmacSha256::new_from_slice(self.channel_secret.as_bytes()).map_err(|e| {
            ValidationError::HmacError {
                message: format!("Failed to create HMAC instance: {}", e),
            }
        })?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

// Security: Don't expose secrets in debug output
impl std::fmt::Debug for SignatureValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureValidator")
            .field("channel_secret", &"<REDACTED>")
            .finish()
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
