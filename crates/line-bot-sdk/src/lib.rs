//! # LINE Bot SDK
//!
//! Minimal Software Development Kit for the LINE Messaging API, covering what
//! a webhook-driven bot needs:
//!
//! - Webhook payload types ([`webhook::WebhookPayload`] and friends)
//! - Webhook signature validation ([`webhook::SignatureValidator`])
//! - An API client for replying to messages and downloading message content
//!   ([`client::MessagingApiClient`])
//!
//! # Examples
//!
//! ```rust
//! use line_bot_sdk::webhook::{SignatureValidator, WebhookPayload};
//!
//! let validator = SignatureValidator::new("channel-secret");
//! let body = br#"{"destination":"U0","events":[]}"#;
//! let signature = validator.sign(body);
//!
//! assert!(validator.validate(body, &signature).is_ok());
//! let payload = WebhookPayload::from_slice(body).unwrap();
//! assert!(payload.events.is_empty());
//! ```

// Public modules
pub mod client;
pub mod error;
pub mod webhook;

// Re-export commonly used types at crate root for convenience
pub use client::{ClientConfig, MessagingApiClient, SendMessage};
pub use error::{ApiError, ValidationError};
pub use webhook::{
    MessageContent, MessageEvent, SignatureValidator, WebhookEvent, WebhookPayload,
    SIGNATURE_HEADER,
};
