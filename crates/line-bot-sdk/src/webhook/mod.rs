//! Webhook handling for LINE Messaging API callbacks.
//!
//! The platform POSTs a JSON document containing zero or more events and
//! signs the raw body with the channel secret. This module provides the
//! payload types and the signature check; dispatching on events is left to
//! the application.

mod events;
mod validation;

pub use events::{
    ContentProvider, DeliveryContext, EventSource, MessageContent, MessageEvent, WebhookEvent,
    WebhookPayload,
};
pub use validation::SignatureValidator;

/// Name of the HTTP header carrying the base64 HMAC-SHA256 body signature.
///
/// Lower-case so it can be used directly with `http::HeaderMap` lookups.
pub const SIGNATURE_HEADER: &str = "x-line-signature";
