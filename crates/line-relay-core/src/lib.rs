//! # Line-Relay Core
//!
//! Core logic for the Line-Relay webhook service.
//!
//! This crate turns verified webhook payloads into replies:
//! - [`message::InboundMessage`] is the closed set of message kinds the bot
//!   answers (text, location, image)
//! - [`dispatcher::EventDispatcher`] routes each event to its handler
//! - [`handlers`] implements the three replies
//! - [`gateway::MessagingGateway`] and [`image_store::ImageStore`] abstract
//!   the Messaging API and the local image directory
//!
//! ## Architecture
//!
//! - Handlers depend only on the two trait abstractions
//! - Concrete implementations live in [`adapters`] and are injected at startup
//! - Configuration values arrive through [`dispatcher::DispatchSettings`],
//!   never through global state

pub mod adapters;
pub mod dispatcher;
pub mod gateway;
pub mod handlers;
pub mod image_store;
pub mod message;
pub mod secret;

#[cfg(test)]
mod testing;

pub use dispatcher::{DispatchReport, DispatchSettings, EventDispatcher, ReplyTexts};
pub use gateway::{GatewayError, MessagingGateway};
pub use handlers::HandlerError;
pub use image_store::{ImageFile, ImageStore, StorageError, StoredImage};
pub use message::{ContentId, IgnoredEvent, InboundMessage, ReplyToken};
pub use secret::SecretValue;

/// Route prefix under which stored images are served.
///
/// Shared by the URL the image handler replies with and the HTTP route that
/// serves the file, so the two cannot drift apart.
pub const IMAGE_ROUTE_PREFIX: &str = "/image";

/// Build the public URL of an image file served under [`IMAGE_ROUTE_PREFIX`].
///
/// A trailing slash on `public_base_url` is ignored.
///
/// ```rust
/// use line_relay_core::public_image_url;
///
/// assert_eq!(
///     public_image_url("https://bot.example.com/", "test.jpg"),
///     "https://bot.example.com/image/test.jpg"
/// );
/// ```
pub fn public_image_url(public_base_url: &str, file_name: &str) -> String {
    format!(
        "{}{}/{}",
        public_base_url.trim_end_matches('/'),
        IMAGE_ROUTE_PREFIX,
        file_name
    )
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
