//! # Message Handlers
//!
//! One handler per [`InboundMessage`](crate::InboundMessage) kind. Handlers
//! reply through the [`MessagingGateway`] and never retry.

use line_bot_sdk::SendMessage;
use tracing::{debug, info, instrument};

use crate::dispatcher::ReplyTexts;
use crate::gateway::{GatewayError, MessagingGateway};
use crate::image_store::{ImageStore, StorageError};
use crate::message::{ContentId, ReplyToken};
use crate::public_image_url;

/// Errors raised while handling a single message event.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Failed to fetch content for message {content_id}: {source}")]
    ContentFetch {
        content_id: String,
        #[source]
        source: GatewayError,
    },

    #[error("Image storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to send reply: {0}")]
    Reply(#[source] GatewayError),
}

impl HandlerError {
    /// Check if error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ContentFetch { source, .. } => source.is_transient(),
            Self::Storage(e) => e.is_transient(),
            Self::Reply(e) => e.is_transient(),
        }
    }
}

/// Reply to a text message with the fixed acknowledgment.
///
/// The incoming text is logged and otherwise ignored.
#[instrument(skip(gateway, replies, text), fields(reply_token = %reply_token))]
pub async fn handle_text(
    gateway: &dyn MessagingGateway,
    replies: &ReplyTexts,
    reply_token: &ReplyToken,
    text: &str,
) -> Result<(), HandlerError> {
    info!(text = %text, "Received text message");

    gateway
        .reply(reply_token, vec![SendMessage::text(replies.text.as_str())])
        .await
        .map_err(HandlerError::Reply)
}

/// Reply to a location message with the fixed acknowledgment.
#[instrument(skip(gateway, replies), fields(reply_token = %reply_token))]
pub async fn handle_location(
    gateway: &dyn MessagingGateway,
    replies: &ReplyTexts,
    reply_token: &ReplyToken,
    latitude: f64,
    longitude: f64,
) -> Result<(), HandlerError> {
    debug!(latitude, longitude, "Received location message");

    gateway
        .reply(
            reply_token,
            vec![SendMessage::text(replies.location.as_str())],
        )
        .await
        .map_err(HandlerError::Reply)
}

/// Relay an image: download it, store it, reply with its public URL.
///
/// Steps run strictly in order and the first failure ends the handler:
/// 1. ensure the image directory exists
/// 2. download the content by message id
/// 3. replace the stored image
/// 4. reply with an image message pointing at the public URL
#[instrument(skip(gateway, images, public_base_url), fields(reply_token = %reply_token, content_id = %content_id))]
pub async fn handle_image(
    gateway: &dyn MessagingGateway,
    images: &dyn ImageStore,
    public_base_url: &str,
    reply_token: &ReplyToken,
    content_id: &ContentId,
) -> Result<(), HandlerError> {
    images.ensure_directory().await?;

    let content =
        gateway
            .fetch_content(content_id)
            .await
            .map_err(|source| HandlerError::ContentFetch {
                content_id: content_id.to_string(),
                source,
            })?;

    let stored = images.store(&content).await?;

    let url = public_image_url(public_base_url, &stored.file_name);
    info!(
        size_bytes = stored.size_bytes,
        url = %url,
        "Stored image, replying with public URL"
    );

    gateway
        .reply(reply_token, vec![SendMessage::image(url)])
        .await
        .map_err(HandlerError::Reply)
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
