//! Outbound message types for the reply endpoint.

use serde::{Deserialize, Serialize};

/// A message the bot sends back to a conversation.
///
/// Serializes to the Messaging API's message object format, e.g.
/// `{"type":"text","text":"hi"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SendMessage {
    Text {
        text: String,
    },

    /// Both URLs must be HTTPS and reachable by the platform.
    #[serde(rename_all = "camelCase")]
    Image {
        original_content_url: String,
        preview_image_url: String,
    },
}

impl SendMessage {
    /// Create a text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an image message using the same URL for the full image and
    /// the preview.
    pub fn image(url: impl Into<String>) -> Self {
        let url = url.into();
        Self::Image {
            original_content_url: url.clone(),
            preview_image_url: url,
        }
    }
}

/// Body of `POST /v2/bot/message/reply`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyMessageRequest<'a> {
    pub reply_token: &'a str,
    pub messages: &'a [SendMessage],
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
