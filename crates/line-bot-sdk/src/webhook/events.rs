//! Webhook payload types.
//!
//! Only the fields the SDK's consumers act on are modelled. Unknown fields
//! are ignored, and unknown event or message types deserialize into
//! catch-all variants instead of failing the whole payload.

use serde::{Deserialize, Serialize};

/// Top-level webhook request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// User ID of the bot that should receive the events.
    #[serde(default)]
    pub destination: String,

    /// Events in delivery order. Empty for the console's verification request.
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

impl WebhookPayload {
    /// Parse a payload from the raw request body.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json::Error` when the body is not a
    /// JSON object of the expected shape.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

/// A single webhook event, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebhookEvent {
    /// A user sent a message.
    Message(MessageEvent),

    /// Follow, unfollow, postback, join and every other event type.
    #[serde(other)]
    Other,
}

/// Event emitted when a user sends a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Single-use token for replying. Absent in standby mode.
    #[serde(default)]
    pub reply_token: Option<String>,

    /// The message itself.
    pub message: MessageContent,

    /// Who sent the message.
    #[serde(default)]
    pub source: Option<EventSource>,

    /// Event time in milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: i64,

    /// Unique event ID, stable across redeliveries.
    #[serde(default)]
    pub webhook_event_id: Option<String>,

    #[serde(default)]
    pub delivery_context: Option<DeliveryContext>,
}

impl MessageEvent {
    /// Returns `true` when the platform flagged this event as a redelivery.
    pub fn is_redelivery(&self) -> bool {
        self.delivery_context
            .as_ref()
            .map(|c| c.is_redelivery)
            .unwrap_or(false)
    }
}

/// Message body, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageContent {
    Text {
        id: String,
        text: String,
    },

    Image {
        id: String,
        #[serde(default, rename = "contentProvider")]
        content_provider: Option<ContentProvider>,
    },

    Location {
        id: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        address: Option<String>,
        latitude: f64,
        longitude: f64,
    },

    /// Sticker, video, audio, file and any type added later.
    #[serde(other)]
    Unsupported,
}

impl MessageContent {
    /// Short name of the message type, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Location { .. } => "location",
            Self::Unsupported => "unsupported",
        }
    }

    /// Message ID, if the type is one the SDK models.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Text { id, .. } | Self::Image { id, .. } | Self::Location { id, .. } => Some(id),
            Self::Unsupported => None,
        }
    }
}

/// Where image bytes are held.
///
/// Content uploaded by users is provided by `line` and must be downloaded
/// through the content API; `external` content carries its own URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentProvider {
    #[serde(rename = "type")]
    pub provider_type: String,

    #[serde(default)]
    pub original_content_url: Option<String>,

    #[serde(default)]
    pub preview_image_url: Option<String>,
}

/// Source of an event (user, group chat or multi-person room).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub source_type: String,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub group_id: Option<String>,

    #[serde(default)]
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryContext {
    pub is_redelivery: bool,
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
