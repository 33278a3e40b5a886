//! Inbound message classification.
//!
//! [`InboundMessage`] is the closed set of message kinds the relay answers.
//! Every other webhook event maps to an [`IgnoredEvent`] reason, which the
//! dispatcher logs and skips.

use line_bot_sdk::{MessageContent, MessageEvent, WebhookEvent};
use std::fmt;

/// Single-use token that authorizes one reply to one event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplyToken(String);

impl ReplyToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReplyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Platform identifier used to download a message's binary content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A message the relay knows how to answer.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Text {
        reply_token: ReplyToken,
        text: String,
    },
    Location {
        reply_token: ReplyToken,
        latitude: f64,
        longitude: f64,
        title: Option<String>,
        address: Option<String>,
    },
    Image {
        reply_token: ReplyToken,
        content_id: ContentId,
    },
}

/// Why an event was not routed to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredEvent {
    /// Follow, unfollow, postback and other non-message events.
    NotAMessage,
    /// A message of a kind with no handler (sticker, video, ...).
    UnsupportedKind,
    /// The event carries no reply token, so it cannot be answered.
    MissingReplyToken,
}

impl IgnoredEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAMessage => "not_a_message",
            Self::UnsupportedKind => "unsupported_kind",
            Self::MissingReplyToken => "missing_reply_token",
        }
    }
}

impl fmt::Display for IgnoredEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InboundMessage {
    /// Classify a webhook event.
    ///
    /// # Errors
    ///
    /// Returns the [`IgnoredEvent`] reason when the event has no handler.
    pub fn from_event(event: &WebhookEvent) -> Result<Self, IgnoredEvent> {
        match event {
            WebhookEvent::Message(message_event) => Self::from_message_event(message_event),
            WebhookEvent::Other => Err(IgnoredEvent::NotAMessage),
        }
    }

    fn from_message_event(event: &MessageEvent) -> Result<Self, IgnoredEvent> {
        if matches!(event.message, MessageContent::Unsupported) {
            return Err(IgnoredEvent::UnsupportedKind);
        }

        let reply_token = match event.reply_token.as_deref() {
            Some(token) if !token.is_empty() => ReplyToken::new(token),
            _ => return Err(IgnoredEvent::MissingReplyToken),
        };

        let message = match &event.message {
            MessageContent::Text { text, .. } => Self::Text {
                reply_token,
                text: text.clone(),
            },
            MessageContent::Location {
                title,
                address,
                latitude,
                longitude,
                ..
            } => Self::Location {
                reply_token,
                latitude: *latitude,
                longitude: *longitude,
                title: title.clone(),
                address: address.clone(),
            },
            MessageContent::Image { id, .. } => Self::Image {
                reply_token,
                content_id: ContentId::new(id.clone()),
            },
            MessageContent::Unsupported => return Err(IgnoredEvent::UnsupportedKind),
        };

        Ok(message)
    }

    /// Short name of the message kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Location { .. } => "location",
            Self::Image { .. } => "image",
        }
    }

    pub fn reply_token(&self) -> &ReplyToken {
        match self {
            Self::Text { reply_token, .. }
            | Self::Location { reply_token, .. }
            | Self::Image { reply_token, .. } => reply_token,
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
