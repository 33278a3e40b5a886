//! # Event Dispatcher
//!
//! Routes each event of a verified webhook payload to its handler.
//!
//! Events are handled sequentially in payload order. A failing handler is
//! logged and counted; it never stops the remaining events and never turns
//! into an HTTP error, so the platform does not redeliver the batch.

use std::sync::Arc;

use line_bot_sdk::{WebhookEvent, WebhookPayload};
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::gateway::MessagingGateway;
use crate::handlers::{self, HandlerError};
use crate::image_store::ImageStore;
use crate::message::InboundMessage;

/// Acknowledgment texts sent in reply to text and location messages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReplyTexts {
    pub text: String,
    pub location: String,
}

impl Default for ReplyTexts {
    fn default() -> Self {
        Self {
            text: "received".to_string(),
            location: "location info".to_string(),
        }
    }
}

/// Values the handlers need from the service configuration.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Externally reachable base URL of this service
    pub public_base_url: String,
    pub replies: ReplyTexts,
}

/// Per-payload outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub handled: usize,
    pub ignored: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn total(&self) -> usize {
        self.handled + self.ignored + self.failed
    }
}

/// Dispatches webhook events to the text, location and image handlers.
#[derive(Clone)]
pub struct EventDispatcher {
    gateway: Arc<dyn MessagingGateway>,
    images: Arc<dyn ImageStore>,
    settings: DispatchSettings,
}

impl EventDispatcher {
    pub fn new(
        gateway: Arc<dyn MessagingGateway>,
        images: Arc<dyn ImageStore>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            gateway,
            images,
            settings,
        }
    }

    /// Handle every event in `payload`, in order.
    pub async fn dispatch(&self, payload: &WebhookPayload) -> DispatchReport {
        let mut report = DispatchReport::default();

        for (index, event) in payload.events.iter().enumerate() {
            if let WebhookEvent::Message(message_event) = event {
                if message_event.is_redelivery() {
                    info!(
                        index,
                        webhook_event_id = ?message_event.webhook_event_id,
                        "Handling redelivered event"
                    );
                }
            }

            let message = match InboundMessage::from_event(event) {
                Ok(message) => message,
                Err(reason) => {
                    debug!(index, reason = %reason, "Ignoring webhook event");
                    report.ignored += 1;
                    continue;
                }
            };

            match self.handle(&message).await {
                Ok(()) => {
                    debug!(index, kind = message.kind(), "Handled message event");
                    report.handled += 1;
                }
                Err(e) => {
                    error!(
                        index,
                        kind = message.kind(),
                        error = %e,
                        transient = e.is_transient(),
                        "Failed to handle message event"
                    );
                    report.failed += 1;
                }
            }
        }

        info!(
            destination = %payload.destination,
            events = report.total(),
            handled = report.handled,
            ignored = report.ignored,
            failed = report.failed,
            "Dispatched webhook events"
        );

        report
    }

    /// Route one message to its handler.
    pub async fn handle(&self, message: &InboundMessage) -> Result<(), HandlerError> {
        match message {
            InboundMessage::Text { reply_token, text } => {
                handlers::handle_text(
                    self.gateway.as_ref(),
                    &self.settings.replies,
                    reply_token,
                    text,
                )
                .await
            }
            InboundMessage::Location {
                reply_token,
                latitude,
                longitude,
                ..
            } => {
                handlers::handle_location(
                    self.gateway.as_ref(),
                    &self.settings.replies,
                    reply_token,
                    *latitude,
                    *longitude,
                )
                .await
            }
            InboundMessage::Image {
                reply_token,
                content_id,
            } => {
                handlers::handle_image(
                    self.gateway.as_ref(),
                    self.images.as_ref(),
                    &self.settings.public_base_url,
                    reply_token,
                    content_id,
                )
                .await
            }
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("image_file", &self.images.file_name())
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
