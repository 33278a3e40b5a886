//! Outbound Messaging API abstraction.

use async_trait::async_trait;
use bytes::Bytes;
use line_bot_sdk::{ApiError, SendMessage};

use crate::message::{ContentId, ReplyToken};

/// Interface to the messaging platform used by the handlers.
///
/// The production implementation wraps [`line_bot_sdk::MessagingApiClient`];
/// tests substitute recording mocks.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send a reply bound to `reply_token`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the platform rejects the reply or cannot be
    /// reached.
    async fn reply(
        &self,
        reply_token: &ReplyToken,
        messages: Vec<SendMessage>,
    ) -> Result<(), GatewayError>;

    /// Download the binary content of a message.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the content does not exist, exceeds the
    /// configured size cap, or cannot be fetched.
    async fn fetch_content(&self, content_id: &ContentId) -> Result<Bytes, GatewayError>;
}

/// Messaging gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Messaging API error: {0}")]
    Api(#[from] ApiError),
}

impl GatewayError {
    /// Check if error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api(e) => e.is_transient(),
        }
    }
}
