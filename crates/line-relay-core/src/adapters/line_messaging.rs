//! # Messaging API Gateway Adapter
//!
//! [`MessagingGateway`] backed by the SDK's [`MessagingApiClient`].

use crate::gateway::{GatewayError, MessagingGateway};
use crate::message::{ContentId, ReplyToken};
use async_trait::async_trait;
use bytes::Bytes;
use line_bot_sdk::{MessagingApiClient, SendMessage};

#[async_trait]
impl MessagingGateway for MessagingApiClient {
    async fn reply(
        &self,
        reply_token: &ReplyToken,
        messages: Vec<SendMessage>,
    ) -> Result<(), GatewayError> {
        self.reply_message(reply_token.as_str(), &messages)
            .await
            .map_err(GatewayError::from)
    }

    async fn fetch_content(&self, content_id: &ContentId) -> Result<Bytes, GatewayError> {
        self.get_message_content(content_id.as_str())
            .await
            .map_err(GatewayError::from)
    }
}

#[cfg(test)]
#[path = "line_messaging_tests.rs"]
mod tests;
