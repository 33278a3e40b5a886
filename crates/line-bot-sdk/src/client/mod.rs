//! Messaging API client.
//!
//! Provides [`MessagingApiClient`] for the two calls a reply bot needs:
//! sending a reply through a reply token and downloading the binary content
//! of a user's message.

mod messages;

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tracing::{debug, instrument};
use url::Url;

use crate::error::ApiError;

pub use messages::{ReplyMessageRequest, SendMessage};

/// Default host for regular Messaging API calls.
pub const DEFAULT_API_BASE_URL: &str = "https://api.line.me";

/// Default host for content downloads.
pub const DEFAULT_DATA_API_BASE_URL: &str = "https://api-data.line.me";

/// Configuration for Messaging API client behavior.
///
/// # Examples
///
/// ```
/// use line_bot_sdk::client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(3))
///     .with_max_content_bytes(1024 * 1024);
/// assert_eq!(config.timeout, Duration::from_secs(3));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string for API requests
    pub user_agent: String,
    /// Whole-request timeout, applied to replies and content downloads
    pub timeout: Duration,
    /// Largest content download accepted, in bytes
    pub max_content_bytes: usize,
    /// Base URL for the reply endpoint
    pub api_base_url: String,
    /// Base URL for the content endpoint
    pub data_api_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("line-bot-sdk/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(5),
            max_content_bytes: 10 * 1024 * 1024, // 10MB
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            data_api_base_url: DEFAULT_DATA_API_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the content download cap.
    pub fn with_max_content_bytes(mut self, max_content_bytes: usize) -> Self {
        self.max_content_bytes = max_content_bytes;
        self
    }

    /// Set the base URL for the reply endpoint.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the base URL for the content endpoint.
    pub fn with_data_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.data_api_base_url = url.into();
        self
    }
}

/// Messaging API client authenticated with a channel access token.
///
/// Cheap to clone; clones share the underlying connection pool.
///
/// # Examples
///
/// ```no_run
/// # use line_bot_sdk::client::{MessagingApiClient, SendMessage};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MessagingApiClient::builder("channel-access-token").build()?;
///
/// client
///     .reply_message("reply-token", &[SendMessage::text("received")])
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MessagingApiClient {
    access_token: String,
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl MessagingApiClient {
    /// Create a new builder for constructing a client.
    pub fn builder(access_token: impl Into<String>) -> MessagingApiClientBuilder {
        MessagingApiClientBuilder::new(access_token)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Reply to an event using its reply token.
    ///
    /// A reply token can be used once, shortly after the event was
    /// delivered; the platform enforces both.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if:
    /// - The reply token is expired or already used (`InvalidRequest`)
    /// - The access token is rejected (`AuthenticationFailed`)
    /// - The request times out or the network fails
    #[instrument(skip(self, reply_token, messages), fields(message_count = messages.len()))]
    pub async fn reply_message(
        &self,
        reply_token: &str,
        messages: &[SendMessage],
    ) -> Result<(), ApiError> {
        let url = endpoint_url(&self.config.api_base_url, &["v2", "bot", "message", "reply"])?;
        let body = ReplyMessageRequest {
            reply_token,
            messages,
        };

        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(ApiError::from_status(status, error_text));
        }

        debug!("Reply delivered");
        Ok(())
    }

    /// Download the binary content of an image, video, audio or file message.
    ///
    /// The body is streamed and the download aborted as soon as it exceeds
    /// [`ClientConfig::max_content_bytes`].
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if:
    /// - The message ID is unknown or the content expired (`NotFound`)
    /// - The content is larger than the cap (`ContentTooLarge`)
    /// - The request times out or the network fails
    #[instrument(skip(self))]
    pub async fn get_message_content(&self, message_id: &str) -> Result<Bytes, ApiError> {
        let url = endpoint_url(
            &self.config.data_api_base_url,
            &["v2", "bot", "message", message_id, "content"],
        )?;
        let limit = self.config.max_content_bytes;

        let mut response = self
            .http_client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(ApiError::from_status(status, error_text));
        }

        if response
            .content_length()
            .is_some_and(|len| len > limit as u64)
        {
            return Err(ApiError::ContentTooLarge { limit });
        }

        let mut content = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            if content.len() + chunk.len() > limit {
                return Err(ApiError::ContentTooLarge { limit });
            }
            content.extend_from_slice(&chunk);
        }

        debug!(size_bytes = content.len(), "Message content downloaded");
        Ok(content.freeze())
    }
}

/// Append `segments` to `base`, percent-encoding each one.
///
/// A message id containing `/`, `?` or `#` stays a single path segment.
fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = Url::parse(base).map_err(|e| ApiError::Configuration {
        message: format!("Invalid base URL '{}': {}", base, e),
    })?;

    url.path_segments_mut()
        .map_err(|_| ApiError::Configuration {
            message: format!("Base URL '{}' cannot carry a path", base),
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

impl std::fmt::Debug for MessagingApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingApiClient")
            .field("config", &self.config)
            .field("access_token", &"<REDACTED>")
            .finish()
    }
}

/// Builder for constructing `MessagingApiClient` instances.
pub struct MessagingApiClientBuilder {
    access_token: String,
    config: Option<ClientConfig>,
}

impl MessagingApiClientBuilder {
    fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            config: None,
        }
    }

    /// Set the client configuration.
    ///
    /// If not set, uses `ClientConfig::default()`.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` if the HTTP client cannot be created.
    pub fn build(self) -> Result<MessagingApiClient, ApiError> {
        let config = self.config.unwrap_or_default();

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(MessagingApiClient {
            access_token: self.access_token,
            http_client,
            config,
        })
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
