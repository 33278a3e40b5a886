//! Configuration types for the HTTP service

use std::path::PathBuf;
use std::time::Duration;

use line_bot_sdk::client::{ClientConfig, DEFAULT_API_BASE_URL, DEFAULT_DATA_API_BASE_URL};
use line_relay_core::image_store::is_plain_file_name;
use line_relay_core::{DispatchSettings, ReplyTexts, SecretValue, IMAGE_ROUTE_PREFIX};
use serde::Deserialize;

use crate::errors::ConfigError;

/// Service configuration
///
/// Loaded once at startup and passed explicitly to the router, the
/// dispatcher and the Messaging API client.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Webhook endpoint settings
    pub webhook: WebhookConfig,

    /// Channel credentials
    pub channel: ChannelConfig,

    /// Externally reachable base URL of this service, used to build image URLs
    pub public_base_url: String,

    /// Accept a non-HTTPS `public_base_url` (local testing only)
    pub allow_insecure_base_url: bool,

    /// Messaging API client settings
    pub messaging: MessagingConfig,

    /// Image storage settings
    pub storage: StorageConfig,

    /// Acknowledgment texts
    pub replies: ReplyTexts,

    /// Security settings
    pub security: SecurityConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,

    /// Maximum request size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_seconds: 30,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Webhook endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Callback endpoint path
    pub endpoint_path: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            endpoint_path: "/callback".to_string(),
        }
    }
}

/// Channel credentials issued by the platform console
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ChannelConfig {
    /// Key for webhook signature verification
    pub secret: SecretValue,

    /// Bearer token for the Messaging API
    pub access_token: SecretValue,
}

/// Messaging API client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    pub api_base_url: String,
    pub data_api_base_url: String,

    /// Timeout for each reply and content download, in seconds
    pub timeout_seconds: u64,

    /// Largest accepted content download, in bytes
    pub max_content_bytes: usize,

    pub user_agent: String,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            data_api_base_url: DEFAULT_DATA_API_BASE_URL.to_string(),
            timeout_seconds: 5,
            max_content_bytes: 10 * 1024 * 1024, // 10MB
            user_agent: concat!("line-relay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Image storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory images are written to and served from
    pub image_dir: PathBuf,

    /// File name the relayed image is stored under
    pub image_file_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("image"),
            image_file_name: "test.jpg".to_string(),
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// Log request bodies at DEBUG (contains user messages)
    pub log_request_bodies: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl ServiceConfig {
    /// Validate configuration
    ///
    /// Checks that:
    /// - channel secret and access token are present
    /// - `public_base_url` is an absolute HTTPS URL (HTTP only with
    ///   `allow_insecure_base_url`)
    /// - the Messaging API base URLs parse
    /// - the webhook path starts with `/`, holds no route syntax and does not
    ///   overlap the image or health routes
    /// - the image file name is a plain file name
    /// - timeouts and size limits are non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel.secret.is_blank() {
            return Err(ConfigError::Missing {
                key: "channel.secret".to_string(),
            });
        }

        if self.channel.access_token.is_blank() {
            return Err(ConfigError::Missing {
                key: "channel.access_token".to_string(),
            });
        }

        if self.public_base_url.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "public_base_url".to_string(),
            });
        }

        let base_url = url::Url::parse(&self.public_base_url).map_err(|e| ConfigError::Invalid {
            message: format!("public_base_url '{}' is not a URL: {}", self.public_base_url, e),
        })?;
        if base_url.cannot_be_a_base() || base_url.host_str().is_none() {
            return Err(ConfigError::Invalid {
                message: format!(
                    "public_base_url '{}' must be an absolute URL with a host",
                    self.public_base_url
                ),
            });
        }
        match base_url.scheme() {
            "https" => {}
            "http" if self.allow_insecure_base_url => {}
            scheme => {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "public_base_url must use https (got '{}'); the platform only fetches images over HTTPS",
                        scheme
                    ),
                })
            }
        }

        for (key, value) in [
            ("messaging.api_base_url", &self.messaging.api_base_url),
            ("messaging.data_api_base_url", &self.messaging.data_api_base_url),
        ] {
            url::Url::parse(value).map_err(|e| ConfigError::Invalid {
                message: format!("{} '{}' is not a URL: {}", key, value, e),
            })?;
        }

        if !self.webhook.endpoint_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                message: format!(
                    "webhook.endpoint_path '{}' must start with '/'",
                    self.webhook.endpoint_path
                ),
            });
        }

        validate_endpoint_path(&self.webhook.endpoint_path)?;

        if !is_plain_file_name(&self.storage.image_file_name) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "storage.image_file_name '{}' must be a plain file name",
                    self.storage.image_file_name
                ),
            });
        }

        if self.messaging.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                message: "messaging.timeout_seconds must be greater than zero".to_string(),
            });
        }

        if self.messaging.max_content_bytes == 0 {
            return Err(ConfigError::Invalid {
                message: "messaging.max_content_bytes must be greater than zero".to_string(),
            });
        }

        if self.server.max_body_size == 0 {
            return Err(ConfigError::Invalid {
                message: "server.max_body_size must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Messaging API client settings.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_user_agent(self.messaging.user_agent.as_str())
            .with_timeout(Duration::from_secs(self.messaging.timeout_seconds))
            .with_max_content_bytes(self.messaging.max_content_bytes)
            .with_api_base_url(self.messaging.api_base_url.as_str())
            .with_data_api_base_url(self.messaging.data_api_base_url.as_str())
    }

    /// Values the event dispatcher needs.
    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            public_base_url: self.public_base_url.clone(),
            replies: self.replies.clone(),
        }
    }

    /// `host:port` the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Reject webhook paths the router cannot register next to its own routes.
fn validate_endpoint_path(path: &str) -> Result<(), ConfigError> {
    if path.contains(['{', '}', '*']) {
        return Err(ConfigError::Invalid {
            message: format!(
                "webhook.endpoint_path '{}' must not contain route parameters or wildcards",
                path
            ),
        });
    }

    let image_prefix = format!("{}/", IMAGE_ROUTE_PREFIX);
    if path == "/health" || path == IMAGE_ROUTE_PREFIX || path.starts_with(&image_prefix) {
        return Err(ConfigError::Invalid {
            message: format!(
                "webhook.endpoint_path '{}' overlaps a built-in route",
                path
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
