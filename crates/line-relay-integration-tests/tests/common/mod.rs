//! Common test utilities for line-relay integration tests
//!
//! This module provides:
//! - [`TestRelay`], a fully wired router whose Messaging API is a wiremock
//!   server and whose image directory is a temp dir
//! - Signing helpers
//! - Webhook payload builders

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use line_bot_sdk::{MessagingApiClient, SignatureValidator};
use line_relay_api::{
    create_router, AppState, ChannelConfig, ServiceConfig, StorageConfig,
};
use line_relay_core::{adapters::FilesystemImageStore, SecretValue};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CHANNEL_SECRET: &str = "integration-channel-secret";
pub const ACCESS_TOKEN: &str = "integration-access-token";
pub const PUBLIC_BASE_URL: &str = "https://relay.example.com";
pub const REPLY_PATH: &str = "/v2/bot/message/reply";

// ============================================================================
// Test harness
// ============================================================================

/// Router wired to a mock Messaging API and a temporary image directory
#[allow(dead_code)]
pub struct TestRelay {
    pub router: Router,
    pub line_api: MockServer,
    pub image_dir: PathBuf,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestRelay {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(customize: impl FnOnce(&mut ServiceConfig)) -> Self {
        let line_api = MockServer::start().await;
        let temp_dir = TempDir::new().expect("temp dir");
        let image_dir = temp_dir.path().join("image");

        let mut config = ServiceConfig {
            channel: ChannelConfig {
                secret: SecretValue::new(CHANNEL_SECRET),
                access_token: SecretValue::new(ACCESS_TOKEN),
            },
            public_base_url: PUBLIC_BASE_URL.to_string(),
            storage: StorageConfig {
                image_dir: image_dir.clone(),
                image_file_name: "test.jpg".to_string(),
            },
            ..ServiceConfig::default()
        };
        config.messaging.api_base_url = line_api.uri();
        config.messaging.data_api_base_url = line_api.uri();
        customize(&mut config);
        config.validate().expect("test configuration is valid");

        let client = MessagingApiClient::builder(config.channel.access_token.expose_secret())
            .config(config.client_config())
            .build()
            .expect("client builds");
        let images = FilesystemImageStore::new(
            config.storage.image_dir.clone(),
            config.storage.image_file_name.clone(),
        )
        .expect("image store");

        let state = AppState::new(config, Arc::new(client), Arc::new(images));

        Self {
            router: create_router(state),
            line_api,
            image_dir,
            _temp_dir: temp_dir,
        }
    }

    /// Accept every reply with `200 {}`.
    pub async fn accept_replies(&self) {
        Mock::given(method("POST"))
            .and(path(REPLY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&self.line_api)
            .await;
    }

    /// Serve `bytes` as the content of message `id`.
    pub async fn serve_content(&self, id: &str, bytes: &[u8]) {
        Mock::given(method("GET"))
            .and(path(format!("/v2/bot/message/{}/content", id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(bytes.to_vec()),
            )
            .mount(&self.line_api)
            .await;
    }

    /// POST a correctly signed callback.
    pub async fn post_callback(&self, body: &str) -> (StatusCode, Bytes) {
        self.post_callback_with_signature(body, Some(&sign(body.as_bytes())))
            .await
    }

    pub async fn post_callback_with_signature(
        &self,
        body: &str,
        signature: Option<&str>,
    ) -> (StatusCode, Bytes) {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/callback")
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            builder = builder.header("x-line-signature", signature);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, bytes)
    }

    /// JSON bodies of every reply call the mock API received, in order.
    pub async fn replies(&self) -> Vec<serde_json::Value> {
        self.line_api
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == REPLY_PATH)
            .map(|r| r.body_json().expect("reply body is JSON"))
            .collect()
    }

    /// Number of requests of any kind the mock API received.
    pub async fn outbound_request_count(&self) -> usize {
        self.line_api
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or(0)
    }

    pub fn stored_image(&self) -> Option<Vec<u8>> {
        std::fs::read(self.image_dir.join("test.jpg")).ok()
    }
}

// ============================================================================
// Signing
// ============================================================================

/// Signature the platform would send for `body`.
#[allow(dead_code)]
pub fn sign(body: &[u8]) -> String {
    SignatureValidator::new(CHANNEL_SECRET).sign(body)
}

// ============================================================================
// Payload builders
// ============================================================================

#[allow(dead_code)]
pub fn payload(events: &[String]) -> String {
    format!(
        r#"{{"destination":"U0123456789abcdef","events":[{}]}}"#,
        events.join(",")
    )
}

#[allow(dead_code)]
pub fn text_event(reply_token: &str, text: &str) -> String {
    serde_json::json!({
        "type": "message",
        "mode": "active",
        "timestamp": 1_700_000_000_000_i64,
        "source": { "type": "user", "userId": "U4af4980629" },
        "webhookEventId": "01FZ74A0TDDPYRVKNK77XKC3ZR",
        "deliveryContext": { "isRedelivery": false },
        "replyToken": reply_token,
        "message": { "type": "text", "id": "444573844083572737", "text": text }
    })
    .to_string()
}

#[allow(dead_code)]
pub fn location_event(reply_token: &str) -> String {
    serde_json::json!({
        "type": "message",
        "timestamp": 1_700_000_000_000_i64,
        "source": { "type": "user", "userId": "U4af4980629" },
        "replyToken": reply_token,
        "message": {
            "type": "location",
            "id": "325708",
            "title": "my location",
            "address": "1-3 Kioicho, Chiyoda-ku, Tokyo",
            "latitude": 35.67966,
            "longitude": 139.73669
        }
    })
    .to_string()
}

#[allow(dead_code)]
pub fn image_event(reply_token: &str, message_id: &str) -> String {
    serde_json::json!({
        "type": "message",
        "timestamp": 1_700_000_000_000_i64,
        "source": { "type": "user", "userId": "U4af4980629" },
        "replyToken": reply_token,
        "message": {
            "type": "image",
            "id": message_id,
            "contentProvider": { "type": "line" }
        }
    })
    .to_string()
}

#[allow(dead_code)]
pub fn sticker_event(reply_token: &str) -> String {
    serde_json::json!({
        "type": "message",
        "replyToken": reply_token,
        "message": { "type": "sticker", "id": "1501597916", "packageId": "446", "stickerId": "1988" }
    })
    .to_string()
}

#[allow(dead_code)]
pub fn follow_event(reply_token: &str) -> String {
    serde_json::json!({
        "type": "follow",
        "replyToken": reply_token,
        "source": { "type": "user", "userId": "U4af4980629" }
    })
    .to_string()
}
