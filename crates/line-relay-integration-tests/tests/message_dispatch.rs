//! Integration tests for message dispatch and replies
//!
//! Covers the text and location acknowledgments, ignored event kinds, batch
//! ordering, and the rule that handler failures never change the `200 OK`.

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_text_message_gets_fixed_acknowledgment() {
    // Arrange
    let relay = TestRelay::start().await;
    Mock::given(method("POST"))
        .and(path(REPLY_PATH))
        .and(header("authorization", format!("Bearer {}", ACCESS_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&relay.line_api)
        .await;

    // Act
    let (status, _) = relay
        .post_callback(&payload(&[text_event("reply-1", "anything at all")]))
        .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        relay.replies().await,
        vec![json!({
            "replyToken": "reply-1",
            "messages": [{ "type": "text", "text": "received" }]
        })]
    );
}

#[tokio::test]
async fn test_text_reply_ignores_message_content() {
    // Arrange
    let relay = TestRelay::start().await;
    relay.accept_replies().await;

    // Act
    for (i, text) in ["hi", "", "收到", "🙂🙂🙂"].iter().enumerate() {
        let (status, _) = relay
            .post_callback(&payload(&[text_event(&format!("r{}", i), text)]))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Assert
    let replies = relay.replies().await;
    assert_eq!(replies.len(), 4);
    for reply in replies {
        assert_eq!(reply["messages"], json!([{ "type": "text", "text": "received" }]));
    }
}

#[tokio::test]
async fn test_location_message_gets_location_acknowledgment() {
    // Arrange
    let relay = TestRelay::start().await;
    relay.accept_replies().await;

    // Act
    let (status, _) = relay
        .post_callback(&payload(&[location_event("loc-1")]))
        .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        relay.replies().await,
        vec![json!({
            "replyToken": "loc-1",
            "messages": [{ "type": "text", "text": "location info" }]
        })]
    );
}

#[tokio::test]
async fn test_configured_acknowledgments_are_used() {
    // Arrange
    let relay = TestRelay::start_with(|config| {
        config.replies.text = "收到".to_string();
        config.replies.location = "地址資訊".to_string();
    })
    .await;
    relay.accept_replies().await;

    // Act
    relay
        .post_callback(&payload(&[text_event("r1", "hi"), location_event("r2")]))
        .await;

    // Assert
    let replies = relay.replies().await;
    assert_eq!(replies[0]["messages"][0]["text"], "收到");
    assert_eq!(replies[1]["messages"][0]["text"], "地址資訊");
}

#[tokio::test]
async fn test_unrecognized_kinds_produce_no_reply() {
    // Arrange
    let relay = TestRelay::start().await;
    relay.accept_replies().await;

    // Act
    let (status, body) = relay
        .post_callback(&payload(&[sticker_event("r1"), follow_event("r2")]))
        .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), b"OK");
    assert_eq!(relay.outbound_request_count().await, 0);
}

#[tokio::test]
async fn test_verification_request_returns_ok() {
    // Arrange
    let relay = TestRelay::start().await;

    // Act
    let (status, _) = relay.post_callback(&payload(&[])).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(relay.outbound_request_count().await, 0);
}

#[tokio::test]
async fn test_batch_is_dispatched_in_order() {
    // Arrange
    let relay = TestRelay::start().await;
    relay.accept_replies().await;

    // Act
    let (status, _) = relay
        .post_callback(&payload(&[
            location_event("first"),
            sticker_event("skipped"),
            text_event("second", "hi"),
            location_event("third"),
        ]))
        .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let tokens: Vec<String> = relay
        .replies()
        .await
        .iter()
        .map(|r| r["replyToken"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(tokens, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_reply_api_failure_still_returns_ok() {
    // Arrange
    let relay = TestRelay::start().await;
    Mock::given(method("POST"))
        .and(path(REPLY_PATH))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"message":"Invalid reply token"}"#),
        )
        .mount(&relay.line_api)
        .await;

    // Act
    let (status, body) = relay
        .post_callback(&payload(&[text_event("expired", "hi"), text_event("also", "hi")]))
        .await;

    // Assert: both events were attempted, no fallback reply was sent
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), b"OK");
    assert_eq!(relay.replies().await.len(), 2);
}

#[tokio::test]
async fn test_event_without_reply_token_is_skipped() {
    // Arrange
    let relay = TestRelay::start().await;
    relay.accept_replies().await;
    let standby_event = json!({
        "type": "message",
        "mode": "standby",
        "message": { "type": "text", "id": "1", "text": "hi" }
    })
    .to_string();

    // Act
    let (status, _) = relay.post_callback(&payload(&[standby_event])).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(relay.outbound_request_count().await, 0);
}
