//! # Line-Relay HTTP Service
//!
//! HTTP server for receiving LINE webhooks and relaying images back to users.
//!
//! This service provides:
//! - Webhook callback endpoint with signature validation
//! - Static image endpoint for the relayed image
//! - Health check endpoint

pub mod config;
pub mod errors;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use line_bot_sdk::{SignatureValidator, ValidationError, WebhookPayload, SIGNATURE_HEADER};
use line_relay_core::{EventDispatcher, ImageStore, MessagingGateway, IMAGE_ROUTE_PREFIX};
use serde::Serialize;
use std::{future::IntoFuture, sync::Arc, time::Duration};
use tokio::sync::Notify;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{debug, error, info, instrument, warn};

pub use config::*;
pub use errors::*;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Service configuration
    pub config: Arc<ServiceConfig>,

    /// Webhook signature validator keyed by the channel secret
    pub signature_validator: Arc<SignatureValidator>,

    /// Routes verified events to the message handlers
    pub dispatcher: Arc<EventDispatcher>,

    /// Image storage, shared with the dispatcher
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: ServiceConfig,
        gateway: Arc<dyn MessagingGateway>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        let signature_validator = SignatureValidator::new(config.channel.secret.expose_secret());
        let dispatcher =
            EventDispatcher::new(gateway, Arc::clone(&images), config.dispatch_settings());

        Self {
            config: Arc::new(config),
            signature_validator: Arc::new(signature_validator),
            dispatcher: Arc::new(dispatcher),
            images,
        }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.server.max_body_size;

    let webhook_routes =
        Router::new().route(&state.config.webhook.endpoint_path, post(handle_callback));

    let image_routes =
        Router::new().route(&format!("{}/{{filename}}", IMAGE_ROUTE_PREFIX), get(serve_image));

    let health_routes = Router::new().route("/health", get(handle_health_check));

    Router::new()
        .merge(webhook_routes)
        .merge(image_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(max_body_size))
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server
///
/// Binds `server.host:server.port` and serves until SIGINT or SIGTERM. After
/// the signal, in-flight requests get `server.shutdown_timeout_seconds` to
/// finish.
pub async fn start_server(state: AppState) -> Result<(), ServiceError> {
    let addr = state.config.bind_address();
    let shutdown_timeout = Duration::from_secs(state.config.server.shutdown_timeout_seconds);

    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ServiceError::BindFailed {
                address: addr.clone(),
                message: e.to_string(),
            })?;

    info!("Starting HTTP server on {}", addr);

    let app = create_router(state);

    let shutdown_started = Arc::new(Notify::new());
    let notifier = Arc::clone(&shutdown_started);
    let shutdown = async move {
        shutdown_signal(shutdown_timeout).await;
        notifier.notify_one();
    };

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|e| ServiceError::ServerFailed {
                message: e.to_string(),
            })?;
        }
        _ = async {
            shutdown_started.notified().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            warn!(
                timeout_seconds = shutdown_timeout.as_secs(),
                "Graceful shutdown timed out, dropping in-flight requests"
            );
        }
    }

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal(shutdown_timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
        },
    }
}

// ============================================================================
// Webhook Handlers
// ============================================================================

/// Handle LINE webhook callbacks
///
/// 1. Verify the `x-line-signature` header against the raw body
/// 2. Parse the body into a webhook payload
/// 3. Dispatch every event to its handler
/// 4. Answer `200 OK`, whatever the handlers' outcome
///
/// Signature and parse failures answer `400 Bad Request` and dispatch nothing.
#[instrument(skip(state, headers, body), fields(body_size = body.len()))]
pub async fn handle_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, CallbackError> {
    if state.config.security.log_request_bodies {
        debug!(body = %String::from_utf8_lossy(&body), "Request body");
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .ok_or(CallbackError::MissingSignature)?
        .to_str()
        .map_err(|_| {
            CallbackError::InvalidSignature(ValidationError::InvalidSignatureFormat {
                message: "signature header is not visible ASCII".to_string(),
            })
        })?;

    state.signature_validator.validate(&body, signature)?;

    let payload = WebhookPayload::from_slice(&body)?;

    let report = state.dispatcher.dispatch(&payload).await;

    info!(
        handled = report.handled,
        ignored = report.ignored,
        failed = report.failed,
        "Processed webhook callback"
    );

    Ok("OK")
}

// ============================================================================
// Image Handlers
// ============================================================================

/// Serve a file from the image directory
///
/// Unknown names and names that do not resolve inside the image directory
/// answer `404 Not Found`.
#[instrument(skip(state))]
async fn serve_image(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    match state.images.load(&filename).await {
        Ok(Some(file)) => {
            debug!(size_bytes = file.content.len(), "Serving image");
            ([(header::CONTENT_TYPE, file.content_type)], file.content).into_response()
        }
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!(error = %e, "Failed to read image");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// ============================================================================
// Health Check Handlers
// ============================================================================

/// Basic health check endpoint
async fn handle_health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

// ============================================================================
// Middleware
// ============================================================================

/// Request logging middleware
///
/// Propagates or assigns an `x-correlation-id` and logs each request's
/// completion at a level matching its status.
async fn request_logging_middleware(
    mut request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    // Extract or generate correlation ID
    let correlation_id = request
        .headers()
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request.extensions_mut().insert(correlation_id.clone());

    info!(
        correlation_id = %correlation_id,
        method = %method,
        uri = %uri,
        "Request started"
    );

    let mut response = next.run(request).await;
    let duration = start.elapsed();

    if let Ok(header_value) = correlation_id.parse() {
        response
            .headers_mut()
            .insert("x-correlation-id", header_value);
    }

    let status = response.status();

    if status.is_server_error() {
        error!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with server error"
        );
    } else if status.is_client_error() {
        warn!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with client error"
        );
    } else {
        info!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    }

    response
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
