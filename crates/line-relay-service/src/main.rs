//! # Line-Relay Service
//!
//! Binary entry point for the Line-Relay HTTP service.
//!
//! This executable:
//! - Loads configuration from files, environment and command line
//! - Initializes logging
//! - Creates the Messaging API client and the image store
//! - Starts the HTTP server from line-relay-api

mod settings;

use anyhow::Context;
use clap::Parser;
use line_bot_sdk::MessagingApiClient;
use line_relay_api::{start_server, AppState, ServiceError};
use line_relay_core::{adapters::FilesystemImageStore, public_image_url};
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "line-relay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LINE webhook receiver that acknowledges messages and relays images")]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "LINE_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable JSON structured logging
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Configuration is loaded before logging so the logging section applies;
    // load errors are reported once the subscriber exists.
    let loaded = settings::load_config(args.config.as_deref(), args.port);

    let (level, json_format) = match &loaded {
        Ok(config) => (config.logging.level.clone(), config.logging.json_format),
        Err(_) => ("info".to_string(), false),
    };
    init_tracing(&level, args.json_logs || json_format);

    info!("Starting Line-Relay Service");

    let service_config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(
                error = %e,
                "Could not load service configuration; aborting. \
                 Fix the configuration and restart."
            );
            std::process::exit(3);
        }
    };

    if let Err(e) = service_config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(3);
    }

    let client = MessagingApiClient::builder(service_config.channel.access_token.expose_secret())
        .config(service_config.client_config())
        .build()
        .context("Failed to build Messaging API client")?;

    let images = FilesystemImageStore::new(
        service_config.storage.image_dir.clone(),
        service_config.storage.image_file_name.clone(),
    )
    .context("Failed to configure image store")?;

    info!(
        public_base_url = %service_config.public_base_url,
        image_url = %public_image_url(
            &service_config.public_base_url,
            &service_config.storage.image_file_name
        ),
        image_dir = %service_config.storage.image_dir.display(),
        "Relayed images will be served from the public base URL"
    );

    info!(
        host = %service_config.server.host,
        port = service_config.server.port,
        endpoint = %service_config.webhook.endpoint_path,
        "Starting HTTP server"
    );

    let state = AppState::new(service_config, Arc::new(client), Arc::new(images));

    if let Err(e) = start_server(state).await {
        error!("Failed to start server: {}", e);

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration(_) => 3,
        };

        std::process::exit(exit_code);
    }

    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`.
fn init_tracing(level: &str, json_format: bool) {
    let default_filter = format!(
        "line_relay_service={level},line_relay_api={level},line_relay_core={level},line_bot_sdk={level},tower_http=debug",
        level = level
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(json_format.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_format).then(tracing_subscriber::fmt::layer))
        .init();
}
