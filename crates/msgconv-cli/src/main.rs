#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
use msgconv_server::service::{ServiceConfig, ServiceState};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Cli;

/// Tracing target for server startup events.
pub const TRACING_TARGET_SERVER_STARTUP: &str = "msgconv_cli::server::startup";

/// Tracing target for server shutdown events.
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "msgconv_cli::server::shutdown";

/// Tracing target for configuration loading.
pub const TRACING_TARGET_CONFIG: &str = "msgconv_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing();
    log_startup_info();

    cli.server
        .validate()
        .context("invalid server configuration")?;

    let service_config = ServiceConfig::from_env();
    log_service_config(&service_config);

    let state = ServiceState::new(service_config);
    let router = msgconv_server::routes(state).layer(TraceLayer::new_for_http());

    server::serve(router, cli.server).await?;

    Ok(())
}

/// Initializes tracing with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Logs startup information.
fn log_startup_info() {
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting msgconv server"
    );

    tracing::debug!(
        target: TRACING_TARGET_SERVER_STARTUP,
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        "build information"
    );
}

/// Logs the conversion service configuration.
fn log_service_config(config: &ServiceConfig) {
    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        converter = %config.converter,
        convert_timeout_secs = config.convert_timeout_secs,
        "conversion configuration loaded"
    );
}
