//! HTTP server startup with graceful shutdown.

/// Tracing target for server startup events.
pub const TRACING_TARGET_STARTUP: &str = "msgconv_cli::server::startup";

/// Tracing target for server shutdown events.
pub const TRACING_TARGET_SHUTDOWN: &str = "msgconv_cli::server::shutdown";

mod error;
mod http_server;
mod shutdown;

use axum::Router;
pub use error::{ServerError, ServerResult};
use http_server::serve_http;
use shutdown::shutdown_signal;

use crate::config::ServerConfig;

/// Starts the HTTP server and runs it until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the address cannot
/// be bound, or the server hits a fatal error while running.
pub async fn serve(app: Router, config: ServerConfig) -> ServerResult<()> {
    serve_http(app, config).await
}
