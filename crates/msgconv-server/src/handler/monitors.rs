//! Liveness probe handlers.

use axum::Router;
use axum::routing::get;

use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "msgconv_server::handler::monitors";

/// Trivial liveness probe.
///
/// Always answers immediately; conversions run on their own tasks and
/// must never delay this endpoint.
async fn healthcheck() -> &'static str {
    tracing::trace!(target: TRACING_TARGET, "healthcheck");
    "OK"
}

/// Returns a [`Router`] with all monitoring routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/healthcheck", get(healthcheck))
}
