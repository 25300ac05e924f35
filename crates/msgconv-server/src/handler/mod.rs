//! All `axum::`[`Router`]s with related handlers.
//!
//! [`Router`]: axum::Router

mod convert;
mod error;
mod monitors;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::ServiceState;

/// Largest accepted request body: 100 MiB.
///
/// The axum default of 2 MiB would reject realistic `.msg` uploads.
const MAX_BODY_SIZE: usize = 100 * 1024 * 1024;

#[inline]
async fn fallback() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

/// Returns a [`Router`] with all routes and the shared state applied.
pub fn routes(state: ServiceState) -> Router {
    Router::new()
        .merge(convert::routes())
        .merge(monitors::routes())
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}
