#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for converter invocations.
pub const TRACING_TARGET_INVOKE: &str = "msgconv_core::invoke";

/// Tracing target for workspace lifecycle events.
pub const TRACING_TARGET_WORKSPACE: &str = "msgconv_core::workspace";

mod error;
mod invoke;
mod stream;
mod workspace;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use invoke::{Invoker, Outcome};
pub use stream::ArtifactStream;
pub use workspace::{Workspace, sanitize_filename};

/// Fixed chunk size for streaming file reads and writes (64 KiB).
///
/// Bounds peak memory per request on both the ingestion and the response
/// path regardless of upload or artifact size.
pub const CHUNK_SIZE: usize = 64 * 1024;
