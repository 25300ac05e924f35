//! Common error type definitions.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of errors that can occur in msgconv-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Filesystem operation failed (workspace creation, file IO).
    FileSystem,
    /// Internal invariant violated.
    Internal,
}

/// A structured error type for msgconv-core operations.
///
/// Expected converter failures are not represented here; they travel as
/// [`Outcome`] variants. Only faults that should abort the request reach
/// this type.
///
/// [`Outcome`]: crate::Outcome
#[derive(Debug, Error)]
#[error("{kind:?}{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a new filesystem error.
    pub fn file_system() -> Self {
        Self::new(ErrorKind::FileSystem)
    }

    /// Creates a new internal error.
    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::file_system()
            .with_message(err.to_string())
            .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_carries_message_and_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = Error::file_system()
            .with_message("cannot create workspace")
            .with_source(source);

        assert_eq!(error.kind, ErrorKind::FileSystem);
        assert!(std::error::Error::source(&error).is_some());
        assert!(error.to_string().contains("cannot create workspace"));
    }

    #[test]
    fn io_error_converts_to_file_system_kind() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = Error::from(io_err);

        assert_eq!(error.kind, ErrorKind::FileSystem);
        assert!(error.to_string().contains("denied"));
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        assert_eq!(ErrorKind::FileSystem.as_ref(), "file_system");
        assert_eq!(ErrorKind::Internal.as_ref(), "internal");
    }
}
