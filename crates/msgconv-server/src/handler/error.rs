//! Handler error kinds and their fixed plain-text responses.
//!
//! Every failure a client can observe maps to exactly one status/body
//! pairing. Bodies are plain text and deterministic; the only variable
//! content is the converter's own stderr, attached as a detail to the
//! conversion-failed kind.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Result type alias for handler operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Client-visible failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "errors do nothing unless serialized"]
pub enum ErrorKind {
    /// The request body was not `multipart/form-data`.
    MultipartRequired,
    /// The multipart body carried no part named `msg`.
    MissingInput,
    /// The converter ran and failed, timed out, or could not be
    /// launched.
    ConversionFailed,
    /// An unexpected fault inside the request pipeline.
    Internal,
}

impl ErrorKind {
    /// Returns the HTTP status for this kind.
    pub const fn status(self) -> StatusCode {
        match self {
            Self::MultipartRequired | Self::MissingInput => StatusCode::BAD_REQUEST,
            Self::ConversionFailed | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the fixed response body for this kind.
    pub const fn message(self) -> &'static str {
        match self {
            Self::MultipartRequired => "Multipart request required.",
            Self::MissingInput => "No msg provided.",
            Self::ConversionFailed | Self::Internal => "Conversion failed.",
        }
    }

    /// Attaches diagnostic detail to this kind, producing an [`Error`].
    ///
    /// The detail is appended to the fixed message in the response body.
    /// Only the conversion-failed kind carries one: the converter's
    /// captured stderr.
    pub fn with_detail(self, detail: impl Into<String>) -> Error {
        Error {
            kind: self,
            detail: Some(detail.into()),
        }
    }
}

impl IntoResponse for ErrorKind {
    fn into_response(self) -> Response {
        Error::from(self).into_response()
    }
}

/// A handler error: a failure kind plus optional diagnostic detail.
#[derive(Debug, Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error {
    kind: ErrorKind,
    detail: Option<String>,
}

impl Error {
    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the diagnostic detail if present.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Renders the response body for this error.
    fn body(&self) -> Cow<'static, str> {
        match &self.detail {
            Some(detail) => Cow::Owned(format!("{} {}", self.kind.message(), detail)),
            None => Cow::Borrowed(self.kind.message()),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind, detail: None }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.kind.status(), self.body().into_owned()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_400_with_fixed_bodies() {
        assert_eq!(ErrorKind::MultipartRequired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorKind::MultipartRequired.message(),
            "Multipart request required."
        );

        assert_eq!(ErrorKind::MissingInput.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::MissingInput.message(), "No msg provided.");
    }

    #[test]
    fn server_errors_map_to_500() {
        assert_eq!(
            ErrorKind::ConversionFailed.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ErrorKind::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorKind::Internal.message(), "Conversion failed.");
    }

    #[test]
    fn detail_is_appended_to_the_fixed_message() {
        let error = ErrorKind::ConversionFailed.with_detail("unknown MAPI property");

        assert_eq!(error.kind(), ErrorKind::ConversionFailed);
        assert_eq!(
            error.to_string(),
            "Conversion failed. unknown MAPI property"
        );
    }

    #[test]
    fn kind_without_detail_renders_fixed_message_only() {
        let error = Error::from(ErrorKind::ConversionFailed);
        assert_eq!(error.to_string(), "Conversion failed.");
        assert!(error.detail().is_none());
    }
}
