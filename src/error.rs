//! Error taxonomy.
//!
//! Three layers, each with a distinct audience:
//!
//! - [`Error`] — infrastructure failures surfaced to the caller of
//!   [`Server::listen`](crate::Server::listen): bad configuration, a route
//!   pattern the matcher rejects, socket errors, a shutdown that overran its
//!   deadline.
//! - [`HandlerError`] — what application handlers return. A tagged choice
//!   between a classified [`DomainError`] and an opaque error, so the
//!   dispatch layer branches on the tag instead of downcasting.
//! - [`DomainError`] — a structured failure with a stable kind tag and a
//!   client-safe message. The wrapped cause stays in the logs; only the
//!   message crosses the wire.

use std::fmt;
use std::time::Duration;

use http::StatusCode;

use crate::response::ErrorResponse;

/// Boxed error trait object used for wrapped causes and opaque errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Kind tag for required-argument errors.
pub const REQUIRED_ARGUMENT: &str = "REQUIRED_ARGUMENT";
/// Kind tag for invalid-argument errors.
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";

const REQUIRED_ARGUMENT_MSG: &str = "missing required argument(s)";
const INVALID_ARGUMENT_MSG: &str = "invalid argument(s) passed in";

// ── DomainError ───────────────────────────────────────────────────────────────

/// A structured, caller-classified failure.
///
/// Carries an error code, a stable kind tag, and a message safe to show to
/// clients. An optional wrapped cause holds the underlying error; it appears
/// in [`Display`](fmt::Display) output (and therefore in server logs) but is
/// never serialized into a response body.
#[derive(Debug)]
pub struct DomainError {
    code: u16,
    kind: String,
    message: String,
    cause: Option<BoxError>,
}

impl DomainError {
    /// Creates a classified error with a code, kind tag, and client-safe message.
    pub fn new(code: u16, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            kind: kind.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Attaches the underlying error. Log-side only; never sent to clients.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Standardised required-argument error (400, [`REQUIRED_ARGUMENT`]).
    ///
    /// The message lists the offending argument names comma-joined:
    /// `missing required argument(s): port, timeout`.
    pub fn required_args(args: &[&str]) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST.as_u16(),
            REQUIRED_ARGUMENT,
            format!("{REQUIRED_ARGUMENT_MSG}: {}", args.join(", ")),
        )
    }

    /// Standardised invalid-argument error (400, [`INVALID_ARGUMENT`]).
    pub fn invalid_args(args: &[&str]) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST.as_u16(),
            INVALID_ARGUMENT,
            format!("{INVALID_ARGUMENT_MSG}: {}", args.join(", ")),
        )
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{} due to {cause}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for DomainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|c| c.as_ref() as &(dyn std::error::Error + 'static))
    }
}

// ── HandlerError ──────────────────────────────────────────────────────────────

/// The error half of the application-handler contract.
///
/// The discriminant decides what clients see: a [`Domain`](Self::Domain)
/// error keeps its code, kind, and message in the response body; an
/// [`Opaque`](Self::Opaque) error is logged in full but answered with a bare
/// `{"code":500}` so internals never leak.
#[derive(Debug)]
pub enum HandlerError {
    /// A classified error; its code and message travel to the client.
    Domain(DomainError),
    /// Anything else; logged server-side, hidden from the client.
    Opaque(BoxError),
}

impl HandlerError {
    /// Wraps any error as opaque.
    pub fn opaque(err: impl Into<BoxError>) -> Self {
        Self::Opaque(err.into())
    }

    /// Maps this error to the client-visible body.
    ///
    /// A domain error answers with its configured code (falling back to 500
    /// when the code is not a valid HTTP status), its kind tag, and its
    /// message — never the wrapped cause. An opaque error answers with a
    /// bare 500.
    pub(crate) fn to_error_response(&self) -> ErrorResponse {
        match self {
            Self::Domain(e) => ErrorResponse {
                code: StatusCode::from_u16(e.code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
                    .as_u16(),
                kind: e.kind().to_owned(),
                message: e.message().to_owned(),
            },
            Self::Opaque(_) => ErrorResponse {
                code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                kind: String::new(),
                message: String::new(),
            },
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => e.fmt(f),
            Self::Opaque(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => std::error::Error::source(e),
            Self::Opaque(e) => Some(e.as_ref() as &(dyn std::error::Error + 'static)),
        }
    }
}

impl From<DomainError> for HandlerError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

// ── Server error ──────────────────────────────────────────────────────────────

/// The error type returned by the server's fallible operations.
///
/// Application-level failures travel through [`HandlerError`] and become
/// HTTP responses; this type surfaces infrastructure failures from
/// [`Server::listen`](crate::Server::listen).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configuration failed its precondition check; no socket was opened.
    #[error("invalid configuration: {0}")]
    Config(DomainError),

    /// A route pattern was rejected by the underlying matcher.
    #[error("invalid route: {0}")]
    Route(DomainError),

    /// Binding or accepting on the listening socket failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// In-flight requests did not drain within the configured timeout.
    #[error("graceful shutdown timed out after {0:?}")]
    ShutdownTimeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_args_joins_names() {
        let err = DomainError::required_args(&["a", "b"]);
        assert_eq!(err.code(), 400);
        assert_eq!(err.kind(), REQUIRED_ARGUMENT);
        assert_eq!(err.message(), "missing required argument(s): a, b");
    }

    #[test]
    fn invalid_args_joins_names() {
        let err = DomainError::invalid_args(&["limit"]);
        assert_eq!(err.code(), 400);
        assert_eq!(err.kind(), INVALID_ARGUMENT);
        assert_eq!(err.message(), "invalid argument(s) passed in: limit");
    }

    #[test]
    fn display_appends_cause() {
        let io = std::io::Error::other("disk full");
        let err = DomainError::new(500, "STORAGE", "unable to persist").with_cause(io);
        assert_eq!(err.to_string(), "unable to persist due to disk full");
    }

    #[test]
    fn display_without_cause_is_message_only() {
        let err = DomainError::new(500, "STORAGE", "unable to persist");
        assert_eq!(err.to_string(), "unable to persist");
    }

    #[test]
    fn domain_error_keeps_code_and_kind_in_body() {
        let err = HandlerError::from(DomainError::required_args(&["id"]));
        let body = err.to_error_response();
        assert_eq!(body.code, 400);
        assert_eq!(body.kind, REQUIRED_ARGUMENT);
        assert_eq!(body.message, "missing required argument(s): id");
    }

    #[test]
    fn domain_error_with_bogus_code_falls_back_to_500() {
        let err = HandlerError::from(DomainError::new(7, "WEIRD", "odd"));
        assert_eq!(err.to_error_response().code, 500);
    }

    #[test]
    fn opaque_error_body_is_bare_500() {
        let err = HandlerError::opaque(std::io::Error::other("boom"));
        let body = err.to_error_response();
        assert_eq!(body.code, 500);
        assert!(body.kind.is_empty());
        assert!(body.message.is_empty());
    }
}
