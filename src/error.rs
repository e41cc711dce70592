//! Error taxonomy.
//!
//! Two error types split along the crate's two phases. [`ConfigError`] is
//! fatal at registration time: malformed patterns or conflicting
//! registrations surface immediately, before any traffic. [`HttpError`] is
//! the request-time, status-carrying type: recoverable by after-phases and
//! otherwise rendered by the response coercer so the dispatcher's caller
//! always receives a well-formed response.

use std::error::Error as StdError;
use std::fmt;

use http::Method;
use thiserror::Error;

/// A fatal registration error. Raised while an [`App`](crate::App) is being
/// built (pattern parsing, route insertion); never during request handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A pattern contained an empty path segment (e.g. `//` or a bare `:`).
    #[error("empty path segment in pattern `{pattern}`")]
    EmptySegment {
        /// The offending raw pattern.
        pattern: String,
    },

    /// A trailing-wildcard segment (`**`) appeared before the final
    /// position, where it cannot match.
    #[error("wildcard segment must be last in pattern `{pattern}`")]
    WildcardNotLast {
        /// The offending raw pattern.
        pattern: String,
    },

    /// Two registrations collided on the same method and path.
    #[error("duplicate route for {method} `{pattern}`")]
    DuplicateRoute {
        /// The HTTP method (or `ANY`) that collided.
        method: String,
        /// The raw pattern that collided.
        pattern: String,
    },

    /// Two patterns share a path position but name the captured parameter
    /// differently.
    #[error("parameter name conflict at `{pattern}`: `{existing}` vs `{offered}`")]
    ParamNameConflict {
        /// The parameter name already registered at this position.
        existing: String,
        /// The conflicting parameter name being offered.
        offered: String,
        /// The raw pattern being registered.
        pattern: String,
    },

    /// Two patterns share a trailing-wildcard position but name the captured
    /// remainder differently.
    #[error("wildcard name conflict at `{pattern}`: `{existing}` vs `{offered}`")]
    WildcardNameConflict {
        /// The wildcard name already registered at this position.
        existing: String,
        /// The conflicting wildcard name being offered.
        offered: String,
        /// The raw pattern being registered.
        pattern: String,
    },
}

/// A request-time failure carrying an HTTP status, a client-facing message,
/// an optional `Allow` list (for 405s), and an optional underlying cause.
///
/// The rendered status is sanitized to the `100..=599` range, defaulting to
/// `500` for anything outside it. Cause chains are only exposed to clients
/// in debug mode.
#[derive(Debug)]
pub struct HttpError {
    status: u16,
    message: String,
    allow: Vec<Method>,
    cause: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl HttpError {
    /// Build an error with an explicit status and message.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            allow: Vec::new(),
            cause: None,
        }
    }

    /// A `404 Not Found`.
    pub fn not_found() -> Self {
        Self::new(404, "not found")
    }

    /// A `405 Method Not Allowed` carrying the set of methods that *are*
    /// allowed at the requested path (rendered into the `Allow` header).
    pub fn method_not_allowed(methods: Vec<Method>) -> Self {
        Self {
            status: 405,
            message: "method not allowed".to_string(),
            allow: methods,
            cause: None,
        }
    }

    /// A `500 Internal Server Error` with a custom message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    /// A transport-level failure (body read/write). Reported as `500` with
    /// the underlying I/O error attached as the cause.
    pub fn transport(err: std::io::Error) -> Self {
        Self::internal("transport error").with_cause(err)
    }

    /// Attach an underlying cause, consuming and returning `self`.
    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The sanitized HTTP status: the stored code if it is a valid HTTP
    /// status (`100..=599`), otherwise `500`.
    pub fn status(&self) -> u16 {
        if (100..=599).contains(&self.status) {
            self.status
        } else {
            500
        }
    }

    /// The client-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The `Allow` list, non-empty only for `405` responses.
    pub fn allow(&self) -> &[Method] {
        &self.allow
    }

    /// The underlying cause, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status(), self.message)
    }
}

impl StdError for HttpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .map(|c| c.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        Self::transport(err)
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal("json error").with_cause(err)
    }
}
