//! Transport error types.

use std::fmt;
use std::time::Duration;

/// Errors from executing an HTTP request.
///
/// None of these reach scripts directly: the dispatcher reports every
/// transport failure as status code 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// The URL that was requested
    pub url: String,
    /// The specific error that occurred
    pub kind: TransportErrorKind,
}

/// Specific transport error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The URL could not be parsed or uses an unsupported scheme
    InvalidUrl {
        /// Why the URL was rejected
        reason: String,
    },
    /// The request did not complete within its timeout
    Timeout {
        /// The timeout that elapsed
        timeout: Duration,
    },
    /// The connection could not be established
    Connect {
        /// Error from the HTTP client
        reason: String,
    },
    /// The request failed for another reason
    Request {
        /// Error from the HTTP client
        reason: String,
    },
    /// The response body could not be read
    Body {
        /// Error from the HTTP client
        reason: String,
    },
}

impl TransportError {
    /// Creates a new TransportError with the given kind.
    #[must_use]
    pub fn new(url: impl Into<String>, kind: TransportErrorKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    /// Creates an invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            url,
            TransportErrorKind::InvalidUrl {
                reason: reason.into(),
            },
        )
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self::new(url, TransportErrorKind::Timeout { timeout })
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connect(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            url,
            TransportErrorKind::Connect {
                reason: reason.into(),
            },
        )
    }

    /// Creates a generic request error.
    #[must_use]
    pub fn request(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            url,
            TransportErrorKind::Request {
                reason: reason.into(),
            },
        )
    }

    /// Creates a body read error.
    #[must_use]
    pub fn body(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            url,
            TransportErrorKind::Body {
                reason: reason.into(),
            },
        )
    }

    /// Returns true if the request timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, TransportErrorKind::Timeout { .. })
    }

    /// Returns true if the URL was rejected before any I/O.
    #[must_use]
    pub fn is_invalid_url(&self) -> bool {
        matches!(self.kind, TransportErrorKind::InvalidUrl { .. })
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TransportErrorKind::InvalidUrl { reason } => {
                write!(f, "invalid URL '{}': {}", self.url, reason)
            }
            TransportErrorKind::Timeout { timeout } => {
                write!(
                    f,
                    "request to '{}' timed out after {}ms",
                    self.url,
                    timeout.as_millis()
                )
            }
            TransportErrorKind::Connect { reason } => {
                write!(f, "failed to connect to '{}': {}", self.url, reason)
            }
            TransportErrorKind::Request { reason } => {
                write!(f, "request to '{}' failed: {}", self.url, reason)
            }
            TransportErrorKind::Body { reason } => {
                write!(f, "failed to read response from '{}': {}", self.url, reason)
            }
        }
    }
}

impl std::error::Error for TransportError {}
