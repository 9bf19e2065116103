//! HTTP transport.
//!
//! The bridge treats the network as a blocking call: URL, query parameters
//! and a timeout go in, a status code and body text come out. Workers call
//! it off the host thread.

mod blocking;
mod error;

pub use blocking::BlockingTransport;
pub use error::{TransportError, TransportErrorKind};

use std::fmt::Debug;
use std::time::Duration;

/// Query parameters for a GET request, in the order the script gave them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// No parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Zips parallel key and value arrays.
    ///
    /// Arrays of different length, or an empty key array, produce no
    /// parameters at all rather than an error.
    #[must_use]
    pub fn from_parallel(keys: &[String], values: &[String]) -> Self {
        if keys.is_empty() || keys.len() != values.len() {
            return Self::default();
        }
        Self(
            keys.iter()
                .cloned()
                .zip(values.iter().cloned())
                .collect(),
        )
    }

    /// Appends one parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// The key/value pairs.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A GET request as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Target URL, without the query parameters below
    pub url: String,
    /// Query parameters appended to the URL
    pub params: QueryParams,
    /// Total time allowed for the request
    pub timeout: Duration,
}

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, decoded as text
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for the only status scripts treat as success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// A blocking HTTP GET primitive.
///
/// Implementations are shared across worker threads, so they must be
/// `Send + Sync`. The timeout in the request is enforced here; the bridge
/// never interrupts a call in progress.
pub trait HttpTransport: Send + Sync + Debug {
    /// Performs the request, blocking until it completes or times out.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no HTTP response was received.
    /// Non-2xx responses are not errors.
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}
