//! reqwest-backed blocking transport.

use super::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::error::BridgeError;
use std::time::Duration;
use url::Url;

/// HTTP transport backed by `reqwest::blocking`.
///
/// One client is shared by every worker; it pools connections internally.
#[derive(Debug, Clone)]
pub struct BlockingTransport {
    client: reqwest::blocking::Client,
}

impl BlockingTransport {
    /// Creates a transport sending the given `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::TransportInit` if the TLS backend or client
    /// cannot be initialized.
    pub fn new(user_agent: &str) -> Result<Self, BridgeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| BridgeError::transport_init(e.to_string()))?;

        Ok(Self { client })
    }

    /// Parses the URL and rejects anything but http and https.
    fn validate_url(url: &str) -> Result<Url, TransportError> {
        let parsed = Url::parse(url).map_err(|e| TransportError::invalid_url(url, e.to_string()))?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            scheme => Err(TransportError::invalid_url(
                url,
                format!("unsupported URL scheme: {scheme}; only http and https are allowed"),
            )),
        }
    }

    fn classify(url: &str, timeout: Duration, error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::timeout(url, timeout)
        } else if error.is_connect() {
            TransportError::connect(url, error.to_string())
        } else if error.is_builder() {
            TransportError::invalid_url(url, error.to_string())
        } else {
            TransportError::request(url, error.to_string())
        }
    }
}

impl HttpTransport for BlockingTransport {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = Self::validate_url(&request.url)?;

        let mut builder = self.client.get(url).timeout(request.timeout);
        if !request.params.is_empty() {
            builder = builder.query(request.params.pairs());
        }

        let response = builder
            .send()
            .map_err(|e| Self::classify(&request.url, request.timeout, &e))?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| {
            if e.is_timeout() {
                TransportError::timeout(&request.url, request.timeout)
            } else {
                TransportError::body(&request.url, e.to_string())
            }
        })?;

        Ok(HttpResponse { status, body })
    }
}
