//! Transport abstraction over the wire-level HTTP exchange.
//!
//! The engine talks to `Transport` rather than reqwest directly so tests
//! can substitute a stub that serves canned responses without a network.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// A single outbound request, fully assembled by the request layer.
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl WireRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A single response as it came off the wire.
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl WireResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as text, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connection(String),
}

/// One HTTP exchange. Retry, pacing, and identity rotation live above
/// this seam in [`RequestClient`](super::RequestClient).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &WireRequest) -> Result<WireResponse, TransportError>;
}

/// Production transport backed by reqwest with a session cookie jar.
///
/// The cookie store is what makes consecutive requests within one item's
/// processing look like a continuous browsing session.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &WireRequest) -> Result<WireResponse, TransportError> {
        let mut req = self.client.get(&request.url);
        for (name, value) in &request.headers {
            req = req.header(name, value);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Connection(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Connection(e.to_string())
            }
        })?;

        Ok(WireResponse {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}
