//! Request layer: rotating identity, politeness throttle, bounded retries.
//!
//! All outbound traffic goes through one [`RequestClient`] per process run.
//! The client enforces a global minimum delay between consecutive requests,
//! rotates user agents per attempt, and retries 403s and transport failures
//! up to a fixed bound. HTTP error statuses never become Rust errors; every
//! outcome is a [`FetchOutcome`] variant callers inspect explicitly.

mod transport;
mod user_agent;

pub use transport::{ReqwestTransport, Transport, TransportError, WireRequest, WireResponse};
pub use user_agent::{BROWSER_HEADERS, GOOGLE_REFERER, USER_AGENTS};

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

/// Tunables for the request layer.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Per-call timeout handed to the transport.
    pub timeout: Duration,
    /// Minimum delay between consecutive outbound requests, process-wide.
    /// A politeness throttle, not a performance knob; it applies on every
    /// retry attempt as well.
    pub request_delay: Duration,
    /// Total attempts per call for 403s and transport failures.
    pub retry_attempts: u32,
    /// Extra sleep between retry attempts.
    pub retry_backoff: Duration,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            request_delay: Duration::from_millis(500),
            retry_attempts: 3,
            retry_backoff: Duration::from_secs(1),
        }
    }
}

/// Result of one `fetch` call, after retries.
#[derive(Debug)]
pub enum FetchOutcome {
    /// 2xx with body.
    Success(WireResponse),
    /// Non-2xx status after retries. Not an error at this layer.
    HttpError { status: u16 },
    /// Transport failure after retries.
    Failed(TransportError),
}

impl FetchOutcome {
    /// The response, if this was a success.
    pub fn success(self) -> Option<WireResponse> {
        match self {
            FetchOutcome::Success(response) => Some(response),
            _ => None,
        }
    }

    /// Short description for log lines.
    pub fn describe(&self) -> String {
        match self {
            FetchOutcome::Success(r) => format!("HTTP {}", r.status),
            FetchOutcome::HttpError { status } => format!("HTTP {}", status),
            FetchOutcome::Failed(e) => e.to_string(),
        }
    }
}

/// Rotating-identity state shared by every request in a run.
struct IdentityState {
    ua_index: usize,
    last_request: Option<Instant>,
}

/// HTTP client with identity rotation and a global politeness throttle.
pub struct RequestClient {
    transport: Arc<dyn Transport>,
    config: RequestConfig,
    identity: Mutex<IdentityState>,
}

impl RequestClient {
    /// Create a client backed by the production reqwest transport.
    pub fn new(config: RequestConfig) -> Self {
        let transport = Arc::new(ReqwestTransport::new(config.timeout));
        Self::with_transport(transport, config)
    }

    /// Create a client over an arbitrary transport (used by tests).
    pub fn with_transport(transport: Arc<dyn Transport>, config: RequestConfig) -> Self {
        Self {
            transport,
            config,
            identity: Mutex::new(IdentityState {
                ua_index: 0,
                last_request: None,
            }),
        }
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Wait out the politeness delay, stamp the request, and pick the next
    /// user agent in the rotation.
    async fn pace(&self) -> &'static str {
        let mut identity = self.identity.lock().await;
        if let Some(last) = identity.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.config.request_delay {
                let wait = self.config.request_delay - elapsed;
                debug!("throttling {:?} before next request", wait);
                tokio::time::sleep(wait).await;
            }
        }
        identity.last_request = Some(Instant::now());

        let ua = USER_AGENTS[identity.ua_index % USER_AGENTS.len()];
        identity.ua_index = (identity.ua_index + 1) % USER_AGENTS.len();
        ua
    }

    fn build_request(&self, url: &str, user_agent: &str, referer: Option<&str>) -> WireRequest {
        let mut request = WireRequest::new(url).header("User-Agent", user_agent);
        for (name, value) in BROWSER_HEADERS {
            request = request.header(*name, *value);
        }
        if let Some(referer) = referer {
            request = request.header("Referer", referer);
        }
        request
    }

    /// Fetch a URL with browser-like headers and bounded retries.
    ///
    /// Retries on 403 and transport failures; any other status is returned
    /// immediately as [`FetchOutcome::HttpError`].
    pub async fn fetch(&self, url: &str, referer: Option<&str>) -> FetchOutcome {
        let attempts = self.config.retry_attempts.max(1);
        let mut last_outcome = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_backoff).await;
            }

            let user_agent = self.pace().await;
            let request = self.build_request(url, user_agent, referer);

            match self.transport.execute(&request).await {
                Ok(response) if response.is_success() => {
                    return FetchOutcome::Success(response);
                }
                Ok(response) if response.status == 403 => {
                    debug!("403 from {} (attempt {}/{})", url, attempt + 1, attempts);
                    last_outcome = Some(FetchOutcome::HttpError { status: 403 });
                }
                Ok(response) => {
                    return FetchOutcome::HttpError {
                        status: response.status,
                    };
                }
                Err(e) => {
                    debug!(
                        "transport failure for {} (attempt {}/{}): {}",
                        url,
                        attempt + 1,
                        attempts,
                        e
                    );
                    last_outcome = Some(FetchOutcome::Failed(e));
                }
            }
        }

        last_outcome.unwrap_or(FetchOutcome::Failed(TransportError::Connection(
            "no attempts made".to_string(),
        )))
    }
}
