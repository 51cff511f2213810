use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware, state::InMemoryState,
    state::NotKeyed,
};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::config::{CvmConfig, CvmUrls};
use super::error::{CvmError, Result};
use super::statements::DocKind;

const INITIAL_BACKOFF_MS: u64 = 1000; // 1 second
const MAX_BACKOFF_MS: u64 = 60_000;

type Governor = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// HTTP client for the CVM open-data portal with built-in throttling and retry logic.
///
/// The `Cvm` client is the transport layer under the archive fetcher. The portal
/// serves large static ZIP archives (tens of megabytes per fiscal year), so the
/// client is deliberately small: a rate-limited `get_bytes` with retries is the
/// whole surface.
///
/// # Throttling
///
/// The portal publishes no formal fair-access rule, but hammering it during a
/// multi-year reload is both rude and slow (the server throttles aggressive
/// clients). A token bucket caps request frequency; when the bucket is empty,
/// requests wait until tokens become available.
///
/// # Error Handling
///
/// Transient failures (network errors, HTTP 429) are retried with exponential
/// backoff and jitter. HTTP 404 maps to [`CvmError::NotFound`], which the load
/// pipeline treats as "this fiscal year has not been published yet" rather than
/// as a hard failure.
///
/// # Examples
///
/// ```rust
/// # use cvmkit::Cvm;
/// let cvm = Cvm::new("my_app/1.0 (my@email.com)")?;
/// # Ok::<(), cvmkit::CvmError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Cvm {
    /// HTTP client for making requests
    pub(crate) client: reqwest::Client,

    /// Token bucket rate limiter
    pub(crate) rate_limiter: Arc<Governor>,

    /// Base URL for quarterly (ITR) archives
    pub(crate) itr_url: String,

    /// Base URL for annual (DFP) archives
    pub(crate) dfp_url: String,

    /// Base URL for the open-company registry
    pub(crate) registry_url: String,

    /// Maximum retries for transient failures
    pub(crate) max_retries: u32,
}

impl Cvm {
    /// Creates a new Cvm client with sensible defaults.
    ///
    /// Defaults: 5 requests per second, a 120-second timeout (archives are
    /// large), and the standard portal base URLs. The user agent identifies
    /// your application to the portal operators.
    pub fn new(user_agent: &str) -> Result<Self> {
        let config = CvmConfig {
            user_agent: user_agent.to_string(),
            ..CvmConfig::default()
        };
        Self::with_config(&config)
    }

    /// Creates a Cvm client from a [`CvmConfig`].
    ///
    /// Use this when you need to point the client at a mirror, change the
    /// throttle, or shorten the timeout for tests.
    ///
    /// # Errors
    ///
    /// Returns `CvmError::ConfigError` if the user agent is malformed, the
    /// rate limit is zero, or the HTTP client cannot be built.
    pub fn with_config(config: &CvmConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| CvmError::ConfigError(format!("Invalid user agent: {}", e)))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| CvmError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(config.rate_limit).ok_or_else(|| {
                CvmError::ConfigError("Rate limit must be greater than zero".to_string())
            })?,
        )));

        let CvmUrls { itr, dfp, registry } = config.base_urls.clone();

        Ok(Cvm {
            client,
            rate_limiter,
            itr_url: itr,
            dfp_url: dfp,
            registry_url: registry,
            max_retries: config.max_retries,
        })
    }

    /// Calculates the wait duration for retry attempts.
    ///
    /// Exponential backoff (1s, 2s, 4s, ...) with ±20% jitter so that several
    /// concurrent downloads do not retry in lockstep. Capped at one minute so
    /// a large retry count cannot overflow the doubling.
    fn calculate_backoff(retry: u32) -> Duration {
        let backoff_ms = INITIAL_BACKOFF_MS
            .saturating_mul(2_u64.saturating_pow(retry))
            .min(MAX_BACKOFF_MS);
        let jitter = (backoff_ms as f64 * 0.2 * (fastrand::f64() - 0.5)) as i64;
        Duration::from_millis((backoff_ms as i64 + jitter) as u64)
    }

    /// Fetches binary data from a URL with rate limiting and retry logic.
    ///
    /// This is the download path for bulk ZIP archives. Rate limit responses
    /// (HTTP 429) and network failures are retried up to `max_retries` times with
    /// exponential backoff; 404 and other HTTP errors return immediately.
    ///
    /// # Errors
    ///
    /// * `CvmError::NotFound` - the archive does not exist (HTTP 404),
    ///   typically a fiscal year that has not been published
    /// * `CvmError::RateLimitExceeded` - 429 responses persisted after retries
    /// * `CvmError::RequestError` - network failure after retries
    /// * `CvmError::InvalidResponse` - unexpected HTTP status code
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let mut retries = 0;

        loop {
            self.rate_limiter.until_ready().await;

            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(e) => {
                    if retries >= self.max_retries {
                        return Err(CvmError::RequestError(e));
                    }
                    let backoff = Self::calculate_backoff(retries);
                    tracing::warn!(
                        "Request failed for {}: {:?}. Attempt {}/{}. Retrying in {:?}.",
                        url,
                        e,
                        retries + 1,
                        self.max_retries + 1,
                        backoff
                    );
                    sleep(backoff).await;
                    retries += 1;
                    continue;
                }
            };

            match response.status() {
                reqwest::StatusCode::OK => {
                    return response
                        .bytes()
                        .await
                        .map(|b| b.to_vec())
                        .map_err(CvmError::RequestError);
                }
                reqwest::StatusCode::NOT_FOUND => {
                    return Err(CvmError::NotFound);
                }
                reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    if retries >= self.max_retries {
                        return Err(CvmError::RateLimitExceeded);
                    }
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|h| h.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .map(Duration::from_secs)
                        .unwrap_or_else(|| Self::calculate_backoff(retries));
                    tracing::warn!(
                        "Rate limit hit (429) for {}. Attempt {}/{}. Waiting for {:?} before retry.",
                        url,
                        retries + 1,
                        self.max_retries + 1,
                        retry_after
                    );
                    sleep(retry_after).await;
                    retries += 1;
                    continue;
                }
                status => {
                    return Err(CvmError::InvalidResponse(format!(
                        "Unexpected status code: {} for URL: {}",
                        status, url
                    )));
                }
            }
        }
    }

    /// Returns the base URL for the given document kind's dataset.
    pub fn base_url(&self, kind: DocKind) -> &str {
        match kind {
            DocKind::Itr => &self.itr_url,
            DocKind::Dfp => &self.dfp_url,
        }
    }

    /// Returns the base URL for the open-company registry dataset.
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }
}
