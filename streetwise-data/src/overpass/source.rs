//! HTTP [`RoadNetworkSource`] backed by an Overpass API interpreter.
//!
//! # Example
//!
//! ```no_run
//! use streetwise_core::{BoundingBox, RoadNetworkSource, query_for_bbox};
//! use streetwise_data::overpass::HttpOverpassSource;
//!
//! let source = HttpOverpassSource::new("https://overpass-api.de/api/interpreter")?;
//! let query = query_for_bbox(BoundingBox::new(37.70, -122.51, 37.81, -122.36));
//! let elements = source.fetch_elements(&query)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use log::info;
use streetwise_core::{OverpassQuery, QueryServiceError, RawElement, RoadNetworkSource};

use super::response::decode_elements;
use super::retry::RetryPolicy;
use crate::http::{BlockingClient, ClientBuildError};

/// Public Overpass interpreter endpoint.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Default user agent for Overpass requests.
pub const DEFAULT_USER_AGENT: &str = "streetwise/0.1 (street extraction)";

/// Default request timeout in seconds; matches the `[timeout:120]` the
/// queries ask the server for.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for [`HttpOverpassSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverpassSourceConfig {
    /// Interpreter endpoint URL.
    pub url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Retry behaviour for transient failures.
    pub retry: RetryPolicy,
}

impl Default for OverpassSourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OVERPASS_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            retry: RetryPolicy::default(),
        }
    }
}

impl OverpassSourceConfig {
    /// Configuration for the given endpoint with default settings.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Road-network source posting queries to an Overpass interpreter.
///
/// Each query is sent as the `data` form field. Transient failures are
/// retried according to the configured [`RetryPolicy`], sleeping on the
/// calling thread between attempts.
#[derive(Debug)]
pub struct HttpOverpassSource {
    http: BlockingClient,
    config: OverpassSourceConfig,
}

impl HttpOverpassSource {
    /// Source for the given endpoint with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(OverpassSourceConfig::new(url))
    }

    /// Source with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: OverpassSourceConfig) -> Result<Self, ClientBuildError> {
        let http = BlockingClient::new(&config.user_agent, config.timeout)?;
        Ok(Self { http, config })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &OverpassSourceConfig {
        &self.config
    }

    async fn post_query(&self, query: &OverpassQuery) -> Result<String, QueryServiceError> {
        let url = self.config.url.as_str();
        let response = self
            .http
            .client()
            .post(url)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err))?;
        response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))
    }

    fn fetch_once(&self, query: &OverpassQuery) -> Result<Vec<RawElement>, QueryServiceError> {
        let body = self.http.block_on(self.post_query(query))?;
        let elements = decode_elements(&body)?;
        info!("Successfully fetched {} elements", elements.len());
        Ok(elements)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error) -> QueryServiceError {
        let url = self.config.url.clone();
        if error.is_timeout() {
            return QueryServiceError::Timeout {
                url,
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return QueryServiceError::Http {
                url,
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        if error.is_decode() {
            return QueryServiceError::MalformedPayload {
                message: error.to_string(),
            };
        }
        QueryServiceError::Network {
            url,
            message: error.to_string(),
        }
    }
}

impl RoadNetworkSource for HttpOverpassSource {
    fn fetch_elements(&self, query: &OverpassQuery) -> Result<Vec<RawElement>, QueryServiceError> {
        let max_attempts = self.config.retry.max_attempts.max(1);
        self.config.retry.run(
            |attempt| {
                info!("Fetching data from Overpass API (attempt {attempt}/{max_attempts})");
                self.fetch_once(query)
            },
            std::thread::sleep,
        )
    }
}
