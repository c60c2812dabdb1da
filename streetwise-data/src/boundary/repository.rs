//! HTTP client for a static repository of US city boundary GeoJSON files.
//!
//! Files are laid out as `{base}/{state_code}/{city_slug}.json`.

use std::time::Duration;

use log::{debug, error, info};
use reqwest::StatusCode;
use streetwise_core::{Boundary, BoundaryError, BoundarySource};

use super::document::parse_boundary;
use super::naming::{city_slug, state_code};
use crate::http::{BlockingClient, ClientBuildError};

/// Default repository root.
pub const DEFAULT_BOUNDARY_BASE_URL: &str = "https://raw.githubusercontent.com/generalpiston/geojson-us-city-boundaries/refs/heads/master/cities";

/// The only country the repository covers.
pub const SUPPORTED_COUNTRY: &str = "United States";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpBoundaryRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryRepositoryConfig {
    /// Repository root URL.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for BoundaryRepositoryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BOUNDARY_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: crate::overpass::DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl BoundaryRepositoryConfig {
    /// Configuration for the given repository root.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
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
}

/// [`BoundarySource`] fetching boundaries over HTTP.
#[derive(Debug)]
pub struct HttpBoundaryRepository {
    http: BlockingClient,
    config: BoundaryRepositoryConfig,
}

impl HttpBoundaryRepository {
    /// Repository client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new() -> Result<Self, ClientBuildError> {
        Self::with_config(BoundaryRepositoryConfig::default())
    }

    /// Repository client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: BoundaryRepositoryConfig) -> Result<Self, ClientBuildError> {
        let http = BlockingClient::new(&config.user_agent, config.timeout)?;
        Ok(Self { http, config })
    }

    /// URL of the boundary file for a city.
    ///
    /// # Errors
    ///
    /// [`BoundaryError::UnsupportedCountry`] outside the United States and
    /// [`BoundaryError::UnknownState`] when the state has no code.
    pub fn boundary_url(
        &self,
        city: &str,
        state: &str,
        country: &str,
    ) -> Result<String, BoundaryError> {
        if !country.trim().eq_ignore_ascii_case(SUPPORTED_COUNTRY) {
            return Err(BoundaryError::UnsupportedCountry {
                country: country.to_owned(),
            });
        }
        let code = state_code(state).ok_or_else(|| BoundaryError::UnknownState {
            state: state.to_owned(),
        })?;
        Ok(format!(
            "{}/{code}/{}.json",
            self.config.base_url.trim_end_matches('/'),
            city_slug(city)
        ))
    }

    async fn download(&self, url: &str) -> Result<(StatusCode, String), reqwest::Error> {
        let response = self.http.client().get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

fn network_error(url: &str, error: &reqwest::Error) -> BoundaryError {
    BoundaryError::Network {
        url: url.to_owned(),
        message: error.to_string(),
    }
}

impl BoundarySource for HttpBoundaryRepository {
    fn boundary(&self, city: &str, state: &str, country: &str) -> Result<Boundary, BoundaryError> {
        info!("Fetching boundary for {city}, {state}");
        let url = self.boundary_url(city, state, country)?;
        debug!("Fetching from URL: {url}");
        let (status, body) = self
            .http
            .block_on(self.download(&url))
            .map_err(|err| network_error(&url, &err))?;
        if status == StatusCode::NOT_FOUND {
            error!("City boundary not found: {city}, {state} (tried {url})");
            return Err(BoundaryError::NotFound {
                city: city.to_owned(),
                state: state.to_owned(),
                url,
            });
        }
        if !status.is_success() {
            return Err(BoundaryError::Network {
                url,
                message: format!("HTTP {status}"),
            });
        }
        let boundary = parse_boundary(&body, city, Some(state), country)?;
        info!(
            "Fetched boundary for {}: {:.2} km², bbox {:?}",
            boundary.name,
            boundary.area_km2,
            <[f64; 4]>::from(boundary.bbox)
        );
        Ok(boundary)
    }
}
