//! Error types shared by the extraction pipeline and its collaborators.

use thiserror::Error;

/// Failures talking to the road-network query service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryServiceError {
    /// The request could not be sent or the connection dropped.
    #[error("request to {url} failed: {message}")]
    Network {
        /// Endpoint that was contacted.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The service did not answer within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint that was contacted.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success status.
    #[error("{url} responded with HTTP {status}: {message}")]
    Http {
        /// Endpoint that was contacted.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("malformed response payload: {message}")]
    MalformedPayload {
        /// Decoder error description.
        message: String,
    },
    /// Every retry attempt failed with a transient error.
    #[error("query service still failing after {attempts} attempts")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Error from the final attempt.
        #[source]
        last: Box<QueryServiceError>,
    },
}

impl QueryServiceError {
    /// Whether retrying the same request may succeed.
    ///
    /// Transport failures, timeouts and HTTP errors are transient; a payload
    /// that failed to decode will decode the same way next time.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::Http { .. }
        )
    }
}

/// Failures obtaining a city boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundaryError {
    /// The repository has no boundary for the requested city.
    #[error("no boundary found for {city}, {state} at {url}")]
    NotFound {
        /// Requested city.
        city: String,
        /// Requested state.
        state: String,
        /// URL that was tried.
        url: String,
    },
    /// Only United States cities are available.
    #[error("only United States cities are supported, got {country:?}")]
    UnsupportedCountry {
        /// Requested country.
        country: String,
    },
    /// The state could not be mapped to a two-letter code.
    #[error("could not determine state code for {state:?}")]
    UnknownState {
        /// Requested state.
        state: String,
    },
    /// The repository could not be reached.
    #[error("failed to fetch boundary from {url}: {message}")]
    Network {
        /// URL that was requested.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The payload was not usable GeoJSON.
    #[error("invalid boundary GeoJSON: {message}")]
    InvalidGeoJson {
        /// Decoder error description.
        message: String,
    },
    /// The geometry is not a polygon or multi-polygon.
    #[error("unsupported boundary geometry {kind}")]
    UnsupportedGeometry {
        /// GeoJSON type name of the rejected geometry.
        kind: String,
    },
    /// Reading or writing the local boundary cache failed.
    #[error("boundary cache error at {path}: {message}")]
    Cache {
        /// Cache file involved.
        path: String,
        /// I/O error description.
        message: String,
    },
}

/// Failures that make the boundary filter unusable for a whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The boundary is not polygonal.
    #[error("cannot filter against a {kind} boundary")]
    UnsupportedGeometry {
        /// GeoJSON type name of the boundary geometry.
        kind: String,
    },
    /// The boundary polygon is degenerate.
    #[error("boundary is not a usable polygon: {reason}")]
    InvalidBoundary {
        /// What was wrong with it.
        reason: String,
    },
}

/// Failures that abort an extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No boundary could be obtained for the requested city.
    #[error("boundary unavailable for {city}, {state}")]
    BoundaryUnavailable {
        /// Requested city.
        city: String,
        /// Requested state.
        state: String,
        /// Underlying boundary failure.
        #[source]
        source: BoundaryError,
    },
    /// The road-network query failed after retries.
    #[error("road-network query failed")]
    QueryService(#[from] QueryServiceError),
    /// The region key is not in the catalogue.
    #[error("region {key:?} not supported; available: {}", available.join(", "))]
    UnknownRegion {
        /// Requested key.
        key: String,
        /// Keys present in the catalogue.
        available: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(QueryServiceError::Network { url: "u".into(), message: "reset".into() }, true)]
    #[case(QueryServiceError::Timeout { url: "u".into(), timeout_secs: 120 }, true)]
    #[case(QueryServiceError::Http { url: "u".into(), status: 504, message: "gateway".into() }, true)]
    #[case(QueryServiceError::MalformedPayload { message: "eof".into() }, false)]
    fn classifies_transient_failures(#[case] error: QueryServiceError, #[case] expected: bool) {
        assert_eq!(error.is_transient(), expected);
    }

    #[rstest]
    fn exhausted_retries_are_not_retried_again() {
        let error = QueryServiceError::RetriesExhausted {
            attempts: 3,
            last: Box::new(QueryServiceError::Timeout {
                url: "u".into(),
                timeout_secs: 1,
            }),
        };
        assert!(!error.is_transient());
        assert!(std::error::Error::source(&error).is_some());
    }

    #[rstest]
    fn unknown_region_lists_available_keys() {
        let error = ExtractError::UnknownRegion {
            key: "atlantis".into(),
            available: vec!["san-francisco".into()],
        };
        assert_eq!(
            error.to_string(),
            "region \"atlantis\" not supported; available: san-francisco"
        );
    }
}
