//! The end-to-end extraction pipeline.
//!
//! One run is strictly ordered: build query, fetch, assemble, classify,
//! filter against the boundary, consolidate. Nothing is shared between runs.

use geo::Geometry;
use log::{error, info};

use crate::assemble::assemble;
use crate::boundary::Boundary;
use crate::classify::classify;
use crate::config::ExtractorConfig;
use crate::consolidate::consolidate;
use crate::element::RawElement;
use crate::error::ExtractError;
use crate::filter::{FilterOutcome, filter_by_boundary};
use crate::query::{query_for_bbox, query_for_boundary};
use crate::region::RegionCatalog;
use crate::source::{BoundarySource, RoadNetworkSource};
use crate::street::{ExtractionContext, StreetEntity};

/// Result of one extraction run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    /// Consolidated streets sorted by base name.
    pub streets: Vec<StreetEntity>,
    /// Whether and how the boundary filter ran.
    pub filter: FilterOutcome,
}

impl ExtractionReport {
    /// Sum of street lengths in miles.
    #[must_use]
    pub fn total_miles(&self) -> f64 {
        self.streets.iter().map(|street| street.length_miles).sum()
    }
}

/// Extracts named city streets through a road-network source.
///
/// # Examples
/// ```
/// use streetwise_core::{
///     ExtractorConfig, FilterOutcome, OverpassQuery, QueryServiceError, RawElement,
///     RoadNetworkSource, StreetExtractor,
/// };
///
/// struct Empty;
///
/// impl RoadNetworkSource for Empty {
///     fn fetch_elements(&self, _query: &OverpassQuery) -> Result<Vec<RawElement>, QueryServiceError> {
///         Ok(Vec::new())
///     }
/// }
///
/// let extractor = StreetExtractor::new(Empty).with_config(ExtractorConfig::default());
/// let report = extractor.extract_region("san-francisco")?;
/// assert!(report.streets.is_empty());
/// assert_eq!(report.filter, FilterOutcome::NotRequested);
/// # Ok::<(), streetwise_core::ExtractError>(())
/// ```
#[derive(Debug, Clone)]
pub struct StreetExtractor<R> {
    source: R,
    config: ExtractorConfig,
    regions: RegionCatalog,
}

impl<R: RoadNetworkSource> StreetExtractor<R> {
    /// Extractor with default thresholds and the built-in region table.
    #[must_use]
    pub fn new(source: R) -> Self {
        Self {
            source,
            config: ExtractorConfig::default(),
            regions: RegionCatalog::builtin(),
        }
    }

    /// Replace the thresholds.
    #[must_use]
    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the region table.
    #[must_use]
    pub fn with_regions(mut self, regions: RegionCatalog) -> Self {
        self.regions = regions;
        self
    }

    /// Active thresholds.
    #[must_use]
    pub const fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Region table used by [`Self::extract_region`].
    #[must_use]
    pub const fn regions(&self) -> &RegionCatalog {
        &self.regions
    }

    /// Extract the streets inside `boundary`, labelling them with `city`
    /// and `state`.
    ///
    /// # Errors
    ///
    /// [`ExtractError::QueryService`] when the road-network query fails.
    pub fn extract_streets(
        &self,
        boundary: &Boundary,
        city: &str,
        state: &str,
    ) -> Result<ExtractionReport, ExtractError> {
        info!(
            "Fetching street data for {city}, {state} using {} boundary",
            boundary.geometry_kind()
        );
        let query = query_for_boundary(&boundary.geometry, self.config.max_polygon_pairs);
        let elements = self.source.fetch_elements(&query)?;
        Ok(self.process(
            &elements,
            &ExtractionContext::new(city, state),
            Some(&boundary.geometry),
        ))
    }

    /// Extract the streets of a catalogue region by its bounding box.
    ///
    /// No boundary is consulted, so the filter outcome is
    /// [`FilterOutcome::NotRequested`].
    ///
    /// # Errors
    ///
    /// [`ExtractError::UnknownRegion`] for keys missing from the catalogue
    /// and [`ExtractError::QueryService`] when the query fails.
    pub fn extract_region(&self, key: &str) -> Result<ExtractionReport, ExtractError> {
        let region = self.regions.require(key)?;
        info!("Fetching street data for {} by bounding box", region.name);
        let elements = self.source.fetch_elements(&query_for_bbox(region.bbox))?;
        Ok(self.process(
            &elements,
            &ExtractionContext::new(region.city.as_str(), region.state.as_str()),
            None,
        ))
    }

    /// Look up a city's boundary and extract the streets inside it.
    ///
    /// Streets are labelled with the boundary's own name, which may differ
    /// in spelling from `city`, and with `state` as given.
    ///
    /// # Errors
    ///
    /// [`ExtractError::BoundaryUnavailable`] when no boundary can be
    /// obtained and [`ExtractError::QueryService`] when the query fails.
    pub fn extract_city<B: BoundarySource>(
        &self,
        boundaries: &B,
        city: &str,
        state: &str,
        country: &str,
    ) -> Result<ExtractionReport, ExtractError> {
        let boundary = boundaries.boundary(city, state, country).map_err(|source| {
            error!("Could not get boundary for {city}, {state}: {source}");
            ExtractError::BoundaryUnavailable {
                city: city.to_owned(),
                state: state.to_owned(),
                source,
            }
        })?;
        self.extract_streets(&boundary, &boundary.name, state)
    }

    /// Run assembly, classification, filtering and consolidation over one
    /// response.
    #[must_use]
    pub fn process(
        &self,
        elements: &[RawElement],
        context: &ExtractionContext,
        boundary: Option<&Geometry<f64>>,
    ) -> ExtractionReport {
        let candidates = assemble(elements, &self.config);
        let classified = classify(candidates, context);
        let (filtered, filter) = match boundary {
            Some(geometry) => filter_by_boundary(classified, geometry, &self.config),
            None => (classified, FilterOutcome::NotRequested),
        };
        let streets = consolidate(filtered);
        info!("Processed {} streets for {}", streets.len(), context.city);
        ExtractionReport { streets, filter }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueryServiceError;
    use crate::BoundaryError;
    use crate::test_support::{StubBoundarySource, StubRoadNetworkSource, named_way};
    use rstest::rstest;

    #[rstest]
    fn region_query_uses_catalogue_bbox() {
        let source = StubRoadNetworkSource::with_elements(vec![named_way(
            1,
            "Clement Street",
            &[(37.78, -122.47), (37.78, -122.46)],
        )]);
        let extractor = StreetExtractor::new(&source);
        let report = extractor.extract_region("san-francisco").expect("region run");

        assert_eq!(report.streets.len(), 1);
        let queries = source.queries();
        let query = queries.first().expect("one query issued");
        assert!(query.as_str().contains("(37.7049,-122.5096,37.8084,-122.3573)"));
    }

    #[rstest]
    fn query_failures_propagate() {
        let source = StubRoadNetworkSource::with_error(QueryServiceError::MalformedPayload {
            message: "truncated".to_owned(),
        });
        let err = StreetExtractor::new(&source)
            .extract_region("san-francisco")
            .expect_err("query failure");
        assert!(matches!(err, ExtractError::QueryService(_)));
    }

    #[rstest]
    fn unavailable_boundary_is_an_error_not_an_empty_report() {
        let source = StubRoadNetworkSource::with_elements(vec![named_way(
            1,
            "Main Street",
            &[(37.0, -122.0), (37.01, -122.0)],
        )]);
        let boundaries = StubBoundarySource::with_error(BoundaryError::Network {
            url: "https://boundaries.example/ca/testville.json".to_owned(),
            message: "connection reset".to_owned(),
        });
        let err = StreetExtractor::new(&source)
            .extract_city(&boundaries, "Testville", "CA", "United States")
            .expect_err("no boundary, no report");

        let ExtractError::BoundaryUnavailable { city, state, source: cause } = &err else {
            panic!("expected BoundaryUnavailable, got {err:?}");
        };
        assert_eq!(city, "Testville");
        assert_eq!(state, "CA");
        assert!(matches!(cause, BoundaryError::Network { .. }));
        assert!(source.queries().is_empty());
    }
}
