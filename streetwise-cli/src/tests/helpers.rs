//! Test doubles and fixtures shared by the CLI tests.

use camino::Utf8PathBuf;
use streetwise_core::test_support::{
    StubBoundarySource, StubRoadNetworkSource, named_way, rectangle_boundary,
};
use streetwise_core::{Boundary, BoundaryError, BoundarySource, RawElement, RoadNetworkSource};
use streetwise_data::{BoundaryCache, CachedBoundarySource};
use tempfile::TempDir;

use crate::CliError;
use crate::fetch::{FetchConfig, SourceFactory};

/// Source factory serving canned elements and a canned boundary lookup.
///
/// Boundaries still pass through the on-disk cache so tests can observe
/// what a run stored.
#[derive(Debug, Clone)]
pub(super) struct StubSourceFactory {
    pub(super) elements: Vec<RawElement>,
    pub(super) boundary: Result<Boundary, BoundaryError>,
}

impl StubSourceFactory {
    pub(super) fn new(elements: Vec<RawElement>) -> Self {
        Self {
            elements,
            boundary: Ok(testville()),
        }
    }

    pub(super) fn with_boundary_error(mut self, error: BoundaryError) -> Self {
        self.boundary = Err(error);
        self
    }
}

impl SourceFactory for StubSourceFactory {
    fn road_network(
        &self,
        _config: &FetchConfig,
    ) -> Result<Box<dyn RoadNetworkSource + '_>, CliError> {
        Ok(Box::new(StubRoadNetworkSource::with_elements(
            self.elements.clone(),
        )))
    }

    fn boundaries(&self, config: &FetchConfig) -> Result<Box<dyn BoundarySource + '_>, CliError> {
        let repository = match &self.boundary {
            Ok(boundary) => StubBoundarySource::with_boundary(boundary.clone()),
            Err(error) => StubBoundarySource::with_error(error.clone()),
        };
        let cache = BoundaryCache::new(config.boundary_dir.clone());
        Ok(Box::new(CachedBoundarySource::new(cache, repository)))
    }
}

/// A small rectangle south-east of San Francisco.
pub(super) fn testville() -> Boundary {
    rectangle_boundary("Testville", 37.0, -122.0, 37.1, -121.9)
}

/// One street inside Testville and one far outside it.
pub(super) fn testville_streets() -> Vec<RawElement> {
    vec![
        named_way(1, "Main Street", &[(37.03, -121.95), (37.05, -121.95)]),
        named_way(2, "Elm Street", &[(40.0, -100.0), (40.01, -100.0)]),
    ]
}

/// Streets inside the San Francisco catalogue bounding box.
pub(super) fn san_francisco_streets() -> Vec<RawElement> {
    vec![
        named_way(1, "Clement Street", &[(37.78, -122.47), (37.78, -122.46)]),
        named_way(2, "Interstate 80", &[(37.78, -122.40), (37.79, -122.39)]),
        named_way(3, "Geary Boulevard", &[(37.781, -122.47), (37.781, -122.45)]),
    ]
}

/// A temporary directory with a UTF-8 path.
pub(super) fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}
