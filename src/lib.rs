//! Facade crate for the streetwise street extraction toolkit.
//!
//! This crate re-exports the core extraction pipeline and, behind the
//! `http` feature, the Overpass and boundary repository adapters together
//! with dataset output.

#![forbid(unsafe_code)]

pub use streetwise_core::{
    Boundary, BoundaryError, BoundarySource, BoundingBox, ExtractError, ExtractionReport,
    ExtractorConfig, FilterOutcome, OverpassQuery, QueryServiceError, RawElement, Region,
    RegionCatalog, RoadNetworkSource, StreetEntity, StreetExtractor,
};

#[cfg(feature = "http")]
pub use streetwise_data::{
    BoundaryCache, CachedBoundarySource, HttpBoundaryRepository, HttpOverpassSource,
    OverpassSourceConfig, RetryPolicy, StreetDataset, StreetSummary, read_dataset, write_dataset,
};
