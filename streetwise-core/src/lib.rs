//! Core domain types and algorithms for streetwise.
//!
//! The crate turns a city boundary and a road-network query response into a
//! deduplicated list of named city streets. It performs no I/O: queries are
//! executed through a [`RoadNetworkSource`] and boundaries obtained through a
//! [`BoundarySource`], both supplied by the caller.
//!
//! The stages are exposed individually ([`query_for_boundary`],
//! [`assemble`], [`classify`], [`filter_by_boundary`], [`consolidate`]) and
//! composed by [`StreetExtractor`].

#![forbid(unsafe_code)]

pub mod assemble;
pub mod boundary;
pub mod classify;
pub mod config;
pub mod consolidate;
pub mod element;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod pipeline;
pub mod query;
pub mod region;
pub mod source;
pub mod street;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use assemble::{SourceKind, SourceRef, StreetCandidate, assemble};
pub use boundary::{Boundary, BoundingBox, estimate_area_km2, geometry_kind};
pub use classify::{StreetName, classify, is_excluded_road_name, parse_street_name};
pub use config::ExtractorConfig;
pub use consolidate::consolidate;
pub use element::{ElementKind, RawElement, RawNode, RawRelation, RawWay, Tags};
pub use error::{BoundaryError, ExtractError, FilterError, QueryServiceError};
pub use filter::{FilterOutcome, Overlap, boundary_area, filter_by_boundary, measure_overlap};
pub use geometry::{
    LatLon, METRES_PER_DEGREE, METRES_PER_MILE, Polyline, multi_line_miles, polyline_miles,
    round_to_hundredths, to_line_string,
};
pub use pipeline::{ExtractionReport, StreetExtractor};
pub use query::{
    OverpassQuery, QueryBuildError, SpatialFilter, downsample_pairs, polygon_filter,
    query_for_bbox, query_for_boundary,
};
pub use region::{Region, RegionCatalog};
pub use source::{BoundarySource, RoadNetworkSource};
pub use street::{ExtractionContext, StreetEntity};
