//! Network and file adapters for streetwise.
//!
//! Responsibilities:
//! - Execute road-network queries against an Overpass interpreter.
//! - Fetch city boundaries from the GeoJSON repository and cache them.
//! - Persist extracted streets and summarise them.
//!
//! Boundaries:
//! - Do not encode extraction rules (live in `streetwise-core`).
//! - Present synchronous interfaces; async I/O stays behind an owned runtime.

#![forbid(unsafe_code)]

pub mod boundary;
pub mod dataset;
mod http;
pub mod overpass;
pub mod report;

pub use boundary::{
    BoundaryCache, BoundaryRepositoryConfig, CachedBoundarySource, HttpBoundaryRepository,
};
pub use dataset::{DatasetError, StreetDataset, dataset_path, read_dataset, write_dataset};
pub use http::ClientBuildError;
pub use overpass::{HttpOverpassSource, OverpassSourceConfig, RetryPolicy};
pub use report::{NO_SUFFIX, StreetSummary};
