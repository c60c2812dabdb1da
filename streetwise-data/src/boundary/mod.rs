//! City boundary lookup: repository client, GeoJSON conversion and cache.

pub mod cache;
pub mod document;
pub mod naming;
pub mod repository;

pub use cache::{BOUNDARY_EXTENSION, BoundaryCache, CachedBoundarySource};
pub use document::{parse_boundary, parse_cached_boundary, to_feature_collection};
pub use naming::{city_slug, file_stem, state_code};
pub use repository::{
    BoundaryRepositoryConfig, DEFAULT_BOUNDARY_BASE_URL, HttpBoundaryRepository,
    SUPPORTED_COUNTRY,
};
