//! On-disk boundary cache of one-feature GeoJSON files.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};
use streetwise_core::{Boundary, BoundaryError, BoundarySource};
use streetwise_fs::{file_is_file, list_file_stems, read_utf8_file, write_utf8_file};

use super::document::{parse_cached_boundary, to_feature_collection};
use super::naming::file_stem;

/// Extension of cached boundary files.
pub const BOUNDARY_EXTENSION: &str = "geojson";

/// A directory of cached boundaries named `{city}_{state}.geojson`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryCache {
    dir: Utf8PathBuf,
}

fn cache_error(path: &Utf8Path, err: &impl ToString) -> BoundaryError {
    BoundaryError::Cache {
        path: path.to_string(),
        message: err.to_string(),
    }
}

impl BoundaryCache {
    /// Cache rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Path of the file for `stem`; the extension is added when missing.
    #[must_use]
    pub fn path_for(&self, stem: &str) -> Utf8PathBuf {
        let suffix = format!(".{BOUNDARY_EXTENSION}");
        if stem.ends_with(&suffix) {
            self.dir.join(stem)
        } else {
            self.dir.join(format!("{stem}{suffix}"))
        }
    }

    /// Load the boundary stored under `stem`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// [`BoundaryError::Cache`] when the file cannot be read and
    /// [`BoundaryError::InvalidGeoJson`] when it does not parse.
    pub fn load(&self, stem: &str) -> Result<Option<Boundary>, BoundaryError> {
        let path = self.path_for(stem);
        if !file_is_file(&path).map_err(|err| cache_error(&path, &err))? {
            return Ok(None);
        }
        let text = read_utf8_file(&path).map_err(|err| cache_error(&path, &err))?;
        let boundary = parse_cached_boundary(&text)?;
        info!("Loaded boundary from {path}");
        Ok(Some(boundary))
    }

    /// Save under the stem derived from the boundary's own name and state.
    ///
    /// # Errors
    ///
    /// [`BoundaryError::Cache`] when the file cannot be written.
    pub fn save(&self, boundary: &Boundary) -> Result<Utf8PathBuf, BoundaryError> {
        self.save_as(&file_stem(&boundary.name, boundary.state.as_deref()), boundary)
    }

    /// Save under an explicit stem.
    ///
    /// # Errors
    ///
    /// [`BoundaryError::Cache`] when the file cannot be written.
    pub fn save_as(&self, stem: &str, boundary: &Boundary) -> Result<Utf8PathBuf, BoundaryError> {
        let path = self.path_for(stem);
        let text = serde_json::to_string_pretty(&to_feature_collection(boundary))
            .map_err(|err| cache_error(&path, &err))?;
        write_utf8_file(&path, &text).map_err(|err| cache_error(&path, &err))?;
        info!("Saved boundary to {path}");
        Ok(path)
    }

    /// Stems of every cached boundary, sorted.
    ///
    /// # Errors
    ///
    /// [`BoundaryError::Cache`] when the directory cannot be listed.
    pub fn list(&self) -> Result<Vec<String>, BoundaryError> {
        list_file_stems(&self.dir, BOUNDARY_EXTENSION)
            .map_err(|err: io::Error| cache_error(&self.dir, &err))
    }
}

/// A [`BoundarySource`] that consults a [`BoundaryCache`] before its inner
/// source and caches what the inner source returns.
///
/// Entries are keyed by the requested city and state, so a repeated
/// lookup hits the cache even when the repository spells the city
/// differently. Cache failures are logged and never fail a lookup.
#[derive(Debug)]
pub struct CachedBoundarySource<S> {
    cache: BoundaryCache,
    inner: S,
}

impl<S> CachedBoundarySource<S> {
    /// Wrap `inner` with `cache`.
    #[must_use]
    pub const fn new(cache: BoundaryCache, inner: S) -> Self {
        Self { cache, inner }
    }

    /// The underlying cache.
    #[must_use]
    pub const fn cache(&self) -> &BoundaryCache {
        &self.cache
    }
}

impl<S: BoundarySource> BoundarySource for CachedBoundarySource<S> {
    fn boundary(&self, city: &str, state: &str, country: &str) -> Result<Boundary, BoundaryError> {
        let stem = file_stem(city, Some(state));
        match self.cache.load(&stem) {
            Ok(Some(boundary)) => {
                info!("Loaded existing boundary for {city}");
                return Ok(boundary);
            }
            Ok(None) => {}
            Err(err) => warn!("Ignoring unreadable cached boundary {stem}: {err}"),
        }
        let boundary = self.inner.boundary(city, state, country)?;
        if let Err(err) = self.cache.save_as(&stem, &boundary) {
            warn!("Could not cache boundary for {city}, {state}: {err}");
        }
        Ok(boundary)
    }
}
