//! Fixed regions that can be extracted without a boundary lookup.

use crate::boundary::BoundingBox;
use crate::error::ExtractError;

/// A named region with a fixed bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Lookup key, e.g. `san-francisco`.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Area queried for the region.
    pub bbox: BoundingBox,
    /// City recorded on extracted streets.
    pub city: String,
    /// State recorded on extracted streets.
    pub state: String,
}

/// Read-only table of supported regions.
///
/// Built once and passed to the extractor; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegionCatalog {
    regions: Vec<Region>,
}

impl RegionCatalog {
    /// Catalogue containing the given regions, in lookup-listing order.
    #[must_use]
    pub const fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// The regions shipped with the tool.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![Region {
            key: "san-francisco".to_owned(),
            name: "San Francisco".to_owned(),
            bbox: BoundingBox::new(37.7049, -122.5096, 37.8084, -122.3573),
            city: "San Francisco".to_owned(),
            state: "CA".to_owned(),
        }])
    }

    /// Look up a region by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Region> {
        self.regions.iter().find(|region| region.key == key)
    }

    /// Look up a region, reporting the available keys when it is missing.
    ///
    /// # Errors
    ///
    /// [`ExtractError::UnknownRegion`] when `key` is not in the catalogue.
    pub fn require(&self, key: &str) -> Result<&Region, ExtractError> {
        self.get(key).ok_or_else(|| ExtractError::UnknownRegion {
            key: key.to_owned(),
            available: self.keys().map(str::to_owned).collect(),
        })
    }

    /// Keys of every region in the catalogue.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|region| region.key.as_str())
    }
}
