//! The street entity produced by the pipeline.

use crate::assemble::SourceRef;
use crate::geometry::Polyline;

/// One named street with its geometry and provenance.
///
/// With the `serde` feature enabled the entity serialises with camelCase
/// field names and `geometry` as a list of `[lat, lon]` lists.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct StreetEntity {
    /// Identifier built from the city and the source element.
    pub id: String,
    /// Uppercase name without suffix.
    pub base_name: String,
    /// Standard suffix abbreviation, or empty.
    pub suffix: String,
    /// `base_name` and `suffix` joined by a space.
    pub full_name: String,
    /// Polylines making up the street, each with at least two points.
    pub geometry: Vec<Polyline>,
    /// Great-circle length in miles, rounded to two decimals.
    pub length_miles: f64,
    /// City the street was extracted for.
    pub city: String,
    /// State the street was extracted for.
    pub state: String,
}

impl StreetEntity {
    /// Number of polylines in the entity's geometry.
    #[must_use]
    pub fn polyline_count(&self) -> usize {
        self.geometry.len()
    }
}

/// Provenance copied onto every entity of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionContext {
    /// City name.
    pub city: String,
    /// State code or name.
    pub state: String,
}

impl ExtractionContext {
    /// Construct a context from city and state.
    #[must_use]
    pub fn new(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
        }
    }

    /// Entity identifier for a source element, e.g. `san_francisco_way_7`.
    #[must_use]
    pub fn entity_id(&self, source: SourceRef) -> String {
        format!("{}_{source}", self.city.to_lowercase().replace(' ', "_"))
    }
}
