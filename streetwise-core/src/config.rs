//! Tunable thresholds for the extraction pipeline.

/// Thresholds applied by the assembler, classifier, filter and query
/// builder.
///
/// The defaults are the values the published datasets were built with;
/// changing them changes which streets survive.
///
/// # Examples
/// ```
/// use streetwise_core::ExtractorConfig;
///
/// let config = ExtractorConfig::default().with_max_polygon_pairs(100);
/// assert_eq!(config.max_polygon_pairs, 100);
/// assert_eq!(config.min_overlap_ratio, 0.25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Entities shorter than this many miles are data artefacts.
    pub min_length_miles: f64,
    /// Entities longer than this many miles are cross-city routes.
    pub max_length_miles: f64,
    /// Minimum trimmed character count of a usable `name` tag.
    pub min_name_chars: usize,
    /// Fraction of an entity's planar length that must fall inside the
    /// boundary for it to be kept.
    pub min_overlap_ratio: f64,
    /// Absolute inside length, in metres, that keeps an entity regardless
    /// of its overlap ratio.
    pub min_overlap_metres: f64,
    /// Share of a polyline's length credited when it touches the boundary
    /// but the clipped result has no length of its own.
    pub touching_overlap_fraction: f64,
    /// Maximum number of coordinate pairs in a polygon query filter.
    pub max_polygon_pairs: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_length_miles: 0.01,
            max_length_miles: 50.0,
            min_name_chars: 2,
            min_overlap_ratio: 0.25,
            min_overlap_metres: 100.0,
            touching_overlap_fraction: 0.1,
            max_polygon_pairs: 200,
        }
    }
}

impl ExtractorConfig {
    /// Set the accepted entity length window in miles.
    #[must_use]
    pub const fn with_length_window(mut self, min_miles: f64, max_miles: f64) -> Self {
        self.min_length_miles = min_miles;
        self.max_length_miles = max_miles;
        self
    }

    /// Set the overlap thresholds used by the boundary filter.
    #[must_use]
    pub const fn with_overlap(mut self, ratio: f64, metres: f64) -> Self {
        self.min_overlap_ratio = ratio;
        self.min_overlap_metres = metres;
        self
    }

    /// Set the polygon simplification cap.
    #[must_use]
    pub const fn with_max_polygon_pairs(mut self, pairs: usize) -> Self {
        self.max_polygon_pairs = pairs;
        self
    }

    /// Whether a total entity length falls inside the accepted window.
    #[must_use]
    pub fn accepts_length(&self, miles: f64) -> bool {
        miles >= self.min_length_miles && miles <= self.max_length_miles
    }
}
