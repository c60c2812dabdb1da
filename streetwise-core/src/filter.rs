//! Keep only entities that sufficiently overlap the city boundary.
//!
//! Lengths here are planar, in coordinate degrees, so they are comparable
//! with the boundary polygon without reprojection. The absolute threshold is
//! converted at 111 km per degree.

use geo::{BooleanOps, Coord, Euclidean, Geometry, Intersects, Length, MultiLineString, MultiPolygon};
use log::{info, warn};

use crate::boundary::geometry_kind;
use crate::config::ExtractorConfig;
use crate::error::FilterError;
use crate::geometry::{METRES_PER_DEGREE, Polyline, planar_length, to_line_string};
use crate::street::StreetEntity;

/// Minimum coordinate count of a closed ring.
const MIN_RING_COORDS: usize = 4;

/// What happened to the boundary filter during one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The filter ran.
    Applied {
        /// Entities kept.
        retained: usize,
        /// Entities dropped for insufficient overlap.
        dropped: usize,
    },
    /// The boundary could not be used; every entity was kept.
    Skipped {
        /// Why the filter could not run.
        reason: FilterError,
    },
    /// No boundary was involved, as for fixed-region extraction.
    NotRequested,
}

/// Planar overlap between an entity and the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Overlap {
    /// Total planar length of the entity.
    pub total: f64,
    /// Planar length inside the boundary.
    pub inside: f64,
}

impl Overlap {
    /// Fraction of the entity inside the boundary.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.total > 0.0 {
            self.inside / self.total
        } else {
            0.0
        }
    }

    /// Inside length converted to approximate metres.
    #[must_use]
    pub fn inside_metres(&self) -> f64 {
        self.inside * METRES_PER_DEGREE
    }

    /// Whether the overlap is enough to keep the entity.
    #[must_use]
    pub fn is_sufficient(&self, config: &ExtractorConfig) -> bool {
        self.inside > 0.0
            && (self.ratio() >= config.min_overlap_ratio
                || self.inside_metres() >= config.min_overlap_metres)
    }
}

/// Validate a boundary and normalise it to a multi-polygon.
///
/// # Errors
///
/// [`FilterError::UnsupportedGeometry`] for non-polygonal geometry and
/// [`FilterError::InvalidBoundary`] for empty, unclosed or non-finite rings.
pub fn boundary_area(geometry: &Geometry<f64>) -> Result<MultiPolygon<f64>, FilterError> {
    let area = match geometry {
        Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon.clone()]),
        Geometry::MultiPolygon(multi) => multi.clone(),
        other => {
            return Err(FilterError::UnsupportedGeometry {
                kind: geometry_kind(other).to_owned(),
            });
        }
    };
    if area.0.is_empty() {
        return Err(FilterError::InvalidBoundary {
            reason: "multi-polygon has no members".to_owned(),
        });
    }
    for polygon in &area {
        if polygon.exterior().0.len() < MIN_RING_COORDS {
            return Err(FilterError::InvalidBoundary {
                reason: format!(
                    "exterior ring has {} coordinates, need at least {MIN_RING_COORDS}",
                    polygon.exterior().0.len()
                ),
            });
        }
        let finite = |c: &Coord<f64>| c.x.is_finite() && c.y.is_finite();
        let rings_finite = polygon.exterior().coords().all(finite)
            && polygon
                .interiors()
                .iter()
                .all(|ring| ring.coords().all(finite));
        if !rings_finite {
            return Err(FilterError::InvalidBoundary {
                reason: "ring contains a non-finite coordinate".to_owned(),
            });
        }
    }
    Ok(area)
}

/// Measure how much of a multi-line lies inside the boundary.
///
/// When a polyline intersects the boundary but clipping yields no measurable
/// length, as when it only touches an edge, a fixed share of the polyline's
/// length is credited instead of nothing.
#[must_use]
pub fn measure_overlap(area: &MultiPolygon<f64>, lines: &[Polyline], config: &ExtractorConfig) -> Overlap {
    let mut overlap = Overlap::default();
    for points in lines.iter().filter(|points| points.len() >= 2) {
        let line = to_line_string(points);
        let length = planar_length(&line);
        overlap.total += length;
        if !area.intersects(&line) {
            continue;
        }
        let clipped = area.clip(&MultiLineString::new(vec![line]), false);
        let inside = Euclidean.length(&clipped);
        overlap.inside += if inside > 0.0 {
            inside
        } else {
            length * config.touching_overlap_fraction
        };
    }
    overlap
}

/// Keep the entities whose overlap with `boundary` is sufficient.
///
/// A boundary that cannot be used does not abort the run: every entity is
/// returned and the outcome records why the filter was skipped.
#[must_use]
pub fn filter_by_boundary(
    entities: Vec<StreetEntity>,
    boundary: &Geometry<f64>,
    config: &ExtractorConfig,
) -> (Vec<StreetEntity>, FilterOutcome) {
    let area = match boundary_area(boundary) {
        Ok(area) => area,
        Err(reason) => {
            warn!("Boundary filter skipped, keeping all {} streets: {reason}", entities.len());
            return (entities, FilterOutcome::Skipped { reason });
        }
    };

    let before = entities.len();
    let retained: Vec<StreetEntity> = entities
        .into_iter()
        .filter(|entity| measure_overlap(&area, &entity.geometry, config).is_sufficient(config))
        .collect();
    let dropped = before - retained.len();
    info!("Filtered to {} streets within city boundary ({dropped} dropped)", retained.len());
    let outcome = FilterOutcome::Applied {
        retained: retained.len(),
        dropped,
    };
    (retained, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LatLon;
    use geo::{LineString, Polygon, polygon};
    use rstest::{fixture, rstest};

    #[fixture]
    fn square() -> Geometry<f64> {
        Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ])
    }

    fn entity(name: &str, lines: Vec<Polyline>) -> StreetEntity {
        StreetEntity {
            id: format!("test_way_{name}"),
            base_name: name.to_owned(),
            suffix: String::new(),
            full_name: name.to_owned(),
            geometry: lines,
            length_miles: 1.0,
            city: "Test".to_owned(),
            state: "CA".to_owned(),
        }
    }

    #[rstest]
    fn line_fully_inside_overlaps_completely(square: Geometry<f64>) {
        let area = boundary_area(&square).expect("valid square");
        let lines = vec![vec![LatLon::new(0.2, 0.2), LatLon::new(0.8, 0.8)]];
        let overlap = measure_overlap(&area, &lines, &ExtractorConfig::default());
        assert!((overlap.inside - overlap.total).abs() < 1.0e-6);
        assert!(overlap.is_sufficient(&ExtractorConfig::default()));
    }

    #[rstest]
    fn line_outside_has_no_overlap(square: Geometry<f64>) {
        let area = boundary_area(&square).expect("valid square");
        let lines = vec![vec![LatLon::new(5.0, 5.0), LatLon::new(6.0, 6.0)]];
        let overlap = measure_overlap(&area, &lines, &ExtractorConfig::default());
        assert_eq!(overlap.inside, 0.0);
        assert!(!overlap.is_sufficient(&ExtractorConfig::default()));
    }

    #[rstest]
    fn small_fraction_kept_by_absolute_length(square: Geometry<f64>) {
        let area = boundary_area(&square).expect("valid square");
        // 0.1 degrees inside out of 1.0 total: ratio 0.1 but about 11 km.
        let lines = vec![vec![LatLon::new(0.5, 0.9), LatLon::new(0.5, 1.9)]];
        let overlap = measure_overlap(&area, &lines, &ExtractorConfig::default());
        assert!((overlap.ratio() - 0.1).abs() < 1.0e-6);
        assert!(overlap.is_sufficient(&ExtractorConfig::default()));
    }

    #[rstest]
    fn tiny_fraction_below_both_thresholds_is_dropped(square: Geometry<f64>) {
        let area = boundary_area(&square).expect("valid square");
        // 0.0005 degrees inside (about 55 m) of 1.0005 total.
        let lines = vec![vec![LatLon::new(0.5, 0.9995), LatLon::new(0.5, 2.0)]];
        let overlap = measure_overlap(&area, &lines, &ExtractorConfig::default());
        assert!(overlap.inside > 0.0);
        assert!(!overlap.is_sufficient(&ExtractorConfig::default()));
    }

    #[rstest]
    fn line_touching_a_corner_is_credited_a_tenth(square: Geometry<f64>) {
        let area = boundary_area(&square).expect("valid square");
        // Meets the square only at (1, 1), so clipping yields no length.
        let lines = vec![vec![LatLon::new(1.0, 1.0), LatLon::new(1.5, 1.0)]];
        let config = ExtractorConfig::default();
        let overlap = measure_overlap(&area, &lines, &config);
        assert!((overlap.total - 0.5).abs() < 1.0e-9);
        assert!((overlap.inside - 0.1 * overlap.total).abs() < 1.0e-9);
        // 0.05 degrees is about 5.5 km, above the absolute threshold.
        assert!(overlap.is_sufficient(&config));
    }

    #[rstest]
    fn short_touching_line_stays_below_thresholds(square: Geometry<f64>) {
        let area = boundary_area(&square).expect("valid square");
        let lines = vec![vec![LatLon::new(1.0, 1.0), LatLon::new(1.0005, 1.0)]];
        let config = ExtractorConfig::default();
        let overlap = measure_overlap(&area, &lines, &config);
        assert!((overlap.inside - 0.1 * overlap.total).abs() < 1.0e-12);
        // About 5.5 m credited, a ratio of 0.1.
        assert!(!overlap.is_sufficient(&config));
    }

    #[rstest]
    fn filter_reports_retained_and_dropped(square: Geometry<f64>) {
        let inside = entity("INSIDE", vec![vec![LatLon::new(0.2, 0.2), LatLon::new(0.3, 0.3)]]);
        let outside = entity("OUTSIDE", vec![vec![LatLon::new(3.0, 3.0), LatLon::new(4.0, 4.0)]]);
        let (kept, outcome) =
            filter_by_boundary(vec![inside, outside], &square, &ExtractorConfig::default());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.first().map(|e| e.base_name.as_str()), Some("INSIDE"));
        assert_eq!(
            outcome,
            FilterOutcome::Applied {
                retained: 1,
                dropped: 1
            }
        );
    }

    #[rstest]
    fn degenerate_boundary_skips_filter() {
        let sliver = Geometry::Polygon(Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]),
            Vec::new(),
        ));
        let outside = entity("OUTSIDE", vec![vec![LatLon::new(3.0, 3.0), LatLon::new(4.0, 4.0)]]);
        let (kept, outcome) = filter_by_boundary(vec![outside], &sliver, &ExtractorConfig::default());
        assert_eq!(kept.len(), 1);
        assert!(matches!(
            outcome,
            FilterOutcome::Skipped {
                reason: FilterError::InvalidBoundary { .. }
            }
        ));
    }

    #[rstest]
    fn non_polygonal_boundary_skips_filter() {
        let line = Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]));
        let (kept, outcome) = filter_by_boundary(Vec::new(), &line, &ExtractorConfig::default());
        assert!(kept.is_empty());
        assert_eq!(
            outcome,
            FilterOutcome::Skipped {
                reason: FilterError::UnsupportedGeometry {
                    kind: "LineString".to_owned()
                }
            }
        );
    }
}
