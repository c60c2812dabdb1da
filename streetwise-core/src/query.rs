//! Build Overpass QL queries for city streets.
//!
//! A boundary polygon becomes a `poly:` filter of alternating latitude and
//! longitude tokens. Polygons with too many vertices are thinned so the
//! service does not time out. When the polygon cannot be expressed the
//! builder falls back to the boundary's envelope, and failing that to an
//! unfiltered query; the pipeline keeps going either way.

use std::fmt;

use geo::{Coord, Geometry, LineString};
use log::{debug, info, warn};
use thiserror::Error;

use crate::boundary::{BoundingBox, geometry_kind};

/// Road classes that count as city streets.
const HIGHWAY_CLASSES: &str = "primary|secondary|tertiary|unclassified|residential|living_street";

/// Server-side timeout requested in the query header, in seconds.
const QUERY_TIMEOUT_SECS: u64 = 120;

/// A ready-to-send Overpass QL query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverpassQuery(String);

impl OverpassQuery {
    /// Query restricted by the given spatial filter.
    #[must_use]
    pub fn new(filter: &SpatialFilter) -> Self {
        let clause = filter.clause();
        Self(format!(
            "[out:json][timeout:{QUERY_TIMEOUT_SECS}];\n\
             (\n  \
             way[\"highway\"~\"^({HIGHWAY_CLASSES})$\"][\"name\"]{clause};\n  \
             relation[\"type\"=\"associatedStreet\"][\"name\"]{clause};\n\
             );\n\
             (._;>;);\n\
             out geom;\n"
        ))
    }

    /// Query text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the query, returning its text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OverpassQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The spatial restriction applied to each query statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialFilter {
    /// `poly:"lat lon lat lon ..."` filter; holds the coordinate string.
    Polygon(String),
    /// `(south,west,north,east)` filter.
    BoundingBox(BoundingBox),
    /// No spatial restriction at all.
    Unfiltered,
}

impl SpatialFilter {
    fn clause(&self) -> String {
        match self {
            Self::Polygon(coords) => format!("(poly:\"{coords}\")"),
            Self::BoundingBox(bbox) => {
                format!("({},{},{},{})", bbox.south, bbox.west, bbox.north, bbox.east)
            }
            Self::Unfiltered => String::new(),
        }
    }
}

/// Reasons a geometry cannot become a polygon filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryBuildError {
    /// Only polygons and multi-polygons are supported.
    #[error("unsupported geometry type {kind} for polygon query")]
    UnsupportedGeometry {
        /// GeoJSON type name of the rejected geometry.
        kind: &'static str,
    },
    /// The selected ring has no vertices.
    #[error("polygon ring has no coordinates")]
    EmptyRing,
    /// A vertex is NaN or infinite.
    #[error("polygon ring contains a non-finite coordinate")]
    NonFiniteCoordinate,
}

/// Build a query for a boundary geometry, falling back as needed.
///
/// # Examples
/// ```
/// use geo::{Geometry, polygon};
/// use streetwise_core::query_for_boundary;
///
/// let square = Geometry::Polygon(polygon![
///     (x: -122.5, y: 37.7),
///     (x: -122.4, y: 37.7),
///     (x: -122.4, y: 37.8),
///     (x: -122.5, y: 37.7),
/// ]);
/// let query = query_for_boundary(&square, 200);
/// assert!(query.as_str().contains("poly:\"37.7 -122.5 37.7 -122.4"));
/// ```
#[must_use]
pub fn query_for_boundary(geometry: &Geometry<f64>, max_pairs: usize) -> OverpassQuery {
    match polygon_filter(geometry, max_pairs) {
        Ok(coords) => {
            debug!(
                "Using polygon filter with {} coordinate pairs",
                coords.split_whitespace().count() / 2
            );
            OverpassQuery::new(&SpatialFilter::Polygon(coords))
        }
        Err(err) => {
            warn!("Polygon query unavailable ({err}); falling back to bounding box");
            match BoundingBox::from_geometry(geometry) {
                Some(bbox) => {
                    info!(
                        "Using fallback bounding box: {:.4},{:.4},{:.4},{:.4}",
                        bbox.south, bbox.west, bbox.north, bbox.east
                    );
                    OverpassQuery::new(&SpatialFilter::BoundingBox(bbox))
                }
                None => {
                    warn!("Boundary has no usable envelope; issuing unfiltered query");
                    OverpassQuery::new(&SpatialFilter::Unfiltered)
                }
            }
        }
    }
}

/// Build a query restricted to a bounding box.
#[must_use]
pub fn query_for_bbox(bbox: BoundingBox) -> OverpassQuery {
    OverpassQuery::new(&SpatialFilter::BoundingBox(bbox))
}

/// Convert a polygonal geometry into the `poly:` coordinate string.
///
/// A `Polygon` contributes its outer ring. A `MultiPolygon` contributes the
/// outer ring with the most vertices (the first such ring on ties); holes and
/// the remaining polygons are ignored here and only apply during boundary
/// filtering.
///
/// # Errors
///
/// See [`QueryBuildError`].
pub fn polygon_filter(geometry: &Geometry<f64>, max_pairs: usize) -> Result<String, QueryBuildError> {
    let ring = primary_ring(geometry)?;
    let coords: Vec<Coord<f64>> = ring.coords().copied().collect();
    if coords.is_empty() {
        return Err(QueryBuildError::EmptyRing);
    }
    if coords.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(QueryBuildError::NonFiniteCoordinate);
    }

    let simplified = downsample_pairs(&coords, max_pairs);
    if simplified.len() < coords.len() {
        info!(
            "Simplified polygon from {} to {} coordinate pairs",
            coords.len(),
            simplified.len()
        );
    }

    Ok(simplified
        .iter()
        .map(|c| format!("{} {}", c.y, c.x))
        .collect::<Vec<_>>()
        .join(" "))
}

fn primary_ring(geometry: &Geometry<f64>) -> Result<&LineString<f64>, QueryBuildError> {
    match geometry {
        Geometry::Polygon(polygon) => Ok(polygon.exterior()),
        Geometry::MultiPolygon(multi) => multi
            .iter()
            .map(|polygon| polygon.exterior())
            .fold(None, |best: Option<&LineString<f64>>, ring| match best {
                Some(current) if current.0.len() >= ring.0.len() => Some(current),
                _ => Some(ring),
            })
            .ok_or(QueryBuildError::EmptyRing),
        other => Err(QueryBuildError::UnsupportedGeometry {
            kind: geometry_kind(other),
        }),
    }
}

/// Keep every Nth coordinate pair so that at most `max_pairs` remain.
///
/// `N = ceil(len / max_pairs)`. Order is preserved and the first pair is
/// always kept. Inputs already within the cap are returned unchanged.
#[must_use]
pub fn downsample_pairs(coords: &[Coord<f64>], max_pairs: usize) -> Vec<Coord<f64>> {
    if max_pairs == 0 || coords.len() <= max_pairs {
        return coords.to_vec();
    }
    let step = coords.len().div_ceil(max_pairs);
    coords.iter().step_by(step).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{MultiPolygon, Polygon, point, polygon};
    use rstest::rstest;

    fn ring_with(count: usize) -> Vec<Coord<f64>> {
        (0..count)
            .map(|i| {
                let offset = f64::from(u32::try_from(i).expect("small test ring"));
                Coord {
                    x: -122.0 - offset * 0.001,
                    y: 37.0 + offset * 0.001,
                }
            })
            .collect()
    }

    #[rstest]
    fn polygon_filter_reverses_axis_order() {
        let geometry = Geometry::Polygon(polygon![
            (x: -122.5, y: 37.7),
            (x: -122.4, y: 37.8),
            (x: -122.3, y: 37.7),
            (x: -122.5, y: 37.7),
        ]);
        let coords = polygon_filter(&geometry, 200).expect("polygon filter");
        assert_eq!(coords, "37.7 -122.5 37.8 -122.4 37.7 -122.3 37.7 -122.5");
    }

    #[rstest]
    fn multi_polygon_uses_ring_with_most_vertices() {
        let small = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ];
        let large = polygon![
            (x: 10.0, y: 10.0),
            (x: 11.0, y: 10.0),
            (x: 11.0, y: 11.0),
            (x: 10.0, y: 11.0),
            (x: 10.0, y: 10.0),
        ];
        let geometry = Geometry::MultiPolygon(MultiPolygon::new(vec![small, large]));
        let coords = polygon_filter(&geometry, 200).expect("polygon filter");
        assert!(coords.starts_with("10 10 10 11"), "got {coords}");
    }

    #[rstest]
    fn oversized_ring_is_thinned_to_the_cap() {
        let ring = ring_with(450);
        let simplified = downsample_pairs(&ring, 200);
        // ceil(450 / 200) = 3, so indices 0, 3, 6, ... survive.
        assert_eq!(simplified.len(), 150);
        assert_eq!(simplified.first(), ring.first());
        assert_eq!(simplified.get(1), ring.get(3));
    }

    #[rstest]
    fn ring_at_cap_is_untouched() {
        let ring = ring_with(200);
        assert_eq!(downsample_pairs(&ring, 200), ring);
    }

    #[rstest]
    fn unsupported_geometry_falls_back_to_bbox() {
        let geometry = Geometry::LineString(LineString::from(vec![(0.0, 1.0), (2.0, 3.0)]));
        let query = query_for_boundary(&geometry, 200);
        assert!(query.as_str().contains("(1,0,3,2)"), "got {query}");
        assert!(!query.as_str().contains("poly:"));
    }

    #[rstest]
    fn empty_polygon_falls_back_to_unfiltered_query() {
        let geometry = Geometry::Polygon(Polygon::new(LineString::new(Vec::new()), Vec::new()));
        let query = query_for_boundary(&geometry, 200);
        assert!(!query.as_str().contains("poly:"));
        assert!(query.as_str().contains("[\"name\"];"), "got {query}");
    }

    #[rstest]
    fn point_reports_unsupported_geometry() {
        let err = polygon_filter(&Geometry::Point(point!(x: 1.0, y: 2.0)), 200)
            .expect_err("points are unsupported");
        assert_eq!(err, QueryBuildError::UnsupportedGeometry { kind: "Point" });
    }

    #[rstest]
    fn bbox_query_selects_streets_and_relations() {
        let query = query_for_bbox(BoundingBox::new(37.7049, -122.5096, 37.8084, -122.3573));
        let text = query.as_str();
        assert!(text.starts_with("[out:json][timeout:120];"));
        assert!(text.contains(
            "way[\"highway\"~\"^(primary|secondary|tertiary|unclassified|residential|living_street)$\"][\"name\"](37.7049,-122.5096,37.8084,-122.3573);"
        ));
        assert!(text.contains(
            "relation[\"type\"=\"associatedStreet\"][\"name\"](37.7049,-122.5096,37.8084,-122.3573);"
        ));
        assert!(text.contains("(._;>;);\nout geom;"));
    }
}
