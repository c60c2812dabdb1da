//! City boundary polygons and their derived envelope data.

use geo::{Area, BoundingRect, Geometry};

use crate::error::BoundaryError;

/// Square kilometres per square degree at the equator.
const KM2_PER_DEG2: f64 = 111.0 * 111.0;

/// Axis-aligned envelope in `[south, west, north, east]` order.
///
/// With the `serde` feature enabled the value serialises as that
/// four-element array.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "[f64; 4]", into = "[f64; 4]")
)]
pub struct BoundingBox {
    /// Minimum latitude.
    pub south: f64,
    /// Minimum longitude.
    pub west: f64,
    /// Maximum latitude.
    pub north: f64,
    /// Maximum longitude.
    pub east: f64,
}

impl BoundingBox {
    /// Construct a bounding box from its four edges.
    #[must_use]
    pub const fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Envelope of a geometry, or `None` when the geometry has no
    /// coordinates or any edge is non-finite.
    #[must_use]
    pub fn from_geometry(geometry: &Geometry<f64>) -> Option<Self> {
        let rect = geometry.bounding_rect()?;
        let bbox = Self::new(rect.min().y, rect.min().x, rect.max().y, rect.max().x);
        bbox.is_finite().then_some(bbox)
    }

    /// Returns true when all four edges are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        [self.south, self.west, self.north, self.east]
            .iter()
            .all(|edge| edge.is_finite())
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from([south, west, north, east]: [f64; 4]) -> Self {
        Self::new(south, west, north, east)
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(value: BoundingBox) -> Self {
        [value.south, value.west, value.north, value.east]
    }
}

/// The administrative area of one city.
///
/// Geometry is WGS84 with `x = longitude`, `y = latitude` and is always a
/// `Polygon` or `MultiPolygon`.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    /// City name as reported by the boundary repository.
    pub name: String,
    /// State name or code the boundary was requested for.
    pub state: Option<String>,
    /// Country the city belongs to.
    pub country: String,
    /// Polygonal outline of the city.
    pub geometry: Geometry<f64>,
    /// Envelope of `geometry`.
    pub bbox: BoundingBox,
    /// Area estimate in square kilometres using 111 km per degree.
    pub area_km2: f64,
}

impl Boundary {
    /// Validate the geometry and derive the envelope and area estimate.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::UnsupportedGeometry`] for anything other
    /// than a polygon or multi-polygon, and [`BoundaryError::InvalidGeoJson`]
    /// when the geometry has no finite envelope.
    ///
    /// # Examples
    /// ```
    /// use geo::{Geometry, polygon};
    /// use streetwise_core::Boundary;
    ///
    /// let square = polygon![
    ///     (x: 0.0, y: 0.0),
    ///     (x: 1.0, y: 0.0),
    ///     (x: 1.0, y: 1.0),
    ///     (x: 0.0, y: 1.0),
    ///     (x: 0.0, y: 0.0),
    /// ];
    /// let boundary = Boundary::new("Square", Some("CA"), "United States", Geometry::Polygon(square))?;
    /// assert_eq!(boundary.bbox.north, 1.0);
    /// # Ok::<(), streetwise_core::BoundaryError>(())
    /// ```
    pub fn new(
        name: impl Into<String>,
        state: Option<&str>,
        country: impl Into<String>,
        geometry: Geometry<f64>,
    ) -> Result<Self, BoundaryError> {
        if !matches!(geometry, Geometry::Polygon(_) | Geometry::MultiPolygon(_)) {
            return Err(BoundaryError::UnsupportedGeometry {
                kind: geometry_kind(&geometry).to_owned(),
            });
        }
        let bbox =
            BoundingBox::from_geometry(&geometry).ok_or_else(|| BoundaryError::InvalidGeoJson {
                message: "boundary geometry has no finite envelope".to_owned(),
            })?;
        let area_km2 = estimate_area_km2(&geometry);
        Ok(Self {
            name: name.into(),
            state: state.map(str::to_owned),
            country: country.into(),
            geometry,
            bbox,
            area_km2,
        })
    }

    /// Name of the geometry variant, e.g. `"MultiPolygon"`.
    #[must_use]
    pub fn geometry_kind(&self) -> &'static str {
        geometry_kind(&self.geometry)
    }
}

/// Planar area converted with the 111 km per degree approximation.
#[must_use]
pub fn estimate_area_km2(geometry: &Geometry<f64>) -> f64 {
    geometry.unsigned_area() * KM2_PER_DEG2
}

/// GeoJSON-style type name of a geometry.
#[must_use]
pub fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{MultiPolygon, point, polygon};
    use rstest::{fixture, rstest};

    #[fixture]
    fn unit_square() -> Geometry<f64> {
        Geometry::Polygon(polygon![
            (x: -122.5, y: 37.7),
            (x: -122.4, y: 37.7),
            (x: -122.4, y: 37.8),
            (x: -122.5, y: 37.8),
            (x: -122.5, y: 37.7),
        ])
    }

    #[rstest]
    fn derives_bbox_in_south_west_north_east_order(unit_square: Geometry<f64>) {
        let boundary = Boundary::new("Test", Some("CA"), "United States", unit_square)
            .expect("polygon boundary");
        let edges: [f64; 4] = boundary.bbox.into();
        assert_eq!(edges, [37.7, -122.5, 37.8, -122.4]);
    }

    #[rstest]
    fn estimates_area_from_square_degrees(unit_square: Geometry<f64>) {
        let boundary = Boundary::new("Test", None, "United States", unit_square)
            .expect("polygon boundary");
        let expected = 0.01 * KM2_PER_DEG2;
        assert!((boundary.area_km2 - expected).abs() < 1.0e-6);
    }

    #[rstest]
    fn accepts_multi_polygons(unit_square: Geometry<f64>) {
        let Geometry::Polygon(polygon) = unit_square else {
            panic!("fixture should be a polygon");
        };
        let multi = Geometry::MultiPolygon(MultiPolygon::new(vec![polygon]));
        let boundary =
            Boundary::new("Test", None, "United States", multi).expect("multi-polygon boundary");
        assert_eq!(boundary.geometry_kind(), "MultiPolygon");
    }

    #[rstest]
    fn rejects_points() {
        let err = Boundary::new(
            "Test",
            None,
            "United States",
            Geometry::Point(point!(x: 0.0, y: 0.0)),
        )
        .expect_err("points are not boundaries");
        assert_eq!(
            err,
            BoundaryError::UnsupportedGeometry {
                kind: "Point".to_owned()
            }
        );
    }
}
