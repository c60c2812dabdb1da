//! Point and polyline primitives shared by every pipeline stage.
//!
//! Street geometry is stored in `(lat, lon)` order to match the persisted
//! dataset layout. Conversions into [`geo`] types swap to `x = longitude`,
//! `y = latitude`.

use geo::{Coord, Euclidean, Haversine, Length, LineString};

/// Metres in one statute mile.
pub const METRES_PER_MILE: f64 = 1609.344;

/// Rough metres per degree used when a planar length must be read as a
/// ground distance.
pub const METRES_PER_DEGREE: f64 = 111_000.0;

/// A WGS84 position in `(lat, lon)` order.
///
/// With the `serde` feature enabled the value serialises as a two-element
/// array `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "[f64; 2]", into = "[f64; 2]")
)]
pub struct LatLon {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl LatLon {
    /// Construct a position from latitude and longitude.
    ///
    /// # Examples
    /// ```
    /// use streetwise_core::LatLon;
    ///
    /// let point = LatLon::new(37.77, -122.42);
    /// assert_eq!(point.to_coord().x, -122.42);
    /// ```
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns true when both components are finite and inside WGS84 range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Convert into a [`Coord`] with `x = lon`, `y = lat`.
    #[must_use]
    pub const fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

impl From<[f64; 2]> for LatLon {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<LatLon> for [f64; 2] {
    fn from(value: LatLon) -> Self {
        [value.lat, value.lon]
    }
}

/// An ordered run of positions describing one continuous piece of road.
pub type Polyline = Vec<LatLon>;

/// Build a [`LineString`] in `(lon, lat)` order from a polyline.
#[must_use]
pub fn to_line_string(points: &[LatLon]) -> LineString<f64> {
    points.iter().copied().map(LatLon::to_coord).collect()
}

/// Great-circle length of a polyline in miles.
#[must_use]
pub fn polyline_miles(points: &[LatLon]) -> f64 {
    Haversine.length(&to_line_string(points)) / METRES_PER_MILE
}

/// Summed great-circle length of every polyline in a multi-line, in miles.
#[must_use]
pub fn multi_line_miles(lines: &[Polyline]) -> f64 {
    lines.iter().map(|line| polyline_miles(line)).sum()
}

/// Planar length in coordinate-degree units.
#[must_use]
pub fn planar_length(line: &LineString<f64>) -> f64 {
    Euclidean.length(line)
}

/// Round to two decimal places.
#[must_use]
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        let delta = (actual - expected).abs();
        assert!(
            delta <= tolerance,
            "expected {expected}, got {actual} (|delta| = {delta})"
        );
    }

    #[rstest]
    fn one_degree_of_latitude_is_about_69_miles() {
        let line = vec![LatLon::new(0.0, 0.0), LatLon::new(1.0, 0.0)];
        assert_close(polyline_miles(&line), 69.09, 0.05);
    }

    #[rstest]
    fn multi_line_length_sums_members() {
        let first = vec![LatLon::new(0.0, 0.0), LatLon::new(0.01, 0.0)];
        let second = vec![LatLon::new(1.0, 1.0), LatLon::new(1.01, 1.0)];
        let total = multi_line_miles(&[first.clone(), second.clone()]);
        assert_close(total, polyline_miles(&first) + polyline_miles(&second), 1.0e-9);
    }

    #[rstest]
    fn single_point_has_zero_length() {
        assert_close(polyline_miles(&[LatLon::new(10.0, 10.0)]), 0.0, 0.0);
    }

    #[rstest]
    fn line_string_swaps_axis_order() {
        let line = to_line_string(&[LatLon::new(1.0, 2.0), LatLon::new(3.0, 4.0)]);
        let coords: Vec<_> = line.coords().copied().collect();
        assert_eq!(coords, vec![Coord { x: 2.0, y: 1.0 }, Coord { x: 4.0, y: 3.0 }]);
    }

    #[rstest]
    #[case(1.004, 1.0)]
    #[case(1.005_1, 1.01)]
    #[case(3.5, 3.5)]
    fn rounds_to_hundredths(#[case] input: f64, #[case] expected: f64) {
        assert_close(round_to_hundredths(input), expected, 1.0e-12);
    }

    #[rstest]
    #[case(LatLon::new(91.0, 0.0))]
    #[case(LatLon::new(0.0, -181.0))]
    #[case(LatLon::new(f64::NAN, 0.0))]
    fn rejects_out_of_range_positions(#[case] point: LatLon) {
        assert!(!point.is_valid());
    }
}
