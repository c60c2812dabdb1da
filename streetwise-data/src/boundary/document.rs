//! Conversion between boundary GeoJSON documents and [`Boundary`].

use geo::Geometry;
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use streetwise_core::{Boundary, BoundaryError};

fn invalid(message: impl Into<String>) -> BoundaryError {
    BoundaryError::InvalidGeoJson {
        message: message.into(),
    }
}

fn string_property(feature: &Feature, key: &str) -> Option<String> {
    feature
        .property(key)
        .and_then(JsonValue::as_str)
        .map(str::to_owned)
}

/// The feature describing the city: the first member of a
/// `FeatureCollection`, or a bare `Feature`.
fn city_feature(text: &str) -> Result<Feature, BoundaryError> {
    let document: GeoJson = text.parse().map_err(|err: geojson::Error| invalid(err.to_string()))?;
    match document {
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .next()
            .ok_or_else(|| invalid("no features found in FeatureCollection")),
        GeoJson::Feature(feature) => Ok(feature),
        GeoJson::Geometry(_) => Err(invalid("expected a Feature or FeatureCollection")),
    }
}

fn feature_geometry(feature: &Feature) -> Result<Geometry<f64>, BoundaryError> {
    let geometry = feature
        .geometry
        .clone()
        .ok_or_else(|| invalid("no geometry found in feature"))?;
    Geometry::<f64>::try_from(geometry).map_err(|err| invalid(err.to_string()))
}

/// Parse a repository document for the requested city.
///
/// A `name` property on the feature replaces `city` as the boundary name.
///
/// # Errors
///
/// Returns [`BoundaryError::InvalidGeoJson`] for unparseable documents,
/// empty collections and features without geometry, and
/// [`BoundaryError::UnsupportedGeometry`] for non-polygonal geometry.
///
/// # Examples
/// ```
/// use streetwise_data::boundary::parse_boundary;
///
/// let text = r#"{"type": "Feature", "properties": {"name": "Tiny Town"},
///     "geometry": {"type": "Polygon", "coordinates":
///         [[[-122.0, 37.0], [-121.9, 37.0], [-121.9, 37.1], [-122.0, 37.0]]]}}"#;
/// let boundary = parse_boundary(text, "tiny town", Some("CA"), "United States")?;
/// assert_eq!(boundary.name, "Tiny Town");
/// # Ok::<(), streetwise_core::BoundaryError>(())
/// ```
pub fn parse_boundary(
    text: &str,
    city: &str,
    state: Option<&str>,
    country: &str,
) -> Result<Boundary, BoundaryError> {
    let feature = city_feature(text)?;
    let geometry = feature_geometry(&feature)?;
    let name = string_property(&feature, "name").unwrap_or_else(|| city.to_owned());
    Boundary::new(name, state, country, geometry)
}

/// Parse a cached document written by [`to_feature_collection`].
///
/// Missing `name` and `country` properties read as `"Unknown"`. The
/// envelope and area are recomputed from the geometry.
///
/// # Errors
///
/// As for [`parse_boundary`].
pub fn parse_cached_boundary(text: &str) -> Result<Boundary, BoundaryError> {
    let feature = city_feature(text)?;
    let geometry = feature_geometry(&feature)?;
    let name = string_property(&feature, "name").unwrap_or_else(|| "Unknown".to_owned());
    let country = string_property(&feature, "country").unwrap_or_else(|| "Unknown".to_owned());
    let state = string_property(&feature, "state");
    Boundary::new(name, state.as_deref(), country, geometry)
}

/// One-feature collection carrying the boundary and its derived data as
/// properties `name`, `state`, `country`, `area_km2` and `bbox`.
#[must_use]
pub fn to_feature_collection(boundary: &Boundary) -> FeatureCollection {
    let bbox: [f64; 4] = boundary.bbox.into();
    let mut properties = JsonObject::new();
    properties.insert("name".to_owned(), JsonValue::from(boundary.name.as_str()));
    properties.insert(
        "state".to_owned(),
        boundary
            .state
            .as_deref()
            .map_or(JsonValue::Null, JsonValue::from),
    );
    properties.insert(
        "country".to_owned(),
        JsonValue::from(boundary.country.as_str()),
    );
    properties.insert("area_km2".to_owned(), JsonValue::from(boundary.area_km2));
    properties.insert("bbox".to_owned(), JsonValue::from(bbox.to_vec()));
    let feature = Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(
            &boundary.geometry,
        ))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    };
    FeatureCollection {
        bbox: None,
        features: vec![feature],
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn polygon_json() -> &'static str {
        r#"{"type": "Polygon", "coordinates":
            [[[-122.5, 37.7], [-122.4, 37.7], [-122.4, 37.8], [-122.5, 37.8], [-122.5, 37.7]]]}"#
    }

    #[rstest]
    fn uses_the_first_feature_of_a_collection(polygon_json: &str) {
        let text = format!(
            r#"{{"type": "FeatureCollection", "features": [
                {{"type": "Feature", "properties": {{"name": "San Francisco"}}, "geometry": {polygon_json}}},
                {{"type": "Feature", "properties": {{"name": "Other"}}, "geometry": {polygon_json}}}
            ]}}"#
        );
        let boundary =
            parse_boundary(&text, "san francisco", Some("CA"), "United States").expect("parses");
        assert_eq!(boundary.name, "San Francisco");
        assert_eq!(boundary.state.as_deref(), Some("CA"));
        assert_eq!(boundary.geometry_kind(), "Polygon");
    }

    #[rstest]
    fn falls_back_to_requested_name(polygon_json: &str) {
        let text = format!(r#"{{"type": "Feature", "properties": {{}}, "geometry": {polygon_json}}}"#);
        let boundary = parse_boundary(&text, "Requested", None, "United States").expect("parses");
        assert_eq!(boundary.name, "Requested");
    }

    #[rstest]
    #[case(r#"{"type": "FeatureCollection", "features": []}"#)]
    #[case(r#"{"type": "Feature", "properties": {}, "geometry": null}"#)]
    #[case(r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#)]
    #[case("not json")]
    fn rejects_unusable_documents(#[case] text: &str) {
        let err = parse_boundary(text, "X", None, "United States").expect_err("unusable");
        assert!(matches!(err, BoundaryError::InvalidGeoJson { .. }), "{err:?}");
    }

    #[rstest]
    fn rejects_line_boundaries() {
        let text = r#"{"type": "Feature", "properties": {},
            "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}}"#;
        let err = parse_boundary(text, "X", None, "United States").expect_err("not polygonal");
        assert_eq!(
            err,
            BoundaryError::UnsupportedGeometry {
                kind: "LineString".to_owned()
            }
        );
    }

    #[rstest]
    fn cached_documents_keep_their_properties(polygon_json: &str) {
        let original = parse_boundary(
            &format!(r#"{{"type": "Feature", "properties": {{"name": "San Francisco"}}, "geometry": {polygon_json}}}"#),
            "san francisco",
            Some("CA"),
            "United States",
        )
        .expect("parses");
        let text = serde_json::to_string(&to_feature_collection(&original)).expect("serialises");

        let value: JsonValue = serde_json::from_str(&text).expect("json");
        assert_eq!(value["features"][0]["properties"]["bbox"][0], 37.7);
        let cached = parse_cached_boundary(&text).expect("reads back");
        assert_eq!(cached, original);
    }
}
