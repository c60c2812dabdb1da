//! Overpass API JSON response types.
//!
//! A response is `{"elements": [...]}` where each element carries a `type`
//! of `node`, `way` or `relation`. With `out geom;` ways carry an inline
//! `geometry` list of `{lat, lon}` objects, and relations list their
//! `members`.
//!
//! See: <https://wiki.openstreetmap.org/wiki/Overpass_API/Output_Formats#JSON>

use std::collections::HashMap;

use log::warn;
use serde::Deserialize;
use serde_json::Value;
use streetwise_core::{
    LatLon, QueryServiceError, RawElement, RawNode, RawRelation, RawWay,
};

/// Top-level Overpass response.
///
/// Elements are kept as raw JSON so that one malformed element does not
/// reject the whole response.
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    /// Elements in response order.
    #[serde(default)]
    pub elements: Vec<Value>,
    /// Server remark, present when the query hit a runtime limit.
    #[serde(default)]
    pub remark: Option<String>,
}

/// One element as it appears on the wire.
#[derive(Debug, Deserialize)]
pub struct WireElement {
    /// `node`, `way` or `relation`.
    #[serde(rename = "type")]
    pub kind: String,
    /// OSM identifier.
    pub id: i64,
    /// Node latitude.
    pub lat: Option<f64>,
    /// Node longitude.
    pub lon: Option<f64>,
    /// Element tags.
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Inline way geometry; entries are `null` for nodes the server clipped.
    pub geometry: Option<Vec<Option<WirePoint>>>,
    /// Way node references.
    #[serde(default)]
    pub nodes: Vec<i64>,
    /// Relation members.
    #[serde(default)]
    pub members: Vec<WireMember>,
}

/// A `{lat, lon}` vertex.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WirePoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// A relation member reference.
#[derive(Debug, Deserialize)]
pub struct WireMember {
    /// Member element type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Member identifier.
    #[serde(rename = "ref")]
    pub id: i64,
    /// Member role, often `street` or `house`.
    #[serde(default)]
    pub role: String,
}

impl WireElement {
    /// Convert to the core element model.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem for unknown element types and
    /// for nodes without a position.
    pub fn into_raw(self) -> Result<RawElement, String> {
        let Self {
            kind,
            id,
            lat: latitude,
            lon: longitude,
            tags,
            geometry,
            nodes,
            members,
        } = self;
        match kind.as_str() {
            "node" => match (latitude, longitude) {
                (Some(lat), Some(lon)) => Ok(RawElement::Node(RawNode {
                    id,
                    position: LatLon::new(lat, lon),
                })),
                _ => Err(format!("node {id} has no position")),
            },
            "way" => Ok(RawElement::Way(RawWay {
                id,
                tags,
                geometry: geometry.map(|points| {
                    points
                        .into_iter()
                        .flatten()
                        .map(|point| LatLon::new(point.lat, point.lon))
                        .collect()
                }),
                node_refs: nodes,
            })),
            "relation" => Ok(RawElement::Relation(RawRelation {
                id,
                tags,
                member_ways: members
                    .into_iter()
                    .filter(|member| member.kind == "way")
                    .map(|member| member.id)
                    .collect(),
            })),
            other => Err(format!("unsupported element type {other:?} for id {id}")),
        }
    }
}

/// Decode a response body into core elements.
///
/// Elements that cannot be decoded are logged and skipped.
///
/// # Errors
///
/// Returns [`QueryServiceError::MalformedPayload`] when the body is not a
/// JSON object with an `elements` list.
///
/// # Examples
/// ```
/// use streetwise_data::overpass::decode_elements;
///
/// let body = r#"{"elements": [
///     {"type": "way", "id": 7, "tags": {"name": "Main Street"},
///      "geometry": [{"lat": 37.0, "lon": -122.0}, {"lat": 37.01, "lon": -122.0}]}
/// ]}"#;
/// let elements = decode_elements(body)?;
/// assert_eq!(elements.len(), 1);
/// # Ok::<(), streetwise_core::QueryServiceError>(())
/// ```
pub fn decode_elements(body: &str) -> Result<Vec<RawElement>, QueryServiceError> {
    let response: OverpassResponse =
        serde_json::from_str(body).map_err(|err| QueryServiceError::MalformedPayload {
            message: err.to_string(),
        })?;
    if let Some(remark) = &response.remark {
        warn!("Overpass remark: {remark}");
    }
    let total = response.elements.len();
    let elements: Vec<RawElement> = response
        .elements
        .into_iter()
        .filter_map(|value| {
            serde_json::from_value::<WireElement>(value)
                .map_err(|err| err.to_string())
                .and_then(WireElement::into_raw)
                .map_err(|reason| warn!("Skipping malformed element: {reason}"))
                .ok()
        })
        .collect();
    if elements.len() < total {
        warn!("Skipped {} of {total} elements", total - elements.len());
    }
    Ok(elements)
}
