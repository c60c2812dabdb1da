//! Test doubles and element builders.
//!
//! [`StubRoadNetworkSource`] and [`StubBoundarySource`] return canned
//! responses without any I/O. The builder functions keep fixtures short.

use std::cell::RefCell;

use geo::{Geometry, LineString, Polygon};

use crate::boundary::Boundary;
use crate::element::{RawElement, RawRelation, RawWay, Tags};
use crate::error::{BoundaryError, QueryServiceError};
use crate::geometry::LatLon;
use crate::query::OverpassQuery;
use crate::source::{BoundarySource, RoadNetworkSource};

/// Road-network source returning a fixed response and recording queries.
///
/// # Example
///
/// ```
/// use streetwise_core::test_support::{StubRoadNetworkSource, named_way};
/// use streetwise_core::{BoundingBox, RoadNetworkSource, query_for_bbox};
///
/// let source = StubRoadNetworkSource::with_elements(vec![named_way(
///     1,
///     "Main Street",
///     &[(37.0, -122.0), (37.01, -122.0)],
/// )]);
/// let query = query_for_bbox(BoundingBox::new(36.0, -123.0, 38.0, -121.0));
/// assert_eq!(source.fetch_elements(&query).map(|e| e.len()), Ok(1));
/// assert_eq!(source.queries().len(), 1);
/// ```
#[derive(Debug)]
pub struct StubRoadNetworkSource {
    response: Result<Vec<RawElement>, QueryServiceError>,
    queries: RefCell<Vec<OverpassQuery>>,
}

impl StubRoadNetworkSource {
    /// Source answering every query with `elements`.
    #[must_use]
    pub fn with_elements(elements: Vec<RawElement>) -> Self {
        Self {
            response: Ok(elements),
            queries: RefCell::new(Vec::new()),
        }
    }

    /// Source failing every query with `error`.
    #[must_use]
    pub fn with_error(error: QueryServiceError) -> Self {
        Self {
            response: Err(error),
            queries: RefCell::new(Vec::new()),
        }
    }

    /// Queries received so far, oldest first.
    #[must_use]
    pub fn queries(&self) -> Vec<OverpassQuery> {
        self.queries.borrow().clone()
    }
}

impl RoadNetworkSource for StubRoadNetworkSource {
    fn fetch_elements(&self, query: &OverpassQuery) -> Result<Vec<RawElement>, QueryServiceError> {
        self.queries.borrow_mut().push(query.clone());
        self.response.clone()
    }
}

/// Boundary source returning a fixed boundary or error.
#[derive(Debug, Clone)]
pub struct StubBoundarySource {
    response: Result<Boundary, BoundaryError>,
}

impl StubBoundarySource {
    /// Source answering every lookup with `boundary`.
    #[must_use]
    pub const fn with_boundary(boundary: Boundary) -> Self {
        Self {
            response: Ok(boundary),
        }
    }

    /// Source failing every lookup with `error`.
    #[must_use]
    pub const fn with_error(error: BoundaryError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

impl BoundarySource for StubBoundarySource {
    fn boundary(&self, _city: &str, _state: &str, _country: &str) -> Result<Boundary, BoundaryError> {
        self.response.clone()
    }
}

fn name_tags(name: &str) -> Tags {
    Tags::from([("name".to_owned(), name.to_owned())])
}

/// A way tagged `name` with inline geometry given as `(lat, lon)` pairs.
#[must_use]
pub fn named_way(id: i64, name: &str, points: &[(f64, f64)]) -> RawElement {
    RawElement::Way(RawWay {
        id,
        tags: name_tags(name),
        geometry: Some(points.iter().map(|&(lat, lon)| LatLon::new(lat, lon)).collect()),
        node_refs: Vec::new(),
    })
}

/// A street relation tagged `name` over the given member ways.
#[must_use]
pub fn street_relation(id: i64, name: &str, members: &[i64]) -> RawElement {
    let mut tags = name_tags(name);
    tags.insert("type".to_owned(), "associatedStreet".to_owned());
    RawElement::Relation(RawRelation {
        id,
        tags,
        member_ways: members.to_vec(),
    })
}

/// An axis-aligned rectangular boundary between the given edges.
///
/// # Panics
///
/// Panics if the edges are not finite.
#[must_use]
pub fn rectangle_boundary(name: &str, south: f64, west: f64, north: f64, east: f64) -> Boundary {
    let ring = LineString::from(vec![
        (west, south),
        (east, south),
        (east, north),
        (west, north),
        (west, south),
    ]);
    let geometry = Geometry::Polygon(Polygon::new(ring, Vec::new()));
    match Boundary::new(name, Some("CA"), "United States", geometry) {
        Ok(boundary) => boundary,
        Err(err) => panic!("rectangle boundary should be valid: {err}"),
    }
}
