//! Assemble raw query elements into named street candidates.
//!
//! Relations are processed first and claim their member ways; any way not
//! claimed by a relation becomes a standalone candidate. Candidates keep the
//! raw `name` tag so classification can decide what to do with it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::{debug, info};

use crate::config::ExtractorConfig;
use crate::element::{RawElement, RawRelation, RawWay, Tags, name_tag};
use crate::geometry::{LatLon, Polyline, multi_line_miles};

/// Whether a candidate came from a relation or a standalone way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// A street relation grouping several ways.
    Relation,
    /// A single way not claimed by any relation.
    Way,
}

impl SourceKind {
    /// Short tag used when building entity identifiers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relation => "rel",
            Self::Way => "way",
        }
    }
}

/// The source element a candidate was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRef {
    /// Element kind.
    pub kind: SourceKind,
    /// Source identifier.
    pub id: i64,
}

impl SourceRef {
    /// Construct a source reference.
    #[must_use]
    pub const fn new(kind: SourceKind, id: i64) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind.as_str(), self.id)
    }
}

/// A named road entity before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetCandidate {
    /// Element the candidate was built from.
    pub source: SourceRef,
    /// Trimmed raw `name` tag.
    pub name: String,
    /// One polyline per contributing way, each with at least two points.
    pub geometry: Vec<Polyline>,
    /// Unrounded great-circle length in miles.
    pub length_miles: f64,
}

/// Lookup tables over one response.
struct ElementIndex<'a> {
    nodes: HashMap<i64, LatLon>,
    ways: HashMap<i64, &'a RawWay>,
    way_order: Vec<&'a RawWay>,
    relations: Vec<&'a RawRelation>,
}

impl<'a> ElementIndex<'a> {
    fn build(elements: &'a [RawElement]) -> Self {
        let mut index = Self {
            nodes: HashMap::new(),
            ways: HashMap::new(),
            way_order: Vec::new(),
            relations: Vec::new(),
        };
        for element in elements {
            match element {
                RawElement::Node(node) => {
                    index.nodes.insert(node.id, node.position);
                }
                RawElement::Way(way) => {
                    index.ways.insert(way.id, way);
                    index.way_order.push(way);
                }
                RawElement::Relation(relation) => index.relations.push(relation),
            }
        }
        index
    }

    /// Vertices of a way, inline or resolved through node references.
    ///
    /// Returns `None` when the way has no geometry of its own and any
    /// referenced node is missing from the response.
    fn way_geometry(&self, way: &RawWay) -> Option<Polyline> {
        if let Some(points) = &way.geometry {
            return Some(points.clone());
        }
        if way.node_refs.is_empty() {
            return None;
        }
        let resolved: Option<Polyline> = way
            .node_refs
            .iter()
            .map(|node_id| self.nodes.get(node_id).copied())
            .collect();
        if resolved.is_none() {
            debug!("Way {} references nodes missing from the response", way.id);
        }
        resolved
    }
}

/// Polylines shorter than two points or with invalid positions carry no
/// measurable geometry.
fn usable(points: &[LatLon]) -> bool {
    points.len() >= 2 && points.iter().all(LatLon::is_valid)
}

fn usable_name<'t>(tags: &'t Tags, config: &ExtractorConfig) -> Option<&'t str> {
    name_tag(tags).filter(|name| name.chars().count() >= config.min_name_chars)
}

/// Convert a response's elements into street candidates.
///
/// Each relation with a usable name and at least one member way carrying
/// geometry yields one candidate with one polyline per such member, in
/// membership order. Those members are claimed and never reappear as
/// standalone candidates. Every remaining named way yields a single-polyline
/// candidate, in response order. Candidates outside the configured length
/// window are dropped.
///
/// # Examples
/// ```
/// use std::collections::HashMap;
/// use streetwise_core::{ExtractorConfig, LatLon, RawElement, RawWay, assemble};
///
/// let way = RawWay {
///     id: 1,
///     tags: HashMap::from([("name".to_owned(), "Main Street".to_owned())]),
///     geometry: Some(vec![LatLon::new(37.0, -122.0), LatLon::new(37.01, -122.0)]),
///     node_refs: Vec::new(),
/// };
/// let candidates = assemble(&[RawElement::Way(way)], &ExtractorConfig::default());
/// assert_eq!(candidates.len(), 1);
/// ```
#[must_use]
pub fn assemble(elements: &[RawElement], config: &ExtractorConfig) -> Vec<StreetCandidate> {
    let index = ElementIndex::build(elements);
    let mut claimed: HashSet<i64> = HashSet::new();
    let mut candidates = Vec::new();

    for relation in &index.relations {
        let Some(name) = usable_name(&relation.tags, config) else {
            continue;
        };
        let mut geometry = Vec::new();
        for way_id in &relation.member_ways {
            let Some(way) = index.ways.get(way_id) else {
                continue;
            };
            let Some(points) = index.way_geometry(way) else {
                continue;
            };
            claimed.insert(*way_id);
            if usable(&points) {
                geometry.push(points);
            }
        }
        if geometry.is_empty() {
            debug!("Skipping relation {} ({name}): no usable member ways", relation.id);
            continue;
        }
        push_within_window(
            &mut candidates,
            SourceRef::new(SourceKind::Relation, relation.id),
            name,
            geometry,
            config,
        );
    }
    let from_relations = candidates.len();

    for way in &index.way_order {
        if claimed.contains(&way.id) {
            continue;
        }
        let Some(name) = usable_name(&way.tags, config) else {
            continue;
        };
        let Some(points) = index.way_geometry(way) else {
            continue;
        };
        claimed.insert(way.id);
        if !usable(&points) {
            debug!("Skipping way {} ({name}): malformed geometry", way.id);
            continue;
        }
        push_within_window(
            &mut candidates,
            SourceRef::new(SourceKind::Way, way.id),
            name,
            vec![points],
            config,
        );
    }

    info!(
        "Assembled {} candidates ({from_relations} relations, {} standalone ways)",
        candidates.len(),
        candidates.len() - from_relations
    );
    candidates
}

fn push_within_window(
    candidates: &mut Vec<StreetCandidate>,
    source: SourceRef,
    name: &str,
    geometry: Vec<Polyline>,
    config: &ExtractorConfig,
) {
    let length_miles = multi_line_miles(&geometry);
    if !config.accepts_length(length_miles) {
        debug!("Skipping {source} ({name}): length {length_miles:.2} miles outside window");
        return;
    }
    candidates.push(StreetCandidate {
        source,
        name: name.to_owned(),
        geometry,
        length_miles,
    });
}
