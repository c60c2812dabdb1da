//! Raw road-network elements as returned by one query response.
//!
//! Elements are read-only inputs to [`crate::assemble`]; they are discarded
//! once candidates have been built.

use std::collections::HashMap;

use crate::geometry::{LatLon, Polyline};

/// Free-form key/value tags attached to ways and relations.
pub type Tags = HashMap<String, String>;

/// Discriminant of a [`RawElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A single positioned node.
    Node,
    /// An ordered list of nodes forming one road segment.
    Way,
    /// A named group of member ways.
    Relation,
}

/// A single node with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    /// Source identifier.
    pub id: i64,
    /// Node position.
    pub position: LatLon,
}

/// One continuous road segment.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWay {
    /// Source identifier.
    pub id: i64,
    /// Element tags; `name` and `highway` are the ones that matter here.
    pub tags: Tags,
    /// Inline vertex list when the service returned full geometry.
    pub geometry: Option<Polyline>,
    /// Node identifiers in way order, used when `geometry` is absent.
    pub node_refs: Vec<i64>,
}

/// A relation grouping several ways under one street name.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRelation {
    /// Source identifier.
    pub id: i64,
    /// Element tags.
    pub tags: Tags,
    /// Member way identifiers in membership order.
    pub member_ways: Vec<i64>,
}

/// Closed sum of the element types a query response may contain.
#[derive(Debug, Clone, PartialEq)]
pub enum RawElement {
    /// See [`RawNode`].
    Node(RawNode),
    /// See [`RawWay`].
    Way(RawWay),
    /// See [`RawRelation`].
    Relation(RawRelation),
}

impl RawElement {
    /// Source identifier of the element.
    #[must_use]
    pub const fn id(&self) -> i64 {
        match self {
            Self::Node(node) => node.id,
            Self::Way(way) => way.id,
            Self::Relation(relation) => relation.id,
        }
    }

    /// Discriminant of the element.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Node(_) => ElementKind::Node,
            Self::Way(_) => ElementKind::Way,
            Self::Relation(_) => ElementKind::Relation,
        }
    }
}

/// Trimmed `name` tag, if present and non-blank.
pub(crate) fn name_tag(tags: &Tags) -> Option<&str> {
    tags.get("name")
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("  Market Street "), Some("Market Street"))]
    #[case(Some("   "), None)]
    #[case(None, None)]
    fn name_tag_is_trimmed(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        let mut tags = Tags::new();
        if let Some(value) = raw {
            tags.insert("name".to_owned(), value.to_owned());
        }
        assert_eq!(name_tag(&tags), expected);
    }

    #[rstest]
    fn reports_kind_and_id() {
        let element = RawElement::Relation(RawRelation {
            id: 42,
            tags: Tags::new(),
            member_ways: vec![1, 2],
        });
        assert_eq!(element.id(), 42);
        assert_eq!(element.kind(), ElementKind::Relation);
    }
}
