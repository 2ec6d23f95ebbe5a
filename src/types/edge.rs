//! Edge types for the journey kernel.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::node::{AttrValue, NodeId};

/// Type of edge in the property graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeType {
    /// Structural containment (section -> page, page -> content item).
    Contains,
    /// Hyperlink between pages.
    LinksTo,
    /// Persona -> page relevance (supplied by the upstream classifier).
    Targets,
    /// Page -> topic association.
    HasTopic,
    /// Content -> entity mention.
    Mentions,
    /// Generic relatedness.
    RelatedTo,
    /// Derived, persona-tagged navigation transition.
    NextStep,
    /// Inverse containment in the URL hierarchy.
    ChildOf,
}

impl EdgeType {
    /// Parse an edge type from its string tag.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CONTAINS" => Some(Self::Contains),
            "LINKS_TO" => Some(Self::LinksTo),
            "TARGETS" => Some(Self::Targets),
            "HAS_TOPIC" => Some(Self::HasTopic),
            "MENTIONS" => Some(Self::Mentions),
            "RELATED_TO" => Some(Self::RelatedTo),
            "NEXT_STEP" => Some(Self::NextStep),
            "CHILD_OF" => Some(Self::ChildOf),
            _ => None,
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains => write!(f, "CONTAINS"),
            Self::LinksTo => write!(f, "LINKS_TO"),
            Self::Targets => write!(f, "TARGETS"),
            Self::HasTopic => write!(f, "HAS_TOPIC"),
            Self::Mentions => write!(f, "MENTIONS"),
            Self::RelatedTo => write!(f, "RELATED_TO"),
            Self::NextStep => write!(f, "NEXT_STEP"),
            Self::ChildOf => write!(f, "CHILD_OF"),
        }
    }
}

/// Identity of an edge: the `(from, to, type)` triple.
///
/// At most one edge per key may exist in a store; attributes are not part
/// of edge identity. Implements `Ord` for canonical ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    /// Source node.
    pub from: NodeId,
    /// Target node.
    pub to: NodeId,
    /// Edge type.
    pub edge_type: EdgeType,
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} [{}]", self.from, self.to, self.edge_type)
    }
}

/// Directed edge in the property graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node.
    pub from: NodeId,
    /// Target node.
    pub to: NodeId,
    /// Edge type.
    pub edge_type: EdgeType,
    /// Open attribute bag (string -> scalar).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Edge {
    /// Create a new edge with an empty attribute bag.
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>, edge_type: EdgeType) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            edge_type,
            attributes: BTreeMap::new(),
        }
    }

    /// Create a LINKS_TO edge.
    pub fn links_to(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self::new(from, to, EdgeType::LinksTo)
    }

    /// Attach an attribute (builder style).
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute by key.
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    /// The identity triple of this edge.
    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            from: self.from.clone(),
            to: self.to.clone(),
            edge_type: self.edge_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_key_ordering() {
        let e1 = Edge::links_to("a", "b").key();
        let e2 = Edge::links_to("a", "c").key();
        let e3 = Edge::links_to("b", "c").key();

        // Same source, different target
        assert!(e1 < e2);
        // Different source
        assert!(e1 < e3);
        assert!(e2 < e3);
    }

    #[test]
    fn test_edge_type_distinguishes_keys() {
        let k1 = Edge::new("a", "b", EdgeType::LinksTo).key();
        let k2 = Edge::new("a", "b", EdgeType::Contains).key();
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_edge_type_round_trip() {
        for tag in [
            "CONTAINS",
            "LINKS_TO",
            "TARGETS",
            "HAS_TOPIC",
            "MENTIONS",
            "RELATED_TO",
            "NEXT_STEP",
            "CHILD_OF",
        ] {
            let parsed = EdgeType::from_str(tag).unwrap();
            assert_eq!(parsed.to_string(), tag);
        }
        assert_eq!(EdgeType::from_str("links_to"), Some(EdgeType::LinksTo));
        assert_eq!(EdgeType::from_str("FOLLOWS"), None);
    }

    #[test]
    fn test_attributes_not_part_of_identity() {
        let plain = Edge::links_to("a", "b");
        let tagged = Edge::links_to("a", "b").with_attr("weight", 0.5);
        assert_eq!(plain.key(), tagged.key());
        assert_ne!(plain, tagged);
    }
}
