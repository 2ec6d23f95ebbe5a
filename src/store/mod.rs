//! In-memory property graph store.
//!
//! The store owns the full node/edge set for one batch run. Population is
//! `&mut`; analysis and export are `&self` and safe to share across threads
//! once population stops (single-writer/multiple-reader, enforced by the
//! borrow checker).
//!
//! ## Determinism Guarantees
//!
//! - `nodes_of` yields nodes in insertion order
//! - `neighbors` yields adjacent ids in edge-insertion order
//! - `validate` reports findings in deterministic order

pub mod export;
pub mod validate;

use std::collections::{BTreeMap, HashMap};

use crate::types::{Edge, EdgeKey, EdgeType, Node, NodeId, NodeType};

pub use export::{GraphDocument, ImportError, ImportOutcome};
pub use validate::ValidationReport;

/// Error type for store operations.
///
/// `AddNode`/`AddEdge` failures abort only the affected insertion and never
/// partially mutate state; the caller decides whether a partially populated
/// store is fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum GraphError {
    /// A node with this id already exists.
    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),
    /// An edge references a node absent from the store.
    #[error("edge {edge} references missing node {missing}")]
    DanglingEndpoint {
        /// The rejected edge's identity triple.
        edge: EdgeKey,
        /// The missing endpoint.
        missing: NodeId,
    },
    /// Lookup miss. Returned to the caller, not a system fault.
    #[error("node not found: {0}")]
    NotFound(NodeId),
}

/// Outcome of an `add_edge` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsert {
    /// The edge was appended to the store.
    Inserted,
    /// An edge with the same `(from, to, type)` triple already existed;
    /// the call was an idempotent no-op.
    Duplicate,
}

/// Traversal direction for `neighbors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Follow edges from source to target.
    Forward,
    /// Follow edges from target to source.
    Reverse,
}

/// Typed in-memory property graph.
///
/// Indices kept consistent on every insert:
/// - primary id index (O(1) point lookup)
/// - per-type buckets in insertion order (O(1) type-scoped enumeration)
/// - forward and reverse adjacency (O(degree) traversal)
#[derive(Debug, Clone, Default)]
pub struct PropertyGraph {
    nodes: HashMap<NodeId, Node>,
    /// Global node insertion order.
    order: Vec<NodeId>,
    /// Per-type node ids in insertion order.
    buckets: BTreeMap<NodeType, Vec<NodeId>>,
    /// All edges in insertion order.
    edges: Vec<Edge>,
    /// Edge identity -> index into `edges`.
    edge_index: HashMap<EdgeKey, usize>,
    /// Source id -> outgoing edge indices.
    forward: HashMap<NodeId, Vec<usize>>,
    /// Target id -> incoming edge indices.
    reverse: HashMap<NodeId, Vec<usize>>,
}

impl PropertyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node.
    ///
    /// Fails with [`GraphError::DuplicateId`] if the id is already present;
    /// on success the node is registered under the primary index and its
    /// type bucket.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.nodes.contains_key(node.id.as_str()) {
            return Err(GraphError::DuplicateId(node.id));
        }
        self.order.push(node.id.clone());
        self.buckets
            .entry(node.node_type)
            .or_default()
            .push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Add an edge.
    ///
    /// Fails with [`GraphError::DanglingEndpoint`] if either endpoint is
    /// absent. Returns [`EdgeInsert::Duplicate`] without mutating anything
    /// if an edge with the same `(from, to, type)` triple already exists.
    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeInsert, GraphError> {
        for endpoint in [&edge.from, &edge.to] {
            if !self.nodes.contains_key(endpoint.as_str()) {
                return Err(GraphError::DanglingEndpoint {
                    edge: edge.key(),
                    missing: endpoint.clone(),
                });
            }
        }
        let key = edge.key();
        if self.edge_index.contains_key(&key) {
            return Ok(EdgeInsert::Duplicate);
        }
        let idx = self.edges.len();
        self.forward.entry(edge.from.clone()).or_default().push(idx);
        self.reverse.entry(edge.to.clone()).or_default().push(idx);
        self.edge_index.insert(key, idx);
        self.edges.push(edge);
        Ok(EdgeInsert::Inserted)
    }

    /// Look up a node, `None` on miss.
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Look up a node, [`GraphError::NotFound`] on miss.
    pub fn node(&self, id: &str) -> Result<&Node, GraphError> {
        self.nodes
            .get(id)
            .ok_or_else(|| GraphError::NotFound(NodeId::new(id)))
    }

    /// Whether a node with this id exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up an edge by its identity triple.
    pub fn edge(&self, key: &EdgeKey) -> Option<&Edge> {
        self.edge_index.get(key).map(|&idx| &self.edges[idx])
    }

    /// All nodes in insertion order. Restartable: each call yields a fresh
    /// iterator independent of prior consumption.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().map(|id| &self.nodes[id.as_str()])
    }

    /// All nodes of one type, insertion order, restartable.
    pub fn nodes_of(&self, node_type: NodeType) -> impl Iterator<Item = &Node> {
        self.buckets
            .get(&node_type)
            .into_iter()
            .flatten()
            .map(|id| &self.nodes[id.as_str()])
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All edges of one type, insertion order.
    pub fn edges_of(&self, edge_type: EdgeType) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.edge_type == edge_type)
    }

    /// Ids adjacent to `id` over edges of `edge_type`, in edge-insertion
    /// order. Empty when the node has no such neighbors (not an error).
    pub fn neighbors(
        &self,
        id: &str,
        edge_type: EdgeType,
        direction: Direction,
    ) -> impl Iterator<Item = &NodeId> {
        let index = match direction {
            Direction::Forward => &self.forward,
            Direction::Reverse => &self.reverse,
        };
        index
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.edges[idx])
            .filter(move |e| e.edge_type == edge_type)
            .map(move |e| match direction {
                Direction::Forward => &e.to,
                Direction::Reverse => &e.from,
            })
    }

    /// Incoming + outgoing edge count for a node.
    pub fn degree(&self, id: &str) -> usize {
        self.forward.get(id).map_or(0, Vec::len) + self.reverse.get(id).map_or(0, Vec::len)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttrValue;

    fn page(id: &str) -> Node {
        Node::new(id, NodeType::Page).with_attr("importance", 0.5)
    }

    fn populated() -> PropertyGraph {
        let mut g = PropertyGraph::new();
        g.add_node(page("a")).unwrap();
        g.add_node(page("b")).unwrap();
        g.add_node(page("c")).unwrap();
        g.add_node(Node::new("t1", NodeType::Topic)).unwrap();
        g.add_edge(Edge::links_to("a", "b")).unwrap();
        g.add_edge(Edge::links_to("b", "c")).unwrap();
        g.add_edge(Edge::new("a", "t1", EdgeType::HasTopic)).unwrap();
        g
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut g = PropertyGraph::new();
        g.add_node(page("a")).unwrap();
        let err = g.add_node(page("a")).unwrap_err();
        assert_eq!(err, GraphError::DuplicateId(NodeId::new("a")));
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn test_dangling_edge_rejected_without_mutation() {
        let mut g = PropertyGraph::new();
        g.add_node(page("a")).unwrap();
        let err = g.add_edge(Edge::links_to("a", "missing")).unwrap_err();
        assert!(matches!(err, GraphError::DanglingEndpoint { missing, .. }
            if missing.as_str() == "missing"));
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.degree("a"), 0);
    }

    #[test]
    fn test_idempotent_edge_insert() {
        let mut g = populated();
        let before = g.edge_count();
        let outcome = g
            .add_edge(Edge::links_to("a", "b").with_attr("weight", 0.9))
            .unwrap();
        assert_eq!(outcome, EdgeInsert::Duplicate);
        assert_eq!(g.edge_count(), before);
        // Original attributes retained
        assert!(g
            .edge(&Edge::links_to("a", "b").key())
            .unwrap()
            .attr("weight")
            .is_none());
    }

    #[test]
    fn test_same_pair_different_type_allowed() {
        let mut g = populated();
        let outcome = g.add_edge(Edge::new("a", "b", EdgeType::RelatedTo)).unwrap();
        assert_eq!(outcome, EdgeInsert::Inserted);
    }

    #[test]
    fn test_type_buckets_preserve_insertion_order() {
        let g = populated();
        let pages: Vec<_> = g.nodes_of(NodeType::Page).map(|n| n.id.as_str()).collect();
        assert_eq!(pages, ["a", "b", "c"]);
        let topics: Vec<_> = g.nodes_of(NodeType::Topic).map(|n| n.id.as_str()).collect();
        assert_eq!(topics, ["t1"]);
        assert_eq!(g.nodes_of(NodeType::Entity).count(), 0);
    }

    #[test]
    fn test_query_is_restartable() {
        let g = populated();
        let first: Vec<_> = g.nodes_of(NodeType::Page).map(|n| n.id.clone()).collect();
        let second: Vec<_> = g.nodes_of(NodeType::Page).map(|n| n.id.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_neighbors_by_type_and_direction() {
        let g = populated();
        let fwd: Vec<_> = g
            .neighbors("a", EdgeType::LinksTo, Direction::Forward)
            .map(NodeId::as_str)
            .collect();
        assert_eq!(fwd, ["b"]);
        // HAS_TOPIC edge from "a" is not a LINKS_TO neighbor
        let rev: Vec<_> = g
            .neighbors("b", EdgeType::LinksTo, Direction::Reverse)
            .map(NodeId::as_str)
            .collect();
        assert_eq!(rev, ["a"]);
        assert_eq!(
            g.neighbors("c", EdgeType::LinksTo, Direction::Forward).count(),
            0
        );
    }

    #[test]
    fn test_node_lookup() {
        let g = populated();
        assert_eq!(g.node("a").unwrap().importance(), 0.5);
        assert_eq!(
            g.node("zzz").unwrap_err(),
            GraphError::NotFound(NodeId::new("zzz"))
        );
    }

    #[test]
    fn test_edge_attributes_readable() {
        let mut g = populated();
        g.add_node(Node::new("persona:student", NodeType::Persona)).unwrap();
        g.add_edge(
            Edge::new("persona:student", "a", EdgeType::Targets).with_attr("relevance", 0.8),
        )
        .unwrap();
        let edge = g
            .edge(&Edge::new("persona:student", "a", EdgeType::Targets).key())
            .unwrap();
        assert_eq!(edge.attr("relevance"), Some(&AttrValue::Float(0.8)));
    }
}
