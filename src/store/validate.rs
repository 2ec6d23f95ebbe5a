//! Structural validation of a populated graph.
//!
//! Validation is advisory: it produces a report and never mutates or
//! raises. Dangling edges should be impossible given `add_edge`'s contract
//! but are re-checked exhaustively anyway.

use serde::{Deserialize, Serialize};

use super::PropertyGraph;
use crate::types::{EdgeKey, EdgeType, NodeId};

/// Findings of a structural validation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Edges referencing an id absent from the node index.
    pub dangling_edges: Vec<EdgeKey>,
    /// Nodes with degree 0.
    pub isolated_nodes: Vec<NodeId>,
    /// CONTAINS pairs forming a 2-cycle. The CONTAINS hierarchy must be
    /// acyclic; each offending pair is reported once, smaller id first.
    pub contains_cycles: Vec<(NodeId, NodeId)>,
}

impl ValidationReport {
    /// Whether the pass found nothing.
    pub fn is_clean(&self) -> bool {
        self.dangling_edges.is_empty()
            && self.isolated_nodes.is_empty()
            && self.contains_cycles.is_empty()
    }
}

impl PropertyGraph {
    /// Run a full structural validation pass.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        for edge in self.edges() {
            for endpoint in [&edge.from, &edge.to] {
                if !self.contains_node(endpoint.as_str()) {
                    report.dangling_edges.push(edge.key());
                    break;
                }
            }
        }

        for node in self.nodes() {
            if self.degree(node.id.as_str()) == 0 {
                report.isolated_nodes.push(node.id.clone());
            }
        }

        for edge in self.edges_of(EdgeType::Contains) {
            if edge.from >= edge.to {
                continue; // report each pair once
            }
            let back = EdgeKey {
                from: edge.to.clone(),
                to: edge.from.clone(),
                edge_type: EdgeType::Contains,
            };
            if self.edge(&back).is_some() {
                report
                    .contains_cycles
                    .push((edge.from.clone(), edge.to.clone()));
            }
        }

        report
    }
}
