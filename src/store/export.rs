//! Graph export and import.
//!
//! Two formats:
//! - `GraphDocument`: structured JSON preserving ids, types, and all
//!   attributes. Round-trippable: re-importing reproduces an equivalent
//!   store. Also the on-disk input format produced by the extraction
//!   pipeline.
//! - Mermaid flowchart for visual inspection, NEXT_STEP edges labeled
//!   with persona and transition probability.
//!
//! Exports take `&self` and never mutate the store.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::{GraphError, PropertyGraph};
use crate::canonical::to_canonical_bytes;
use crate::types::{AttrValue, Edge, EdgeType, Node, NodeId, NodeType};

/// Schema version of the structured export document.
pub const GRAPH_DOCUMENT_VERSION: &str = "graph_doc_v1";

/// Flat node record in the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node id.
    pub id: String,
    /// Node type tag (e.g. "Page").
    #[serde(rename = "type")]
    pub node_type: String,
    /// Attribute bag; unknown keys are preserved opaquely.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttrValue>,
}

/// Flat edge record in the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Source node id.
    pub from: String,
    /// Target node id.
    pub to: String,
    /// Edge type tag (e.g. "LINKS_TO").
    #[serde(rename = "type")]
    pub edge_type: String,
    /// Attribute bag; unknown keys are preserved opaquely.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttrValue>,
}

/// Structured serialization of a full graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Document schema version.
    pub schema_version: String,
    /// Nodes in store insertion order.
    pub nodes: Vec<NodeRecord>,
    /// Edges in store insertion order.
    pub edges: Vec<EdgeRecord>,
}

/// Error resolving a document into a store.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// A node record carries a type tag outside the closed enum.
    #[error("unknown node type tag {tag:?} on node {id}")]
    UnknownNodeType {
        /// Offending node id.
        id: String,
        /// The unresolvable tag.
        tag: String,
    },
    /// An edge record carries a type tag outside the closed enum.
    #[error("unknown edge type tag {tag:?} on edge {from} -> {to}")]
    UnknownEdgeType {
        /// Source id.
        from: String,
        /// Target id.
        to: String,
        /// The unresolvable tag.
        tag: String,
    },
    /// Malformed JSON.
    #[error("document parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result of a best-effort import.
///
/// Structural errors (duplicate ids, dangling endpoints) abort only the
/// affected insertion and are collected as warnings; the caller decides
/// whether a partially populated store is fatal.
#[derive(Debug)]
pub struct ImportOutcome {
    /// The populated store.
    pub graph: PropertyGraph,
    /// Per-record insertion failures, in document order.
    pub warnings: Vec<GraphError>,
}

impl GraphDocument {
    /// Parse a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// SHA-256 checksum over the canonical document bytes, hex-encoded.
    /// Recorded in the run report so consumers can verify export files.
    pub fn checksum(&self) -> String {
        let digest = Sha256::digest(to_canonical_bytes(self));
        hex::encode(digest)
    }
}

impl PropertyGraph {
    /// Export the full store as a structured document.
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            schema_version: GRAPH_DOCUMENT_VERSION.to_string(),
            nodes: self
                .nodes()
                .map(|n| NodeRecord {
                    id: n.id.to_string(),
                    node_type: n.node_type.to_string(),
                    attributes: n.attributes.clone(),
                })
                .collect(),
            edges: self
                .edges()
                .iter()
                .map(|e| EdgeRecord {
                    from: e.from.to_string(),
                    to: e.to.to_string(),
                    edge_type: e.edge_type.to_string(),
                    attributes: e.attributes.clone(),
                })
                .collect(),
        }
    }

    /// Build a store from a document, best-effort.
    ///
    /// Unknown type tags are hard errors (the enum is closed); duplicate
    /// ids and dangling endpoints become warnings on the outcome.
    pub fn from_document(doc: &GraphDocument) -> Result<ImportOutcome, ImportError> {
        let mut graph = PropertyGraph::new();
        let mut warnings = Vec::new();

        for record in &doc.nodes {
            let node_type = NodeType::from_str(&record.node_type).ok_or_else(|| {
                ImportError::UnknownNodeType {
                    id: record.id.clone(),
                    tag: record.node_type.clone(),
                }
            })?;
            let mut node = Node::new(record.id.as_str(), node_type);
            node.attributes = record.attributes.clone();
            if let Err(e) = graph.add_node(node) {
                warnings.push(e);
            }
        }

        for record in &doc.edges {
            let edge_type = EdgeType::from_str(&record.edge_type).ok_or_else(|| {
                ImportError::UnknownEdgeType {
                    from: record.from.clone(),
                    to: record.to.clone(),
                    tag: record.edge_type.clone(),
                }
            })?;
            let mut edge = Edge::new(record.from.as_str(), record.to.as_str(), edge_type);
            edge.attributes = record.attributes.clone();
            if let Err(e) = graph.add_edge(edge) {
                warnings.push(e);
            }
        }

        if !warnings.is_empty() {
            tracing::warn!(
                warning_count = warnings.len(),
                "graph import completed with insertion warnings"
            );
        }

        Ok(ImportOutcome { graph, warnings })
    }

    /// Render the store as a Mermaid flowchart.
    ///
    /// NEXT_STEP edges are labeled `persona_id p=prob`; other non-link
    /// edges are labeled with their type. Renders in GitHub markdown or
    /// the Mermaid live editor.
    pub fn to_mermaid(&self) -> String {
        let mut ids: BTreeMap<&NodeId, String> = BTreeMap::new();
        for (i, node) in self.nodes().enumerate() {
            ids.insert(&node.id, format!("n{i}"));
        }

        let mut out = String::from("flowchart TD\n");
        for node in self.nodes() {
            let label = node.title().unwrap_or_else(|| node.id.as_str());
            let _ = writeln!(
                out,
                "    {}[\"{}: {}\"]",
                ids[&node.id],
                node.node_type,
                mermaid_escape(label)
            );
        }
        for edge in self.edges() {
            let from = &ids[&edge.from];
            let to = &ids[&edge.to];
            match edge.edge_type {
                EdgeType::NextStep => {
                    let persona = edge
                        .attr("persona_id")
                        .and_then(AttrValue::as_str)
                        .unwrap_or("?");
                    let prob = edge
                        .attr("transition_prob")
                        .and_then(AttrValue::as_f64)
                        .unwrap_or(0.0);
                    let _ = writeln!(out, "    {from} ==>|\"{persona} p={prob:.2}\"| {to}");
                }
                EdgeType::LinksTo => {
                    let _ = writeln!(out, "    {from} --> {to}");
                }
                other => {
                    let _ = writeln!(out, "    {from} -.->|{other}| {to}");
                }
            }
        }
        out
    }
}

fn mermaid_escape(label: &str) -> String {
    label.replace('"', "'")
}
