//! # journey-kernel
//!
//! Typed property graph and persona journey inference for crawled web
//! corpora.
//!
//! The kernel answers one question:
//!
//! > Given a site graph and an audience persona, where do visits **begin**,
//! > where do they **convert**, and which paths connect the two?
//!
//! ## Core Contract
//!
//! 1. Hold the full node/edge set in memory with id-, type-, and
//!    adjacency-indexed access and structural validation
//! 2. Per persona, deterministically derive entry points, conversion
//!    points, stage labels, and bounded greedy paths
//! 3. Materialize paths as persona-tagged NEXT_STEP edges, gated by hard
//!    invariants, and export the enriched graph
//!
//! ## Architecture
//!
//! ```text
//! GraphDocument → PropertyGraph → JourneyAnalyzer → EdgeMaterializer
//!                      ↑               ↓                   ↓
//!                  validate()    PersonaJourney       NEXT_STEP edges
//!                                                          ↓
//!                                              export (JSON / Mermaid)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same graph + same catalog + same policy → identical entry points,
//!   conversion points, and paths
//! - All tie-breaks are explicit (depth, importance, id); nothing depends
//!   on map iteration order
//! - Fingerprints and policy hashes are computed over canonical bytes

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analyzer;
pub mod canonical;
pub mod materializer;
pub mod policy;
pub mod report;
pub mod store;
pub mod types;

// Re-exports
pub use analyzer::{classify_page, JourneyAnalyzer, PathTracer, StageClassifier};
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes};
pub use materializer::{EdgeMaterializer, InvariantViolation, MaterializeReport, RejectedEdge};
pub use policy::scoring::{conversion_score, entry_score, percentile};
pub use policy::JourneyPolicy;
pub use report::{execute_run, GraphFingerprint, PersonaSummary, RunOutcome, RunReport};
pub use store::export::GRAPH_DOCUMENT_VERSION;
pub use store::{
    Direction, EdgeInsert, GraphDocument, GraphError, ImportError, ImportOutcome, PropertyGraph,
    ValidationReport,
};
pub use types::{
    AttrValue, CatalogError, ConversionPoint, Edge, EdgeKey, EdgeType, EntryPoint,
    JourneyDiagnostics, JourneyPath, JourneyStage, Node, NodeId, NodeType, Persona,
    PersonaCatalog, PersonaJourney,
};

/// Schema version for all journey kernel types.
/// Increment on breaking changes to any schema type.
pub const JOURNEY_KERNEL_SCHEMA_VERSION: &str = "1.0.0";

/// Default policy version identifier.
pub const DEFAULT_POLICY_VERSION: &str = "journey_policy_v1";
