//! Run-level reporting and graph fingerprints.
//!
//! A fingerprint captures a deterministic identity of the graph's
//! structural content; the run report ties together everything a batch run
//! produced: policy provenance, fingerprints before and after enrichment,
//! per-persona summaries, and the materializer's counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::analyzer::JourneyAnalyzer;
use crate::canonical::canonical_hash_hex;
use crate::materializer::{EdgeMaterializer, MaterializeReport};
use crate::policy::JourneyPolicy;
use crate::store::{PropertyGraph, ValidationReport};
use crate::types::{PersonaCatalog, PersonaJourney};
use crate::JOURNEY_KERNEL_SCHEMA_VERSION;

/// Deterministic fingerprint of a graph's structural content.
///
/// Two stores with the same node ids, edge triples, and schema version
/// produce equal fingerprints regardless of how they were built — this is
/// the round-trip witness for the structured export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFingerprint {
    /// Total nodes.
    pub node_count: u64,
    /// Total edges.
    pub edge_count: u64,
    /// Hash of sorted node ids.
    pub node_id_hash: String,
    /// Hash of sorted `(from, to, type)` triples.
    pub edge_triple_hash: String,
    /// Schema version of the kernel types.
    pub schema_version: String,
}

impl GraphFingerprint {
    /// Compute the fingerprint of a store.
    pub fn compute(graph: &PropertyGraph) -> Self {
        let node_ids: BTreeSet<String> = graph.nodes().map(|n| n.id.to_string()).collect();

        let mut triples: Vec<(String, String, String)> = graph
            .edges()
            .iter()
            .map(|e| (e.from.to_string(), e.to.to_string(), e.edge_type.to_string()))
            .collect();
        triples.sort();

        Self {
            node_count: node_ids.len() as u64,
            edge_count: triples.len() as u64,
            node_id_hash: canonical_hash_hex(&node_ids),
            edge_triple_hash: canonical_hash_hex(&triples),
            schema_version: JOURNEY_KERNEL_SCHEMA_VERSION.to_string(),
        }
    }
}

/// Per-persona summary line in the run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaSummary {
    /// Persona id.
    pub persona_id: String,
    /// Entry points retained.
    pub entry_points: usize,
    /// Conversion points retained.
    pub conversion_points: usize,
    /// Paths retained.
    pub paths: usize,
    /// Whether the persona produced an empty journey.
    pub empty: bool,
    /// Whether TARGETS relevance data was available.
    pub targets_available: bool,
}

impl PersonaSummary {
    fn of(journey: &PersonaJourney) -> Self {
        Self {
            persona_id: journey.persona_id.clone(),
            entry_points: journey.entry_points.len(),
            conversion_points: journey.conversion_points.len(),
            paths: journey.paths.len(),
            empty: journey.is_empty(),
            targets_available: journey.diagnostics.targets_available,
        }
    }
}

/// Everything a batch run produced, serializable for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// Run start, UTC.
    pub started_at: DateTime<Utc>,
    /// Run end, UTC.
    pub finished_at: DateTime<Utc>,
    /// Policy version that produced the run.
    pub policy_version: String,
    /// Hash of the policy parameters.
    pub policy_params_hash: String,
    /// Fingerprint before materialization.
    pub fingerprint_before: GraphFingerprint,
    /// Fingerprint after materialization.
    pub fingerprint_after: GraphFingerprint,
    /// Structural validation findings on the populated graph.
    pub validation: ValidationReport,
    /// One summary per persona, catalog order.
    pub personas: Vec<PersonaSummary>,
    /// Materializer counts and rejections.
    pub materialize: MaterializeReport,
    /// SHA-256 checksum of the final export document, when exported.
    pub export_checksum: Option<String>,
}

/// Output of [`execute_run`].
#[derive(Debug)]
pub struct RunOutcome {
    /// Full per-persona analyzer output.
    pub journeys: Vec<PersonaJourney>,
    /// The run report.
    pub report: RunReport,
}

/// Run the full pipeline over a populated store: validate, analyze every
/// persona, materialize NEXT_STEP edges, and assemble the report.
///
/// The store must already be populated; this call is the transition from
/// its read-only analysis phase to the single enrichment write.
pub fn execute_run(
    graph: &mut PropertyGraph,
    catalog: &PersonaCatalog,
    policy: &JourneyPolicy,
) -> RunOutcome {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    tracing::info!(
        %run_id,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        personas = catalog.len(),
        "journey run started"
    );

    let validation = graph.validate();
    if !validation.is_clean() {
        tracing::warn!(
            dangling = validation.dangling_edges.len(),
            isolated = validation.isolated_nodes.len(),
            contains_cycles = validation.contains_cycles.len(),
            "structural validation reported findings"
        );
    }
    let fingerprint_before = GraphFingerprint::compute(graph);

    let analyzer = JourneyAnalyzer::new(graph, policy);
    let journeys = analyzer.analyze_all(catalog);
    let labels = analyzer.stages().label_all(graph);
    drop(analyzer);

    let materialize = EdgeMaterializer::new(&labels).materialize(graph, &journeys);
    let fingerprint_after = GraphFingerprint::compute(graph);

    let report = RunReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        policy_version: policy.policy_id().to_string(),
        policy_params_hash: policy.params_hash(),
        fingerprint_before,
        fingerprint_after,
        validation,
        personas: journeys.iter().map(PersonaSummary::of).collect(),
        materialize,
        export_checksum: None,
    };
    tracing::info!(%run_id, inserted = report.materialize.inserted, "journey run finished");

    RunOutcome { journeys, report }
}
