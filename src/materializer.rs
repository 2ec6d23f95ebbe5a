//! NEXT_STEP edge materialization.
//!
//! Turns traced paths into persona-tagged NEXT_STEP edges and inserts them
//! through the store's `add_edge`. Candidate edges that violate the hard
//! invariants (probability range, self-loop, empty persona id) are rejected
//! at this boundary and counted in the report — never silently dropped.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::store::{EdgeInsert, GraphError, PropertyGraph};
use crate::types::{Edge, EdgeType, JourneyStage, NodeId, PersonaJourney};

/// Hard-invariant violation on a candidate NEXT_STEP edge.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum InvariantViolation {
    /// transition_prob outside [0, 1].
    #[error("transition_prob {0} outside [0, 1]")]
    ProbOutOfRange(f64),
    /// from == to.
    #[error("self-loop on {0}")]
    SelfLoop(NodeId),
    /// Missing or empty persona id.
    #[error("empty persona id")]
    EmptyPersonaId,
}

/// A candidate edge rejected by the invariant gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedEdge {
    /// Source page.
    pub from: NodeId,
    /// Target page.
    pub to: NodeId,
    /// Persona whose path produced the candidate.
    pub persona_id: String,
    /// Why it was rejected.
    pub reason: InvariantViolation,
}

/// Materialization outcome, surfaced in the run report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterializeReport {
    /// NEXT_STEP edges inserted.
    pub inserted: usize,
    /// `(from, to, persona)` pairs merged from multiple path traversals.
    pub merged: usize,
    /// Candidates dropped because another persona already claimed the
    /// `(from, to, NEXT_STEP)` triple (idempotent insert).
    pub deduplicated: usize,
    /// Candidates rejected by the invariant gate.
    pub rejected: Vec<RejectedEdge>,
    /// Insertion failures from the store (impossible by construction,
    /// re-checked anyway).
    pub structural_errors: Vec<GraphError>,
    /// Pages with at least one outgoing NEXT_STEP edge.
    pub covered_pages: usize,
    /// Distinct pages appearing in the accepted paths.
    pub targeted_pages: usize,
}

impl MaterializeReport {
    /// Covered / targeted pages. Advisory only.
    pub fn coverage(&self) -> f64 {
        if self.targeted_pages == 0 {
            return 0.0;
        }
        self.covered_pages as f64 / self.targeted_pages as f64
    }
}

/// Accumulated state for one `(from, to)` pair within a persona.
#[derive(Debug, Clone, Copy)]
struct Accumulated {
    prob_sum: f64,
    frequency: u64,
}

/// Materializes analyzer output into the graph.
pub struct EdgeMaterializer<'a> {
    /// Stage labels, total over pages, computed before mutation starts.
    labels: &'a BTreeMap<NodeId, JourneyStage>,
}

impl<'a> EdgeMaterializer<'a> {
    /// Create a materializer over precomputed stage labels.
    pub fn new(labels: &'a BTreeMap<NodeId, JourneyStage>) -> Self {
        Self { labels }
    }

    /// Convert every journey's paths into NEXT_STEP edges.
    ///
    /// Journeys are processed in the given order (catalog order), and each
    /// persona's pairs in sorted order, so insertion is deterministic.
    /// Repeated `(from, to)` traversals within a persona merge into one
    /// edge with a frequency-weighted average probability.
    pub fn materialize(
        &self,
        graph: &mut PropertyGraph,
        journeys: &[PersonaJourney],
    ) -> MaterializeReport {
        let mut report = MaterializeReport::default();
        let mut targeted: BTreeSet<NodeId> = BTreeSet::new();

        for journey in journeys {
            let mut pairs: BTreeMap<(NodeId, NodeId), Accumulated> = BTreeMap::new();
            for path in &journey.paths {
                for page in &path.pages {
                    targeted.insert(page.clone());
                }
                for (from, to, prob) in path.steps() {
                    let acc = pairs.entry((from.clone(), to.clone())).or_insert(Accumulated {
                        prob_sum: 0.0,
                        frequency: 0,
                    });
                    acc.prob_sum += prob;
                    acc.frequency += 1;
                }
            }

            for ((from, to), acc) in pairs {
                if acc.frequency > 1 {
                    report.merged += 1;
                }
                let prob = acc.prob_sum / acc.frequency as f64;
                if let Err(reason) = self.check(&from, &to, prob, &journey.persona_id) {
                    tracing::warn!(
                        from = %from,
                        to = %to,
                        persona = %journey.persona_id,
                        %reason,
                        "rejected NEXT_STEP candidate"
                    );
                    report.rejected.push(RejectedEdge {
                        from,
                        to,
                        persona_id: journey.persona_id.clone(),
                        reason,
                    });
                    continue;
                }
                let from_stage = self.labels.get(&from).copied();
                let to_stage = self.labels.get(&to).copied();
                let mut edge = Edge::new(from, to, EdgeType::NextStep)
                    .with_attr("persona_id", journey.persona_id.as_str())
                    .with_attr("transition_prob", prob)
                    .with_attr("frequency", acc.frequency as i64);
                if let Some(stage) = from_stage {
                    edge = edge.with_attr("from_stage", stage.to_string());
                }
                if let Some(stage) = to_stage {
                    edge = edge.with_attr("to_stage", stage.to_string());
                }
                match graph.add_edge(edge) {
                    Ok(EdgeInsert::Inserted) => report.inserted += 1,
                    Ok(EdgeInsert::Duplicate) => report.deduplicated += 1,
                    Err(e) => report.structural_errors.push(e),
                }
            }
        }

        report.targeted_pages = targeted.len();
        report.covered_pages = graph
            .edges_of(EdgeType::NextStep)
            .map(|e| &e.from)
            .collect::<BTreeSet<_>>()
            .len();

        tracing::info!(
            inserted = report.inserted,
            merged = report.merged,
            deduplicated = report.deduplicated,
            rejected = report.rejected.len(),
            coverage = report.coverage(),
            "materialization complete"
        );
        report
    }

    /// The invariant gate. Range, self-loop, and persona-id checks are
    /// hard: a failing candidate never reaches the store.
    fn check(
        &self,
        from: &NodeId,
        to: &NodeId,
        prob: f64,
        persona_id: &str,
    ) -> Result<(), InvariantViolation> {
        if !(0.0..=1.0).contains(&prob) {
            return Err(InvariantViolation::ProbOutOfRange(prob));
        }
        if from == to {
            return Err(InvariantViolation::SelfLoop(from.clone()));
        }
        if persona_id.is_empty() {
            return Err(InvariantViolation::EmptyPersonaId);
        }
        Ok(())
    }
}
