//! Greedy path tracing.
//!
//! The tracer is a bounded greedy walk, not a full graph search: cost is
//! linear in path length instead of exponential in branching factor. The
//! trade-off is completeness — a path that needs a detour through a
//! lower-scoring intermediate page to reach a better destination is never
//! found. A future iteration could use bounded-depth search with
//! backtracking.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::stages::StageClassifier;
use crate::policy::JourneyPolicy;
use crate::store::{Direction, PropertyGraph};
use crate::types::{EdgeType, EntryPoint, JourneyPath, JourneyStage, NodeId, NodeType};

/// Persona -> page relevance map extracted from TARGETS edges.
///
/// `None` when the persona has no TARGETS data at all; the tracer then
/// falls back to using every LINKS_TO neighbor (graceful degradation).
pub type RelevanceMap = BTreeMap<NodeId, f64>;

/// Bounded greedy walker over LINKS_TO edges.
pub struct PathTracer<'a> {
    graph: &'a PropertyGraph,
    policy: &'a JourneyPolicy,
    stages: &'a StageClassifier<'a>,
}

impl<'a> PathTracer<'a> {
    /// Create a tracer over a populated graph.
    pub fn new(
        graph: &'a PropertyGraph,
        policy: &'a JourneyPolicy,
        stages: &'a StageClassifier<'a>,
    ) -> Self {
        Self {
            graph,
            policy,
            stages,
        }
    }

    /// Trace one path from an entry point.
    ///
    /// Walk rules:
    /// - candidates are forward LINKS_TO neighbors that are pages
    /// - with TARGETS data, candidates are restricted to pages with
    ///   relevance >= the policy threshold
    /// - next = candidate maximizing the progression score (strict stage
    ///   progress scores `progression_score`, anything else
    ///   `plateau_score`), ties broken by importance descending, then id
    /// - the walk stops on an exhausted candidate set, a revisit, or the
    ///   hop budget; an early stop is normal output, not an error
    pub fn trace(&self, entry: &EntryPoint, targets: Option<&RelevanceMap>) -> JourneyPath {
        let mut pages = vec![entry.page_id.clone()];
        let mut transitions = Vec::new();
        let mut current = entry.page_id.clone();
        let mut current_stage = entry.stage;

        while pages.len() < self.policy.max_path_len {
            let next = match self.best_candidate(&current, current_stage, targets) {
                Some(step) => step,
                None => break,
            };
            if pages.contains(&next.id) {
                break; // cycle guard
            }
            transitions.push(next.score.clamp(0.0, 1.0));
            current = next.id.clone();
            current_stage = next.stage;
            pages.push(next.id);
        }

        tracing::debug!(
            entry = %entry.page_id,
            len = pages.len(),
            "traced journey path"
        );
        JourneyPath { pages, transitions }
    }

    fn best_candidate(
        &self,
        current: &NodeId,
        current_stage: JourneyStage,
        targets: Option<&RelevanceMap>,
    ) -> Option<Step> {
        let mut best: Option<Step> = None;
        for id in self
            .graph
            .neighbors(current.as_str(), EdgeType::LinksTo, Direction::Forward)
        {
            let Some(node) = self.graph.get(id.as_str()) else {
                continue;
            };
            if node.node_type != NodeType::Page {
                continue;
            }
            if let Some(relevance) = targets {
                let relevant = relevance
                    .get(id.as_str())
                    .is_some_and(|r| *r >= self.policy.relevance_threshold);
                if !relevant {
                    continue;
                }
            }
            let stage = self.stages.stage_of(node);
            let score = if current_stage.progresses_to(stage) {
                self.policy.progression_score
            } else {
                self.policy.plateau_score
            };
            let candidate = Step {
                id: id.clone(),
                stage,
                score,
                importance: node.importance(),
            };
            best = match best {
                None => Some(candidate),
                Some(incumbent) => Some(prefer(incumbent, candidate)),
            };
        }
        best
    }
}

/// One considered hop.
struct Step {
    id: NodeId,
    stage: JourneyStage,
    score: f64,
    importance: f64,
}

/// Deterministic candidate preference: higher score, then higher
/// importance, then smaller id.
fn prefer(a: Step, b: Step) -> Step {
    // Less = `a` preferred, Greater = `b` preferred.
    let ord = b
        .score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.importance.partial_cmp(&a.importance).unwrap_or(Ordering::Equal))
        .then_with(|| a.id.cmp(&b.id));
    if ord == Ordering::Greater {
        b
    } else {
        a
    }
}

/// Extract a persona's relevance map from its TARGETS edges.
///
/// Returns `None` when the graph holds no TARGETS edges for the persona
/// (including when the persona has no node in the graph).
pub fn relevance_map(graph: &PropertyGraph, persona_id: &str) -> Option<RelevanceMap> {
    if !graph.contains_node(persona_id) {
        return None;
    }
    let mut map = RelevanceMap::new();
    for edge in graph.edges_of(EdgeType::Targets) {
        if edge.from.as_str() != persona_id {
            continue;
        }
        let relevance = edge
            .attr("relevance")
            .and_then(crate::types::AttrValue::as_f64)
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        map.insert(edge.to.clone(), relevance);
    }
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}
