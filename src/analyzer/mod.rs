//! Journey analysis engine.
//!
//! For one persona at a time, the analyzer discovers entry points,
//! conversion points, per-page stage labels, and a bounded set of typical
//! paths, using only what is already in the store: page importance, url
//! depth, LINKS_TO edges, and (when present) TARGETS relevance scores.
//!
//! Personas are independent: `analyze_all` runs them on scoped threads
//! against the shared read-only graph, the only shared mutable state being
//! the stage cache behind its lock.

pub mod stages;
pub mod tracer;

use std::cmp::Ordering;

use crate::policy::scoring::{conversion_score, entry_score, percentile};
use crate::policy::JourneyPolicy;
use crate::store::{Direction, PropertyGraph};
use crate::types::{
    ConversionPoint, EdgeType, EntryPoint, JourneyDiagnostics, JourneyPath, NodeType, Persona,
    PersonaCatalog, PersonaJourney,
};

pub use stages::{classify_page, StageClassifier};
pub use tracer::{relevance_map, PathTracer, RelevanceMap};

/// Per-persona journey analyzer over a frozen graph.
pub struct JourneyAnalyzer<'a> {
    graph: &'a PropertyGraph,
    policy: &'a JourneyPolicy,
    stages: StageClassifier<'a>,
    /// Corpus inbound-link threshold (policy percentile), precomputed.
    inbound_threshold: f64,
}

impl<'a> JourneyAnalyzer<'a> {
    /// Create an analyzer; precomputes the corpus inbound-link threshold.
    pub fn new(graph: &'a PropertyGraph, policy: &'a JourneyPolicy) -> Self {
        let counts: Vec<usize> = graph
            .nodes_of(NodeType::Page)
            .map(|n| {
                graph
                    .neighbors(n.id.as_str(), EdgeType::LinksTo, Direction::Reverse)
                    .count()
            })
            .collect();
        let inbound_threshold = percentile(&counts, policy.inbound_percentile);
        Self {
            graph,
            policy,
            stages: StageClassifier::new(policy),
            inbound_threshold,
        }
    }

    /// The shared stage classifier.
    pub fn stages(&self) -> &StageClassifier<'a> {
        &self.stages
    }

    /// The inbound-link threshold used for conversion scoring.
    pub fn inbound_threshold(&self) -> f64 {
        self.inbound_threshold
    }

    /// Analyze one persona.
    ///
    /// A persona with zero qualifying entry points yields an empty journey;
    /// that is reported output, not an error.
    pub fn analyze(&self, persona: &Persona) -> PersonaJourney {
        let mut diagnostics = JourneyDiagnostics::default();

        let entry_points = self.entry_points(persona, &mut diagnostics);
        let conversion_points = self.conversion_points();
        let targets = relevance_map(self.graph, &persona.id);
        diagnostics.targets_available = targets.is_some();

        let tracer = PathTracer::new(self.graph, self.policy, &self.stages);
        let mut paths: Vec<JourneyPath> = Vec::new();
        for entry in &entry_points {
            let path = tracer.trace(entry, targets.as_ref());
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        let traced = paths.len();
        paths.sort_by(compare_paths);
        paths.truncate(self.policy.top_paths);
        diagnostics.paths_discarded = traced - paths.len();

        tracing::info!(
            persona = %persona.id,
            entry_points = entry_points.len(),
            conversion_points = conversion_points.len(),
            paths = paths.len(),
            "persona analysis complete"
        );

        PersonaJourney {
            persona_id: persona.id.clone(),
            entry_points,
            conversion_points,
            paths,
            diagnostics,
        }
    }

    /// Analyze every persona in the catalog.
    ///
    /// Personas run as scoped threads over the shared `&PropertyGraph`;
    /// results are returned in catalog order regardless of completion
    /// order, so output is deterministic.
    pub fn analyze_all(&self, catalog: &PersonaCatalog) -> Vec<PersonaJourney> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = catalog
                .iter()
                .map(|persona| scope.spawn(move || self.analyze(persona)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("persona analysis thread panicked"))
                .collect()
        })
    }

    fn entry_points(
        &self,
        persona: &Persona,
        diagnostics: &mut JourneyDiagnostics,
    ) -> Vec<EntryPoint> {
        let mut scored: Vec<(f64, u32, EntryPoint)> = Vec::new();
        for page in self.graph.nodes_of(NodeType::Page) {
            diagnostics.pages_scored += 1;
            let score = entry_score(page, persona, self.policy);
            if score <= 0.0 {
                continue;
            }
            scored.push((
                score,
                page.url_depth(),
                EntryPoint {
                    page_id: page.id.clone(),
                    score,
                    stage: self.stages.stage_of(page),
                },
            ));
        }
        diagnostics.entry_candidates = scored.len();
        // Score desc, then lower depth, then id: explicit tie-breaks so
        // output never depends on iteration order.
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
                .then_with(|| a.2.page_id.cmp(&b.2.page_id))
        });
        scored
            .into_iter()
            .take(self.policy.top_entry_points)
            .map(|(_, _, ep)| ep)
            .collect()
    }

    fn conversion_points(&self) -> Vec<ConversionPoint> {
        let mut scored: Vec<(f64, u32, ConversionPoint)> = Vec::new();
        for page in self.graph.nodes_of(NodeType::Page) {
            let inbound = self
                .graph
                .neighbors(page.id.as_str(), EdgeType::LinksTo, Direction::Reverse)
                .count();
            let score = conversion_score(page, inbound, self.inbound_threshold, self.policy);
            if score <= 0.0 {
                continue;
            }
            scored.push((
                score,
                page.url_depth(),
                ConversionPoint {
                    page_id: page.id.clone(),
                    score,
                    stage: self.stages.stage_of(page),
                },
            ));
        }
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
                .then_with(|| a.2.page_id.cmp(&b.2.page_id))
        });
        scored
            .into_iter()
            .take(self.policy.top_conversion_points)
            .map(|(_, _, cp)| cp)
            .collect()
    }
}

/// Path preference: longer first, then higher average transition score,
/// then page sequence for full determinism.
fn compare_paths(a: &JourneyPath, b: &JourneyPath) -> Ordering {
    b.len()
        .cmp(&a.len())
        .then_with(|| {
            b.avg_transition()
                .partial_cmp(&a.avg_transition())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.pages.cmp(&b.pages))
}
