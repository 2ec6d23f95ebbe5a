//! Derived journey records.
//!
//! Entry points, conversion points, and traced paths are analyzer output,
//! not graph state: only the NEXT_STEP edges materialized from them are
//! persisted in the store.

use serde::{Deserialize, Serialize};

use super::node::NodeId;
use super::persona::JourneyStage;

/// A page where a persona is inferred to begin a site visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPoint {
    /// Page node id.
    pub page_id: NodeId,
    /// Entry score (importance / depth, interest-boosted).
    pub score: f64,
    /// Stage label of the page.
    pub stage: JourneyStage,
}

/// A page representing a completed user goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionPoint {
    /// Page node id.
    pub page_id: NodeId,
    /// Conversion score.
    pub score: f64,
    /// Stage label of the page.
    pub stage: JourneyStage,
}

/// A traced navigation path with per-step transition scores.
///
/// `transitions[i]` scores the step from `pages[i]` to `pages[i + 1]`, so
/// `transitions.len() == pages.len() - 1`. A single-page path is valid
/// output: it means the entry point had no usable forward neighbors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyPath {
    /// Visited page ids, entry point first.
    pub pages: Vec<NodeId>,
    /// Transition scores in [0, 1], one per step.
    pub transitions: Vec<f64>,
}

impl JourneyPath {
    /// Path length in pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the path is empty (never produced by the tracer).
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Mean transition score; 0 for single-page paths.
    pub fn avg_transition(&self) -> f64 {
        if self.transitions.is_empty() {
            return 0.0;
        }
        self.transitions.iter().sum::<f64>() / self.transitions.len() as f64
    }

    /// Iterate `(from, to, score)` steps.
    pub fn steps(&self) -> impl Iterator<Item = (&NodeId, &NodeId, f64)> {
        self.pages
            .windows(2)
            .zip(self.transitions.iter())
            .map(|(pair, score)| (&pair[0], &pair[1], *score))
    }
}

/// Per-persona analyzer diagnostics, surfaced in the run report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JourneyDiagnostics {
    /// Pages scored for entry.
    pub pages_scored: usize,
    /// Entry candidates with a positive score.
    pub entry_candidates: usize,
    /// Whether TARGETS relevance data existed for this persona.
    pub targets_available: bool,
    /// Paths discarded by the top-N cut.
    pub paths_discarded: usize,
}

/// Complete analyzer output for one persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaJourney {
    /// Persona id.
    pub persona_id: String,
    /// Top entry points, best first.
    pub entry_points: Vec<EntryPoint>,
    /// Top conversion points, best first.
    pub conversion_points: Vec<ConversionPoint>,
    /// Top traced paths, best first.
    pub paths: Vec<JourneyPath>,
    /// Diagnostics for the run report.
    pub diagnostics: JourneyDiagnostics,
}

impl PersonaJourney {
    /// An empty journey: the persona had zero qualifying entry points.
    /// Reported, not fatal.
    pub fn is_empty(&self) -> bool {
        self.entry_points.is_empty()
    }
}
