//! Journey-stage classification.
//!
//! A page's stage is a pure function of its static attributes, independent
//! of persona. Every page receives exactly one stage, and the same inputs
//! always produce the same label.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use crate::policy::scoring::action_keyword_in_url;
use crate::policy::JourneyPolicy;
use crate::store::PropertyGraph;
use crate::types::{JourneyStage, Node, NodeId, NodeType};

/// Category that classifies as DECISION.
const DECISION_CATEGORY: &str = "admissions";
/// Categories that classify as CONSIDERATION.
const CONSIDERATION_CATEGORIES: [&str; 2] = ["programme", "faculty"];
/// Depth at or below which an otherwise-unclassified page is AWARENESS.
const AWARENESS_MAX_DEPTH: u32 = 2;

/// Classify a page into its journey stage.
///
/// Rules, first match wins:
/// 1. action-intent keyword in the URL -> ACTION
/// 2. category "admissions"           -> DECISION
/// 3. category "programme"/"faculty"  -> CONSIDERATION
/// 4. url_depth <= 2                  -> AWARENESS
/// 5. otherwise                       -> CONSIDERATION
pub fn classify_page(page: &Node, policy: &JourneyPolicy) -> JourneyStage {
    if action_keyword_in_url(page, &policy.action_keywords) {
        return JourneyStage::Action;
    }
    match page.category().map(str::to_ascii_lowercase) {
        Some(c) if c == DECISION_CATEGORY => return JourneyStage::Decision,
        Some(c) if CONSIDERATION_CATEGORIES.contains(&c.as_str()) => {
            return JourneyStage::Consideration
        }
        _ => {}
    }
    if page.url_depth() <= AWARENESS_MAX_DEPTH {
        JourneyStage::Awareness
    } else {
        JourneyStage::Consideration
    }
}

/// Caching wrapper around [`classify_page`].
///
/// The cache is shared across persona analyses (the label does not depend
/// on the persona), so it sits behind a read-write lock.
#[derive(Debug)]
pub struct StageClassifier<'a> {
    policy: &'a JourneyPolicy,
    cache: RwLock<HashMap<NodeId, JourneyStage>>,
}

impl<'a> StageClassifier<'a> {
    /// Create a classifier with an empty cache.
    pub fn new(policy: &'a JourneyPolicy) -> Self {
        Self {
            policy,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Stage of a page, computed once and cached by node id.
    pub fn stage_of(&self, page: &Node) -> JourneyStage {
        if let Some(stage) = self.cache.read().get(page.id.as_str()) {
            return *stage;
        }
        let stage = classify_page(page, self.policy);
        self.cache.write().insert(page.id.clone(), stage);
        stage
    }

    /// Label every Page node in the graph.
    ///
    /// The returned map is total over pages: every page id maps to exactly
    /// one stage.
    pub fn label_all(&self, graph: &PropertyGraph) -> BTreeMap<NodeId, JourneyStage> {
        graph
            .nodes_of(NodeType::Page)
            .map(|page| (page.id.clone(), self.stage_of(page)))
            .collect()
    }
}
