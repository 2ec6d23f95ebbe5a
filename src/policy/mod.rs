//! Journey policy: every heuristic constant as configuration.
//!
//! The conversion weights and the inbound-link percentile are reasonable
//! defaults, not validated-optimal constants, so they are all tunable here
//! rather than hard-coded in the scorers.
//!
//! ## Float Normalization for Deterministic Hashing
//!
//! Floats are quantized to integers (multiply by 1e6, round to i64) before
//! hashing, so `params_hash` is stable across platforms and serializers.

pub mod scoring;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::canonical::canonical_hash_hex;
use crate::DEFAULT_POLICY_VERSION;

/// Quantization factor for float normalization.
const FLOAT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

fn quantize_float(value: f64) -> i64 {
    (value * FLOAT_QUANTIZATION_FACTOR).round() as i64
}

/// Journey analysis policy.
///
/// ## Parameters
///
/// - `interest_boost`: entry-score multiplier on persona-interest overlap
/// - `action_weight` / `category_weight` / `inbound_weight`: conversion
///   score components
/// - `inbound_percentile`: corpus percentile an inbound-link count must
///   reach for the `inbound_weight` component
/// - `relevance_threshold`: minimum TARGETS relevance for a page to stay
///   a path candidate
/// - `progression_score` / `plateau_score`: step score for a strict stage
///   progression vs. any other move
/// - `max_path_len`: hop budget per traced path
/// - `top_entry_points` / `top_conversion_points` / `top_paths`: result
///   cuts per persona
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyPolicy {
    /// Policy version identifier.
    pub version: String,
    /// Entry-score multiplier when persona interests overlap page keywords.
    pub interest_boost: f64,
    /// Conversion weight for an action-intent keyword in url/title.
    pub action_weight: f64,
    /// Conversion weight for a conversion-category page.
    pub category_weight: f64,
    /// Conversion weight for a high inbound-link count.
    pub inbound_weight: f64,
    /// Percentile (0-1) of the corpus inbound-link distribution.
    pub inbound_percentile: f64,
    /// Categories counted as conversion categories.
    pub conversion_categories: BTreeSet<String>,
    /// Action-intent keywords matched against url/title tokens.
    pub action_keywords: BTreeSet<String>,
    /// Minimum TARGETS relevance for path candidates.
    pub relevance_threshold: f64,
    /// Step score for a strict stage progression.
    pub progression_score: f64,
    /// Step score for a non-progressing move.
    pub plateau_score: f64,
    /// Maximum pages per traced path.
    pub max_path_len: usize,
    /// Entry points retained per persona.
    pub top_entry_points: usize,
    /// Conversion points retained per persona.
    pub top_conversion_points: usize,
    /// Paths retained per persona.
    pub top_paths: usize,
}

impl Default for JourneyPolicy {
    fn default() -> Self {
        Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            interest_boost: 1.5,
            action_weight: 0.5,
            category_weight: 0.3,
            inbound_weight: 0.2,
            inbound_percentile: 0.75,
            conversion_categories: ["admissions", "contact", "application"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            action_keywords: [
                "apply", "register", "enroll", "enrol", "signup", "submit", "contact",
                "book", "request",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            relevance_threshold: 0.5,
            progression_score: 1.0,
            plateau_score: 0.3,
            max_path_len: 5,
            top_entry_points: 3,
            top_conversion_points: 2,
            top_paths: 5,
        }
    }
}

impl JourneyPolicy {
    /// Get the policy id.
    pub fn policy_id(&self) -> &str {
        &self.version
    }

    /// Hash of the policy parameters, quantized for cross-platform
    /// stability. Recorded in run reports for provenance.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(&self.to_quantized())
    }

    fn to_quantized(&self) -> QuantizedPolicyParams {
        QuantizedPolicyParams {
            version: self.version.clone(),
            interest_boost: quantize_float(self.interest_boost),
            action_weight: quantize_float(self.action_weight),
            category_weight: quantize_float(self.category_weight),
            inbound_weight: quantize_float(self.inbound_weight),
            inbound_percentile: quantize_float(self.inbound_percentile),
            conversion_categories: self.conversion_categories.clone(),
            action_keywords: self.action_keywords.clone(),
            relevance_threshold: quantize_float(self.relevance_threshold),
            progression_score: quantize_float(self.progression_score),
            plateau_score: quantize_float(self.plateau_score),
            max_path_len: self.max_path_len,
            top_entry_points: self.top_entry_points,
            top_conversion_points: self.top_conversion_points,
            top_paths: self.top_paths,
        }
    }
}

/// Quantized policy parameters for deterministic hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuantizedPolicyParams {
    version: String,
    interest_boost: i64,
    action_weight: i64,
    category_weight: i64,
    inbound_weight: i64,
    inbound_percentile: i64,
    conversion_categories: BTreeSet<String>,
    action_keywords: BTreeSet<String>,
    relevance_threshold: i64,
    progression_score: i64,
    plateau_score: i64,
    max_path_len: usize,
    top_entry_points: usize,
    top_conversion_points: usize,
    top_paths: usize,
}
