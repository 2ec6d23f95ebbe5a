//! Personas and journey stages.
//!
//! The persona catalog is static input: hand-authored or config-loaded,
//! never derived from the graph, and immutable for the run's duration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Stage of a user journey.
///
/// Stages are totally ordered for progression comparisons:
/// Awareness < Consideration < Decision < Action < Retention.
/// The order is linear, not cyclic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JourneyStage {
    /// First contact with the site.
    Awareness,
    /// Comparing options.
    Consideration,
    /// Committing to an option.
    Decision,
    /// Completing a goal action.
    Action,
    /// Returning after the goal.
    Retention,
}

impl JourneyStage {
    /// Position in the progression order, starting at 0.
    pub fn rank(self) -> u8 {
        match self {
            Self::Awareness => 0,
            Self::Consideration => 1,
            Self::Decision => 2,
            Self::Action => 3,
            Self::Retention => 4,
        }
    }

    /// Whether moving to `next` is a strict progression.
    pub fn progresses_to(self, next: Self) -> bool {
        next.rank() > self.rank()
    }

    /// Parse a stage from its string tag.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "AWARENESS" => Some(Self::Awareness),
            "CONSIDERATION" => Some(Self::Consideration),
            "DECISION" => Some(Self::Decision),
            "ACTION" => Some(Self::Action),
            "RETENTION" => Some(Self::Retention),
            _ => None,
        }
    }

    /// All stages, in progression order.
    pub fn all() -> [Self; 5] {
        [
            Self::Awareness,
            Self::Consideration,
            Self::Decision,
            Self::Action,
            Self::Retention,
        ]
    }
}

impl fmt::Display for JourneyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Awareness => write!(f, "AWARENESS"),
            Self::Consideration => write!(f, "CONSIDERATION"),
            Self::Decision => write!(f, "DECISION"),
            Self::Action => write!(f, "ACTION"),
            Self::Retention => write!(f, "RETENTION"),
        }
    }
}

/// An audience persona.
///
/// Read-only after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    /// Persona identifier (also the id of the matching Persona node, when
    /// the graph carries one).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Interest keywords, lowercase.
    pub interests: BTreeSet<String>,
    /// Stages this persona typically enters the site at.
    #[serde(default)]
    pub typical_entry_stages: Vec<JourneyStage>,
    /// Stages this persona typically leaves the site at.
    #[serde(default)]
    pub typical_terminal_stages: Vec<JourneyStage>,
}

impl Persona {
    /// Create a persona with normalized (lowercase) interests.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        interests: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            interests: interests
                .into_iter()
                .map(|i| i.into().to_ascii_lowercase())
                .collect(),
            typical_entry_stages: vec![JourneyStage::Awareness],
            typical_terminal_stages: vec![JourneyStage::Action],
        }
    }

    /// Set the typical entry stages (builder style).
    pub fn with_entry_stages(mut self, stages: impl Into<Vec<JourneyStage>>) -> Self {
        self.typical_entry_stages = stages.into();
        self
    }

    /// Set the typical terminal stages (builder style).
    pub fn with_terminal_stages(mut self, stages: impl Into<Vec<JourneyStage>>) -> Self {
        self.typical_terminal_stages = stages.into();
        self
    }
}

/// Error loading a persona catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Two personas share an id.
    #[error("duplicate persona id: {0}")]
    DuplicateId(String),
    /// A persona has an empty id.
    #[error("persona with empty id")]
    EmptyId,
    /// Malformed catalog JSON.
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Static set of personas, iterated in load order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaCatalog {
    personas: Vec<Persona>,
}

impl PersonaCatalog {
    /// Build a catalog, rejecting duplicate or empty ids.
    pub fn new(personas: Vec<Persona>) -> Result<Self, CatalogError> {
        let mut seen = BTreeSet::new();
        for p in &personas {
            if p.id.is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if !seen.insert(p.id.clone()) {
                return Err(CatalogError::DuplicateId(p.id.clone()));
            }
        }
        Ok(Self { personas })
    }

    /// Load a catalog from a JSON array of personas.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let personas: Vec<Persona> = serde_json::from_str(json)?;
        Self::new(personas)
    }

    /// Look up a persona by id.
    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }

    /// Iterate personas in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    /// Number of personas.
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}
