//! Node types for the journey kernel.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

use regex_lite::Regex;

/// Unique identifier for a node in the property graph.
///
/// Ids come from the upstream extraction pipeline (URL-derived slugs and
/// content hashes). Wraps a `String` and implements `Ord` for deterministic
/// ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new NodeId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Type of node in the property graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// A crawled web page.
    Page,
    /// A structural section of the site.
    Section,
    /// An extracted content item (paragraph, media block).
    ContentItem,
    /// A topic label.
    Topic,
    /// An audience persona.
    Persona,
    /// A named entity.
    Entity,
}

impl NodeType {
    /// Parse a node type from its string tag.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "page" => Some(Self::Page),
            "section" => Some(Self::Section),
            "contentitem" | "content_item" => Some(Self::ContentItem),
            "topic" => Some(Self::Topic),
            "persona" => Some(Self::Persona),
            "entity" => Some(Self::Entity),
            _ => None,
        }
    }

    /// All node types, in a fixed order.
    pub fn all() -> [Self; 6] {
        [
            Self::Page,
            Self::Section,
            Self::ContentItem,
            Self::Topic,
            Self::Persona,
            Self::Entity,
        ]
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page => write!(f, "Page"),
            Self::Section => write!(f, "Section"),
            Self::ContentItem => write!(f, "ContentItem"),
            Self::Topic => write!(f, "Topic"),
            Self::Persona => write!(f, "Persona"),
            Self::Entity => write!(f, "Entity"),
        }
    }
}

/// Scalar attribute value.
///
/// Attribute bags are open: components validate only the keys they read and
/// pass everything else through untouched, so upstream extractors can evolve
/// independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// String value.
    Str(String),
}

impl AttrValue {
    /// Get as f64 if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Get as i64 if integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as str if a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Get as bool if boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Node in the property graph.
///
/// `id` and `node_type` are immutable once assigned; everything else lives
/// in the open attribute bag. Pages carry `url`, `importance`, `url_depth`,
/// `category`, and optionally `title` and `keywords`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Globally unique identifier.
    pub id: NodeId,
    /// Node type.
    pub node_type: NodeType,
    /// Open attribute bag (string -> scalar).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Node {
    /// Create a new node with an empty attribute bag.
    pub fn new(id: impl Into<NodeId>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            attributes: BTreeMap::new(),
        }
    }

    /// Attach an attribute (builder style).
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute by key.
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    /// Page URL, if present.
    pub fn url(&self) -> Option<&str> {
        self.attr("url").and_then(AttrValue::as_str)
    }

    /// Page title, if present.
    pub fn title(&self) -> Option<&str> {
        self.attr("title").and_then(AttrValue::as_str)
    }

    /// Page category, if present.
    pub fn category(&self) -> Option<&str> {
        self.attr("category").and_then(AttrValue::as_str)
    }

    /// Page importance in [0, 1]. Missing or non-numeric reads as 0.
    pub fn importance(&self) -> f64 {
        self.attr("importance")
            .and_then(AttrValue::as_f64)
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }

    /// URL depth: the explicit `url_depth` attribute when present, otherwise
    /// the number of path segments in `url`.
    pub fn url_depth(&self) -> u32 {
        if let Some(depth) = self.attr("url_depth").and_then(AttrValue::as_i64) {
            return depth.max(0) as u32;
        }
        self.url().map(url_path_depth).unwrap_or(0)
    }

    /// Keyword set for interest matching: the comma-separated `keywords`
    /// attribute unioned with lowercase URL path tokens.
    pub fn keywords(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        if let Some(raw) = self.attr("keywords").and_then(AttrValue::as_str) {
            for kw in raw.split(',') {
                let kw = kw.trim().to_ascii_lowercase();
                if !kw.is_empty() {
                    out.insert(kw);
                }
            }
        }
        if let Some(url) = self.url() {
            for token in tokenize(url_path(url)) {
                out.insert(token);
            }
        }
        out
    }
}

fn host_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^/]+").expect("static regex")
    })
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[a-z0-9]+").expect("static regex"))
}

/// Path portion of a URL: scheme and host stripped, query and fragment cut.
pub fn url_path(url: &str) -> &str {
    let rest = match host_prefix_re().find(url) {
        Some(m) => &url[m.end()..],
        None => url,
    };
    rest.split(['?', '#']).next().unwrap_or("")
}

/// Number of path segments in a URL. The site root has depth 0.
pub fn url_path_depth(url: &str) -> u32 {
    url_path(url).split('/').filter(|s| !s.is_empty()).count() as u32
}

/// Lowercase alphanumeric tokens of a text fragment, in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_ascii_lowercase();
    token_re()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}
