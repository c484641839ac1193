//! Semantic navigation types
//!
//! Declarative semantic-object configuration supplied by the application,
//! shell intents, and the resolved link items handed back to the popover.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One attribute rename rule: context attribute `key` becomes target
/// parameter `value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingItem {
    pub key: String,
    pub value: String,
}

/// Rename rules for one semantic object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticObjectMapping {
    pub semantic_object: String,
    pub items: Vec<MappingItem>,
}

/// Actions never offered for one semantic object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticObjectUnavailableActions {
    pub semantic_object: String,
    pub actions: Vec<String>,
}

/// Declarative navigation configuration attached to a UI control
///
/// Semantic-object names may be dynamic (`{propertyPath}` form); they are
/// resolved against the control's custom data before link resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticPayload {
    pub semantic_objects: Vec<String>,
    #[serde(default)]
    pub semantic_object_mappings: Vec<SemanticObjectMapping>,
    #[serde(default)]
    pub semantic_object_unavailable_actions: Vec<SemanticObjectUnavailableActions>,
    #[serde(default)]
    pub main_semantic_object: Option<String>,
    pub entity_type: String,
    #[serde(default)]
    pub data_field: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub navigation_path: Option<String>,
}

impl SemanticPayload {
    /// Payload for a fixed list of semantic objects
    #[must_use]
    pub fn new(semantic_objects: Vec<String>, entity_type: impl Into<String>) -> Self {
        Self {
            semantic_objects,
            entity_type: entity_type.into(),
            ..Self::default()
        }
    }

    /// Rename rules declared for `semantic_object`
    #[must_use]
    pub fn mappings_for(&self, semantic_object: &str) -> &[MappingItem] {
        self.semantic_object_mappings
            .iter()
            .find(|m| m.semantic_object == semantic_object)
            .map(|m| m.items.as_slice())
            .unwrap_or(&[])
    }

    /// Actions marked unavailable for `semantic_object`
    #[must_use]
    pub fn unavailable_actions_for(&self, semantic_object: &str) -> &[String] {
        self.semantic_object_unavailable_actions
            .iter()
            .find(|u| u.semantic_object == semantic_object)
            .map(|u| u.actions.as_slice())
            .unwrap_or(&[])
    }
}

/// A shell-addressable action identifier: `#SemanticObject-action?params`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub semantic_object: String,
    pub action: String,
    pub parameters: IndexMap<String, String>,
}

impl Intent {
    /// Intent without parameters
    #[must_use]
    pub fn new(semantic_object: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            semantic_object: semantic_object.into(),
            action: action.into(),
            parameters: IndexMap::new(),
        }
    }

    /// Whether both intents address the same target, query ignored
    #[inline]
    #[must_use]
    pub fn same_target(&self, other: &Self) -> bool {
        self.semantic_object == other.semantic_object && self.action == other.action
    }

    /// `SemanticObject-action` pair without hash or query
    #[must_use]
    pub fn target(&self) -> String {
        format!("{}-{}", self.semantic_object, self.action)
    }
}

impl Display for Intent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}-{}", self.semantic_object, self.action)?;
        for (i, (key, value)) in self.parameters.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

impl FromStr for Intent {
    type Err = IntentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix('#').unwrap_or(s);
        let (target, query) = match s.split_once('?') {
            Some((target, query)) => (target, Some(query)),
            None => (s, None),
        };

        let (semantic_object, action) = target
            .split_once('-')
            .ok_or_else(|| IntentParseError(s.to_string()))?;
        if semantic_object.is_empty() || action.is_empty() {
            return Err(IntentParseError(s.to_string()));
        }

        let mut parameters = IndexMap::new();
        if let Some(query) = query {
            for pair in query.split('&').filter(|p| !p.is_empty()) {
                match pair.split_once('=') {
                    Some((key, value)) => parameters.insert(key.to_string(), value.to_string()),
                    None => parameters.insert(pair.to_string(), String::new()),
                };
            }
        }

        Ok(Self {
            semantic_object: semantic_object.to_string(),
            action: action.to_string(),
            parameters,
        })
    }
}

/// Malformed intent hash
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid intent hash: {0}")]
pub struct IntentParseError(pub String);

/// Raw link returned by the shell's link-resolution service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellLink {
    /// Intent hash of the target
    pub intent: String,
    /// Display text
    pub text: String,
    /// Shell-provided tags (e.g. `superiorAction`)
    pub tags: Vec<String>,
}

impl ShellLink {
    /// Tag marking links that rank above the visible-count cutoff
    pub const SUPERIOR_ACTION: &'static str = "superiorAction";

    #[must_use]
    pub fn new(intent: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            text: text.into(),
            tags: Vec::new(),
        }
    }

    /// Mark as superior action
    #[must_use]
    pub fn superior(mut self) -> Self {
        self.tags.push(Self::SUPERIOR_ACTION.to_string());
        self
    }

    /// Whether the shell ranked this link as superior
    #[inline]
    #[must_use]
    pub fn is_superior(&self) -> bool {
        self.tags.iter().any(|t| t == Self::SUPERIOR_ACTION)
    }
}

/// One request to the shell's link-resolution service
#[derive(Debug, Clone, PartialEq)]
pub struct LinkQuery {
    pub semantic_object: String,
    /// Mapped attribute values forwarded as intent parameters
    pub parameters: IndexMap<String, serde_json::Value>,
}

/// A resolved navigation target offered to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkItem {
    /// Stable key (the intent target)
    pub key: String,
    /// Display text
    pub text: String,
    /// Fully qualified hash, rewritten during parameter enrichment
    pub href: String,
    /// Shown without expanding the "more links" section
    pub initially_visible: bool,
}

/// Both collections produced by target resolution
///
/// The own-navigation entry (the current app itself) is kept separate from
/// the offered actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTargets {
    pub available_actions: Vec<LinkItem>,
    pub own_navigation: Option<LinkItem>,
}

/// Attribute/parameter set persisted alongside a navigation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionVariant {
    pub parameters: IndexMap<String, serde_json::Value>,
}

impl SelectionVariant {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With one parameter
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}
