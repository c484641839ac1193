//! Document contexts
//!
//! Defines [`DocumentContext`], the opaque handle to one business-object
//! instance at a data path, together with its lifecycle flags.

use crate::path::DocPath;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle flags carried by every document context
///
/// Mirrors the annotations the hosting data model maintains per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentFlags {
    /// Instance is the active (persisted) document
    pub is_active_entity: bool,
    /// An active sibling exists for this draft
    pub has_active_entity: bool,
    /// A draft sibling exists for this active document
    pub has_draft_entity: bool,
}

impl DocumentFlags {
    /// Flags for an active document without a draft shadow
    #[inline]
    #[must_use]
    pub fn active() -> Self {
        Self {
            is_active_entity: true,
            has_active_entity: false,
            has_draft_entity: false,
        }
    }

    /// Flags for a draft edited from an existing active document
    #[inline]
    #[must_use]
    pub fn draft_of_active() -> Self {
        Self {
            is_active_entity: false,
            has_active_entity: true,
            has_draft_entity: false,
        }
    }

    /// Flags for a newly created draft with no active sibling yet
    #[inline]
    #[must_use]
    pub fn new_draft() -> Self {
        Self::default()
    }
}

/// Handle to a business-object instance at a data path
///
/// Owned by the hosting page session; the engine reads its path, flags and
/// attribute snapshot but never mutates persisted state through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentContext {
    /// Data path of the instance
    pub path: DocPath,
    /// Entity set the instance belongs to
    pub entity_set: String,
    /// Fully qualified entity type
    pub entity_type: String,
    /// Lifecycle flags
    pub flags: DocumentFlags,
    /// Key property names of the entity type
    pub keys: Vec<String>,
    /// Attribute values as last materialized by the hosting model
    pub properties: Map<String, Value>,
}

impl DocumentContext {
    /// Create a context with empty attribute snapshot
    #[must_use]
    pub fn new(path: DocPath, entity_set: impl Into<String>) -> Self {
        let entity_set = entity_set.into();
        let entity_type = entity_set.clone();
        Self {
            path,
            entity_set,
            entity_type,
            flags: DocumentFlags::active(),
            keys: Vec::new(),
            properties: Map::new(),
        }
    }

    /// With entity type
    #[inline]
    #[must_use]
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = entity_type.into();
        self
    }

    /// With lifecycle flags
    #[inline]
    #[must_use]
    pub fn with_flags(mut self, flags: DocumentFlags) -> Self {
        self.flags = flags;
        self
    }

    /// With key property names
    #[inline]
    #[must_use]
    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }

    /// With an attribute value
    #[inline]
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Whether this instance is a draft
    #[inline]
    #[must_use]
    pub fn is_draft(&self) -> bool {
        !self.flags.is_active_entity
    }

    /// Whether this instance is the active document
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.flags.is_active_entity
    }

    /// Whether this is a new document: a draft with no active sibling yet
    #[inline]
    #[must_use]
    pub fn is_new_document(&self) -> bool {
        !self.flags.is_active_entity && !self.flags.has_active_entity
    }

    /// Get an attribute value by name
    #[inline]
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Current values of the key properties, in declaration order
    ///
    /// Missing keys yield `Value::Null` so positions stay aligned.
    #[must_use]
    pub fn key_values(&self) -> Vec<Value> {
        self.keys
            .iter()
            .map(|k| self.properties.get(k).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

/// Path remapping entry produced by sibling resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMapping {
    /// Path under the previous lifecycle state
    pub old_path: DocPath,
    /// Equivalent path under the sibling document
    pub new_path: DocPath,
}

/// Result of sibling context resolution
///
/// Computed transiently per navigation event; not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SiblingInformation {
    /// The corresponding context in the other lifecycle state
    pub target: DocumentContext,
    /// Segment-by-segment remapping from old to new paths
    pub path_mapping: Vec<PathMapping>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn order_path() -> DocPath {
        DocPath::from_str("SalesOrder(1)").unwrap()
    }

    #[test]
    fn context_builder() {
        let ctx = DocumentContext::new(order_path(), "SalesOrder")
            .with_entity_type("com.acme.SalesOrderType")
            .with_keys(vec!["ID".to_string()])
            .with_property("ID", json!(1));

        assert_eq!(ctx.entity_type, "com.acme.SalesOrderType");
        assert_eq!(ctx.property("ID"), Some(&json!(1)));
    }

    #[test]
    fn new_document_detection() {
        let new_draft = DocumentContext::new(order_path(), "SalesOrder")
            .with_flags(DocumentFlags::new_draft());
        assert!(new_draft.is_new_document());
        assert!(new_draft.is_draft());

        let draft = DocumentContext::new(order_path(), "SalesOrder")
            .with_flags(DocumentFlags::draft_of_active());
        assert!(!draft.is_new_document());
        assert!(draft.is_draft());

        let active =
            DocumentContext::new(order_path(), "SalesOrder").with_flags(DocumentFlags::active());
        assert!(active.is_active());
        assert!(!active.is_new_document());
    }

    #[test]
    fn key_values_align_with_declared_keys() {
        let ctx = DocumentContext::new(order_path(), "SalesOrder")
            .with_keys(vec!["ID".to_string(), "Version".to_string()])
            .with_property("ID", json!(1));

        assert_eq!(ctx.key_values(), vec![json!(1), Value::Null]);
    }
}
