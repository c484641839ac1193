//! Collaborator contracts for shell and app-state integration

use crate::error::NavError;
use crate::types::{LinkQuery, SelectionVariant, ShellLink};
use async_trait::async_trait;
use indexmap::IndexMap;

/// Host shell runtime services
///
/// Consumed as-is; absence of the shell degrades resolution to an empty
/// result instead of failing.
#[async_trait]
pub trait ShellServices: Send + Sync {
    /// Whether a shell runtime is present
    fn is_available(&self) -> bool;

    /// Resolve navigation targets, one result bucket per query
    async fn get_links(&self, queries: &[LinkQuery]) -> Result<Vec<Vec<ShellLink>>, NavError>;

    /// Expand a compacted app-state hash into its full form
    async fn expand_compact_hash(&self, hash: &str) -> Result<String, NavError>;

    /// Intent target (`SemanticObject-action`) of the currently running app
    fn current_app_target(&self) -> String;
}

/// Generated app-state key plus the URL parameters carrying it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppStateEntry {
    /// Persisted key, appended as `sap-xapp-state`
    pub key: String,
    /// URL parameters derived from the selection variant
    pub url_parameters: IndexMap<String, String>,
}

/// App-state persistence used during link-parameter enrichment
#[async_trait]
pub trait AppStateService: Send + Sync {
    /// Persist the selection variant and return its key and URL parameters
    async fn app_state_key_and_url_parameters(
        &self,
        selection_variant: &SelectionVariant,
    ) -> Result<AppStateEntry, NavError>;

    /// Merge context attributes into the selection variant
    fn mix_attributes_and_selection_variant(
        &self,
        attributes: &serde_json::Map<String, serde_json::Value>,
        selection_variant: &SelectionVariant,
    ) -> SelectionVariant;
}
