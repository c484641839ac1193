//! Collaborator contracts
//!
//! Every interface here is consumed, never implemented, by this crate: the
//! hosting runtime provides persistence, routing, messaging and metadata.

use crate::error::TxError;
use async_trait::async_trait;
use docflow_model::{DocPath, DocumentContext};
use serde_json::{Map, Value};

/// Result of requesting an editable document
#[derive(Debug, Clone)]
pub struct EditResult {
    /// The editable (draft or sticky) context
    pub context: DocumentContext,
    /// Edit-session token from response headers, when the backend holds one
    pub sticky_session_token: Option<String>,
}

/// Response of an action invocation
#[derive(Debug, Clone, Default)]
pub struct ActionResponse {
    /// Context returned by the action, if any
    pub context: Option<DocumentContext>,
}

/// Persistence operations, delegated to the hosting transaction layer
///
/// Assumed to perform the actual network I/O; errors come back as
/// [`TxError`] variants (soft sentinels included).
#[async_trait]
pub trait TransactionService: Send + Sync {
    /// Request a new editable document for the given active context
    async fn edit_document(&self, context: &DocumentContext) -> Result<EditResult, TxError>;

    /// Create a document instance under `target` with the given data
    async fn create_document(
        &self,
        target: &DocPath,
        data: &Map<String, Value>,
    ) -> Result<DocumentContext, TxError>;

    /// Persist the editable document; returns the resulting active context
    async fn save_document(&self, context: &DocumentContext)
        -> Result<DocumentContext, TxError>;

    /// Discard the editable document; returns the active sibling, if one exists
    async fn cancel_document(
        &self,
        context: &DocumentContext,
    ) -> Result<Option<DocumentContext>, TxError>;

    /// Delete the document instance
    async fn delete_document(&self, context: &DocumentContext) -> Result<(), TxError>;

    /// Invoke an action; `bound_to` carries the binding context for bound actions
    async fn call_action(
        &self,
        name: &str,
        bound_to: Option<&DocumentContext>,
        parameters: &Map<String, Value>,
    ) -> Result<ActionResponse, TxError>;

    /// Request server-side validation of the document
    async fn validate_document(&self, context: &DocumentContext) -> Result<(), TxError>;

    /// Submit all pending changes of the current batch group
    async fn submit_pending_changes(&self) -> Result<(), TxError>;
}

/// Routing operations of the hosting page
#[async_trait]
pub trait NavigationListener: Send + Sync {
    async fn navigate_to_context(&self, context: &DocumentContext) -> Result<(), TxError>;

    async fn navigate_forward_to_context(&self, context: &DocumentContext)
        -> Result<(), TxError>;

    async fn navigate_back_from_context(&self, context: &DocumentContext)
        -> Result<(), TxError>;

    /// Leave a transient (not yet persisted) page after a cancelled creation
    async fn navigate_back_from_transient_state(&self) -> Result<(), TxError>;

    async fn navigate_to_message_page(&self, message: &str) -> Result<(), TxError>;

    /// Hand off to an external application
    async fn navigate_external(
        &self,
        outbound: &str,
        parameters: &Map<String, Value>,
    ) -> Result<(), TxError>;
}

/// Message surface of the hosting page
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn show_message_dialog(&self);

    async fn show_messages(&self);

    /// Drop transition-scoped messages accumulated by the last operation
    fn remove_transition_messages(&self);
}

/// Activity kinds broadcast to collaboration sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Create,
    Activate,
    Delete,
}

/// Collaboration-draft integration
#[async_trait]
pub trait CollaborationService: Send + Sync {
    /// Whether a collaboration session is connected for this page
    fn is_connected(&self) -> bool;

    /// Share the document with connected collaborators
    async fn share(&self, context: &DocumentContext) -> Result<(), TxError>;

    /// Broadcast a lifecycle activity
    async fn send_activity(
        &self,
        kind: ActivityKind,
        context: &DocumentContext,
    ) -> Result<(), TxError>;
}

/// Entity metadata lookups backing creation-mode and action resolution
pub trait ActionMetadata: Send + Sync {
    /// Whether `action` is bound to `entity_type`
    fn is_bound(&self, action: &str, entity_type: &str) -> bool;

    /// Parameterized creation action declared for the entity set, if any
    fn creation_action(&self, entity_set: &str) -> Option<String>;

    /// Non-computed mandatory key fields of the entity set
    fn mandatory_key_fields(&self, entity_set: &str) -> Vec<String>;
}

/// A dependent list binding on the hosting page
///
/// Used for draft/active entry swaps before deletion and for post-action
/// refreshes.
#[async_trait]
pub trait ListBinding: Send + Sync {
    /// Contexts currently materialized in the list
    fn contexts(&self) -> Vec<DocumentContext>;

    /// Replace one list entry with another context, in place
    async fn swap_entry(
        &self,
        old: &DocumentContext,
        new: &DocumentContext,
    ) -> Result<(), TxError>;

    /// Re-read the whole binding
    async fn refresh(&self) -> Result<(), TxError>;
}
