//! Per-page session state
//!
//! Defines the explicit session struct tracking edit mode, draft status and
//! creation mode for one page, plus the programming-model discriminator.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique session identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Ulid);

impl SessionId {
    /// Generate new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle rules applied to an entity set
///
/// Fixed per entity set, read from metadata; never changes while a context
/// for that set is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgrammingModel {
    /// Editable shadow copy with explicit activation
    Draft,
    /// Server-side edit session held open by a token
    Sticky,
    /// Direct updates without draft or session
    NoDraftSupport,
}

impl ProgrammingModel {
    /// Whether edits run against a draft shadow copy
    #[inline]
    #[must_use]
    pub fn uses_draft(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Whether edits are held open by a server session token
    #[inline]
    #[must_use]
    pub fn uses_sticky_session(&self) -> bool {
        matches!(self, Self::Sticky)
    }
}

/// Page display/edit mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditMode {
    /// Read-only presentation of the active document
    #[default]
    Display,
    /// Draft or sticky edit session in progress
    Editable,
}

/// Draft persistence sub-state, orthogonal to [`EditMode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DraftStatus {
    /// No save in flight
    #[default]
    Clear,
    /// Save request submitted, outcome pending
    Saving,
    /// Last save completed successfully
    Saved,
}

/// How a new document is brought into existence and navigated to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreationMode {
    /// Navigate first, create when the target page materializes
    Deferred,
    /// Navigate and create in parallel
    Async,
    /// Create, then navigate to the result
    Sync,
    /// In-table inline row
    Inline,
    /// Editable creation row above the table
    CreationRow,
    /// Hand off to an external application
    External,
}

/// Mutable per-page session state
///
/// Created at session attach, mutated by every transaction operation,
/// reset on navigation away.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Current page mode
    pub edit_mode: EditMode,
    /// Unsaved user changes exist
    pub document_modified: bool,
    /// Save sub-state
    pub draft_status: DraftStatus,
    /// Creation mode of an in-flight create, if any
    pub creation_mode: Option<CreationMode>,
    /// Sticky edit-session token from response headers, if any
    pub sticky_session_token: Option<String>,
}

impl SessionState {
    /// Fresh display-mode state
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return every field to its display-mode default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether a sticky session is currently attached
    #[inline]
    #[must_use]
    pub fn has_sticky_session(&self) -> bool {
        self.sticky_session_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_generation() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn programming_model_predicates() {
        assert!(ProgrammingModel::Draft.uses_draft());
        assert!(!ProgrammingModel::Sticky.uses_draft());
        assert!(ProgrammingModel::Sticky.uses_sticky_session());
        assert!(!ProgrammingModel::NoDraftSupport.uses_sticky_session());
    }

    #[test]
    fn session_state_reset() {
        let mut state = SessionState::new();
        state.edit_mode = EditMode::Editable;
        state.document_modified = true;
        state.draft_status = DraftStatus::Saving;
        state.sticky_session_token = Some("token".to_string());

        state.reset();
        assert_eq!(state, SessionState::default());
        assert!(!state.has_sticky_session());
    }
}
