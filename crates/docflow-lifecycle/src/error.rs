//! Error types for lifecycle operations

use docflow_model::{DraftStatus, EditMode};

/// Lifecycle errors
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// Illegal edit-mode transition
    #[error("illegal edit transition: {from:?} -> {to:?}")]
    IllegalEditTransition {
        /// Current mode
        from: EditMode,
        /// Requested mode
        to: EditMode,
    },

    /// Illegal draft-status transition
    #[error("illegal draft transition: {from:?} -> {to:?}")]
    IllegalDraftTransition {
        /// Current status
        from: DraftStatus,
        /// Requested status
        to: DraftStatus,
    },

    /// Rightmost path does not descend from the root path
    ///
    /// Indicates a caller bug; never absorbed.
    #[error("path '{rightmost}' is not nested under root '{root}'")]
    PathNotNested {
        /// Root document path
        root: String,
        /// Offending rightmost path
        rightmost: String,
    },

    /// The draft sibling algorithm could not map a path segment
    #[error("sibling resolution failed at segment '{segment}': {reason}")]
    SiblingSegmentUnresolved {
        /// Segment that failed to map
        segment: String,
        /// Collaborator-provided reason
        reason: String,
    },
}

impl LifecycleError {
    /// Whether the error signals caller misuse rather than runtime state
    #[inline]
    #[must_use]
    pub fn is_caller_bug(&self) -> bool {
        matches!(self, Self::PathNotNested { .. })
    }
}
