//! docflow lifecycle
//!
//! The draft/sticky session rules:
//! - Pure edit-mode and draft-status transition tables
//! - Sibling context resolution with path remapping
//!
//! The transaction orchestrator drives these rules; nothing here performs
//! I/O beyond the draft sibling collaborator.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod sibling;
pub mod state;

// Re-exports for convenience
pub use error::LifecycleError;
pub use sibling::{remap_path, DraftSiblingAlgorithm, SiblingResolver};
pub use state::{
    allowed_draft_transitions, allowed_edit_transitions, validate_draft_transition,
    validate_edit_transition,
};
