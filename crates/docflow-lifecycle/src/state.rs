//! Edit-mode and draft-status transition rules
//!
//! Pure transition tables; the orchestrator drives them and owns the
//! surrounding side effects.

use crate::error::LifecycleError;
use docflow_model::{DraftStatus, EditMode};

/// Validates an edit-mode transition.
///
/// `Display -> Editable` via edit; `Editable -> Display` via
/// save/cancel/discard. Self-transitions are illegal.
pub fn validate_edit_transition(from: EditMode, to: EditMode) -> Result<(), LifecycleError> {
    if allowed_edit_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(LifecycleError::IllegalEditTransition { from, to })
    }
}

/// Edit modes reachable from `from`
#[must_use]
pub fn allowed_edit_transitions(from: EditMode) -> Vec<EditMode> {
    match from {
        EditMode::Display => vec![EditMode::Editable],
        EditMode::Editable => vec![EditMode::Display],
    }
}

/// Validates a draft-status transition.
///
/// `Clear -> Saving -> Saved -> Clear`, with `Saving -> Clear` as the
/// failure reset.
pub fn validate_draft_transition(from: DraftStatus, to: DraftStatus) -> Result<(), LifecycleError> {
    if allowed_draft_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(LifecycleError::IllegalDraftTransition { from, to })
    }
}

/// Draft statuses reachable from `from`
#[must_use]
pub fn allowed_draft_transitions(from: DraftStatus) -> Vec<DraftStatus> {
    use DraftStatus::*;
    match from {
        Clear => vec![Saving],
        Saving => vec![Saved, Clear],
        Saved => vec![Clear],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_display_to_editable() {
        assert!(validate_edit_transition(EditMode::Display, EditMode::Editable).is_ok());
        assert!(validate_edit_transition(EditMode::Editable, EditMode::Display).is_ok());
    }

    #[test]
    fn edit_self_transition_rejected() {
        assert!(validate_edit_transition(EditMode::Display, EditMode::Display).is_err());
        assert!(validate_edit_transition(EditMode::Editable, EditMode::Editable).is_err());
    }

    #[test]
    fn draft_happy_path() {
        assert!(validate_draft_transition(DraftStatus::Clear, DraftStatus::Saving).is_ok());
        assert!(validate_draft_transition(DraftStatus::Saving, DraftStatus::Saved).is_ok());
        assert!(validate_draft_transition(DraftStatus::Saved, DraftStatus::Clear).is_ok());
    }

    #[test]
    fn draft_failure_reset() {
        assert!(validate_draft_transition(DraftStatus::Saving, DraftStatus::Clear).is_ok());
    }

    #[test]
    fn draft_skip_saving_rejected() {
        assert!(validate_draft_transition(DraftStatus::Clear, DraftStatus::Saved).is_err());
        assert!(validate_draft_transition(DraftStatus::Saved, DraftStatus::Saving).is_err());
    }
}
