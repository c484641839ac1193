use docflow_lifecycle::{
    allowed_draft_transitions, allowed_edit_transitions, validate_draft_transition,
    validate_edit_transition,
};
use docflow_model::{DraftStatus, EditMode};
use proptest::prelude::*;

#[test]
fn edit_transitions_are_symmetric() {
    assert!(validate_edit_transition(EditMode::Display, EditMode::Editable).is_ok());
    assert!(validate_edit_transition(EditMode::Editable, EditMode::Display).is_ok());

    // Invalid
    assert!(validate_edit_transition(EditMode::Display, EditMode::Display).is_err());
    assert!(validate_edit_transition(EditMode::Editable, EditMode::Editable).is_err());
}

#[test]
fn saving_is_the_only_exit_from_clear() {
    assert_eq!(
        allowed_draft_transitions(DraftStatus::Clear),
        vec![DraftStatus::Saving]
    );
}

proptest! {
    #[test]
    fn prop_edit_validation_matches_allowed(
        from in prop_oneof![Just(EditMode::Display), Just(EditMode::Editable)],
        to in prop_oneof![Just(EditMode::Display), Just(EditMode::Editable)],
    ) {
        let res = validate_edit_transition(from, to);
        let allowed = allowed_edit_transitions(from);

        if res.is_ok() {
            prop_assert!(allowed.contains(&to));
        } else {
            prop_assert!(!allowed.contains(&to));
        }
    }

    #[test]
    fn prop_draft_validation_matches_allowed(
        from in prop_oneof![
            Just(DraftStatus::Clear),
            Just(DraftStatus::Saving),
            Just(DraftStatus::Saved),
        ],
        to in prop_oneof![
            Just(DraftStatus::Clear),
            Just(DraftStatus::Saving),
            Just(DraftStatus::Saved),
        ],
    ) {
        let res = validate_draft_transition(from, to);
        let allowed = allowed_draft_transitions(from);

        if res.is_ok() {
            prop_assert!(allowed.contains(&to));
        } else {
            prop_assert!(!allowed.contains(&to));
        }
    }
}
