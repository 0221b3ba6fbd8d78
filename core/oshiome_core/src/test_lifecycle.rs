use crate::errors::DomainError;
use crate::invariants;
use crate::lifecycle::{can_transition, transition};
use crate::types::CampaignStatus::*;

#[test]
fn forward_transitions_are_allowed() {
    invariants::assert_valid_status_transition(Draft, Active);
    invariants::assert_valid_status_transition(Draft, Cancelled);
    invariants::assert_valid_status_transition(Active, Ended);
    invariants::assert_valid_status_transition(Active, Cancelled);

    assert_eq!(transition(Draft, Active), Ok(Active));
    assert_eq!(transition(Active, Ended), Ok(Ended));
}

#[test]
fn no_cycle_back_to_draft() {
    for from in [Active, Ended, Cancelled] {
        assert!(!can_transition(from, Draft));
    }
}

#[test]
fn terminal_states_have_no_exits() {
    for from in [Ended, Cancelled] {
        assert!(from.is_terminal());
        for to in [Draft, Active, Ended, Cancelled] {
            assert_eq!(
                transition(from, to),
                Err(DomainError::InvalidTransition { from, to })
            );
        }
    }
}

#[test]
fn self_transitions_are_rejected() {
    for status in [Draft, Active, Ended, Cancelled] {
        assert!(!can_transition(status, status));
    }
}

#[test]
fn unknown_is_never_a_valid_endpoint() {
    for status in [Draft, Active, Ended, Cancelled, Unknown] {
        assert!(!can_transition(Unknown, status));
        assert!(!can_transition(status, Unknown));
    }
}

#[test]
fn draft_cannot_skip_to_ended() {
    assert_eq!(
        transition(Draft, Ended),
        Err(DomainError::InvalidTransition {
            from: Draft,
            to: Ended
        })
    );
}

#[test]
fn status_string_round_trip() {
    use crate::types::CampaignStatus;
    for status in [Draft, Active, Ended, Cancelled] {
        assert_eq!(CampaignStatus::from_str_loose(status.as_str()), status);
    }
    assert_eq!(CampaignStatus::from_str_loose("archived"), Unknown);
}
