//! Presentation state machine with validated transitions.
//!
//! One presentation cycle runs:
//! Idle -> Evaluating -> Displaying -> Dismissed/ActedUpon -> Idle
//! Evaluating -> Idle when nothing in the queue is eligible.

use std::fmt;

use crate::error::SchedulerError;

/// Phase of the single presentation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresentationState {
    /// Nothing displayed, ready to evaluate the queue.
    Idle,
    /// Host policy is being consulted for the queued candidates.
    Evaluating,
    /// A message occupies the slot.
    Displaying,
    /// The displayed message was closed without action.
    Dismissed,
    /// The user acted upon the displayed message.
    ActedUpon,
}

impl fmt::Display for PresentationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresentationState::Idle => write!(f, "idle"),
            PresentationState::Evaluating => write!(f, "evaluating"),
            PresentationState::Displaying => write!(f, "displaying"),
            PresentationState::Dismissed => write!(f, "dismissed"),
            PresentationState::ActedUpon => write!(f, "acted_upon"),
        }
    }
}

impl PresentationState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &PresentationState) -> bool {
        matches!(
            (self, target),
            (PresentationState::Idle, PresentationState::Evaluating)
                | (PresentationState::Evaluating, PresentationState::Displaying)
                | (PresentationState::Evaluating, PresentationState::Idle)
                | (PresentationState::Displaying, PresentationState::Dismissed)
                | (PresentationState::Displaying, PresentationState::ActedUpon)
                | (PresentationState::Dismissed, PresentationState::Idle)
                | (PresentationState::ActedUpon, PresentationState::Idle)
        )
    }

    /// Whether the single-flight slot is occupied.
    pub fn is_occupied(&self) -> bool {
        !matches!(self, PresentationState::Idle)
    }
}

/// Validate that a presentation transition is allowed.
pub fn validate_transition(
    from: PresentationState,
    to: PresentationState,
) -> Result<(), SchedulerError> {
    if from.can_transition_to(&to) {
        Ok(())
    } else {
        Err(SchedulerError::InvalidTransition(from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PresentationState; 5] = [
        PresentationState::Idle,
        PresentationState::Evaluating,
        PresentationState::Displaying,
        PresentationState::Dismissed,
        PresentationState::ActedUpon,
    ];

    #[test]
    fn test_state_display() {
        assert_eq!(PresentationState::Idle.to_string(), "idle");
        assert_eq!(PresentationState::ActedUpon.to_string(), "acted_upon");
    }

    #[test]
    fn test_full_cycle_dismissed() {
        assert!(validate_transition(PresentationState::Idle, PresentationState::Evaluating).is_ok());
        assert!(
            validate_transition(PresentationState::Evaluating, PresentationState::Displaying).is_ok()
        );
        assert!(
            validate_transition(PresentationState::Displaying, PresentationState::Dismissed).is_ok()
        );
        assert!(validate_transition(PresentationState::Dismissed, PresentationState::Idle).is_ok());
    }

    #[test]
    fn test_acted_upon_returns_to_idle() {
        assert!(
            validate_transition(PresentationState::Displaying, PresentationState::ActedUpon).is_ok()
        );
        assert!(validate_transition(PresentationState::ActedUpon, PresentationState::Idle).is_ok());
    }

    #[test]
    fn test_empty_evaluation_returns_to_idle() {
        assert!(validate_transition(PresentationState::Evaluating, PresentationState::Idle).is_ok());
    }

    #[test]
    fn test_cannot_display_without_evaluating() {
        let err =
            validate_transition(PresentationState::Idle, PresentationState::Displaying).unwrap_err();
        assert!(err.to_string().contains("idle -> displaying"));
    }

    #[test]
    fn test_displaying_cannot_reevaluate() {
        assert!(
            validate_transition(PresentationState::Displaying, PresentationState::Evaluating)
                .is_err()
        );
        assert!(validate_transition(PresentationState::Displaying, PresentationState::Idle).is_err());
    }

    #[test]
    fn test_self_transitions_invalid() {
        for state in ALL {
            assert!(validate_transition(state, state).is_err());
        }
    }

    #[test]
    fn test_all_valid_transitions_count() {
        let mut valid_count = 0;
        for from in &ALL {
            for to in &ALL {
                if validate_transition(*from, *to).is_ok() {
                    valid_count += 1;
                }
            }
        }
        assert_eq!(valid_count, 7, "Expected exactly 7 valid transitions");
    }

    #[test]
    fn test_is_occupied() {
        assert!(!PresentationState::Idle.is_occupied());
        assert!(PresentationState::Displaying.is_occupied());
        assert!(PresentationState::Evaluating.is_occupied());
    }
}
