//! Error types for the scheduling engine.

use crate::state::PresentationState;
use herald_core::error::HeraldError;

/// Errors from the scheduler and presentation lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Invalid presentation transition: {0} -> {1}")]
    InvalidTransition(PresentationState, PresentationState),
    #[error("No message is currently displayed")]
    NothingDisplayed,
}

impl From<SchedulerError> for HeraldError {
    fn from(err: SchedulerError) -> Self {
        HeraldError::Scheduling(err.to_string())
    }
}
