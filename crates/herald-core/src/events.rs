use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ImpressionKind, MessageId, Placement, Timestamp};

/// Domain events emitted by the scheduling engine.
///
/// Published on a broadcast channel for observers such as analytics bridges,
/// debug overlays or the scenario runner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum DomainEvent {
    /// An action was placed in the pending queue.
    ActionQueued {
        context_id: Uuid,
        name: String,
        message_id: MessageId,
        placement: Placement,
        timestamp: Timestamp,
    },

    /// An action had missing files and its enqueue was deferred.
    ActionDeferred {
        context_id: Uuid,
        name: String,
        message_id: MessageId,
        timestamp: Timestamp,
    },

    /// A deferred enqueue was cancelled before the readiness signal fired.
    DeferralCancelled {
        context_id: Uuid,
        timestamp: Timestamp,
    },

    /// Host policy skipped a candidate during evaluation.
    MessageSkipped {
        context_id: Uuid,
        message_id: MessageId,
        discarded: bool,
        timestamp: Timestamp,
    },

    /// A message entered the displaying slot.
    MessageDisplayed {
        context_id: Uuid,
        name: String,
        message_id: MessageId,
        timestamp: Timestamp,
    },

    /// The displayed message was dismissed.
    MessageDismissed {
        context_id: Uuid,
        message_id: MessageId,
        timestamp: Timestamp,
    },

    /// The user acted upon the displayed message.
    MessageActed {
        context_id: Uuid,
        message_id: MessageId,
        action_name: String,
        timestamp: Timestamp,
    },

    /// An impression counter was incremented.
    ImpressionRecorded {
        message_id: MessageId,
        kind: ImpressionKind,
        timestamp: Timestamp,
    },
}

impl DomainEvent {
    /// Snake-case name of the event variant.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::ActionQueued { .. } => "action_queued",
            DomainEvent::ActionDeferred { .. } => "action_deferred",
            DomainEvent::DeferralCancelled { .. } => "deferral_cancelled",
            DomainEvent::MessageSkipped { .. } => "message_skipped",
            DomainEvent::MessageDisplayed { .. } => "message_displayed",
            DomainEvent::MessageDismissed { .. } => "message_dismissed",
            DomainEvent::MessageActed { .. } => "message_acted",
            DomainEvent::ImpressionRecorded { .. } => "impression_recorded",
        }
    }
}
