//! Impression sink interface and an in-memory counter.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use herald_core::types::{ImpressionKind, MessageId};

/// Receiver of impression counter increments, usually an analytics transport.
pub trait ImpressionSink: Send + Sync {
    /// A full message view.
    fn record_message_impression(&self, message_id: &MessageId);

    /// A non-message step of a chained campaign. Counted separately so such
    /// steps do not inflate message views.
    fn record_chained_action_impression(&self, message_id: &MessageId);
}

/// Counts impressions per message id and kind.
#[derive(Debug, Default)]
pub struct ImpressionCounter {
    counts: Mutex<HashMap<(MessageId, ImpressionKind), u64>>,
}

impl ImpressionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, message_id: &MessageId, kind: ImpressionKind) -> u64 {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(message_id.clone(), kind))
            .copied()
            .unwrap_or(0)
    }

    pub fn message_impressions(&self, message_id: &MessageId) -> u64 {
        self.count(message_id, ImpressionKind::Message)
    }

    pub fn chained_action_impressions(&self, message_id: &MessageId) -> u64 {
        self.count(message_id, ImpressionKind::ChainedAction)
    }

    /// All non-zero counters, sorted by message id then kind.
    pub fn snapshot(&self) -> Vec<(MessageId, ImpressionKind, u64)> {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<_> = counts
            .iter()
            .map(|((id, kind), n)| (id.clone(), *kind, *n))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.to_string().cmp(&b.1.to_string())));
        rows
    }

    fn increment(&self, message_id: &MessageId, kind: ImpressionKind) {
        *self
            .counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((message_id.clone(), kind))
            .or_insert(0) += 1;
    }
}

impl ImpressionSink for ImpressionCounter {
    fn record_message_impression(&self, message_id: &MessageId) {
        self.increment(message_id, ImpressionKind::Message);
    }

    fn record_chained_action_impression(&self, message_id: &MessageId) {
        self.increment(message_id, ImpressionKind::ChainedAction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_start_at_zero() {
        let counter = ImpressionCounter::new();
        let id = MessageId::new("m1");
        assert_eq!(counter.message_impressions(&id), 0);
        assert_eq!(counter.chained_action_impressions(&id), 0);
        assert!(counter.snapshot().is_empty());
    }

    #[test]
    fn test_kinds_are_counted_separately() {
        let counter = ImpressionCounter::new();
        let id = MessageId::new("m1");

        counter.record_message_impression(&id);
        counter.record_message_impression(&id);
        counter.record_chained_action_impression(&id);

        assert_eq!(counter.message_impressions(&id), 2);
        assert_eq!(counter.chained_action_impressions(&id), 1);
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let counter = ImpressionCounter::new();
        counter.record_chained_action_impression(&MessageId::new("m2"));
        counter.record_message_impression(&MessageId::new("m2"));
        counter.record_message_impression(&MessageId::new("m1"));

        let rows = counter.snapshot();
        assert_eq!(
            rows,
            vec![
                (MessageId::new("m1"), ImpressionKind::Message, 1),
                (MessageId::new("m2"), ImpressionKind::ChainedAction, 1),
                (MessageId::new("m2"), ImpressionKind::Message, 1),
            ]
        );
    }
}
