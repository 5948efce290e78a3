//! Two-ended staging area between "action requested" and "action shown".
//!
//! Holds pending actions in order. Front insertion is how chained flows jump
//! ahead of the backlog; there is no deduplication and no capacity bound.

use std::collections::VecDeque;
use uuid::Uuid;

use crate::types::Action;

/// Ordered queue of pending actions.
#[derive(Debug, Default)]
pub struct ActionQueue {
    items: VecDeque<Action>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Place an action ahead of everything queued.
    pub fn push_front(&mut self, action: Action) {
        self.items.push_front(action);
    }

    /// Place an action behind everything queued.
    pub fn push_back(&mut self, action: Action) {
        self.items.push_back(action);
    }

    /// Remove and return the earliest action, if any.
    pub fn pop_front(&mut self) -> Option<Action> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.items.iter()
    }

    /// Remove a specific entry by context id.
    pub fn remove(&mut self, id: Uuid) -> Option<Action> {
        let pos = self.items.iter().position(|a| a.id() == id)?;
        self.items.remove(pos)
    }

    /// Move the listed entries to the front, in the given order.
    ///
    /// Entries not listed keep their relative order behind them. Unknown or
    /// repeated ids are ignored.
    pub fn resequence(&mut self, order: &[Uuid]) {
        let mut front = VecDeque::with_capacity(order.len());
        for id in order {
            if let Some(action) = self.remove(*id) {
                front.push_back(action);
            }
        }
        front.append(&mut self.items);
        self.items = front;
    }

    /// Drop every pending action, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let n = self.items.len();
        self.items.clear();
        n
    }
}
