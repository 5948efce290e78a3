//! Readiness gate for actions whose assets are still downloading.
//!
//! An action with missing files is not queued right away. Its enqueue is
//! registered as a one-shot continuation against the "no downloads pending"
//! signal and runs exactly once when that signal fires, unless cancelled.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use crate::context::FileResolver;

/// Deferred work run when the readiness signal fires.
pub type Continuation = Box<dyn FnOnce() + Send + 'static>;

/// Handle for a registered continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of the "variables changed and no downloads pending" signal.
pub trait ReadinessSource: Send + Sync {
    /// Register a continuation to run once, the next time the signal fires.
    fn once_no_downloads_pending(&self, continuation: Continuation) -> SubscriptionId;

    /// Drop a registered continuation. Returns `false` if it already fired
    /// or was never registered.
    fn cancel(&self, id: SubscriptionId) -> bool;
}

#[derive(Default)]
struct TrackerState {
    pending: HashSet<String>,
    available: HashSet<String>,
    waiters: Vec<(SubscriptionId, Continuation)>,
}

/// In-process download bookkeeping.
///
/// Acts as both the [`FileResolver`] for action contexts and the
/// [`ReadinessSource`] for the manager. The signal fires whenever the set of
/// pending downloads drains to empty, and on [`AssetTracker::variables_changed`]
/// while nothing is pending.
#[derive(Default)]
pub struct AssetTracker {
    state: Mutex<TrackerState>,
}

impl AssetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a download for `path` has started.
    pub fn begin_download(&self, path: impl Into<String>) {
        let path = path.into();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.available.remove(&path);
        tracing::debug!(path = %path, "Asset download started");
        state.pending.insert(path);
    }

    /// Mark a download finished. Fires the signal if nothing else is pending.
    pub fn finish_download(&self, path: &str) -> usize {
        let drained = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.pending.remove(path);
            state.available.insert(path.to_string());
            state.pending.is_empty()
        };
        tracing::debug!(path = %path, "Asset download finished");
        if drained {
            self.fire()
        } else {
            0
        }
    }

    /// Mark a download failed. The asset stays missing, but the download no
    /// longer counts as pending.
    pub fn fail_download(&self, path: &str) -> usize {
        let drained = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.pending.remove(path);
            state.pending.is_empty()
        };
        tracing::warn!(path = %path, "Asset download failed");
        if drained {
            self.fire()
        } else {
            0
        }
    }

    /// Register an asset that is already on disk.
    pub fn mark_available(&self, path: impl Into<String>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.available.insert(path.into());
    }

    /// Notify that variables were refreshed. Fires the signal when no
    /// download is pending.
    pub fn variables_changed(&self) -> usize {
        let idle = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .is_empty();
        if idle {
            self.fire()
        } else {
            0
        }
    }

    pub fn pending_downloads(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .len()
    }

    /// Number of continuations waiting for the signal.
    pub fn waiting(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .waiters
            .len()
    }

    /// Run every registered continuation in registration order.
    ///
    /// Continuations are taken out before any runs, so each fires at most
    /// once and may register new ones for the next signal.
    fn fire(&self) -> usize {
        let waiters = std::mem::take(
            &mut self
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .waiters,
        );
        let fired = waiters.len();
        if fired > 0 {
            tracing::debug!(fired, "Readiness signal fired");
        }
        for (_, continuation) in waiters {
            continuation();
        }
        fired
    }
}

impl FileResolver for AssetTracker {
    fn is_available(&self, path: &str) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.available.contains(path) && !state.pending.contains(path)
    }
}

impl ReadinessSource for AssetTracker {
    fn once_no_downloads_pending(&self, continuation: Continuation) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .waiters
            .push((id, continuation));
        id
    }

    fn cancel(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let before = state.waiters.len();
        state.waiters.retain(|(waiter, _)| *waiter != id);
        state.waiters.len() != before
    }
}
