//! Host-supplied display policy and presentation listeners.
//!
//! The host decides per candidate whether it may be shown now, and may
//! reorder a batch of eligible candidates with knowledge the engine lacks
//! (campaign priority, frequency caps). Both hooks have neutral defaults.

use crate::context::ActionContext;
use crate::types::{Decision, Trigger};

/// Eligibility and ordering strategy consulted by the scheduler.
///
/// Called synchronously while the scheduler lock is held, so implementations
/// must not call back into the manager.
pub trait DisplayPolicy: Send + Sync {
    /// Gate a single candidate. Defaults to [`Decision::Show`].
    fn decide(&self, _context: &ActionContext) -> Decision {
        Decision::Show
    }

    /// Reorder the eligible batch. Defaults to keeping the given order.
    ///
    /// The first context of the result is displayed next. Contexts left out
    /// stay queued but are not displayed during this evaluation.
    fn reorder(
        &self,
        contexts: Vec<ActionContext>,
        _trigger: Option<&Trigger>,
    ) -> Vec<ActionContext> {
        contexts
    }
}

/// Lifecycle notifications. Fire-and-forget; every method defaults to a no-op.
pub trait PresentationListener: Send + Sync {
    fn on_displayed(&self, _context: &ActionContext) {}

    fn on_dismissed(&self, _context: &ActionContext) {}

    fn on_action(&self, _action_name: &str, _context: &ActionContext) {}
}

/// Shows everything in queue order.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPolicy;

impl DisplayPolicy for DefaultPolicy {}

/// Ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl PresentationListener for NoopListener {}

type DecideFn = Box<dyn Fn(&ActionContext) -> Decision + Send + Sync>;
type ReorderFn = Box<dyn Fn(Vec<ActionContext>, Option<&Trigger>) -> Vec<ActionContext> + Send + Sync>;

/// Policy built from optional host closures.
///
/// An unset closure falls back to the neutral behavior of [`DefaultPolicy`].
#[derive(Default)]
pub struct CallbackPolicy {
    should_display: Option<DecideFn>,
    sort_and_order: Option<ReorderFn>,
}

impl CallbackPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_display<F>(mut self, f: F) -> Self
    where
        F: Fn(&ActionContext) -> Decision + Send + Sync + 'static,
    {
        self.should_display = Some(Box::new(f));
        self
    }

    pub fn sort_and_order<F>(mut self, f: F) -> Self
    where
        F: Fn(Vec<ActionContext>, Option<&Trigger>) -> Vec<ActionContext> + Send + Sync + 'static,
    {
        self.sort_and_order = Some(Box::new(f));
        self
    }
}

impl DisplayPolicy for CallbackPolicy {
    fn decide(&self, context: &ActionContext) -> Decision {
        match &self.should_display {
            Some(f) => f(context),
            None => Decision::Show,
        }
    }

    fn reorder(
        &self,
        contexts: Vec<ActionContext>,
        trigger: Option<&Trigger>,
    ) -> Vec<ActionContext> {
        match &self.sort_and_order {
            Some(f) => f(contexts, trigger),
            None => contexts,
        }
    }
}
