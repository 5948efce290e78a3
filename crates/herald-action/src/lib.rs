//! Scheduling engine for Herald.
//!
//! Sequences in-app messages and chained campaign steps: classifies incoming
//! actions, holds them until their assets are ready, presents them one at a
//! time under host policy, and counts impressions.

pub mod context;
pub mod definitions;
pub mod error;
pub mod impressions;
pub mod manager;
pub mod policy;
pub mod queue;
pub mod readiness;
pub mod scheduler;
pub mod state;
pub mod types;

pub use context::{ActionContext, FileResolver};
pub use definitions::{ActionDefinitions, DefinitionRegistry};
pub use error::SchedulerError;
pub use impressions::{ImpressionCounter, ImpressionSink};
pub use manager::{ActionManager, ActionManagerBuilder, DeferredEnqueue};
pub use policy::{CallbackPolicy, DefaultPolicy, DisplayPolicy, NoopListener, PresentationListener};
pub use queue::ActionQueue;
pub use readiness::{AssetTracker, Continuation, ReadinessSource, SubscriptionId};
pub use scheduler::{Evaluation, Scheduler};
pub use state::PresentationState;
pub use types::{Action, ActionDefinition, ActionKind, Decision, Trigger, TriggerKind};
