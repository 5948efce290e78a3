//! Action manager: public entry point of the scheduling engine.
//!
//! Classifies incoming actions, gates them on asset readiness, feeds the
//! scheduler, records impressions and relays lifecycle notifications to the
//! host. All queue and presentation state sits behind one lock inside the
//! scheduler; deferred enqueues re-acquire it when they fire.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use herald_core::config::MessagingConfig;
use herald_core::events::DomainEvent;
use herald_core::types::{ImpressionKind, Placement, Timestamp};
use tokio::sync::{broadcast, Notify};
use uuid::Uuid;

use crate::context::ActionContext;
use crate::definitions::{ActionDefinitions, DefinitionRegistry};
use crate::error::SchedulerError;
use crate::impressions::{ImpressionCounter, ImpressionSink};
use crate::policy::{DefaultPolicy, DisplayPolicy, NoopListener, PresentationListener};
use crate::readiness::{AssetTracker, ReadinessSource, SubscriptionId};
use crate::scheduler::Scheduler;
use crate::state::PresentationState;
use crate::types::{Action, ActionKind};

struct ManagerInner {
    scheduler: Mutex<Scheduler>,
    enabled: AtomicBool,
    policy: Box<dyn DisplayPolicy>,
    listener: Box<dyn PresentationListener>,
    readiness: Arc<dyn ReadinessSource>,
    definitions: Arc<dyn DefinitionRegistry>,
    impressions: Arc<dyn ImpressionSink>,
    events: broadcast::Sender<DomainEvent>,
    wake: Notify,
    shutdown: Notify,
}

impl ManagerInner {
    fn scheduler(&self) -> MutexGuard<'_, Scheduler> {
        self.scheduler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: DomainEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Put ready actions in the queue one at a time, in call order. Each
    /// front entry goes to the very front, so a front batch ends up reversed.
    fn enqueue_now(&self, actions: Vec<Action>, placement: Placement) {
        if actions.is_empty() {
            return;
        }
        let queued: Vec<ActionContext> = {
            let mut scheduler = self.scheduler();
            actions
                .into_iter()
                .map(|action| {
                    let ctx = action.context().clone();
                    scheduler.enqueue(action, placement);
                    ctx
                })
                .collect()
        };

        for ctx in queued {
            tracing::debug!(
                name = %ctx.name(),
                message_id = %ctx.message_id(),
                placement = %placement,
                "Action queued"
            );
            self.emit(DomainEvent::ActionQueued {
                context_id: ctx.id(),
                name: ctx.name().to_string(),
                message_id: ctx.message_id().clone(),
                placement,
                timestamp: Timestamp::now(),
            });
        }
        self.wake.notify_one();
    }
}

/// Pending enqueue waiting for the readiness signal.
///
/// Dropping the handle leaves the continuation registered; call
/// [`DeferredEnqueue::cancel`] to withdraw it.
pub struct DeferredEnqueue {
    subscription: SubscriptionId,
    context_id: Uuid,
    readiness: Arc<dyn ReadinessSource>,
    events: broadcast::Sender<DomainEvent>,
}

impl DeferredEnqueue {
    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    pub fn context_id(&self) -> Uuid {
        self.context_id
    }

    /// Withdraw the continuation. Returns `false` if it already fired.
    pub fn cancel(self) -> bool {
        let cancelled = self.readiness.cancel(self.subscription);
        if cancelled {
            tracing::debug!(context_id = %self.context_id, "Deferred enqueue cancelled");
            let _ = self.events.send(DomainEvent::DeferralCancelled {
                context_id: self.context_id,
                timestamp: Timestamp::now(),
            });
        }
        cancelled
    }
}

impl fmt::Debug for DeferredEnqueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredEnqueue")
            .field("subscription", &self.subscription)
            .field("context_id", &self.context_id)
            .finish()
    }
}

/// Builder for [`ActionManager`].
///
/// Every collaborator is optional; unset ones get the neutral in-memory
/// implementation.
pub struct ActionManagerBuilder {
    config: MessagingConfig,
    policy: Option<Box<dyn DisplayPolicy>>,
    listener: Option<Box<dyn PresentationListener>>,
    readiness: Option<Arc<dyn ReadinessSource>>,
    definitions: Option<Arc<dyn DefinitionRegistry>>,
    impressions: Option<Arc<dyn ImpressionSink>>,
}

impl ActionManagerBuilder {
    pub fn policy(mut self, policy: impl DisplayPolicy + 'static) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    pub fn listener(mut self, listener: impl PresentationListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn readiness(mut self, readiness: Arc<dyn ReadinessSource>) -> Self {
        self.readiness = Some(readiness);
        self
    }

    pub fn definitions(mut self, definitions: Arc<dyn DefinitionRegistry>) -> Self {
        self.definitions = Some(definitions);
        self
    }

    pub fn impressions(mut self, impressions: Arc<dyn ImpressionSink>) -> Self {
        self.impressions = Some(impressions);
        self
    }

    pub fn build(self) -> ActionManager {
        let mut scheduler = Scheduler::new(self.config.skip_policy);
        scheduler.set_paused(self.config.start_paused);
        let (events, _) = broadcast::channel(self.config.event_capacity.max(1));

        let inner = ManagerInner {
            scheduler: Mutex::new(scheduler),
            enabled: AtomicBool::new(self.config.enabled),
            policy: self.policy.unwrap_or_else(|| Box::new(DefaultPolicy)),
            listener: self.listener.unwrap_or_else(|| Box::new(NoopListener)),
            readiness: self
                .readiness
                .unwrap_or_else(|| Arc::new(AssetTracker::new())),
            definitions: self
                .definitions
                .unwrap_or_else(|| Arc::new(ActionDefinitions::new())),
            impressions: self
                .impressions
                .unwrap_or_else(|| Arc::new(ImpressionCounter::new())),
            events,
            wake: Notify::new(),
            shutdown: Notify::new(),
        };
        ActionManager {
            inner: Arc::new(inner),
        }
    }
}

/// Orchestrates classification, readiness gating, scheduling and impressions.
///
/// Cheap to clone; clones share the same queue and presentation slot.
#[derive(Clone)]
pub struct ActionManager {
    inner: Arc<ManagerInner>,
}

impl ActionManager {
    pub fn builder(config: MessagingConfig) -> ActionManagerBuilder {
        ActionManagerBuilder {
            config,
            policy: None,
            listener: None,
            readiness: None,
            definitions: None,
            impressions: None,
        }
    }

    /// Manager with default config and in-memory collaborators.
    pub fn new() -> Self {
        Self::builder(MessagingConfig::default()).build()
    }

    // ---- enablement ----

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::SeqCst);
        tracing::info!(enabled, "Action manager enablement changed");
    }

    // ---- enqueue ----

    /// Classify and enqueue in call order: each chained action goes to the
    /// very front, each standalone action to the back.
    ///
    /// Returns a handle for each action deferred on missing files.
    pub fn add_actions(&self, actions: Vec<Action>) -> Vec<DeferredEnqueue> {
        if !self.is_enabled() {
            tracing::debug!(count = actions.len(), "Manager disabled, ignoring actions");
            return Vec::new();
        }
        actions
            .into_iter()
            .flat_map(|action| {
                let placement = action.placement();
                self.enqueue_gated(vec![action], placement)
            })
            .collect()
    }

    /// Enqueue behind everything already queued.
    pub fn append_actions(&self, actions: Vec<Action>) -> Vec<DeferredEnqueue> {
        self.enqueue_gated(actions, Placement::Back)
    }

    /// Enqueue ahead of everything already queued.
    pub fn insert_actions(&self, actions: Vec<Action>) -> Vec<DeferredEnqueue> {
        self.enqueue_gated(actions, Placement::Front)
    }

    fn enqueue_gated(&self, actions: Vec<Action>, placement: Placement) -> Vec<DeferredEnqueue> {
        if !self.is_enabled() {
            tracing::debug!(count = actions.len(), "Manager disabled, ignoring actions");
            return Vec::new();
        }

        let (waiting, ready): (Vec<Action>, Vec<Action>) = actions
            .into_iter()
            .partition(|a| a.context().has_missing_files());

        self.inner.enqueue_now(ready, placement);
        waiting
            .into_iter()
            .map(|action| self.defer(action, placement))
            .collect()
    }

    fn defer(&self, action: Action, placement: Placement) -> DeferredEnqueue {
        let ctx = action.context().clone();
        let weak: Weak<ManagerInner> = Arc::downgrade(&self.inner);
        let subscription = self
            .inner
            .readiness
            .once_no_downloads_pending(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.enqueue_now(vec![action], placement);
                }
            }));

        tracing::info!(
            name = %ctx.name(),
            message_id = %ctx.message_id(),
            subscription = %subscription,
            "Action has missing files, enqueue deferred"
        );
        self.inner.emit(DomainEvent::ActionDeferred {
            context_id: ctx.id(),
            name: ctx.name().to_string(),
            message_id: ctx.message_id().clone(),
            timestamp: Timestamp::now(),
        });

        DeferredEnqueue {
            subscription,
            context_id: ctx.id(),
            readiness: Arc::clone(&self.inner.readiness),
            events: self.inner.events.clone(),
        }
    }

    // ---- presentation ----

    /// Evaluate the queue and display the next eligible action.
    ///
    /// On display the impression is recorded before the listener is told.
    /// Returns the displayed context, or `None` if nothing was displayed.
    pub fn perform_available_actions(&self) -> Result<Option<ActionContext>, SchedulerError> {
        let evaluation = self.inner.scheduler().next(&*self.inner.policy)?;

        for ctx in &evaluation.skipped {
            tracing::debug!(
                name = %ctx.name(),
                message_id = %ctx.message_id(),
                discarded = evaluation.discarded,
                "Message skipped by display policy"
            );
            self.inner.emit(DomainEvent::MessageSkipped {
                context_id: ctx.id(),
                message_id: ctx.message_id().clone(),
                discarded: evaluation.discarded,
                timestamp: Timestamp::now(),
            });
        }

        let Some(action) = evaluation.displayed else {
            return Ok(None);
        };

        let ctx = action.context().clone();
        tracing::info!(
            name = %ctx.name(),
            message_id = %ctx.message_id(),
            chained = action.is_chained(),
            "Displaying message"
        );
        self.record_impression(&action);
        self.inner.emit(DomainEvent::MessageDisplayed {
            context_id: ctx.id(),
            name: ctx.name().to_string(),
            message_id: ctx.message_id().clone(),
            timestamp: Timestamp::now(),
        });
        self.inner.listener.on_displayed(&ctx);
        Ok(Some(ctx))
    }

    /// Close the displayed message without action and free the slot.
    pub fn dismiss_current(&self) -> Result<ActionContext, SchedulerError> {
        let ctx = self.inner.scheduler().dismiss()?.into_context();
        tracing::info!(message_id = %ctx.message_id(), "Message dismissed");
        self.inner.emit(DomainEvent::MessageDismissed {
            context_id: ctx.id(),
            message_id: ctx.message_id().clone(),
            timestamp: Timestamp::now(),
        });
        self.inner.listener.on_dismissed(&ctx);
        self.inner.wake.notify_one();
        Ok(ctx)
    }

    /// Close the displayed message after the user chose `action_name`.
    pub fn act_on_current(&self, action_name: &str) -> Result<ActionContext, SchedulerError> {
        let ctx = self.inner.scheduler().act()?.into_context();
        tracing::info!(
            message_id = %ctx.message_id(),
            action = %action_name,
            "Message acted upon"
        );
        self.inner.emit(DomainEvent::MessageActed {
            context_id: ctx.id(),
            message_id: ctx.message_id().clone(),
            action_name: action_name.to_string(),
            timestamp: Timestamp::now(),
        });
        self.inner.listener.on_action(action_name, &ctx);
        self.inner.wake.notify_one();
        Ok(ctx)
    }

    // ---- impressions ----

    /// Count a presentation of `action`.
    ///
    /// Chained steps declared as `action` increment the chained-action
    /// counter of their message; chained steps declared as `message` and all
    /// standalone actions increment the message counter. Chained steps with
    /// no declared kind are not counted.
    pub fn record_impression(&self, action: &Action) -> Option<ImpressionKind> {
        let ctx = action.context();
        let kind = match action {
            Action::Chained(_) => match self.inner.definitions.kind_of(ctx.name()) {
                Some(ActionKind::Action) => Some(ImpressionKind::ChainedAction),
                Some(ActionKind::Message) => Some(ImpressionKind::Message),
                None => None,
            },
            Action::Standalone(_) => Some(ImpressionKind::Message),
        };

        let Some(kind) = kind else {
            tracing::debug!(
                name = %ctx.name(),
                message_id = %ctx.message_id(),
                "Chained step has no declared kind, no impression recorded"
            );
            return None;
        };

        match kind {
            ImpressionKind::Message => {
                self.inner.impressions.record_message_impression(ctx.message_id())
            }
            ImpressionKind::ChainedAction => self
                .inner
                .impressions
                .record_chained_action_impression(ctx.message_id()),
        }
        self.inner.emit(DomainEvent::ImpressionRecorded {
            message_id: ctx.message_id().clone(),
            kind,
            timestamp: Timestamp::now(),
        });
        Some(kind)
    }

    // ---- control ----

    /// Stop displaying. The queue keeps accepting actions.
    pub fn pause(&self) {
        self.inner.scheduler().set_paused(true);
        tracing::info!("Message dispatch paused");
    }

    pub fn resume(&self) {
        self.inner.scheduler().set_paused(false);
        tracing::info!("Message dispatch resumed");
        self.inner.wake.notify_one();
    }

    pub fn is_paused(&self) -> bool {
        self.inner.scheduler().is_paused()
    }

    /// Drop every queued action. The displayed one, if any, is unaffected.
    pub fn clear_queue(&self) -> usize {
        let cleared = self.inner.scheduler().clear();
        tracing::info!(cleared, "Action queue cleared");
        cleared
    }

    // ---- inspection ----

    pub fn queue_len(&self) -> usize {
        self.inner.scheduler().queue().len()
    }

    /// Queued contexts, front first.
    pub fn pending(&self) -> Vec<ActionContext> {
        self.inner.scheduler().pending()
    }

    /// Context of the displayed action.
    pub fn current(&self) -> Option<ActionContext> {
        self.inner
            .scheduler()
            .current()
            .map(|a| a.context().clone())
    }

    pub fn state(&self) -> PresentationState {
        self.inner.scheduler().state()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.inner.events.subscribe()
    }

    // ---- dispatch loop ----

    /// Dispatch loop: performs available actions each time the manager is
    /// woken (enqueue, resume, dismiss, act). Returns on shutdown.
    pub async fn run(&self) {
        tracing::info!("Action dispatch loop started");
        loop {
            if let Err(e) = self.perform_available_actions() {
                tracing::warn!(error = %e, "Dispatch evaluation failed");
            }
            tokio::select! {
                _ = self.inner.wake.notified() => {}
                _ = self.inner.shutdown.notified() => {
                    tracing::info!("Action dispatch loop stopped");
                    return;
                }
            }
        }
    }

    /// Signal the dispatch loop to stop.
    pub fn shutdown(&self) {
        self.inner.shutdown.notify_one();
    }
}

impl Default for ActionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::CallbackPolicy;
    use crate::types::{ActionDefinition, Decision};
    use herald_core::types::MessageId;

    struct Fixture {
        manager: ActionManager,
        tracker: Arc<AssetTracker>,
        definitions: Arc<ActionDefinitions>,
        impressions: Arc<ImpressionCounter>,
    }

    fn fixture_with(config: MessagingConfig) -> Fixture {
        let tracker = Arc::new(AssetTracker::new());
        let definitions = Arc::new(ActionDefinitions::from_definitions([
            ActionDefinition::new("Open URL", ActionKind::Action),
            ActionDefinition::new("Center Popup", ActionKind::Message),
        ]));
        let impressions = Arc::new(ImpressionCounter::new());
        let manager = ActionManager::builder(config)
            .readiness(tracker.clone())
            .definitions(definitions.clone())
            .impressions(impressions.clone())
            .build();
        Fixture {
            manager,
            tracker,
            definitions,
            impressions,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MessagingConfig::default())
    }

    fn standalone(name: &str, message_id: &str) -> Action {
        Action::Standalone(ActionContext::new(name, message_id))
    }

    fn chained(name: &str, message_id: &str) -> Action {
        Action::Chained(ActionContext::new(name, message_id))
    }

    fn pending_names(manager: &ActionManager) -> Vec<String> {
        manager
            .pending()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    #[test]
    fn test_add_actions_classifies_by_variant() {
        let f = fixture();
        f.manager.add_actions(vec![standalone("A", "m1")]);
        f.manager.add_actions(vec![chained("B", "m1")]);
        assert_eq!(pending_names(&f.manager), ["B", "A"]);
    }

    #[test]
    fn test_mixed_batch_inserts_each_chained_at_very_front() {
        let f = fixture();
        f.manager.append_actions(vec![standalone("old", "m0")]);
        f.manager.add_actions(vec![
            standalone("s1", "m1"),
            chained("c1", "m2"),
            chained("c2", "m2"),
            standalone("s2", "m3"),
        ]);
        assert_eq!(pending_names(&f.manager), ["c2", "c1", "old", "s1", "s2"]);
    }

    #[test]
    fn test_insert_batch_reverses_call_order() {
        let f = fixture();
        f.manager.append_actions(vec![standalone("old", "m0")]);
        f.manager
            .insert_actions(vec![standalone("x", "m1"), standalone("y", "m1")]);
        assert_eq!(pending_names(&f.manager), ["y", "x", "old"]);
    }

    #[test]
    fn test_disabled_manager_ignores_everything() {
        let f = fixture();
        f.manager.set_enabled(false);
        assert!(!f.manager.is_enabled());

        f.manager.add_actions(vec![standalone("A", "m1")]);
        f.manager.append_actions(vec![standalone("B", "m1")]);
        f.manager.insert_actions(vec![standalone("C", "m1")]);
        assert_eq!(f.manager.queue_len(), 0);
    }

    #[test]
    fn test_disabled_by_config() {
        let config = MessagingConfig {
            enabled: false,
            ..MessagingConfig::default()
        };
        let f = fixture_with(config);
        f.manager.add_actions(vec![standalone("A", "m1")]);
        assert_eq!(f.manager.queue_len(), 0);
    }

    #[test]
    fn test_missing_files_defer_until_signal() {
        let f = fixture();
        f.tracker.begin_download("hero.png");
        let ctx = ActionContext::new("C", "m1")
            .with_required_files(["hero.png"], f.tracker.clone());

        let deferred = f.manager.add_actions(vec![Action::Standalone(ctx)]);
        assert_eq!(deferred.len(), 1);
        assert_eq!(f.manager.queue_len(), 0);

        f.tracker.finish_download("hero.png");
        assert_eq!(pending_names(&f.manager), ["C"]);

        // Already fired; cancelling now has no effect.
        assert!(!deferred.into_iter().next().unwrap().cancel());
        assert_eq!(f.manager.queue_len(), 1);
    }

    #[test]
    fn test_cancelled_deferral_never_enqueues() {
        let f = fixture();
        let mut events = f.manager.subscribe_events();
        f.tracker.begin_download("hero.png");
        let ctx = ActionContext::new("C", "m1")
            .with_required_files(["hero.png"], f.tracker.clone());

        let handle = f.manager.append_actions(vec![Action::Standalone(ctx)]).remove(0);
        assert!(handle.cancel());
        assert_eq!(f.tracker.waiting(), 0);

        f.tracker.finish_download("hero.png");
        assert_eq!(f.manager.queue_len(), 0);

        assert_eq!(events.try_recv().unwrap().kind(), "action_deferred");
        assert_eq!(events.try_recv().unwrap().kind(), "deferral_cancelled");
    }

    #[test]
    fn test_deferred_chained_action_lands_at_front() {
        let f = fixture();
        f.tracker.begin_download("step.png");
        let ctx = ActionContext::new("Step", "m1")
            .with_required_files(["step.png"], f.tracker.clone());

        f.manager.add_actions(vec![Action::Chained(ctx), standalone("A", "m2")]);
        assert_eq!(pending_names(&f.manager), ["A"]);

        f.tracker.finish_download("step.png");
        assert_eq!(pending_names(&f.manager), ["Step", "A"]);
    }

    #[test]
    fn test_deferral_after_manager_dropped_is_harmless() {
        let f = fixture();
        f.tracker.begin_download("hero.png");
        let ctx = ActionContext::new("C", "m1")
            .with_required_files(["hero.png"], f.tracker.clone());
        f.manager.add_actions(vec![Action::Standalone(ctx)]);
        drop(f.manager);
        assert_eq!(f.tracker.finish_download("hero.png"), 1);
    }

    #[test]
    fn test_perform_displays_and_records_message_impression() {
        let f = fixture();
        f.manager.add_actions(vec![standalone("Center Popup", "m1")]);

        let shown = f.manager.perform_available_actions().unwrap().unwrap();
        assert_eq!(shown.name(), "Center Popup");
        assert_eq!(f.manager.state(), PresentationState::Displaying);
        assert_eq!(f.manager.current().unwrap().id(), shown.id());
        assert_eq!(f.impressions.message_impressions(&MessageId::new("m1")), 1);
    }

    #[test]
    fn test_single_flight_until_dismissed() {
        let f = fixture();
        f.manager
            .add_actions(vec![standalone("A", "m1"), standalone("B", "m2")]);

        assert_eq!(
            f.manager.perform_available_actions().unwrap().unwrap().name(),
            "A"
        );
        assert!(f.manager.perform_available_actions().unwrap().is_none());

        assert_eq!(f.manager.dismiss_current().unwrap().name(), "A");
        assert_eq!(
            f.manager.perform_available_actions().unwrap().unwrap().name(),
            "B"
        );
    }

    #[test]
    fn test_act_on_current_without_display_is_error() {
        let f = fixture();
        assert!(matches!(
            f.manager.act_on_current("Open URL"),
            Err(SchedulerError::NothingDisplayed)
        ));
        assert!(matches!(
            f.manager.dismiss_current(),
            Err(SchedulerError::NothingDisplayed)
        ));
    }

    #[test]
    fn test_chained_action_step_counts_as_chained_impression() {
        let f = fixture();
        let kind = f.manager.record_impression(&chained("Open URL", "m1"));
        assert_eq!(kind, Some(ImpressionKind::ChainedAction));
        assert_eq!(f.impressions.chained_action_impressions(&MessageId::new("m1")), 1);
        assert_eq!(f.impressions.message_impressions(&MessageId::new("m1")), 0);
    }

    #[test]
    fn test_chained_message_step_counts_as_message_impression() {
        let f = fixture();
        let kind = f.manager.record_impression(&chained("Center Popup", "m1"));
        assert_eq!(kind, Some(ImpressionKind::Message));
        assert_eq!(f.impressions.message_impressions(&MessageId::new("m1")), 1);
        assert_eq!(f.impressions.chained_action_impressions(&MessageId::new("m1")), 0);
    }

    #[test]
    fn test_standalone_action_always_counts_as_message() {
        let f = fixture();
        let kind = f.manager.record_impression(&standalone("Open URL", "m1"));
        assert_eq!(kind, Some(ImpressionKind::Message));
        assert_eq!(f.impressions.message_impressions(&MessageId::new("m1")), 1);
    }

    #[test]
    fn test_unclassified_chained_step_records_nothing() {
        let f = fixture();
        assert!(f.definitions.get("Mystery").is_none());
        let kind = f.manager.record_impression(&chained("Mystery", "m1"));
        assert_eq!(kind, None);
        assert!(f.impressions.snapshot().is_empty());
    }

    #[test]
    fn test_pause_blocks_display_resume_allows() {
        let f = fixture();
        f.manager.pause();
        assert!(f.manager.is_paused());
        f.manager.add_actions(vec![standalone("A", "m1")]);
        assert!(f.manager.perform_available_actions().unwrap().is_none());
        assert_eq!(f.manager.queue_len(), 1);

        f.manager.resume();
        assert!(f.manager.perform_available_actions().unwrap().is_some());
    }

    #[test]
    fn test_start_paused_config() {
        let config = MessagingConfig {
            start_paused: true,
            ..MessagingConfig::default()
        };
        let f = fixture_with(config);
        assert!(f.manager.is_paused());
    }

    #[test]
    fn test_skipped_message_emits_event_and_stays_queued() {
        let tracker = Arc::new(AssetTracker::new());
        let manager = ActionManager::builder(MessagingConfig::default())
            .readiness(tracker)
            .policy(CallbackPolicy::new().should_display(|_| Decision::Skip))
            .build();
        let mut events = manager.subscribe_events();

        manager.add_actions(vec![standalone("A", "m1")]);
        assert!(manager.perform_available_actions().unwrap().is_none());
        assert_eq!(manager.queue_len(), 1);

        assert_eq!(events.try_recv().unwrap().kind(), "action_queued");
        assert_eq!(events.try_recv().unwrap().kind(), "message_skipped");
    }

    #[test]
    fn test_clear_queue() {
        let f = fixture();
        f.manager
            .add_actions(vec![standalone("A", "m1"), standalone("B", "m1")]);
        assert_eq!(f.manager.clear_queue(), 2);
        assert_eq!(f.manager.queue_len(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let f = fixture();
        let other = f.manager.clone();
        other.add_actions(vec![standalone("A", "m1")]);
        assert_eq!(f.manager.queue_len(), 1);
    }

    #[tokio::test]
    async fn test_run_loop_shutdown() {
        let manager = ActionManager::new();
        manager.shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(2), manager.run())
            .await
            .expect("Dispatch loop should shut down within timeout");
    }

    #[tokio::test]
    async fn test_run_loop_displays_queued_action() {
        let manager = ActionManager::new();
        manager.add_actions(vec![standalone("A", "m1")]);

        manager.shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(2), manager.run())
            .await
            .expect("Dispatch loop should shut down within timeout");

        assert_eq!(manager.current().unwrap().name(), "A");
        assert_eq!(manager.queue_len(), 0);
    }
}
