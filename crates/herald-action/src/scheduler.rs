//! Single-flight presentation scheduler.
//!
//! Owns the pending queue and the presentation slot together, so both are
//! always mutated under one lock by the manager. Each evaluation consults the
//! host policy for every queued candidate, orders the eligible ones, and moves
//! the first into the displaying slot. Nothing more is pulled until the
//! displayed action is dismissed or acted upon.

use std::collections::HashSet;

use herald_core::config::SkipPolicy;
use herald_core::types::Placement;
use uuid::Uuid;

use crate::context::ActionContext;
use crate::error::SchedulerError;
use crate::policy::DisplayPolicy;
use crate::queue::ActionQueue;
use crate::state::{validate_transition, PresentationState};
use crate::types::Action;

/// Outcome of one evaluation pass.
#[derive(Debug, Default)]
pub struct Evaluation {
    /// The action that entered the displaying slot, if any.
    pub displayed: Option<Action>,
    /// Candidates the policy skipped.
    pub skipped: Vec<ActionContext>,
    /// Whether skipped candidates were dropped from the queue.
    pub discarded: bool,
}

/// Queue plus presentation slot.
#[derive(Debug)]
pub struct Scheduler {
    queue: ActionQueue,
    state: PresentationState,
    current: Option<Action>,
    paused: bool,
    skip_policy: SkipPolicy,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SkipPolicy::default())
    }
}

impl Scheduler {
    pub fn new(skip_policy: SkipPolicy) -> Self {
        Self {
            queue: ActionQueue::new(),
            state: PresentationState::Idle,
            current: None,
            paused: false,
            skip_policy,
        }
    }

    pub fn enqueue(&mut self, action: Action, placement: Placement) {
        match placement {
            Placement::Front => self.queue.push_front(action),
            Placement::Back => self.queue.push_back(action),
        }
    }

    pub fn queue(&self) -> &ActionQueue {
        &self.queue
    }

    /// Contexts waiting in the queue, front first.
    pub fn pending(&self) -> Vec<ActionContext> {
        self.queue.iter().map(|a| a.context().clone()).collect()
    }

    pub fn state(&self) -> PresentationState {
        self.state
    }

    pub fn current(&self) -> Option<&Action> {
        self.current.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn clear(&mut self) -> usize {
        self.queue.clear()
    }

    /// Evaluate the queue and display the next eligible action.
    ///
    /// Returns an empty evaluation while paused, while a presentation is in
    /// flight, or when the queue is empty. Host callbacks run before any
    /// state is committed, so a panicking policy leaves the scheduler idle.
    pub fn next(&mut self, policy: &dyn DisplayPolicy) -> Result<Evaluation, SchedulerError> {
        if self.paused || self.state.is_occupied() || self.queue.is_empty() {
            return Ok(Evaluation::default());
        }

        let mut eligible: Vec<(i32, usize, ActionContext)> = Vec::new();
        let mut skipped = Vec::new();
        for (position, action) in self.queue.iter().enumerate() {
            let context = action.context();
            match policy.decide(context).priority() {
                Some(priority) => eligible.push((priority, position, context.clone())),
                None => skipped.push(context.clone()),
            }
        }

        // Higher priority first, queue position breaks ties.
        eligible.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        let batch: Vec<ActionContext> = eligible.into_iter().map(|(_, _, ctx)| ctx).collect();

        let order: Vec<Uuid> = if batch.is_empty() {
            Vec::new()
        } else {
            let known: HashSet<Uuid> = batch.iter().map(|ctx| ctx.id()).collect();
            let trigger = batch[0].trigger().cloned();
            policy
                .reorder(batch, trigger.as_ref())
                .iter()
                .map(|ctx| ctx.id())
                .filter(|id| known.contains(id))
                .collect()
        };

        self.transition(PresentationState::Evaluating)?;

        let discarded = self.skip_policy == SkipPolicy::Discard && !skipped.is_empty();
        if discarded {
            for context in &skipped {
                self.queue.remove(context.id());
            }
        }

        let displayed = match order.first() {
            Some(&first) => {
                self.queue.resequence(&order);
                self.queue.remove(first)
            }
            None => None,
        };

        match &displayed {
            Some(action) => {
                self.transition(PresentationState::Displaying)?;
                self.current = Some(action.clone());
            }
            None => self.transition(PresentationState::Idle)?,
        }

        Ok(Evaluation {
            displayed,
            skipped,
            discarded,
        })
    }

    /// Close the displayed action without acting on it.
    pub fn dismiss(&mut self) -> Result<Action, SchedulerError> {
        self.finish(PresentationState::Dismissed)
    }

    /// Close the displayed action after the user acted on it.
    pub fn act(&mut self) -> Result<Action, SchedulerError> {
        self.finish(PresentationState::ActedUpon)
    }

    fn finish(&mut self, outcome: PresentationState) -> Result<Action, SchedulerError> {
        if self.state != PresentationState::Displaying {
            return Err(SchedulerError::NothingDisplayed);
        }
        let action = self.current.take().ok_or(SchedulerError::NothingDisplayed)?;
        self.transition(outcome)?;
        self.transition(PresentationState::Idle)?;
        Ok(action)
    }

    fn transition(&mut self, to: PresentationState) -> Result<(), SchedulerError> {
        validate_transition(self.state, to)?;
        tracing::trace!(from = %self.state, to = %to, "Presentation state");
        self.state = to;
        Ok(())
    }
}
