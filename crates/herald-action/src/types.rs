//! Core types and value objects for the scheduling engine.
//!
//! Defines actions, action kinds, trigger descriptors, policy decisions and
//! declared action definitions.

use herald_core::types::Placement;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::context::ActionContext;

// =============================================================================
// Enums
// =============================================================================

/// Declared kind of an action name, as recorded in the definition registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Non-visual action such as opening a URL or registering for push.
    Action,
    /// Visual in-app message.
    Message,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Action => write!(f, "action"),
            ActionKind::Message => write!(f, "message"),
        }
    }
}

impl std::str::FromStr for ActionKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "action" => Ok(ActionKind::Action),
            "message" => Ok(ActionKind::Message),
            _ => Err(format!("Unknown action kind: {}", s)),
        }
    }
}

/// Category of application event that triggered an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Start,
    Resume,
    Event,
    State,
    UserAttribute,
    Manual,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::Start => write!(f, "start"),
            TriggerKind::Resume => write!(f, "resume"),
            TriggerKind::Event => write!(f, "event"),
            TriggerKind::State => write!(f, "state"),
            TriggerKind::UserAttribute => write!(f, "user_attribute"),
            TriggerKind::Manual => write!(f, "manual"),
        }
    }
}

/// Host verdict for a single candidate during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decision {
    /// Eligible, default priority.
    #[default]
    Show,
    /// Not eligible during this evaluation.
    Skip,
    /// Eligible with an explicit priority. Higher values display first.
    Prioritize(i32),
}

impl Decision {
    /// Effective priority of an eligible decision, `None` for `Skip`.
    pub fn priority(&self) -> Option<i32> {
        match self {
            Decision::Show => Some(0),
            Decision::Skip => None,
            Decision::Prioritize(p) => Some(*p),
        }
    }
}

// =============================================================================
// Domain Structs
// =============================================================================

/// Descriptor of the event that caused an action to be requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub kind: TriggerKind,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl Trigger {
    pub fn new(kind: TriggerKind) -> Self {
        Self {
            kind,
            event_name: None,
            params: BTreeMap::new(),
        }
    }

    /// Trigger for a named tracked event.
    pub fn event(name: impl Into<String>) -> Self {
        Self {
            kind: TriggerKind::Event,
            event_name: Some(name.into()),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// A declared action schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
    pub kind: ActionKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ActionDefinition {
    pub fn new(name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            args: Vec::new(),
        }
    }
}

/// A unit of work waiting to be presented.
///
/// Chained actions are steps of a multi-step campaign and always take the
/// next slot; standalone actions wait their turn.
#[derive(Debug, Clone)]
pub enum Action {
    Standalone(ActionContext),
    Chained(ActionContext),
}

impl Action {
    pub fn context(&self) -> &ActionContext {
        match self {
            Action::Standalone(ctx) | Action::Chained(ctx) => ctx,
        }
    }

    pub fn into_context(self) -> ActionContext {
        match self {
            Action::Standalone(ctx) | Action::Chained(ctx) => ctx,
        }
    }

    /// Per-instance identifier of the wrapped context.
    pub fn id(&self) -> Uuid {
        self.context().id()
    }

    pub fn is_chained(&self) -> bool {
        matches!(self, Action::Chained(_))
    }

    /// Queue end this action belongs at when classified automatically.
    pub fn placement(&self) -> Placement {
        match self {
            Action::Chained(_) => Placement::Front,
            Action::Standalone(_) => Placement::Back,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
