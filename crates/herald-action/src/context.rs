//! Identifying payload of a triggerable action.

use herald_core::types::MessageId;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::types::Trigger;

/// Answers whether an asset is available locally.
///
/// Implemented by the host's download manager. Queried every time
/// [`ActionContext::has_missing_files`] runs, never cached.
pub trait FileResolver: Send + Sync {
    fn is_available(&self, path: &str) -> bool;
}

/// Identifies a triggerable unit: name, owning message, trigger metadata and
/// the assets it needs before it can be shown.
///
/// All fields are fixed at construction. The `with_*` methods consume the
/// context and return the extended value.
#[derive(Clone)]
pub struct ActionContext {
    id: Uuid,
    name: String,
    message_id: MessageId,
    trigger: Option<Trigger>,
    required_files: Vec<String>,
    resolver: Option<Arc<dyn FileResolver>>,
}

impl ActionContext {
    pub fn new(name: impl Into<String>, message_id: impl Into<MessageId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            message_id: message_id.into(),
            trigger: None,
            required_files: Vec::new(),
            resolver: None,
        }
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Attach asset dependencies and the resolver that knows their state.
    pub fn with_required_files(
        mut self,
        files: impl IntoIterator<Item = impl Into<String>>,
        resolver: Arc<dyn FileResolver>,
    ) -> Self {
        self.required_files = files.into_iter().map(Into::into).collect();
        self.resolver = Some(resolver);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    pub fn trigger(&self) -> Option<&Trigger> {
        self.trigger.as_ref()
    }

    pub fn required_files(&self) -> &[String] {
        &self.required_files
    }

    /// Whether any required asset is still unavailable.
    pub fn has_missing_files(&self) -> bool {
        match &self.resolver {
            Some(resolver) => self
                .required_files
                .iter()
                .any(|file| !resolver.is_available(file)),
            None => false,
        }
    }
}

impl fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("message_id", &self.message_id)
            .field("trigger", &self.trigger)
            .field("required_files", &self.required_files)
            .finish()
    }
}
