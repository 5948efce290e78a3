//! Registry mapping action names to their declared kind.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, PoisonError};

use herald_core::error::Result;

use crate::types::{ActionDefinition, ActionKind};

/// Name → kind lookup consulted when recording impressions.
pub trait DefinitionRegistry: Send + Sync {
    /// Declared kind for `name`, or `None` when it is not classified.
    fn kind_of(&self, name: &str) -> Option<ActionKind>;
}

/// In-memory set of declared action definitions.
#[derive(Debug, Default)]
pub struct ActionDefinitions {
    by_name: RwLock<HashMap<String, ActionDefinition>>,
}

impl ActionDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = ActionDefinition>) -> Self {
        let registry = Self::new();
        for definition in definitions {
            registry.register(definition);
        }
        registry
    }

    /// Load definitions from a JSON array file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let definitions: Vec<ActionDefinition> = serde_json::from_str(&content)?;
        tracing::info!(
            count = definitions.len(),
            "Action definitions loaded from {}",
            path.display()
        );
        Ok(Self::from_definitions(definitions))
    }

    /// Add or replace the definition for its name.
    pub fn register(&self, definition: ActionDefinition) -> Option<ActionDefinition> {
        self.by_name
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(definition.name.clone(), definition)
    }

    pub fn get(&self, name: &str) -> Option<ActionDefinition> {
        self.by_name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.by_name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DefinitionRegistry for ActionDefinitions {
    fn kind_of(&self, name: &str) -> Option<ActionKind> {
        self.by_name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|d| d.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_register_and_lookup() {
        let defs = ActionDefinitions::new();
        assert!(defs.is_empty());

        defs.register(ActionDefinition::new("Open URL", ActionKind::Action));
        defs.register(ActionDefinition::new("Center Popup", ActionKind::Message));

        assert_eq!(defs.len(), 2);
        assert_eq!(defs.kind_of("Open URL"), Some(ActionKind::Action));
        assert_eq!(defs.kind_of("Center Popup"), Some(ActionKind::Message));
        assert_eq!(defs.kind_of("Unknown"), None);
    }

    #[test]
    fn test_register_replaces_existing() {
        let defs = ActionDefinitions::new();
        assert!(defs
            .register(ActionDefinition::new("Alert", ActionKind::Action))
            .is_none());
        let previous = defs.register(ActionDefinition::new("Alert", ActionKind::Message));
        assert_eq!(previous.map(|d| d.kind), Some(ActionKind::Action));
        assert_eq!(defs.kind_of("Alert"), Some(ActionKind::Message));
        assert_eq!(defs.len(), 1);
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"[
                {"name": "Open URL", "kind": "action", "args": ["URL"]},
                {"name": "Interstitial", "kind": "message", "description": "Full screen"}
            ]"#,
        )
        .unwrap();

        let defs = ActionDefinitions::load(file.path()).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs.get("Open URL").unwrap().args, vec!["URL".to_string()]);
        assert_eq!(
            defs.get("Interstitial").unwrap().description.as_deref(),
            Some("Full screen")
        );
    }

    #[test]
    fn test_load_invalid_json_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        assert!(ActionDefinitions::load(file.path()).is_err());
    }
}
