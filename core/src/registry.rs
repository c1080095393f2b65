//! Registry of wrapped component ids.
//!
//! Prepare keys start with the component id, so two wrapped components that
//! share an id and the default key derivation would share keys. The registry
//! is owned by whatever composes the wrapped components and passed in
//! explicitly; tests create a fresh one per case.

use std::collections::HashSet;

use kindle_types::ConfigError;

#[derive(Debug, Default)]
pub struct ComponentRegistry {
    ids: HashSet<String>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `component_id`.
    ///
    /// With `default_keys` (the component derives prepare keys with the default
    /// function) a duplicate id is an error. Components with a custom key
    /// function may share an id.
    pub fn register(&mut self, component_id: &str, default_keys: bool) -> Result<(), ConfigError> {
        if self.ids.contains(component_id) {
            if default_keys {
                return Err(ConfigError::DuplicateComponentId {
                    component_id: component_id.to_string(),
                });
            }
            tracing::debug!(component_id, "Duplicate component id with custom prepare keys");
            return Ok(());
        }
        self.ids.insert(component_id.to_string());
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, component_id: &str) -> bool {
        self.ids.contains(component_id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
