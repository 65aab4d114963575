use std::sync::Arc;

use anyhow::bail;

use crate::entity::EntityDescriptor;

/// Registry of entity descriptors, looked up by name.
pub struct EntityRegistry {
    descriptors: Vec<Arc<EntityDescriptor>>,
}

impl EntityRegistry {
    /// Create a new entity registry
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Register a descriptor; names must be unique.
    pub fn register(&mut self, descriptor: EntityDescriptor) -> anyhow::Result<()> {
        if self.get(descriptor.name()).is_some() {
            bail!("entity '{}' is already registered", descriptor.name());
        }

        tracing::debug!(
            entity = descriptor.name(),
            resource = descriptor.resource(),
            "registering entity"
        );
        self.descriptors.push(Arc::new(descriptor));
        Ok(())
    }

    /// All registered descriptors, in registration order.
    pub fn descriptors(&self) -> &[Arc<EntityDescriptor>] {
        &self.descriptors
    }

    /// Get a descriptor by name
    pub fn get(&self, name: &str) -> Option<&Arc<EntityDescriptor>> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.name() == name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = EntityRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("categories").is_none());
    }

    #[test]
    fn test_lookup_by_name() {
        let mut registry = EntityRegistry::new();
        registry
            .register(EntityDescriptor::builder("categories").build())
            .unwrap();
        registry
            .register(
                EntityDescriptor::builder("borrow-records")
                    .label("Borrow record")
                    .build(),
            )
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get("borrow-records").map(|d| d.label()),
            Some("Borrow record")
        );
        let names: Vec<_> = registry.descriptors().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["categories", "borrow-records"]);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = EntityRegistry::new();
        registry
            .register(EntityDescriptor::builder("slides").build())
            .unwrap();
        let error = registry
            .register(EntityDescriptor::builder("slides").build())
            .unwrap_err();
        assert!(error.to_string().contains("already registered"));
        assert_eq!(registry.len(), 1);
    }
}
