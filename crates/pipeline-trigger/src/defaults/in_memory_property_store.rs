//! In-memory trigger property store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::errors::PropertyStoreError;
use crate::traits::{PropertyStore, StoredProperty};
use crate::types::PipelineTriggerProperty;

/// Property store backed by a `HashMap` keyed by container full name.
///
/// Properties are stored behind `Arc`, so a lookup never copies the
/// configuration and a concurrent `put` never changes a property a
/// dispatch is already reading.
#[derive(Debug, Default)]
pub struct InMemoryPropertyStore {
    properties: RwLock<HashMap<String, Arc<PipelineTriggerProperty>>>,
}

impl InMemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.properties.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.read().is_empty()
    }
}

#[async_trait]
impl PropertyStore for InMemoryPropertyStore {
    async fn get(&self, container: &str) -> Result<Option<StoredProperty>, PropertyStoreError> {
        Ok(self
            .properties
            .read()
            .get(container)
            .map(|property| StoredProperty {
                owner: container.to_string(),
                property: Arc::clone(property),
            }))
    }

    async fn put(
        &self,
        container: &str,
        property: PipelineTriggerProperty,
    ) -> Result<(), PropertyStoreError> {
        self.properties
            .write()
            .insert(container.to_string(), Arc::new(property));
        Ok(())
    }

    async fn remove(&self, container: &str) -> Result<(), PropertyStoreError> {
        self.properties.write().remove(container);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_remove() {
        let store = InMemoryPropertyStore::new();
        assert!(store.get("repo").await.expect("get").is_none());

        store
            .put("repo", PipelineTriggerProperty::new("main", "", vec![]))
            .await
            .expect("put");
        let stored = store.get("repo").await.expect("get").expect("present");
        assert_eq!(stored.owner, "repo");
        assert_eq!(stored.property.include_filter(), "main");
        assert_eq!(store.len(), 1);

        store.remove("repo").await.expect("remove");
        store.remove("repo").await.expect("remove twice");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn replacing_does_not_affect_held_property() {
        let store = InMemoryPropertyStore::new();
        store
            .put("repo", PipelineTriggerProperty::new("old", "", vec![]))
            .await
            .expect("put");
        let held = store.get("repo").await.expect("get").expect("present");

        store
            .put("repo", PipelineTriggerProperty::new("new", "", vec![]))
            .await
            .expect("put");
        assert_eq!(held.property.include_filter(), "old");
    }
}
