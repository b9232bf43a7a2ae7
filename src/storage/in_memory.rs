use super::{ObjectStore, StorageError, StorageResult};
use async_trait::async_trait;
use dashmap::DashMap;

/// Object store held in process memory
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: DashMap<(String, String), Vec<u8>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, container: &str, key: &str, content: impl Into<Vec<u8>>) {
        self.objects
            .insert((container.to_string(), key.to_string()), content.into());
    }

    pub fn get(&self, container: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .get(&(container.to_string(), key.to_string()))
            .map(|entry| entry.value().clone())
    }

    pub fn contains(&self, container: &str, key: &str) -> bool {
        self.objects
            .contains_key(&(container.to_string(), key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn exists(&self, container: &str, key: &str) -> StorageResult<bool> {
        Ok(self.contains(container, key))
    }

    async fn copy(
        &self,
        source_container: &str,
        key: &str,
        destination_container: &str,
    ) -> StorageResult<()> {
        // Clone out before inserting so no shard lock is held across both keys
        let content = self
            .get(source_container, key)
            .ok_or_else(|| StorageError::not_found(source_container, key))?;
        self.put(destination_container, key, content);
        Ok(())
    }

    async fn delete(&self, container: &str, key: &str) -> StorageResult<()> {
        self.objects
            .remove(&(container.to_string(), key.to_string()));
        Ok(())
    }
}
