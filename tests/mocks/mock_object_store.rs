//! Object store double with injectable per-operation failures

use async_trait::async_trait;
use std::sync::Mutex;
use text_extractor::storage::{InMemoryObjectStore, ObjectStore, StorageError, StorageResult};

#[derive(Debug, Default)]
pub struct MockObjectStore {
    inner: InMemoryObjectStore,
    failing_ops: Mutex<Vec<&'static str>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `operation` ("exists", "copy" or "delete") fail
    pub fn fail_on(self, operation: &'static str) -> Self {
        self.failing_ops.lock().unwrap().push(operation);
        self
    }

    pub fn put(&self, container: &str, key: &str, content: impl Into<Vec<u8>>) {
        self.inner.put(container, key, content);
    }

    pub fn contains(&self, container: &str, key: &str) -> bool {
        self.inner.contains(container, key)
    }

    pub fn get(&self, container: &str, key: &str) -> Option<Vec<u8>> {
        self.inner.get(container, key)
    }

    fn check(&self, operation: &'static str) -> StorageResult<()> {
        if self.failing_ops.lock().unwrap().contains(&operation) {
            return Err(StorageError::Backend(format!("injected {operation} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn exists(&self, container: &str, key: &str) -> StorageResult<bool> {
        self.check("exists")?;
        self.inner.exists(container, key).await
    }

    async fn copy(
        &self,
        source_container: &str,
        key: &str,
        destination_container: &str,
    ) -> StorageResult<()> {
        self.check("copy")?;
        self.inner
            .copy(source_container, key, destination_container)
            .await
    }

    async fn delete(&self, container: &str, key: &str) -> StorageResult<()> {
        self.check("delete")?;
        self.inner.delete(container, key).await
    }
}
