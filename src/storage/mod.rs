//! # Object Storage
//!
//! Container/key addressed object storage and the image relocation built on
//! top of it.

pub mod filesystem;
pub mod in_memory;
pub mod relocator;

pub use filesystem::FilesystemObjectStore;
pub use in_memory::InMemoryObjectStore;
pub use relocator::{ContainerImageRelocator, ImageRelocator, RelocationOutcome};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object not found: {container}/{key}")]
    NotFound { container: String, key: String },

    #[error("Invalid object key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Storage I/O error during {operation} on {container}/{key}: {source}")]
    Io {
        operation: &'static str,
        container: String,
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn not_found(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            container: container.into(),
            key: key.into(),
        }
    }

    pub fn io(
        operation: &'static str,
        container: impl Into<String>,
        key: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation,
            container: container.into(),
            key: key.into(),
            source,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Minimal object storage capability needed to relocate images
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn exists(&self, container: &str, key: &str) -> StorageResult<bool>;

    /// Copy `key` from `source_container` into `destination_container`
    /// under the same key. Returns only once the copy is durable.
    async fn copy(
        &self,
        source_container: &str,
        key: &str,
        destination_container: &str,
    ) -> StorageResult<()>;

    /// Delete an object; deleting an absent object is not an error
    async fn delete(&self, container: &str, key: &str) -> StorageResult<()>;
}
