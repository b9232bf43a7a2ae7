//! # Task Store
//!
//! Durable persistence for task records, addressed by `requestId` (partition)
//! and `id` (item). Updates always replace the whole record; there is no
//! field-level merge.

pub mod in_memory;
pub mod postgres;

pub use crate::config::CreateMode;
pub use in_memory::InMemoryTaskStore;
pub use postgres::PgTaskStore;

use crate::error::Result;
use crate::models::TaskRecord;
use async_trait::async_trait;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new record. Under [`CreateMode::Upsert`] an existing record
    /// is replaced; under [`CreateMode::Strict`] it is a conflict.
    async fn create(&self, record: &TaskRecord) -> Result<()>;

    /// Replace the record at its key (last write wins)
    async fn update(&self, record: &TaskRecord) -> Result<()>;

    async fn get_by_id(&self, id: &str) -> Result<Option<TaskRecord>>;

    /// Every stored record, unordered. Full scan; not for hot paths.
    async fn get_all(&self) -> Result<Vec<TaskRecord>>;
}
