use super::{CreateMode, TaskStore};
use crate::error::{Result, TextExtractorError};
use crate::models::TaskRecord;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Task store held in process memory, keyed by `(requestId, id)`
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    records: DashMap<(String, String), TaskRecord>,
    create_mode: CreateMode,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_create_mode(create_mode: CreateMode) -> Self {
        Self {
            records: DashMap::new(),
            create_mode,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn key(record: &TaskRecord) -> (String, String) {
        (record.request_id.clone(), record.id.clone())
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, record: &TaskRecord) -> Result<()> {
        match (self.records.entry(Self::key(record)), self.create_mode) {
            (Entry::Occupied(_), CreateMode::Strict) => {
                Err(TextExtractorError::conflict(&record.id))
            }
            (Entry::Occupied(mut existing), CreateMode::Upsert) => {
                existing.insert(record.clone());
                Ok(())
            }
            (Entry::Vacant(slot), _) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, record: &TaskRecord) -> Result<()> {
        self.records.insert(Self::key(record), record.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<TaskRecord>> {
        // id doubles as the partition key
        Ok(self
            .records
            .get(&(id.to_string(), id.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn get_all(&self) -> Result<Vec<TaskRecord>> {
        Ok(self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}
