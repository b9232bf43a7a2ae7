//! Task store double: an in-memory store plus an operation log and
//! injectable write failures

use async_trait::async_trait;
use std::sync::Mutex;
use text_extractor::models::TaskRecord;
use text_extractor::task_store::{CreateMode, InMemoryTaskStore, TaskStore};
use text_extractor::{Result, Stage, TaskStatus, TextExtractorError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Create(TaskStatus),
    Update(TaskStatus),
}

#[derive(Debug, Default)]
struct FailurePlan {
    fail_create: bool,
    /// Reject updates that would write one of these statuses
    fail_updates_to: Vec<TaskStatus>,
    /// Reject only the next update that would write one of these statuses
    fail_next_update_to: Vec<TaskStatus>,
}

#[derive(Debug, Default)]
pub struct MockTaskStore {
    inner: InMemoryTaskStore,
    ops: Mutex<Vec<StoreOp>>,
    failures: Mutex<FailurePlan>,
}

impl MockTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            inner: InMemoryTaskStore::with_create_mode(CreateMode::Strict),
            ..Default::default()
        }
    }

    pub fn fail_create(self) -> Self {
        self.failures.lock().unwrap().fail_create = true;
        self
    }

    pub fn fail_updates_to(self, status: TaskStatus) -> Self {
        self.failures.lock().unwrap().fail_updates_to.push(status);
        self
    }

    pub fn fail_next_update_to(self, status: TaskStatus) -> Self {
        self.failures.lock().unwrap().fail_next_update_to.push(status);
        self
    }

    /// Reject every update regardless of status
    pub fn fail_all_updates(self) -> Self {
        self.failures.lock().unwrap().fail_updates_to = vec![
            TaskStatus::Pending,
            TaskStatus::Processing,
            TaskStatus::Completed,
            TaskStatus::Failed,
        ];
        self
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.lock().unwrap().clone()
    }

    /// Seed a record without logging an operation
    pub async fn seed(&self, record: &TaskRecord) {
        self.inner.update(record).await.unwrap();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

fn injected(operation: &str) -> TextExtractorError {
    TextExtractorError::dependency(Stage::Store, format!("injected {operation} failure"))
}

#[async_trait]
impl TaskStore for MockTaskStore {
    async fn create(&self, record: &TaskRecord) -> Result<()> {
        self.ops.lock().unwrap().push(StoreOp::Create(record.status));
        if self.failures.lock().unwrap().fail_create {
            return Err(injected("create"));
        }
        self.inner.create(record).await
    }

    async fn update(&self, record: &TaskRecord) -> Result<()> {
        self.ops.lock().unwrap().push(StoreOp::Update(record.status));
        {
            let mut failures = self.failures.lock().unwrap();
            if failures.fail_updates_to.contains(&record.status) {
                return Err(injected("update"));
            }
            if let Some(pos) = failures
                .fail_next_update_to
                .iter()
                .position(|status| *status == record.status)
            {
                failures.fail_next_update_to.remove(pos);
                return Err(injected("update"));
            }
        }
        self.inner.update(record).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<TaskRecord>> {
        self.inner.get_by_id(id).await
    }

    async fn get_all(&self) -> Result<Vec<TaskRecord>> {
        self.inner.get_all().await
    }
}
