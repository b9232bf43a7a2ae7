//! In-memory visibility-timeout queue

use async_trait::async_trait;
use std::sync::Mutex;
use text_extractor::messaging::{MessageQueue, QueueMessage};
use text_extractor::Result;

#[derive(Debug, Clone)]
struct Entry {
    msg_id: i64,
    read_count: i32,
    payload: serde_json::Value,
    visible: bool,
}

#[derive(Debug, Default)]
struct QueueState {
    next_id: i64,
    entries: Vec<Entry>,
    deleted: Vec<i64>,
    archived: Vec<i64>,
}

#[derive(Debug, Default)]
pub struct MockQueue {
    state: Mutex<QueueState>,
}

impl MockQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&self, payload: serde_json::Value) -> i64 {
        self.send_with_read_count(payload, 0)
    }

    /// Enqueue a message that has already been delivered `read_count` times
    pub fn send_with_read_count(&self, payload: serde_json::Value, read_count: i32) -> i64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let msg_id = state.next_id;
        state.entries.push(Entry {
            msg_id,
            read_count,
            payload,
            visible: true,
        });
        msg_id
    }

    /// Let every unacknowledged message become visible again
    pub fn expire_visibility(&self) {
        for entry in self.state.lock().unwrap().entries.iter_mut() {
            entry.visible = true;
        }
    }

    pub fn deleted(&self) -> Vec<i64> {
        self.state.lock().unwrap().deleted.clone()
    }

    pub fn archived(&self) -> Vec<i64> {
        self.state.lock().unwrap().archived.clone()
    }

    /// Messages neither deleted nor archived
    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    fn remove(&self, msg_id: i64, archive: bool) {
        let mut state = self.state.lock().unwrap();
        let before = state.entries.len();
        state.entries.retain(|entry| entry.msg_id != msg_id);
        if state.entries.len() < before {
            if archive {
                state.archived.push(msg_id);
            } else {
                state.deleted.push(msg_id);
            }
        }
    }
}

#[async_trait]
impl MessageQueue for MockQueue {
    fn name(&self) -> &str {
        "mock_image_processing_queue"
    }

    async fn read(
        &self,
        batch_size: i32,
        _visibility_timeout_seconds: i32,
    ) -> Result<Vec<QueueMessage>> {
        let mut state = self.state.lock().unwrap();
        let limit = usize::try_from(batch_size).unwrap_or(0);

        Ok(state
            .entries
            .iter_mut()
            .filter(|entry| entry.visible)
            .take(limit)
            .map(|entry| {
                entry.visible = false;
                entry.read_count += 1;
                QueueMessage {
                    msg_id: entry.msg_id,
                    read_count: entry.read_count,
                    payload: entry.payload.clone(),
                }
            })
            .collect())
    }

    async fn delete(&self, msg_id: i64) -> Result<()> {
        self.remove(msg_id, false);
        Ok(())
    }

    async fn archive(&self, msg_id: i64) -> Result<()> {
        self.remove(msg_id, true);
        Ok(())
    }
}
