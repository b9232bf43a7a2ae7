//! # Message Queue
//!
//! Visibility-timeout queue seam and its pgmq implementation. A read message
//! stays invisible for the visibility timeout; unless it is deleted or
//! archived in that window it is delivered again with a higher read count.

use crate::error::{Result, Stage, TextExtractorError};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, info};

/// One delivery of a queue message
#[derive(Debug, Clone, PartialEq)]
pub struct QueueMessage {
    pub msg_id: i64,
    /// Number of times this message has been read, this delivery included
    pub read_count: i32,
    pub payload: serde_json::Value,
}

#[async_trait]
pub trait MessageQueue: Send + Sync {
    fn name(&self) -> &str;

    async fn read(&self, batch_size: i32, visibility_timeout_seconds: i32)
        -> Result<Vec<QueueMessage>>;

    /// Acknowledge a message as done
    async fn delete(&self, msg_id: i64) -> Result<()>;

    /// Move a message out of the queue without processing it again
    async fn archive(&self, msg_id: i64) -> Result<()>;
}

fn queue_error(queue_name: &str, operation: &str, error: sqlx::Error) -> TextExtractorError {
    TextExtractorError::dependency(
        Stage::Queue,
        format!("{operation} on {queue_name} failed: {error}"),
    )
}

/// [`MessageQueue`] backed by the pgmq extension's SQL functions
#[derive(Debug, Clone)]
pub struct PgmqQueue {
    pool: PgPool,
    queue_name: String,
}

impl PgmqQueue {
    pub fn new(pool: PgPool, queue_name: impl Into<String>) -> Self {
        Self {
            pool,
            queue_name: queue_name.into(),
        }
    }

    /// Create the queue if it does not exist
    pub async fn ensure_queue(&self) -> Result<()> {
        sqlx::query("SELECT pgmq.create($1)")
            .bind(&self.queue_name)
            .execute(&self.pool)
            .await
            .map_err(|e| queue_error(&self.queue_name, "create", e))?;

        info!(queue = %self.queue_name, "Queue ready");
        Ok(())
    }
}

#[async_trait]
impl MessageQueue for PgmqQueue {
    fn name(&self) -> &str {
        &self.queue_name
    }

    async fn read(
        &self,
        batch_size: i32,
        visibility_timeout_seconds: i32,
    ) -> Result<Vec<QueueMessage>> {
        let rows = sqlx::query("SELECT msg_id, read_ct, message FROM pgmq.read($1, $2, $3)")
            .bind(&self.queue_name)
            .bind(visibility_timeout_seconds)
            .bind(batch_size)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| queue_error(&self.queue_name, "read", e))?;

        let messages = rows
            .into_iter()
            .map(|row| {
                Ok(QueueMessage {
                    msg_id: row.try_get("msg_id")?,
                    read_count: row.try_get("read_ct")?,
                    payload: row.try_get("message")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| queue_error(&self.queue_name, "decode", e))?;

        debug!(queue = %self.queue_name, count = messages.len(), "Read messages");
        Ok(messages)
    }

    async fn delete(&self, msg_id: i64) -> Result<()> {
        sqlx::query("SELECT pgmq.delete($1::text, $2::bigint)")
            .bind(&self.queue_name)
            .bind(msg_id)
            .execute(&self.pool)
            .await
            .map_err(|e| queue_error(&self.queue_name, "delete", e))?;
        Ok(())
    }

    async fn archive(&self, msg_id: i64) -> Result<()> {
        sqlx::query("SELECT pgmq.archive($1::text, $2::bigint)")
            .bind(&self.queue_name)
            .bind(msg_id)
            .execute(&self.pool)
            .await
            .map_err(|e| queue_error(&self.queue_name, "archive", e))?;
        Ok(())
    }
}
