//! # Queue Worker
//!
//! Polls the image processing queue and runs the pipeline once per message.
//! Runs for different messages may overlap up to the configured concurrency;
//! a single message is only ever handled by one run at a time.
//!
//! Acknowledgement policy:
//! - success: delete the message
//! - non-retryable failure (bad message, conflicting record): archive it
//! - dependency failure: leave it, so it reappears after the visibility timeout
//! - too many deliveries: archive without running the pipeline

use super::queue::{MessageQueue, QueueMessage};
use crate::config::QueueConfig;
use crate::error::Result;
use crate::logging::log_queue_operation;
use crate::orchestration::PipelineOrchestrator;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// What happened to one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDisposition {
    Completed,
    Archived,
    /// Left on the queue for redelivery
    Released,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub received: usize,
    pub completed: usize,
    pub archived: usize,
    pub released: usize,
}

impl BatchSummary {
    fn record(&mut self, disposition: MessageDisposition) {
        match disposition {
            MessageDisposition::Completed => self.completed += 1,
            MessageDisposition::Archived => self.archived += 1,
            MessageDisposition::Released => self.released += 1,
        }
    }
}

pub struct QueueWorker {
    worker_id: String,
    queue: Arc<dyn MessageQueue>,
    orchestrator: Arc<PipelineOrchestrator>,
    config: QueueConfig,
}

impl QueueWorker {
    pub fn new(
        queue: Arc<dyn MessageQueue>,
        orchestrator: Arc<PipelineOrchestrator>,
        config: QueueConfig,
    ) -> Self {
        Self {
            worker_id: format!("worker-{}", Uuid::new_v4()),
            queue,
            orchestrator,
            config,
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Poll until `shutdown` turns true or its sender is dropped
    #[instrument(skip(self, shutdown), fields(worker_id = %self.worker_id, queue = %self.queue.name()))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            batch_size = self.config.batch_size,
            visibility_timeout_seconds = self.config.visibility_timeout_seconds,
            max_concurrent_messages = self.config.max_concurrent_messages,
            "Starting queue worker"
        );

        let polling_interval = Duration::from_millis(self.config.polling_interval_ms);

        loop {
            if *shutdown.borrow() {
                break;
            }

            let idle = match self.process_batch().await {
                Ok(summary) => summary.received == 0,
                Err(e) => {
                    error!(error = %e, "Error reading from queue");
                    true
                }
            };

            // Drain continuously while messages keep arriving
            if idle {
                tokio::select! {
                    _ = tokio::time::sleep(polling_interval) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }

        info!("Queue worker stopped");
        Ok(())
    }

    /// Read one batch and handle every message in it
    pub async fn process_batch(&self) -> Result<BatchSummary> {
        let messages = self
            .queue
            .read(
                self.config.batch_size,
                self.config.visibility_timeout_seconds,
            )
            .await?;

        let mut summary = BatchSummary {
            received: messages.len(),
            ..Default::default()
        };
        if messages.is_empty() {
            return Ok(summary);
        }

        debug!(count = summary.received, "Processing batch");

        let dispositions: Vec<MessageDisposition> = stream::iter(messages)
            .map(|message| self.handle_message(message))
            .buffer_unordered(self.config.max_concurrent_messages.max(1))
            .collect()
            .await;

        for disposition in dispositions {
            summary.record(disposition);
        }

        info!(
            received = summary.received,
            completed = summary.completed,
            archived = summary.archived,
            released = summary.released,
            "Batch processed"
        );
        Ok(summary)
    }

    #[instrument(skip(self, message), fields(msg_id = message.msg_id, read_count = message.read_count))]
    async fn handle_message(&self, message: QueueMessage) -> MessageDisposition {
        let msg_id = message.msg_id;

        if message.read_count > self.config.max_delivery_attempts {
            warn!(
                max_delivery_attempts = self.config.max_delivery_attempts,
                "Message exceeded delivery attempts; archiving"
            );
            self.archive(msg_id, "delivery attempts exhausted").await;
            return MessageDisposition::Archived;
        }

        match self.orchestrator.process_json(message.payload).await {
            Ok(record) => {
                if let Err(e) = self.queue.delete(msg_id).await {
                    // The run is idempotent; a redelivery just repeats it
                    warn!(error = %e, "Failed to delete processed message");
                } else {
                    log_queue_operation("delete", self.queue.name(), msg_id, Some(record.id.as_str()));
                }
                MessageDisposition::Completed
            }
            Err(e) if e.is_retryable() => {
                warn!(
                    error = %e,
                    stage = e.stage().map(|stage| stage.as_str()).unwrap_or("unknown"),
                    "Run failed; message will be redelivered after its visibility timeout"
                );
                MessageDisposition::Released
            }
            Err(e) => {
                error!(error = %e, "Run failed permanently; archiving message");
                self.archive(msg_id, &e.to_string()).await;
                MessageDisposition::Archived
            }
        }
    }

    async fn archive(&self, msg_id: i64, reason: &str) {
        match self.queue.archive(msg_id).await {
            Ok(()) => log_queue_operation("archive", self.queue.name(), msg_id, Some(reason)),
            Err(e) => warn!(msg_id = msg_id, error = %e, "Failed to archive message"),
        }
    }
}
