//! # Messaging Module
//!
//! Queue transport for image processing requests: the [`MessageQueue`]
//! seam, its pgmq implementation, and the [`QueueWorker`] polling loop.

pub mod queue;
pub mod worker;

pub use queue::{MessageQueue, PgmqQueue, QueueMessage};
pub use worker::{BatchSummary, MessageDisposition, QueueWorker};
