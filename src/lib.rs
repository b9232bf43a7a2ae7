#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Text Extractor
//!
//! Queue-driven OCR pipeline for images.
//!
//! ## Overview
//!
//! Each queue message names an image already uploaded to the incoming
//! container. For every message the worker:
//!
//! 1. records a `Pending` task keyed by the request id
//! 2. sends the image URL to the OCR service and flattens the recognized lines
//! 3. stores the raw and flattened results and moves the task to `Processing`
//! 4. moves the image from the incoming to the processed container
//! 5. stamps `endTime` and moves the task to `Completed`
//!
//! A failure after the record exists leaves it `Failed` with an `endTime`.
//! Every step is idempotent over the request id, so a redelivered message
//! converges on the same single record.
//!
//! ## Module Organization
//!
//! - [`models`] - inbound message, task record and OCR response shapes
//! - [`state_machine`] - task status transitions
//! - [`ocr`] - OCR client seam, Azure client and text flattening
//! - [`storage`] - object storage seam and image relocation
//! - [`task_store`] - task record persistence
//! - [`orchestration`] - the per-message pipeline
//! - [`messaging`] - queue transport and the polling worker
//! - [`config`] - configuration loading
//! - [`logging`] - structured logging setup
//! - [`error`] - structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use text_extractor::config::{PipelineConfig, StorageConfig};
//! use text_extractor::ocr::OcrClient;
//! use text_extractor::orchestration::PipelineOrchestrator;
//! use text_extractor::storage::{ContainerImageRelocator, InMemoryObjectStore};
//! use text_extractor::task_store::InMemoryTaskStore;
//!
//! # async fn example(ocr_client: Arc<dyn OcrClient>) -> text_extractor::Result<()> {
//! let store = Arc::new(InMemoryObjectStore::new());
//! let relocator = Arc::new(ContainerImageRelocator::new(store, &StorageConfig::default()));
//! let orchestrator = PipelineOrchestrator::new(
//!     ocr_client,
//!     relocator,
//!     Arc::new(InMemoryTaskStore::new()),
//!     PipelineConfig::default(),
//! );
//!
//! let body = br#"{"id":"abc","imageName":"note.jpg","storageLocation":"https://acct/incoming-images/"}"#;
//! let record = orchestrator.process_message(body).await?;
//! println!("{}: {}", record.status, record.extracted_text);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod ocr;
pub mod orchestration;
pub mod state_machine;
pub mod storage;
pub mod task_store;

pub use config::{ConfigManager, TextExtractorConfig};
pub use error::{Result, Stage, TextExtractorError};
pub use messaging::{MessageQueue, PgmqQueue, QueueWorker};
pub use models::{AnalysisResult, InboundRequest, TaskRecord};
pub use orchestration::PipelineOrchestrator;
pub use state_machine::{TaskEvent, TaskStatus};
