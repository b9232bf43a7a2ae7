//! # Orchestration
//!
//! The per-message pipeline that ties OCR, relocation and the task store
//! together.

pub mod pipeline;

pub use crate::config::{MissingSourcePolicy, PipelineConfig};
pub use pipeline::PipelineOrchestrator;
