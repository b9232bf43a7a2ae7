//! # System Constants
//!
//! Fixed names and defaults that define the operational boundaries of the
//! text extraction worker: container names, OCR service parameters and the
//! task status groupings used by the state machine.

pub use crate::state_machine::TaskStatus;

/// Task lifecycle operations emitted in structured logs
pub mod events {
    pub const TASK_CREATED: &str = "task.created";
    pub const TASK_OCR_COMPLETED: &str = "task.ocr_completed";
    pub const TASK_COMPLETED: &str = "task.completed";
    pub const TASK_FAILED: &str = "task.failed";
    pub const IMAGE_RELOCATED: &str = "image.relocated";
    pub const IMAGE_SOURCE_MISSING: &str = "image.source_missing";
}

/// System-wide defaults
pub mod system {
    /// Language forwarded to the OCR service when the request carries none
    pub const DEFAULT_LANGUAGE: &str = "en";

    /// Logical container holding images waiting to be processed
    pub const INCOMING_CONTAINER: &str = "incoming-images";

    /// Logical container receiving images after OCR
    pub const PROCESSED_CONTAINER: &str = "processed-images";

    /// Queue carrying image processing requests
    pub const IMAGE_PROCESSING_QUEUE: &str = "image_processing_queue";

    /// Table holding task record documents
    pub const TASK_TABLE: &str = "image_processing_tasks";

    pub const DEFAULT_STORAGE_ROOT: &str = "storage";
}

/// Parameters of the image analysis endpoint
pub mod ocr {
    pub const ANALYZE_PATH: &str = "/computervision/imageanalysis:analyze";
    pub const API_VERSION: &str = "2024-02-01";
    pub const READ_FEATURE: &str = "read";
    pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

    /// Longest slice of an error response body carried into error details
    pub const ERROR_BODY_EXCERPT_CHARS: usize = 512;
}

/// Status groups
pub mod status_groups {
    use super::TaskStatus;

    /// Statuses after which a record is never mutated by the same run again
    pub const TASK_FINAL_STATES: &[TaskStatus] = &[TaskStatus::Completed, TaskStatus::Failed];

    /// Statuses from which a run may still fail
    pub const TASK_FAILABLE_STATES: &[TaskStatus] = &[TaskStatus::Pending, TaskStatus::Processing];
}
