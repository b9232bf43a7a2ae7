//! # Text Extractor Configuration
//!
//! Explicit, immutable configuration handed to each collaborator at
//! construction. Nothing in the pipeline reads ambient or global state.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use text_extractor::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let config = manager.config();
//!
//! let queue = &config.queue.queue_name;
//! let incoming = &config.storage.incoming_container;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

use crate::constants::{ocr, system};
use reqwest::Url;
use serde::{Deserialize, Serialize};

const MASK: &str = "***";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TextExtractorConfig {
    pub ocr: OcrConfig,
    pub storage: StorageConfig,
    pub task_store: TaskStoreConfig,
    pub queue: QueueConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// Image analysis endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OcrConfig {
    pub endpoint: String,
    pub api_key: String,
    pub analyze_path: String,
    pub api_version: String,
    pub timeout_ms: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            analyze_path: ocr::ANALYZE_PATH.to_string(),
            api_version: ocr::API_VERSION.to_string(),
            timeout_ms: ocr::DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Object storage layout
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for the filesystem-backed object store
    pub root_dir: String,
    pub incoming_container: String,
    pub processed_container: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: system::DEFAULT_STORAGE_ROOT.to_string(),
            incoming_container: system::INCOMING_CONTAINER.to_string(),
            processed_container: system::PROCESSED_CONTAINER.to_string(),
        }
    }
}

/// How `TaskStore::create` treats an existing record at the same key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateMode {
    /// Replace the existing record; safe under redelivery
    #[default]
    Upsert,
    /// Reject with a conflict error
    Strict,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TaskStoreConfig {
    pub database_url: String,
    pub table_name: String,
    pub max_connections: u32,
    pub create_mode: CreateMode,
}

impl Default for TaskStoreConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            table_name: system::TASK_TABLE.to_string(),
            max_connections: 5,
            create_mode: CreateMode::Upsert,
        }
    }
}

/// Queue polling settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    pub queue_name: String,
    /// Number of messages to read per batch
    pub batch_size: i32,
    /// Seconds a read message stays invisible before it is redelivered
    pub visibility_timeout_seconds: i32,
    /// Polling interval when the queue is empty
    pub polling_interval_ms: u64,
    /// Deliveries after which a message is archived without processing
    pub max_delivery_attempts: i32,
    /// Upper bound on runs in flight within one batch
    pub max_concurrent_messages: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_name: system::IMAGE_PROCESSING_QUEUE.to_string(),
            batch_size: 10,
            visibility_timeout_seconds: 300,
            polling_interval_ms: 1000,
            max_delivery_attempts: 5,
            max_concurrent_messages: 4,
        }
    }
}

/// What a run does when the source image is gone at relocation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSourcePolicy {
    /// Log and finish the run as Completed
    #[default]
    Complete,
    /// Treat the missing image as a relocation failure
    Fail,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub missing_source_policy: MissingSourcePolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// `json` or `pretty`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl TextExtractorConfig {
    /// Reject configurations the worker cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.ocr.endpoint.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "endpoint",
                "ocr",
            ));
        }
        if self.ocr.api_key.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field("api_key", "ocr"));
        }
        if self.ocr.timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "ocr.timeout_ms",
                "0",
                "timeout must be positive",
            ));
        }

        let storage = &self.storage;
        for (field, value) in [
            ("storage.incoming_container", &storage.incoming_container),
            ("storage.processed_container", &storage.processed_container),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigurationError::invalid_value(
                    field,
                    value.clone(),
                    "container name must not be empty",
                ));
            }
        }
        if storage.incoming_container == storage.processed_container {
            return Err(ConfigurationError::invalid_value(
                "storage.processed_container",
                storage.processed_container.clone(),
                "source and destination containers must differ",
            ));
        }

        let queue = &self.queue;
        if queue.batch_size <= 0 {
            return Err(ConfigurationError::invalid_value(
                "queue.batch_size",
                queue.batch_size.to_string(),
                "must be positive",
            ));
        }
        if queue.visibility_timeout_seconds <= 0 {
            return Err(ConfigurationError::invalid_value(
                "queue.visibility_timeout_seconds",
                queue.visibility_timeout_seconds.to_string(),
                "must be positive",
            ));
        }
        if queue.max_delivery_attempts <= 0 {
            return Err(ConfigurationError::invalid_value(
                "queue.max_delivery_attempts",
                queue.max_delivery_attempts.to_string(),
                "must be positive",
            ));
        }
        if queue.max_concurrent_messages == 0 {
            return Err(ConfigurationError::invalid_value(
                "queue.max_concurrent_messages",
                "0",
                "must be positive",
            ));
        }

        Ok(())
    }

    /// JSON view with credentials masked, safe to log
    pub fn sanitized(&self) -> serde_json::Value {
        let mut copy = self.clone();
        if !copy.ocr.api_key.is_empty() {
            copy.ocr.api_key = MASK.to_string();
        }
        copy.task_store.database_url = mask_database_url(&copy.task_store.database_url);

        serde_json::to_value(&copy).unwrap_or(serde_json::Value::Null)
    }
}

fn mask_database_url(database_url: &str) -> String {
    if database_url.is_empty() {
        return String::new();
    }
    match Url::parse(database_url) {
        Ok(mut url) => {
            if url.password().is_some() && url.set_password(Some(MASK)).is_err() {
                return MASK.to_string();
            }
            url.to_string()
        }
        Err(_) => MASK.to_string(),
    }
}
