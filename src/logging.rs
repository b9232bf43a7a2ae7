//! # Structured Logging Module
//!
//! Structured `tracing` output for the worker, plus helpers that emit the
//! canonical audit lines for task transitions and queue acknowledgements.

use crate::config::LoggingConfig;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging.
///
/// `RUST_LOG` wins over the configured level when set. Safe to call more
/// than once; only the first call installs a subscriber.
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = build_filter(&config.level);
        let json = config.format.eq_ignore_ascii_case("json");

        let layer = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // A global subscriber may already exist (tests, embedding hosts)
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing");
        }

        let format = if json { "json" } else { "pretty" };
        tracing::info!(
            level = %config.level,
            format = format,
            "Structured logging initialized"
        );
    });
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log one task record transition
pub fn log_task_operation(operation: &str, request_id: &str, status: &str, details: Option<&str>) {
    tracing::info!(
        operation = %operation,
        request_id = %request_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "TASK_OPERATION"
    );
}

/// Log how a queue message was acknowledged
pub fn log_queue_operation(operation: &str, queue: &str, msg_id: i64, details: Option<&str>) {
    tracing::info!(
        operation = %operation,
        queue = %queue,
        msg_id = msg_id,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "QUEUE_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
