//! # Text Extractor Worker
//!
//! Standalone worker process: loads configuration, wires the pipeline to
//! PostgreSQL, the OCR service and the local object store, then polls the
//! image processing queue until Ctrl+C or SIGTERM.
//!
//! ## Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin text-extractor-worker
//!
//! # Run with a specific environment and overrides
//! TEXT_EXTRACTOR_ENV=production \
//! TEXT_EXTRACTOR__OCR__API_KEY=... \
//!   cargo run --bin text-extractor-worker
//! ```

use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use text_extractor::config::ConfigManager;
use text_extractor::logging;
use text_extractor::messaging::{PgmqQueue, QueueWorker};
use text_extractor::ocr::AzureOcrClient;
use text_extractor::orchestration::PipelineOrchestrator;
use text_extractor::storage::{ContainerImageRelocator, FilesystemObjectStore};
use text_extractor::task_store::PgTaskStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let manager = ConfigManager::load().context("Failed to load configuration")?;
    let config = manager.config().clone();

    logging::init_structured_logging(&config.logging);

    info!("Starting Text Extractor Worker");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));
    info!("   Environment: {}", manager.environment());
    info!("   Config directory: {}", manager.config_directory().display());

    config.validate().context("Invalid configuration")?;
    info!(config = %config.sanitized(), "Configuration validated");

    let task_store = Arc::new(
        PgTaskStore::connect(&config.task_store)
            .await
            .context("Failed to connect task store")?,
    );
    task_store
        .ensure_schema()
        .await
        .context("Failed to prepare task table")?;

    let queue = Arc::new(PgmqQueue::new(
        task_store.pool().clone(),
        config.queue.queue_name.clone(),
    ));
    queue
        .ensure_queue()
        .await
        .context("Failed to prepare queue")?;

    let ocr_client =
        Arc::new(AzureOcrClient::new(config.ocr.clone()).context("Failed to build OCR client")?);
    let object_store = Arc::new(FilesystemObjectStore::new(&config.storage.root_dir));
    let relocator = Arc::new(ContainerImageRelocator::new(object_store, &config.storage));

    let orchestrator = Arc::new(PipelineOrchestrator::new(
        ocr_client,
        relocator,
        task_store,
        config.pipeline,
    ));

    let worker = QueueWorker::new(queue, orchestrator, config.queue.clone());
    info!(worker_id = %worker.worker_id(), "Worker ready; press Ctrl+C to shut down");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signals = tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, finishing in-flight messages...");
        let _ = shutdown_tx.send(true);
    });

    if let Err(e) = worker.run(shutdown_rx).await {
        error!(error = %e, "Queue worker exited with error");
        signals.abort();
        return Err(e.into());
    }

    signals.abort();
    info!("Text Extractor Worker shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
