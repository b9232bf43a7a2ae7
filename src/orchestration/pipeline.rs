//! # Pipeline Orchestrator
//!
//! Drives one inbound request through the pipeline and keeps its task record
//! in step:
//!
//! 1. create the record as `Pending`
//! 2. call OCR with `storageLocation + imageName`
//! 3. flatten, store OCR output, move to `Processing`
//! 4. relocate the image
//! 5. set `endTime`, move to `Completed`
//!
//! Steps run strictly in order and each store write completes before the next
//! step starts. On any failure after the record exists, the orchestrator makes
//! a best-effort attempt to mark it `Failed` and returns the original error.
//! Every step is safe to repeat, so a redelivered message simply re-runs the
//! pipeline over the same key.

use crate::config::{MissingSourcePolicy, PipelineConfig};
use crate::constants::events;
use crate::error::{Result, Stage, TextExtractorError};
use crate::logging::{log_error, log_task_operation};
use crate::models::{InboundRequest, TaskRecord};
use crate::ocr::{flatten, OcrClient};
use crate::state_machine::{TaskEvent, TaskStateMachine};
use crate::storage::{ImageRelocator, RelocationOutcome};
use crate::task_store::TaskStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub struct PipelineOrchestrator {
    ocr_client: Arc<dyn OcrClient>,
    relocator: Arc<dyn ImageRelocator>,
    task_store: Arc<dyn TaskStore>,
    config: PipelineConfig,
}

impl PipelineOrchestrator {
    pub fn new(
        ocr_client: Arc<dyn OcrClient>,
        relocator: Arc<dyn ImageRelocator>,
        task_store: Arc<dyn TaskStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            ocr_client,
            relocator,
            task_store,
            config,
        }
    }

    /// Decode a raw message body and run the pipeline for it.
    ///
    /// A body that does not decode fails with a validation error before any
    /// record is created.
    pub async fn process_message(&self, body: &[u8]) -> Result<TaskRecord> {
        let request = InboundRequest::from_slice(body)?;
        self.process(request).await
    }

    /// Run the pipeline for a message already parsed as JSON
    pub async fn process_json(&self, payload: serde_json::Value) -> Result<TaskRecord> {
        let request = InboundRequest::from_json(payload)?;
        self.process(request).await
    }

    /// Run the pipeline for one request and return the terminal record
    #[instrument(skip(self, request), fields(request_id = %request.id, image_name = %request.image_name))]
    pub async fn process(&self, request: InboundRequest) -> Result<TaskRecord> {
        info!(
            language = %request.language,
            storage_location = %request.storage_location,
            "Processing image"
        );

        let mut machine = TaskStateMachine::new(TaskRecord::pending(&request, Utc::now()));

        // Nothing to mark Failed if the record never made it to the store
        if let Err(e) = self.task_store.create(machine.record()).await {
            error!(error = %e, "Failed to create task record");
            return Err(e);
        }
        log_task_operation(
            events::TASK_CREATED,
            &request.id,
            machine.current_state().as_str(),
            None,
        );

        match self.run_steps(&request, &mut machine).await {
            Ok(()) => Ok(machine.into_record()),
            Err(e) => {
                self.mark_failed(&mut machine, &e).await;
                Err(e)
            }
        }
    }

    async fn run_steps(
        &self,
        request: &InboundRequest,
        machine: &mut TaskStateMachine,
    ) -> Result<()> {
        let output = self
            .ocr_client
            .extract_text(&request.image_url(), &request.language)
            .await?;

        let extracted_text = flatten(&output.analysis);
        debug!(chars = extracted_text.len(), "OCR text flattened");

        self.advance(
            machine,
            TaskEvent::OcrCompleted {
                raw_response: output.raw_response,
                extracted_text,
            },
            events::TASK_OCR_COMPLETED,
        )
        .await?;

        match self.relocator.relocate(&request.image_name).await? {
            RelocationOutcome::Moved => {}
            RelocationOutcome::SourceMissing => match self.config.missing_source_policy {
                MissingSourcePolicy::Complete => {
                    warn!("Source image missing at relocation; completing task anyway");
                }
                MissingSourcePolicy::Fail => {
                    return Err(TextExtractorError::dependency(
                        Stage::Relocate,
                        format!("source image {} does not exist", request.image_name),
                    ));
                }
            },
        }

        self.advance(machine, TaskEvent::complete_now(), events::TASK_COMPLETED)
            .await
    }

    /// Persist the successor record, then commit it to the machine
    async fn advance(
        &self,
        machine: &mut TaskStateMachine,
        event: TaskEvent,
        operation: &str,
    ) -> Result<()> {
        let next = machine.prepare(event)?;
        self.task_store.update(&next).await?;
        machine.commit(next);

        log_task_operation(
            operation,
            &machine.record().id,
            machine.current_state().as_str(),
            None,
        );
        Ok(())
    }

    /// Best effort: a failure here is logged and the original error wins
    async fn mark_failed(&self, machine: &mut TaskStateMachine, cause: &TextExtractorError) {
        let reason = cause.to_string();
        let failed = match machine.prepare(TaskEvent::fail_with_error(reason.clone())) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Task record cannot be marked Failed");
                return;
            }
        };

        match self.task_store.update(&failed).await {
            Ok(()) => {
                machine.commit(failed);
                log_task_operation(
                    events::TASK_FAILED,
                    &machine.record().id,
                    machine.current_state().as_str(),
                    Some(&reason),
                );
            }
            Err(e) => {
                log_error(
                    "pipeline",
                    events::TASK_FAILED,
                    &e.to_string(),
                    Some(&format!(
                        "request {} left as {}; cause: {reason}",
                        machine.record().id,
                        machine.current_state()
                    )),
                );
            }
        }
    }
}
