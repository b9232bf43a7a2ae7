use super::{events::TaskEvent, states::TaskStatus};
use crate::constants::status_groups::TASK_FAILABLE_STATES;
use crate::error::{Result, TextExtractorError};
use crate::models::TaskRecord;
use tracing::debug;

/// Task record lifecycle for a single pipeline run.
///
/// The machine only ever holds the last record that was made durable.
/// Callers compute a successor with [`prepare`](Self::prepare), persist it,
/// and then [`commit`](Self::commit) it, so a failed write leaves the machine
/// at the state the store actually holds.
#[derive(Debug, Clone)]
pub struct TaskStateMachine {
    record: TaskRecord,
}

impl TaskStateMachine {
    pub fn new(record: TaskRecord) -> Self {
        Self { record }
    }

    pub fn current_state(&self) -> TaskStatus {
        self.record.status
    }

    pub fn record(&self) -> &TaskRecord {
        &self.record
    }

    pub fn into_record(self) -> TaskRecord {
        self.record
    }

    /// Build the record that results from applying `event` to the current one
    pub fn prepare(&self, event: TaskEvent) -> Result<TaskRecord> {
        let target = Self::determine_target_state(self.record.status, &event)?;
        let mut next = self.record.clone();
        next.status = target;

        match event {
            TaskEvent::OcrCompleted {
                raw_response,
                extracted_text,
            } => {
                next.ocr_result_raw = raw_response;
                next.extracted_text = extracted_text;
            }
            TaskEvent::Complete { at } => {
                // endTime never precedes startTime, even if the wall clock stepped back
                next.end_time = Some(at.max(next.start_time));
            }
            TaskEvent::Fail { at, reason } => {
                debug!(
                    request_id = %next.id,
                    from = %self.record.status,
                    reason = %reason,
                    "Preparing Failed record"
                );
                next.end_time = Some(at.max(next.start_time));
            }
        }

        Ok(next)
    }

    /// Accept a record previously returned by [`prepare`](Self::prepare)
    pub fn commit(&mut self, record: TaskRecord) {
        debug_assert_eq!(record.id, self.record.id);
        self.record = record;
    }

    /// Determine the target state based on current state and event
    pub fn determine_target_state(current: TaskStatus, event: &TaskEvent) -> Result<TaskStatus> {
        let target = match (current, event) {
            (TaskStatus::Pending, TaskEvent::OcrCompleted { .. }) => TaskStatus::Processing,
            (TaskStatus::Processing, TaskEvent::Complete { .. }) => TaskStatus::Completed,
            (from, TaskEvent::Fail { .. }) if TASK_FAILABLE_STATES.contains(&from) => {
                TaskStatus::Failed
            }
            (from, event) => {
                return Err(TextExtractorError::state_transition(
                    from,
                    event.event_type(),
                ))
            }
        };

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InboundRequest;
    use chrono::{Duration, Utc};

    fn pending_machine() -> TaskStateMachine {
        let request = InboundRequest {
            id: "abc".to_string(),
            image_name: "note.jpg".to_string(),
            language: "en".to_string(),
            storage_location: "https://x/incoming-images/".to_string(),
        };
        TaskStateMachine::new(TaskRecord::pending(&request, Utc::now()))
    }

    fn ocr_event() -> TaskEvent {
        TaskEvent::OcrCompleted {
            raw_response: "{}".to_string(),
            extracted_text: "Hello\n".to_string(),
        }
    }

    #[test]
    fn test_state_transitions() {
        assert_eq!(
            TaskStateMachine::determine_target_state(TaskStatus::Pending, &ocr_event()).unwrap(),
            TaskStatus::Processing
        );
        assert_eq!(
            TaskStateMachine::determine_target_state(
                TaskStatus::Processing,
                &TaskEvent::complete_now()
            )
            .unwrap(),
            TaskStatus::Completed
        );
        assert_eq!(
            TaskStateMachine::determine_target_state(
                TaskStatus::Pending,
                &TaskEvent::fail_with_error("ocr down")
            )
            .unwrap(),
            TaskStatus::Failed
        );
        assert_eq!(
            TaskStateMachine::determine_target_state(
                TaskStatus::Processing,
                &TaskEvent::fail_with_error("move failed")
            )
            .unwrap(),
            TaskStatus::Failed
        );
    }

    #[test]
    fn test_invalid_transitions() {
        // Completion requires OCR output first
        assert!(TaskStateMachine::determine_target_state(
            TaskStatus::Pending,
            &TaskEvent::complete_now()
        )
        .is_err());

        // Terminal states accept nothing
        for terminal in [TaskStatus::Completed, TaskStatus::Failed] {
            assert!(TaskStateMachine::determine_target_state(terminal, &ocr_event()).is_err());
            assert!(TaskStateMachine::determine_target_state(
                terminal,
                &TaskEvent::fail_with_error("late")
            )
            .is_err());
        }
    }

    #[test]
    fn test_fail_follows_status_groups() {
        use crate::constants::status_groups::TASK_FINAL_STATES;

        for &status in TASK_FAILABLE_STATES {
            assert_eq!(
                TaskStateMachine::determine_target_state(
                    status,
                    &TaskEvent::fail_with_error("boom")
                )
                .unwrap(),
                TaskStatus::Failed
            );
        }
        for &status in TASK_FINAL_STATES {
            assert!(status.is_terminal());
            assert!(TaskStateMachine::determine_target_state(
                status,
                &TaskEvent::fail_with_error("boom")
            )
            .is_err());
        }
    }

    #[test]
    fn test_prepare_does_not_mutate_until_commit() {
        let mut machine = pending_machine();
        let next = machine.prepare(ocr_event()).unwrap();

        assert_eq!(next.status, TaskStatus::Processing);
        assert_eq!(next.extracted_text, "Hello\n");
        assert_eq!(machine.current_state(), TaskStatus::Pending);
        assert!(machine.record().extracted_text.is_empty());

        machine.commit(next);
        assert_eq!(machine.current_state(), TaskStatus::Processing);
    }

    #[test]
    fn test_end_time_set_only_on_terminal_transition() {
        let mut machine = pending_machine();
        let processing = machine.prepare(ocr_event()).unwrap();
        assert!(processing.end_time.is_none());
        machine.commit(processing);

        let completed = machine.prepare(TaskEvent::complete_now()).unwrap();
        assert!(completed.end_time.is_some());
        assert!(completed.end_time.unwrap() >= completed.start_time);
    }

    #[test]
    fn test_end_time_clamped_to_start_time() {
        let machine = pending_machine();
        let earlier = machine.record().start_time - Duration::seconds(5);
        let failed = machine
            .prepare(TaskEvent::Fail {
                at: earlier,
                reason: "clock skew".to_string(),
            })
            .unwrap();
        assert_eq!(failed.end_time, Some(failed.start_time));
    }
}
