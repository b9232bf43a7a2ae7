//! # Task Record
//!
//! Persisted state of one image processing request. Field names are the
//! stable document shape shared by every store implementation.

use super::InboundRequest;
use crate::state_machine::TaskStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    /// Partition key; always equal to `id`
    pub request_id: String,
    pub image_name: String,
    pub language: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub ocr_result_raw: String,
    #[serde(default)]
    pub extracted_text: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Fresh record for the start of a run
    pub fn pending(request: &InboundRequest, start_time: DateTime<Utc>) -> Self {
        Self {
            id: request.id.clone(),
            request_id: request.id.clone(),
            image_name: request.image_name.clone(),
            language: request.language.clone(),
            status: TaskStatus::Pending,
            ocr_result_raw: String::new(),
            extracted_text: String::new(),
            start_time,
            end_time: None,
        }
    }

    /// Check the record-level invariants: `id == requestId` and `endTime`
    /// present exactly when the status is terminal
    pub fn is_consistent(&self) -> bool {
        self.id == self.request_id && self.end_time.is_some() == self.status.is_terminal()
    }
}
