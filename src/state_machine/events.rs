use chrono::{DateTime, Utc};

/// Events that move a task record through its lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    /// OCR returned; carries the raw response and the flattened text
    OcrCompleted {
        raw_response: String,
        extracted_text: String,
    },
    /// Relocation finished and the run is done
    Complete { at: DateTime<Utc> },
    /// A step failed after the record was created
    Fail { at: DateTime<Utc>, reason: String },
}

impl TaskEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::OcrCompleted { .. } => "ocr_completed",
            Self::Complete { .. } => "complete",
            Self::Fail { .. } => "fail",
        }
    }

    pub fn fail_with_error(reason: impl Into<String>) -> Self {
        Self::Fail {
            at: Utc::now(),
            reason: reason.into(),
        }
    }

    pub fn complete_now() -> Self {
        Self::Complete { at: Utc::now() }
    }
}
