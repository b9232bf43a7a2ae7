use crate::constants::status_groups::TASK_FINAL_STATES;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a task record.
///
/// Serialized in PascalCase so persisted documents read `"Pending"`,
/// `"Processing"`, `"Completed"` and `"Failed"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    /// Record created, OCR not yet done
    #[default]
    Pending,
    /// OCR output stored, image relocation outstanding
    Processing,
    /// All steps succeeded
    Completed,
    /// A step failed after the record was created
    Failed,
}

impl TaskStatus {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        TASK_FINAL_STATES.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Completed" => Ok(Self::Completed),
            "Failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}
