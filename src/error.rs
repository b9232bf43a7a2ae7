//! # Error Types
//!
//! Crate-wide error taxonomy. Every collaborator call returns a
//! [`Result`] so the orchestrator can decide, per variant, whether a run is
//! worth redelivering.

use std::fmt;
use thiserror::Error;

/// Pipeline stage that raised a dependency error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Ocr,
    Relocate,
    Store,
    Queue,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ocr => "ocr",
            Self::Relocate => "relocate",
            Self::Store => "store",
            Self::Queue => "queue",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TextExtractorError {
    /// Malformed or undecodable inbound message
    #[error("Validation error: {0}")]
    Validation(String),

    /// An external collaborator failed
    #[error("Dependency error in stage {stage}: {detail}")]
    Dependency { stage: Stage, detail: String },

    /// Strict create found an existing record at the same key
    #[error("Conflict: task record {id} already exists")]
    Conflict { id: String },

    #[error("State transition error: cannot apply {event} to a task in status {from}")]
    StateTransition { from: String, event: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TextExtractorError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn dependency(stage: Stage, detail: impl Into<String>) -> Self {
        Self::Dependency {
            stage,
            detail: detail.into(),
        }
    }

    pub fn conflict(id: impl Into<String>) -> Self {
        Self::Conflict { id: id.into() }
    }

    pub fn state_transition(from: impl fmt::Display, event: impl Into<String>) -> Self {
        Self::StateTransition {
            from: from.to_string(),
            event: event.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether redelivering the same message could succeed.
    ///
    /// Only dependency failures are transient; a malformed message or a
    /// conflicting record fails the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Dependency { .. })
    }

    /// Stage of a dependency error, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Dependency { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<crate::config::ConfigurationError> for TextExtractorError {
    fn from(err: crate::config::ConfigurationError) -> Self {
        Self::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TextExtractorError>;
