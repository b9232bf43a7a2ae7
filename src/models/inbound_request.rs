//! # Inbound Request
//!
//! One queue message asking for a single image to be processed.

use crate::constants::system::DEFAULT_LANGUAGE;
use crate::error::{Result, TextExtractorError};
use serde::{Deserialize, Deserializer, Serialize};

/// Image processing request as carried on the queue.
///
/// `id` is assigned by the producer and doubles as the task record key, so
/// it is never generated here: a redelivered message must map onto the same
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundRequest {
    pub id: String,
    pub image_name: String,
    #[serde(default = "default_language", deserialize_with = "language_or_default")]
    pub language: String,
    pub storage_location: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Producers may send `"language": null`; treat it like an absent key
fn language_or_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_language))
}

impl InboundRequest {
    /// Decode and validate a raw message body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let request: Self = serde_json::from_slice(body).map_err(|e| {
            TextExtractorError::validation(format!("Invalid image processing message: {e}"))
        })?;
        request.validated()
    }

    /// Decode and validate a message already parsed as JSON
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let request: Self = serde_json::from_value(value).map_err(|e| {
            TextExtractorError::validation(format!("Invalid image processing message: {e}"))
        })?;
        request.validated()
    }

    fn validated(mut self) -> Result<Self> {
        if self.id.trim().is_empty() {
            return Err(TextExtractorError::validation("Message id must not be empty"));
        }
        if self.image_name.trim().is_empty() {
            return Err(TextExtractorError::validation(format!(
                "Message {} has an empty imageName",
                self.id
            )));
        }
        if self.storage_location.trim().is_empty() {
            return Err(TextExtractorError::validation(format!(
                "Message {} has an empty storageLocation",
                self.id
            )));
        }
        if self.language.trim().is_empty() {
            self.language = default_language();
        }
        Ok(self)
    }

    /// Location handed to the OCR service
    pub fn image_url(&self) -> String {
        format!("{}{}", self.storage_location, self.image_name)
    }
}
