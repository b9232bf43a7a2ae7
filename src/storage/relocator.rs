//! # Image Relocation
//!
//! Moves a processed image from the incoming container to the processed
//! container with copy-then-delete ordering: the source is removed only after
//! the destination copy is durable, so a crash mid-move leaves the image
//! recoverable from the source.

use super::{ObjectStore, StorageError};
use crate::config::StorageConfig;
use crate::constants::events;
use crate::error::{Result, Stage, TextExtractorError};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationOutcome {
    Moved,
    /// The source object was absent; nothing was touched
    SourceMissing,
}

impl fmt::Display for RelocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moved => f.write_str("moved"),
            Self::SourceMissing => f.write_str("source_missing"),
        }
    }
}

#[async_trait]
pub trait ImageRelocator: Send + Sync {
    async fn relocate(&self, image_name: &str) -> Result<RelocationOutcome>;
}

/// [`ImageRelocator`] over any [`ObjectStore`] with fixed container names
pub struct ContainerImageRelocator {
    store: Arc<dyn ObjectStore>,
    source_container: String,
    destination_container: String,
}

impl ContainerImageRelocator {
    pub fn new(store: Arc<dyn ObjectStore>, config: &StorageConfig) -> Self {
        Self {
            store,
            source_container: config.incoming_container.clone(),
            destination_container: config.processed_container.clone(),
        }
    }
}

fn relocation_error(error: StorageError) -> TextExtractorError {
    TextExtractorError::dependency(Stage::Relocate, error.to_string())
}

#[async_trait]
impl ImageRelocator for ContainerImageRelocator {
    #[instrument(skip(self), fields(source = %self.source_container, destination = %self.destination_container))]
    async fn relocate(&self, image_name: &str) -> Result<RelocationOutcome> {
        let present = self
            .store
            .exists(&self.source_container, image_name)
            .await
            .map_err(relocation_error)?;

        if !present {
            warn!(
                operation = events::IMAGE_SOURCE_MISSING,
                image_name = %image_name,
                "Source image does not exist; nothing to relocate"
            );
            return Ok(RelocationOutcome::SourceMissing);
        }

        self.store
            .copy(&self.source_container, image_name, &self.destination_container)
            .await
            .map_err(relocation_error)?;

        self.store
            .delete(&self.source_container, image_name)
            .await
            .map_err(relocation_error)?;

        info!(
            operation = events::IMAGE_RELOCATED,
            image_name = %image_name,
            "Image relocated"
        );
        Ok(RelocationOutcome::Moved)
    }
}
