//! Shared fixtures for integration tests

#![allow(dead_code)]

use crate::mocks::{MockObjectStore, MockOcrClient, MockTaskStore};
use serde_json::json;
use std::sync::Arc;
use text_extractor::config::{MissingSourcePolicy, PipelineConfig, StorageConfig};
use text_extractor::orchestration::PipelineOrchestrator;
use text_extractor::storage::ContainerImageRelocator;

pub const INCOMING: &str = "incoming-images";
pub const PROCESSED: &str = "processed-images";
pub const STORAGE_LOCATION: &str = "https://acct.blob.example.net/incoming-images/";

pub fn message(id: &str, image_name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "imageName": image_name,
        "storageLocation": STORAGE_LOCATION,
    })
}

/// A pipeline wired to mocks, with handles kept for assertions
pub struct Harness {
    pub ocr: Arc<MockOcrClient>,
    pub objects: Arc<MockObjectStore>,
    pub store: Arc<MockTaskStore>,
    pub orchestrator: Arc<PipelineOrchestrator>,
}

pub struct HarnessBuilder {
    ocr: MockOcrClient,
    objects: MockObjectStore,
    store: MockTaskStore,
    policy: MissingSourcePolicy,
    images: Vec<String>,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            ocr: MockOcrClient::returning_lines(&["Hello", "World"]),
            objects: MockObjectStore::new(),
            store: MockTaskStore::new(),
            policy: MissingSourcePolicy::Complete,
            images: Vec::new(),
        }
    }

    pub fn ocr(mut self, ocr: MockOcrClient) -> Self {
        self.ocr = ocr;
        self
    }

    pub fn objects(mut self, objects: MockObjectStore) -> Self {
        self.objects = objects;
        self
    }

    pub fn store(mut self, store: MockTaskStore) -> Self {
        self.store = store;
        self
    }

    pub fn missing_source_policy(mut self, policy: MissingSourcePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Upload an image to the incoming container before the run
    pub fn image(mut self, image_name: &str) -> Self {
        self.images.push(image_name.to_string());
        self
    }

    pub fn build(self) -> Harness {
        for image in &self.images {
            self.objects.put(INCOMING, image, b"image-bytes".to_vec());
        }

        let ocr = Arc::new(self.ocr);
        let objects = Arc::new(self.objects);
        let store = Arc::new(self.store);
        let relocator = Arc::new(ContainerImageRelocator::new(
            objects.clone(),
            &StorageConfig::default(),
        ));

        let orchestrator = Arc::new(PipelineOrchestrator::new(
            ocr.clone(),
            relocator,
            store.clone(),
            PipelineConfig {
                missing_source_policy: self.policy,
            },
        ));

        Harness {
            ocr,
            objects,
            store,
            orchestrator,
        }
    }
}
