//! Hand-written test doubles for the pipeline's collaborators

#![allow(dead_code)]

pub mod mock_object_store;
pub mod mock_ocr;
pub mod mock_queue;
pub mod mock_task_store;

pub use mock_object_store::MockObjectStore;
pub use mock_ocr::MockOcrClient;
pub use mock_queue::MockQueue;
pub use mock_task_store::MockTaskStore;
