pub mod analysis_result;
pub mod inbound_request;
pub mod task_record;

// Re-export core models for easy access
pub use analysis_result::{AnalysisResult, Block, ImageMetadata, Line, Point, ReadResult, Word};
pub use inbound_request::InboundRequest;
pub use task_record::TaskRecord;
