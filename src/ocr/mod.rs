//! # OCR
//!
//! Text recognition seam: the [`OcrClient`] capability, the service-backed
//! [`AzureOcrClient`], and the [`flatten`] parser that turns an analysis
//! result into plain text.

pub mod azure_client;
pub mod parser;

pub use azure_client::AzureOcrClient;
pub use parser::flatten;

use crate::error::Result;
use crate::models::AnalysisResult;
use async_trait::async_trait;

/// Output of one successful OCR call
#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutput {
    /// Response body exactly as the service returned it
    pub raw_response: String,
    pub analysis: AnalysisResult,
}

/// Extracts text from an image reachable at a URL.
///
/// One request per call, no internal retry. Any failure is reported as a
/// dependency error for the `ocr` stage; partial results are never returned.
#[async_trait]
pub trait OcrClient: Send + Sync {
    async fn extract_text(&self, image_url: &str, language: &str) -> Result<OcrOutput>;
}
