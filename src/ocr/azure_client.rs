//! # Azure Image Analysis Client
//!
//! HTTP client for the image analysis `read` feature.

use super::{OcrClient, OcrOutput};
use crate::config::OcrConfig;
use crate::constants::ocr::{ERROR_BODY_EXCERPT_CHARS, READ_FEATURE, SUBSCRIPTION_KEY_HEADER};
use crate::error::{Result, Stage, TextExtractorError};
use crate::models::AnalysisResult;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    url: &'a str,
}

/// [`OcrClient`] backed by the image analysis REST endpoint
#[derive(Debug, Clone)]
pub struct AzureOcrClient {
    client: Client,
    config: OcrConfig,
}

impl AzureOcrClient {
    pub fn new(config: OcrConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                TextExtractorError::configuration(format!("Failed to build OCR HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Full analyze URL for one call
    pub fn analyze_url(&self, language: &str) -> Result<Url> {
        let base = format!(
            "{}{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.analyze_path
        );
        let mut url = Url::parse(&base).map_err(|e| {
            TextExtractorError::configuration(format!("Invalid OCR endpoint '{base}': {e}"))
        })?;

        url.query_pairs_mut()
            .append_pair("api-version", &self.config.api_version)
            .append_pair("features", READ_FEATURE)
            .append_pair("language", language);

        Ok(url)
    }
}

#[async_trait]
impl OcrClient for AzureOcrClient {
    #[instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    async fn extract_text(&self, image_url: &str, language: &str) -> Result<OcrOutput> {
        let url = self.analyze_url(language)?;

        let response = self
            .client
            .post(url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.api_key)
            .json(&AnalyzeRequest { url: image_url })
            .send()
            .await
            .map_err(|e| {
                TextExtractorError::dependency(Stage::Ocr, format!("request failed: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            TextExtractorError::dependency(Stage::Ocr, format!("failed to read response: {e}"))
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "OCR service rejected the request");
            return Err(TextExtractorError::dependency(
                Stage::Ocr,
                format!("status {}: {}", status.as_u16(), excerpt(&body)),
            ));
        }

        let analysis: AnalysisResult = serde_json::from_str(&body).map_err(|e| {
            TextExtractorError::dependency(Stage::Ocr, format!("invalid analysis result: {e}"))
        })?;

        debug!(
            blocks = analysis.blocks().len(),
            model_version = analysis.model_version.as_deref().unwrap_or("unknown"),
            "OCR analysis received"
        );

        Ok(OcrOutput {
            raw_response: body,
            analysis,
        })
    }
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
