//! Scripted OCR client that records every call

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use text_extractor::models::{AnalysisResult, Block};
use text_extractor::ocr::{OcrClient, OcrOutput};
use text_extractor::{Result, Stage, TextExtractorError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrCall {
    pub image_url: String,
    pub language: String,
}

pub struct MockOcrClient {
    /// Responses consumed in order; the default applies once these run out
    scripted: Mutex<VecDeque<Result<OcrOutput>>>,
    default_response: Result<OcrOutput>,
    calls: Arc<Mutex<Vec<OcrCall>>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockOcrClient {
    /// Always recognize a single block with the given lines
    pub fn returning_lines(lines: &[&str]) -> Self {
        Self::with_default(Ok(output_for_lines(lines)))
    }

    /// Always fail with an OCR dependency error
    pub fn failing(detail: &str) -> Self {
        Self::with_default(Err(TextExtractorError::dependency(Stage::Ocr, detail)))
    }

    fn with_default(default_response: Result<OcrOutput>) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            default_response,
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Queue a one-off response ahead of the default
    pub fn then(self, response: Result<OcrOutput>) -> Self {
        self.scripted.lock().unwrap().push_back(response);
        self
    }

    /// Hold every call for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<OcrCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Highest number of calls observed running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

pub fn output_for_lines(lines: &[&str]) -> OcrOutput {
    let analysis = AnalysisResult {
        model_version: Some("2023-10-01".to_string()),
        ..AnalysisResult::from_blocks(vec![Block::from_texts(lines.iter().copied())])
    };
    OcrOutput {
        raw_response: serde_json::to_string(&analysis).unwrap(),
        analysis,
    }
}

#[async_trait]
impl OcrClient for MockOcrClient {
    async fn extract_text(&self, image_url: &str, language: &str) -> Result<OcrOutput> {
        self.calls.lock().unwrap().push(OcrCall {
            image_url: image_url.to_string(),
            language: language.to_string(),
        });

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self
            .scripted
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone());

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}
