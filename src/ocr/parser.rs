//! # OCR Response Parser
//!
//! Flattens an analysis result into plain text.

use crate::models::AnalysisResult;

/// Concatenate every line's text, each followed by `'\n'`.
///
/// Blocks and lines keep response order; nothing is trimmed, collapsed or
/// reordered by geometry. Lines without text are skipped.
pub fn flatten(result: &AnalysisResult) -> String {
    let mut text = String::new();
    for block in result.blocks() {
        for line in &block.lines {
            if let Some(line_text) = &line.text {
                text.push_str(line_text);
                text.push('\n');
            }
        }
    }
    text
}
