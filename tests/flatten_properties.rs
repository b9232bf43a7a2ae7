//! Property tests for OCR text flattening

use proptest::prelude::*;
use text_extractor::models::{AnalysisResult, Block, Line};
use text_extractor::ocr::flatten;

fn line_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-zA-Z0-9 .,]{0,16}")
}

fn blocks() -> impl Strategy<Value = Vec<Vec<Option<String>>>> {
    prop::collection::vec(prop::collection::vec(line_text(), 0..6), 0..5)
}

fn analysis(texts: &[Vec<Option<String>>]) -> AnalysisResult {
    AnalysisResult::from_blocks(
        texts
            .iter()
            .map(|lines| Block {
                lines: lines
                    .iter()
                    .map(|text| Line {
                        text: text.clone(),
                        ..Default::default()
                    })
                    .collect(),
            })
            .collect(),
    )
}

proptest! {
    #[test]
    fn flatten_is_each_present_line_followed_by_newline(texts in blocks()) {
        let expected: String = texts
            .iter()
            .flatten()
            .flatten()
            .map(|text| format!("{text}\n"))
            .collect();

        prop_assert_eq!(flatten(&analysis(&texts)), expected);
    }

    #[test]
    fn flatten_emits_one_newline_per_present_line(texts in blocks()) {
        let present = texts.iter().flatten().filter(|text| text.is_some()).count();
        let output = flatten(&analysis(&texts));

        prop_assert_eq!(output.matches('\n').count(), present);
        prop_assert!(output.is_empty() || output.ends_with('\n'));
    }

    #[test]
    fn flatten_survives_json_round_trip(texts in blocks()) {
        let original = analysis(&texts);
        let raw = serde_json::to_string(&original).unwrap();
        let decoded: AnalysisResult = serde_json::from_str(&raw).unwrap();

        prop_assert_eq!(flatten(&decoded), flatten(&original));
    }
}
