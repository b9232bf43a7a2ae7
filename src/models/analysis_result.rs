//! # Analysis Result
//!
//! Typed view of the image analysis response. Only `lines[].text` is read by
//! the pipeline; geometry and confidences are carried through untouched.
//! Every level defaults to empty, whether the key is absent or `null`, so a
//! sparse response still decodes.

use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub metadata: Option<ImageMetadata>,
    #[serde(default)]
    pub read_result: Option<ReadResult>,
}

impl AnalysisResult {
    /// Text blocks in response order; empty when the service read nothing
    pub fn blocks(&self) -> &[Block] {
        self.read_result
            .as_ref()
            .map(|read| read.blocks.as_slice())
            .unwrap_or_default()
    }

    /// Convenience constructor used when assembling results by hand
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            read_result: Some(ReadResult { blocks }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub width: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub height: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default, deserialize_with = "null_as_default")]
    pub lines: Vec<Line>,
}

impl Block {
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: texts.into_iter().map(Line::new).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    /// A line without text contributes nothing to the flattened output
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bounding_polygon: Vec<Point>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub words: Vec<Word>,
}

impl Line {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bounding_polygon: Vec<Point>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}
