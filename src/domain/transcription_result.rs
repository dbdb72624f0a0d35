use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub start: f64,
    pub end: f64,
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<Word>,
}

/// Structured output of the speech recognition service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    #[serde(default)]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl TranscriptionResult {
    /// Checks the fields a completed job must carry, in a fixed order so the
    /// first missing one is reported.
    pub fn validate(&self) -> Result<(), MissingField> {
        if self.language.trim().is_empty() {
            return Err(MissingField::Language);
        }
        if self.text.trim().is_empty() {
            return Err(MissingField::Text);
        }
        if self.segments.is_empty() {
            return Err(MissingField::Segments);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MissingField {
    #[error("Missing required field: language")]
    Language,
    #[error("Missing required field: text")]
    Text,
    #[error("Missing required field: segments")]
    Segments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub source_language: String,
    pub target_language: String,
    pub text: String,
    pub segments: Vec<Segment>,
}
