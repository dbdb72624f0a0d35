use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Device, JobId, JobStatus, TranscriptionResult, Translation};

pub const DEFAULT_TASK: &str = "transcribe";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Upload,
    RemoteUrl,
}

/// One transcription request and its evolving state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub language: String,
    pub model_size: String,
    pub task: String,
    pub device: Device,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beam_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_prompt: Option<String>,
    #[serde(default)]
    pub hotwords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TranscriptionResult>,
    #[serde(default)]
    pub translations: Vec<Translation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(file_name: String, source_url: Option<String>, params: JobParams) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            status: JobStatus::Pending,
            file_name,
            source_url: source_url.filter(|url| !url.is_empty()),
            language: params.language,
            model_size: params.model_size,
            task: DEFAULT_TASK.to_string(),
            device: params.device,
            beam_size: params.beam_size,
            initial_prompt: params.initial_prompt.filter(|p| !p.is_empty()),
            hotwords: params.hotwords,
            result: None,
            translations: Vec::new(),
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn source_kind(&self) -> SourceKind {
        match self.source_url.as_deref() {
            Some(url) if !url.is_empty() => SourceKind::RemoteUrl,
            _ => SourceKind::Upload,
        }
    }
}

/// Recognition parameters supplied when a job is created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobParams {
    pub language: String,
    pub model_size: String,
    pub device: Device,
    pub beam_size: Option<u32>,
    pub initial_prompt: Option<String>,
    pub hotwords: Vec<String>,
}

impl JobParams {
    /// Builds parameters from raw form values. An unknown device becomes
    /// `cpu` and a beam size that is not a number is dropped.
    pub fn from_raw(
        language: &str,
        model_size: &str,
        device: &str,
        beam_size: Option<&str>,
        initial_prompt: Option<&str>,
        hotwords: Option<&str>,
    ) -> Self {
        Self {
            language: language.to_string(),
            model_size: model_size.to_string(),
            device: Device::normalize(device),
            beam_size: beam_size.and_then(parse_beam_size),
            initial_prompt: initial_prompt
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            hotwords: hotwords.map(parse_hotwords).unwrap_or_default(),
        }
    }
}

fn parse_beam_size(raw: &str) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::debug!(beam_size = %raw, "Ignoring non-numeric beam size");
            None
        }
    }
}

/// Splits `raw` on commas and trims every element, keeping empty ones.
pub fn split_and_trim(raw: &str) -> Vec<String> {
    raw.split(',').map(|part| part.trim().to_string()).collect()
}

/// Hotword list as sent to the recognizer: trimmed, empties removed.
pub fn parse_hotwords(raw: &str) -> Vec<String> {
    split_and_trim(raw)
        .into_iter()
        .filter(|word| !word.is_empty())
        .collect()
}

/// Where the media of a new job comes from.
#[derive(Debug, Clone)]
pub enum JobSource {
    Upload { file_name: String, data: Bytes },
    Url(String),
}

/// Partial update of a stored job; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub file_name: Option<String>,
    pub language: Option<String>,
    pub model_size: Option<String>,
    pub device: Option<Device>,
    pub beam_size: Option<u32>,
    pub initial_prompt: Option<String>,
    pub hotwords: Option<Vec<String>>,
    pub result: Option<TranscriptionResult>,
    pub translations: Option<Vec<Translation>>,
    pub error_message: Option<String>,
}

impl JobPatch {
    /// Copies every present field except `status` onto `job`; status changes
    /// go through the lifecycle transition check.
    pub fn apply_fields(self, job: &mut Job) {
        if let Some(file_name) = self.file_name {
            job.file_name = file_name;
        }
        if let Some(language) = self.language {
            job.language = language;
        }
        if let Some(model_size) = self.model_size {
            job.model_size = model_size;
        }
        if let Some(device) = self.device {
            job.device = device;
        }
        if let Some(beam_size) = self.beam_size {
            job.beam_size = Some(beam_size);
        }
        if let Some(initial_prompt) = self.initial_prompt {
            job.initial_prompt = Some(initial_prompt).filter(|p| !p.is_empty());
        }
        if let Some(hotwords) = self.hotwords {
            job.hotwords = hotwords;
        }
        if let Some(result) = self.result {
            job.result = Some(result);
        }
        if let Some(translations) = self.translations {
            job.translations = translations;
        }
        if let Some(error_message) = self.error_message {
            job.error_message = Some(error_message);
        }
    }
}
