use std::io;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use reqwest::multipart;

use crate::application::ports::{AsrClient, AsrError, HealthResponse};
use crate::domain::{Job, TranscriptionResult};

/// Client for the speech recognition service's `/transcribe` and
/// `/healthcheck` endpoints.
pub struct HttpAsrClient {
    client: reqwest::Client,
    health_client: reqwest::Client,
    base_url: String,
}

impl HttpAsrClient {
    /// `dispatch_timeout` of `None` lets a transcription run as long as the
    /// service needs.
    pub fn new(
        base_url: &str,
        health_timeout: Duration,
        dispatch_timeout: Option<Duration>,
    ) -> Result<Self, AsrError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = dispatch_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AsrError::Request(format!("client: {}", e)))?;
        let health_client = reqwest::Client::builder()
            .timeout(health_timeout)
            .build()
            .map_err(|e| AsrError::Request(format!("client: {}", e)))?;

        Ok(Self {
            client,
            health_client,
            base_url: normalize_base_url(base_url),
        })
    }
}

/// Accepts both `host:port` and full URLs.
fn normalize_base_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// Form fields sent alongside the media file. Optional parameters are only
/// included when set.
pub fn transcription_fields(job: &Job) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("model_size", job.model_size.clone()),
        ("task", job.task.clone()),
        ("language", job.language.clone()),
        ("device", job.device.as_str().to_string()),
    ];

    if let Some(beam_size) = job.beam_size.filter(|b| *b > 0) {
        fields.push(("beam_size", beam_size.to_string()));
    }
    if let Some(prompt) = job.initial_prompt.as_deref().filter(|p| !p.is_empty()) {
        fields.push(("initial_prompt", prompt.to_string()));
    }
    if !job.hotwords.is_empty() {
        fields.push(("hotwords", job.hotwords.join(",")));
    }

    fields
}

#[async_trait]
impl AsrClient for HttpAsrClient {
    async fn transcribe(
        &self,
        job: &Job,
        media: BoxStream<'static, Result<Bytes, io::Error>>,
    ) -> Result<TranscriptionResult, AsrError> {
        let url = format!("{}/transcribe", self.base_url);

        let file_part = multipart::Part::stream(reqwest::Body::wrap_stream(media))
            .file_name(job.file_name.clone());

        let mut form = multipart::Form::new().part("file", file_part);
        for (name, value) in transcription_fields(job) {
            form = form.text(name, value);
        }

        tracing::debug!(url = %url, model_size = %job.model_size, device = %job.device, "Sending media to ASR service");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| AsrError::Request(format!("request: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AsrError::Request(format!("body: {}", e)))?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            tracing::error!(status = status.as_u16(), body = %body, "ASR service returned an error");
            return Err(AsrError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let result: TranscriptionResult =
            serde_json::from_slice(&body).map_err(|e| AsrError::Decode(e.to_string()))?;

        tracing::info!(
            language = %result.language,
            segments = result.segments.len(),
            "ASR transcription received"
        );

        Ok(result)
    }

    async fn health(&self) -> Result<HealthResponse, AsrError> {
        let url = format!("{}/healthcheck", self.base_url);
        let response = self
            .health_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AsrError::Request(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        Ok(HealthResponse {
            success: status.is_success(),
            status: status.as_u16(),
            body,
        })
    }
}
