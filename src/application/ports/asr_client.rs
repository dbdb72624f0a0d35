use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::{Job, TranscriptionResult};

#[async_trait]
pub trait AsrClient: Send + Sync {
    /// Sends the job's media and recognition parameters to the speech
    /// recognition service. Never retries.
    async fn transcribe(
        &self,
        job: &Job,
        media: BoxStream<'static, Result<Bytes, io::Error>>,
    ) -> Result<TranscriptionResult, AsrError>;

    /// Issues a single bounded health request.
    async fn health(&self) -> Result<HealthResponse, AsrError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    pub success: bool,
    pub status: u16,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AsrError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("status {status}: {body}")]
    Service { status: u16, body: String },
    #[error("decode response: {0}")]
    Decode(String),
}
