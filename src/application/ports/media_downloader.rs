use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;

pub struct DownloadedMedia {
    pub title: String,
    pub stream: BoxStream<'static, Result<Bytes, io::Error>>,
}

/// Fetches remote media through an external tool.
#[async_trait::async_trait]
pub trait MediaDownloader: Send + Sync {
    async fn download(&self, source_url: &str) -> Result<DownloadedMedia, DownloadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("source URL is empty")]
    MissingSource,
    #[error("failed to launch downloader: {0}")]
    Launch(io::Error),
    #[error("downloader exited with {status}: {stderr}")]
    ToolFailed { status: String, stderr: String },
    #[error("invalid media metadata: {0}")]
    Metadata(String),
    #[error("download interrupted: {0}")]
    Stream(io::Error),
}
