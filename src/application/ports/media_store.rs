use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;

/// Flat directory of media files addressed by file name.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Writes `stream` to `file_name`, replacing any existing file.
    async fn store(
        &self,
        file_name: &str,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<u64, MediaStoreError>;

    async fn open(
        &self,
        file_name: &str,
    ) -> Result<BoxStream<'static, Result<Bytes, io::Error>>, MediaStoreError>;

    async fn rename(&self, from: &str, to: &str) -> Result<(), MediaStoreError>;

    async fn delete(&self, file_name: &str) -> Result<(), MediaStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error("invalid file name: {0}")]
    InvalidName(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("source stream failed: {0}")]
    Source(io::Error),
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}
