use std::sync::Arc;

use crate::application::ports::{DownloadError, MediaDownloader, MediaStore, MediaStoreError};
use crate::domain::{Job, MediaFileName};

/// Downloads remote media for a job into the media store.
pub struct MediaAcquirer {
    downloader: Arc<dyn MediaDownloader>,
    media_store: Arc<dyn MediaStore>,
}

impl MediaAcquirer {
    pub fn new(downloader: Arc<dyn MediaDownloader>, media_store: Arc<dyn MediaStore>) -> Self {
        Self {
            downloader,
            media_store,
        }
    }

    /// Returns the stored file name, `<job id><separator><sanitized title>`.
    /// Acquiring the same job again overwrites the previous file.
    #[tracing::instrument(skip(self, job), fields(job_id = %job.id))]
    pub async fn acquire(&self, job: &Job) -> Result<String, AcquireError> {
        let source_url = job
            .source_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(AcquireError::Download(DownloadError::MissingSource))?;

        tracing::debug!(source_url = %source_url, "Downloading media");

        let media = self.downloader.download(source_url).await?;
        let file_name = MediaFileName::for_download(job.id, &media.title).to_string();

        let bytes = self
            .media_store
            .store(&file_name, media.stream)
            .await
            .map_err(|e| match e {
                MediaStoreError::Source(cause) => {
                    AcquireError::Download(DownloadError::Stream(cause))
                }
                other => AcquireError::Io(other),
            })?;

        tracing::info!(file_name = %file_name, bytes, "Media downloaded");

        Ok(file_name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("download: {0}")]
    Download(#[from] DownloadError),
    #[error("io: {0}")]
    Io(MediaStoreError),
}
