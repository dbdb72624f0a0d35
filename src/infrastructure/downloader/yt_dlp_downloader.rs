use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use futures::StreamExt;
use futures::future;
use futures::stream;
use serde::Deserialize;
use tokio::process::Command;
use tokio_util::io::ReaderStream;

use crate::application::ports::{DownloadError, DownloadedMedia, MediaDownloader};
use crate::infrastructure::observability::sanitize_for_log;

/// Downloads media by shelling out to `yt-dlp`.
pub struct YtDlpDownloader {
    binary: String,
    format: String,
}

#[derive(Deserialize)]
struct MediaInfo {
    #[serde(default)]
    title: String,
}

impl YtDlpDownloader {
    pub fn new(binary: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            format: format.into(),
        }
    }

    async fn fetch_title(&self, source_url: &str) -> Result<String, DownloadError> {
        let output = Command::new(&self.binary)
            .args(["--dump-single-json", "--no-playlist", "--no-warnings"])
            .arg(source_url)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(DownloadError::Launch)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DownloadError::ToolFailed {
                status: output.status.to_string(),
                stderr: sanitize_for_log(&stderr),
            });
        }

        let info: MediaInfo = serde_json::from_slice(&output.stdout)
            .map_err(|e| DownloadError::Metadata(e.to_string()))?;
        Ok(info.title)
    }
}

#[async_trait]
impl MediaDownloader for YtDlpDownloader {
    async fn download(&self, source_url: &str) -> Result<DownloadedMedia, DownloadError> {
        if source_url.is_empty() {
            return Err(DownloadError::MissingSource);
        }

        let title = self.fetch_title(source_url).await?;
        tracing::debug!(title = %title, format = %self.format, "Starting yt-dlp download");

        let mut child = Command::new(&self.binary)
            .args(["--no-playlist", "--no-warnings", "--quiet", "-f"])
            .arg(&self.format)
            .args(["-o", "-"])
            .arg(source_url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(DownloadError::Launch)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::Launch(io::Error::other("stdout not captured")))?;

        // The exit status is only known once stdout is drained, so a failing
        // tool surfaces as a trailing stream error.
        let exit = stream::once(async move {
            match child.wait().await {
                Ok(status) if status.success() => None,
                Ok(status) => Some(Err(io::Error::other(format!(
                    "yt-dlp exited with {}",
                    status
                )))),
                Err(e) => Some(Err(e)),
            }
        })
        .filter_map(future::ready);

        Ok(DownloadedMedia {
            title,
            stream: ReaderStream::new(stdout).chain(exit).boxed(),
        })
    }
}
