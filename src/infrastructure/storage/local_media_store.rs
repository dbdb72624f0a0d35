use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::application::ports::{MediaStore, MediaStoreError};

/// Media files kept flat in the uploads directory, which is also served to
/// clients for playback.
pub struct LocalMediaStore {
    base_path: PathBuf,
}

impl LocalMediaStore {
    pub fn new(base_path: PathBuf) -> Result<Self, MediaStoreError> {
        std::fs::create_dir_all(&base_path).map_err(|source| MediaStoreError::Io {
            path: base_path.display().to_string(),
            source,
        })?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, file_name: &str) -> Result<PathBuf, MediaStoreError> {
        let invalid = file_name.is_empty()
            || file_name == "."
            || file_name == ".."
            || file_name.contains(['/', '\\', '\0']);
        if invalid {
            return Err(MediaStoreError::InvalidName(file_name.to_string()));
        }
        Ok(self.base_path.join(file_name))
    }
}

fn io_error(path: &Path, source: io::Error) -> MediaStoreError {
    if source.kind() == io::ErrorKind::NotFound {
        MediaStoreError::NotFound(path.display().to_string())
    } else {
        MediaStoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[async_trait::async_trait]
impl MediaStore for LocalMediaStore {
    async fn store(
        &self,
        file_name: &str,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<u64, MediaStoreError> {
        let path = self.resolve(file_name)?;
        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| io_error(&path, e))?;

        let mut total_bytes: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    drop(file);
                    let _ = tokio::fs::remove_file(&path).await;
                    return Err(MediaStoreError::Source(e));
                }
            };
            total_bytes += bytes.len() as u64;
            file.write_all(&bytes)
                .await
                .map_err(|e| io_error(&path, e))?;
        }

        file.flush().await.map_err(|e| io_error(&path, e))?;
        Ok(total_bytes)
    }

    async fn open(
        &self,
        file_name: &str,
    ) -> Result<BoxStream<'static, Result<Bytes, io::Error>>, MediaStoreError> {
        let path = self.resolve(file_name)?;
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| io_error(&path, e))?;
        Ok(ReaderStream::new(file).boxed())
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), MediaStoreError> {
        let from_path = self.resolve(from)?;
        let to_path = self.resolve(to)?;
        tokio::fs::rename(&from_path, &to_path)
            .await
            .map_err(|e| io_error(&from_path, e))
    }

    async fn delete(&self, file_name: &str) -> Result<(), MediaStoreError> {
        let path = self.resolve(file_name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| io_error(&path, e))
    }
}
