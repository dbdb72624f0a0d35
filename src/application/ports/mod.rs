mod asr_client;
mod job_repository;
mod media_downloader;
mod media_store;
mod repository_error;
mod translator;

pub use asr_client::{AsrClient, AsrError, HealthResponse};
pub use job_repository::JobRepository;
pub use media_downloader::{DownloadError, DownloadedMedia, MediaDownloader};
pub use media_store::{MediaStore, MediaStoreError};
pub use repository_error::RepositoryError;
pub use translator::{TranslationError, Translator};
