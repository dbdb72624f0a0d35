use std::sync::Arc;

use tracing::Instrument;

use crate::application::ports::{AsrClient, AsrError, JobRepository, MediaStore, MediaStoreError};
use crate::application::services::job_lifecycle_service::{JobLifecycleService, LifecycleError};
use crate::application::services::job_queue::JobQueue;
use crate::application::services::media_acquirer::{AcquireError, MediaAcquirer};
use crate::domain::{JobId, JobStatus, SourceKind};

pub const INTERRUPTED_MESSAGE: &str = "interrupted by a service restart";

/// Drains the job queue, acquiring media and dispatching it to the speech
/// recognition service one job at a time.
pub struct TranscriptionWorker {
    queue: Arc<JobQueue>,
    lifecycle: Arc<JobLifecycleService>,
    job_repository: Arc<dyn JobRepository>,
    acquirer: Arc<MediaAcquirer>,
    asr_client: Arc<dyn AsrClient>,
    media_store: Arc<dyn MediaStore>,
}

impl TranscriptionWorker {
    pub fn new(
        queue: Arc<JobQueue>,
        lifecycle: Arc<JobLifecycleService>,
        job_repository: Arc<dyn JobRepository>,
        acquirer: Arc<MediaAcquirer>,
        asr_client: Arc<dyn AsrClient>,
        media_store: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            queue,
            lifecycle,
            job_repository,
            acquirer,
            asr_client,
            media_store,
        }
    }

    /// Settles jobs a previous run left mid-flight, processes jobs left
    /// `pending`, then drains the queue until it is closed.
    pub async fn run(self) {
        tracing::info!("Transcription worker started");

        self.recover_interrupted().await;
        for job_id in self.leftover_pending().await {
            self.handle_in_span(job_id).await;
        }

        while let Some(job_id) = self.queue.dequeue().await {
            self.handle_in_span(job_id).await;
        }
        tracing::info!("Transcription worker stopped: queue closed");
    }

    async fn handle_in_span(&self, job_id: JobId) {
        let span = tracing::info_span!("transcription_job", job_id = %job_id);
        self.handle(job_id).instrument(span).await;
    }

    async fn handle(&self, job_id: JobId) {
        if let Err(e) = self.process_job(job_id).await {
            tracing::error!(error = %e, "Transcription job failed");
            if let Err(mark_error) = self.lifecycle.fail(job_id, &e.to_string()).await {
                tracing::error!(error = %mark_error, "Failed to mark job as failed");
            }
        }
    }

    /// Nothing is running when the worker starts, so any job stored in a
    /// running status was cut off. Downloads and dispatches fail; translations
    /// fall back to `done`.
    async fn recover_interrupted(&self) {
        let jobs = match self.job_repository.list_running().await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load interrupted jobs");
                return;
            }
        };
        if !jobs.is_empty() {
            tracing::warn!(count = jobs.len(), "Settling jobs interrupted by a restart");
        }

        for job in jobs {
            let settled = match job.status {
                JobStatus::Translating => self.lifecycle.abandon_translation(job.id).await,
                _ => self.lifecycle.fail(job.id, INTERRUPTED_MESSAGE).await,
            };
            if let Err(e) = settled {
                tracing::error!(job_id = %job.id, error = %e, "Failed to settle interrupted job");
            }
        }
    }

    /// Jobs left `pending` by a restart or by queue eviction, oldest first.
    async fn leftover_pending(&self) -> Vec<JobId> {
        match self.job_repository.list_pending().await {
            Ok(jobs) => {
                if !jobs.is_empty() {
                    tracing::info!(count = jobs.len(), "Resuming pending jobs");
                }
                jobs.into_iter().map(|job| job.id).collect()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load pending jobs");
                Vec::new()
            }
        }
    }

    pub async fn process_job(&self, job_id: JobId) -> Result<(), WorkerError> {
        let job = self.lifecycle.get(job_id).await?;
        if job.status != JobStatus::Pending {
            tracing::debug!(status = %job.status, "Skipping job that is no longer pending");
            return Ok(());
        }

        let job = match job.source_kind() {
            SourceKind::RemoteUrl => {
                let downloading = self.lifecycle.begin_download(job_id).await?;
                let file_name = self.acquirer.acquire(&downloading).await?;
                self.lifecycle
                    .begin_transcription(job_id, Some(file_name))
                    .await?
            }
            SourceKind::Upload => self.lifecycle.begin_transcription(job_id, None).await?,
        };

        let media = self.media_store.open(&job.file_name).await?;

        tracing::debug!(file_name = %job.file_name, model_size = %job.model_size, "Dispatching to ASR");
        let result = self.asr_client.transcribe(&job, media).await?;

        let segments = result.segments.len();
        self.lifecycle.complete(job_id, result).await?;
        tracing::info!(segments, "Transcription completed");

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("lifecycle: {0}")]
    Lifecycle(#[from] LifecycleError),
    #[error("acquire: {0}")]
    Acquire(#[from] AcquireError),
    #[error("media: {0}")]
    Media(#[from] MediaStoreError),
    #[error("asr: {0}")]
    Asr(#[from] AsrError),
}
