use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use futures::stream;

use crate::application::ports::{
    JobRepository, MediaStore, MediaStoreError, RepositoryError, TranslationError, Translator,
};
use crate::application::services::job_queue::{JobQueue, QueueError};
use crate::application::services::observer_registry::ObserverRegistry;
use crate::application::services::translation::translate_result;
use crate::domain::{
    Job, JobId, JobParams, JobPatch, JobSource, JobStatus, MediaFileName, MissingField,
    TranscriptionResult,
};
use crate::infrastructure::observability::sanitize_for_log;

/// Owns the job state machine. Every committed change is persisted first and
/// then broadcast to observers; nothing is broadcast when persistence fails.
pub struct JobLifecycleService {
    job_repository: Arc<dyn JobRepository>,
    media_store: Arc<dyn MediaStore>,
    translator: Arc<dyn Translator>,
    observers: Arc<ObserverRegistry>,
    queue: Arc<JobQueue>,
    fail_on_translation_error: bool,
}

impl JobLifecycleService {
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        media_store: Arc<dyn MediaStore>,
        translator: Arc<dyn Translator>,
        observers: Arc<ObserverRegistry>,
        queue: Arc<JobQueue>,
        fail_on_translation_error: bool,
    ) -> Self {
        Self {
            job_repository,
            media_store,
            translator,
            observers,
            queue,
            fail_on_translation_error,
        }
    }

    pub fn observers(&self) -> &Arc<ObserverRegistry> {
        &self.observers
    }

    #[tracing::instrument(skip(self, source, params))]
    pub async fn create(&self, source: JobSource, params: JobParams) -> Result<Job, LifecycleError> {
        let job = match source {
            JobSource::Upload { file_name, data } => {
                let stored_name = MediaFileName::for_upload(&file_name, Utc::now()).to_string();
                let size = self
                    .media_store
                    .store(&stored_name, stream::once(async move { Ok(data) }).boxed())
                    .await
                    .map_err(LifecycleError::Media)?;
                tracing::debug!(file_name = %stored_name, bytes = size, "Upload saved");
                Job::new(stored_name, None, params)
            }
            JobSource::Url(url) if !url.trim().is_empty() => {
                Job::new(String::new(), Some(url.trim().to_string()), params)
            }
            JobSource::Url(_) => {
                return Err(LifecycleError::Validation(
                    "either a file or a source URL is required".to_string(),
                ));
            }
        };

        let created = match self.job_repository.create(&job).await {
            Ok(created) => created,
            Err(e) => {
                if job.source_url.is_none() {
                    self.discard_media(&job.file_name).await;
                }
                return Err(LifecycleError::Storage(e));
            }
        };

        tracing::info!(
            job_id = %created.id,
            file_name = %created.file_name,
            source_url = created.source_url.as_deref().unwrap_or(""),
            model_size = %created.model_size,
            device = %created.device,
            initial_prompt = %sanitize_for_log(created.initial_prompt.as_deref().unwrap_or("")),
            "Transcription job created"
        );

        self.observers.broadcast(&created);
        self.queue.enqueue(created.id).await?;

        Ok(created)
    }

    pub async fn get(&self, id: JobId) -> Result<Job, LifecycleError> {
        self.job_repository
            .get_by_id(id)
            .await
            .map_err(LifecycleError::Storage)?
            .ok_or(LifecycleError::NotFound(id))
    }

    pub async fn list(&self) -> Result<Vec<Job>, LifecycleError> {
        self.job_repository
            .list()
            .await
            .map_err(LifecycleError::Storage)
    }

    /// Merges `patch` into the stored job. A status in the patch must be a
    /// legal transition from the stored status.
    #[tracing::instrument(skip(self, patch), fields(job_id = %id))]
    pub async fn update(&self, id: JobId, patch: JobPatch) -> Result<Job, LifecycleError> {
        let mut job = match self.job_repository.get_by_id(id).await {
            Ok(Some(job)) => job,
            Ok(None) => return Err(LifecycleError::NotModified(id)),
            Err(e) => return Err(LifecycleError::Storage(e)),
        };

        let next_status = patch.status;
        patch.apply_fields(&mut job);
        if let Some(next) = next_status {
            transition(&mut job, next)?;
        }

        self.commit(job)
            .await
            .map_err(|e| not_modified_or_storage(id, e))
    }

    /// Removes the job and, best effort, its media file.
    #[tracing::instrument(skip(self), fields(job_id = %id))]
    pub async fn delete(&self, id: JobId) -> Result<(), LifecycleError> {
        let job = self.get(id).await?;

        if !job.file_name.is_empty() {
            self.discard_media(&job.file_name).await;
        }

        let deleted = self
            .job_repository
            .delete(id)
            .await
            .map_err(LifecycleError::Storage)?;
        if !deleted {
            return Err(LifecycleError::NotFound(id));
        }

        tracing::info!("Transcription job deleted");
        Ok(())
    }

    /// Replaces the human readable part of the job's file name, keeping the
    /// identity prefix. The disk rename happens first; if the record cannot
    /// be updated afterwards the disk rename is reverted.
    #[tracing::instrument(skip(self), fields(job_id = %id))]
    pub async fn rename(&self, id: JobId, new_human_name: &str) -> Result<Job, LifecycleError> {
        if new_human_name.is_empty() {
            return Err(LifecycleError::Validation(
                "new file name is required".to_string(),
            ));
        }
        if new_human_name.contains(['/', '\\']) {
            return Err(LifecycleError::Validation(
                "new file name must not contain path separators".to_string(),
            ));
        }

        let mut job = self.get(id).await?;
        let current = MediaFileName::parse(&job.file_name)
            .ok_or_else(|| LifecycleError::InvalidFormat(job.file_name.clone()))?;
        let old_name = job.file_name.clone();
        let new_name = current.with_human(new_human_name).to_string();

        self.media_store
            .rename(&old_name, &new_name)
            .await
            .map_err(LifecycleError::Media)?;

        job.file_name = new_name.clone();
        match self.commit(job).await {
            Ok(updated) => {
                tracing::info!(from = %old_name, to = %new_name, "Media file renamed");
                Ok(updated)
            }
            Err(store_error) => {
                tracing::error!(error = %store_error, "Failed to record renamed file, reverting");
                match self.media_store.rename(&new_name, &old_name).await {
                    Ok(()) => Err(LifecycleError::Storage(store_error)),
                    Err(rollback) => {
                        tracing::error!(
                            error = %rollback,
                            from = %new_name,
                            to = %old_name,
                            "Failed to revert media rename; disk and store now disagree"
                        );
                        Err(LifecycleError::RenameRollbackFailed {
                            store: store_error,
                            rollback,
                        })
                    }
                }
            }
        }
    }

    /// Translates the job's result into `target_language` and records the
    /// translation. On failure the job stays in `translating` unless the
    /// service was built to fail it.
    #[tracing::instrument(skip(self), fields(job_id = %id))]
    pub async fn translate(&self, id: JobId, target_language: &str) -> Result<Job, LifecycleError> {
        let mut job = self.get(id).await?;
        let result = job.result.clone().ok_or_else(|| {
            LifecycleError::Validation("job has no transcription result to translate".to_string())
        })?;

        transition(&mut job, JobStatus::Translating)?;
        let job = self.commit(job).await.map_err(LifecycleError::Storage)?;

        match translate_result(self.translator.as_ref(), &result, target_language).await {
            Ok(translation) => {
                let mut job = job;
                job.translations.push(translation);
                transition(&mut job, JobStatus::Done)?;
                let job = self.commit(job).await.map_err(LifecycleError::Storage)?;
                tracing::info!(target_language, "Translation completed");
                Ok(job)
            }
            Err(e) => {
                tracing::warn!(error = %e, target_language, "Translation failed");
                if self.fail_on_translation_error {
                    if let Err(fail_error) = self.fail(id, &e.to_string()).await {
                        tracing::error!(error = %fail_error, "Failed to mark job as failed");
                    }
                }
                Err(LifecycleError::Translation(e))
            }
        }
    }

    /// Accepts a transcription produced outside this process. The stored job
    /// is untouched unless `result` is complete.
    #[tracing::instrument(skip(self, result), fields(job_id = %id))]
    pub async fn ingest_external_result(
        &self,
        id: JobId,
        result: TranscriptionResult,
    ) -> Result<Job, LifecycleError> {
        result.validate()?;

        let mut job = self.get(id).await?;
        job.result = Some(result);
        if matches!(job.status, JobStatus::Pending | JobStatus::Downloading) {
            transition(&mut job, JobStatus::Transcribing)?;
        }
        if job.status == JobStatus::Transcribing {
            transition(&mut job, JobStatus::Done)?;
        }

        self.commit(job)
            .await
            .map_err(|e| not_modified_or_storage(id, e))
    }

    pub async fn begin_download(&self, id: JobId) -> Result<Job, LifecycleError> {
        self.advance(id, JobStatus::Downloading, |_| {}).await
    }

    /// Moves the job to `transcribing`, recording the acquired file name when
    /// one is given.
    pub async fn begin_transcription(
        &self,
        id: JobId,
        file_name: Option<String>,
    ) -> Result<Job, LifecycleError> {
        self.advance(id, JobStatus::Transcribing, move |job| {
            if let Some(file_name) = file_name {
                job.file_name = file_name;
            }
        })
        .await
    }

    pub async fn complete(
        &self,
        id: JobId,
        result: TranscriptionResult,
    ) -> Result<Job, LifecycleError> {
        result.validate()?;
        self.advance(id, JobStatus::Done, move |job| {
            job.result = Some(result);
            job.error_message = None;
        })
        .await
    }

    /// Returns a job stuck in `translating` to `done` with its existing
    /// translations.
    pub async fn abandon_translation(&self, id: JobId) -> Result<Job, LifecycleError> {
        self.advance(id, JobStatus::Done, |_| {}).await
    }

    pub async fn fail(&self, id: JobId, reason: &str) -> Result<Job, LifecycleError> {
        let reason = reason.to_string();
        self.advance(id, JobStatus::Failed, move |job| {
            job.error_message = Some(reason);
        })
        .await
    }

    async fn advance(
        &self,
        id: JobId,
        next: JobStatus,
        mutate: impl FnOnce(&mut Job) + Send,
    ) -> Result<Job, LifecycleError> {
        let mut job = self.get(id).await?;
        transition(&mut job, next)?;
        mutate(&mut job);
        self.commit(job).await.map_err(LifecycleError::Storage)
    }

    async fn discard_media(&self, file_name: &str) {
        if let Err(e) = self.media_store.delete(file_name).await {
            tracing::warn!(error = %e, file_name, "Failed to delete media file");
        }
    }

    async fn commit(&self, mut job: Job) -> Result<Job, RepositoryError> {
        job.updated_at = Utc::now();
        let stored = self.job_repository.update(&job).await?;
        self.observers.broadcast(&stored);
        Ok(stored)
    }
}

fn transition(job: &mut Job, next: JobStatus) -> Result<(), LifecycleError> {
    if !job.status.can_transition_to(next) {
        return Err(LifecycleError::InvalidTransition {
            from: job.status,
            to: next,
        });
    }
    if job.status != next {
        tracing::debug!(job_id = %job.id, from = %job.status, to = %next, "Job status transition");
    }
    job.status = next;
    Ok(())
}

fn not_modified_or_storage(id: JobId, e: RepositoryError) -> LifecycleError {
    match e {
        RepositoryError::NoRowsAffected(_) => LifecycleError::NotModified(id),
        other => LifecycleError::Storage(other),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("{0}")]
    MissingField(#[from] MissingField),
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job not modified: {0}")]
    NotModified(JobId),
    #[error("invalid filename format: {0}")]
    InvalidFormat(String),
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
    #[error("storage: {0}")]
    Storage(RepositoryError),
    #[error("media: {0}")]
    Media(MediaStoreError),
    #[error("storage: {store}; reverting rename also failed: {rollback}")]
    RenameRollbackFailed {
        store: RepositoryError,
        rollback: MediaStoreError,
    },
    #[error("translation: {0}")]
    Translation(TranslationError),
    #[error("queue: {0}")]
    Queue(#[from] QueueError),
}
