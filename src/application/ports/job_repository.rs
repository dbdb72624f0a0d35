use async_trait::async_trait;

use crate::domain::{Job, JobId};

use super::RepositoryError;

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError>;

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;

    /// All jobs, newest first.
    async fn list(&self) -> Result<Vec<Job>, RepositoryError>;

    /// Jobs whose status is one of `JobStatus::RUNNING`.
    async fn list_running(&self) -> Result<Vec<Job>, RepositoryError>;

    /// Jobs still waiting for the worker, oldest first.
    async fn list_pending(&self) -> Result<Vec<Job>, RepositoryError>;

    /// Replaces the stored record. Fails with `NoRowsAffected` when no record
    /// has the job's id.
    async fn update(&self, job: &Job) -> Result<Job, RepositoryError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: JobId) -> Result<bool, RepositoryError>;
}
