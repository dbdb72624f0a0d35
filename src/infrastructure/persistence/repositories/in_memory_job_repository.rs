use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{Job, JobId, JobStatus};

/// Process-local job store. Used when no database is configured and in tests.
#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn collect(&self, keep: impl Fn(&Job) -> bool) -> Vec<Job> {
        let jobs = self.jobs.read().await;
        let mut selected: Vec<Job> = jobs.values().filter(|job| keep(job)).cloned().collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        selected
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(RepositoryError::QueryFailed(format!(
                "duplicate job id {}",
                job.id
            )));
        }
        jobs.insert(job.id, job.clone());
        Ok(job.clone())
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(self.collect(|_| true).await)
    }

    async fn list_running(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(self.collect(|job| job.status.is_running()).await)
    }

    async fn list_pending(&self) -> Result<Vec<Job>, RepositoryError> {
        let mut pending = self.collect(|job| job.status == JobStatus::Pending).await;
        pending.reverse();
        Ok(pending)
    }

    async fn update(&self, job: &Job) -> Result<Job, RepositoryError> {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&job.id) {
            Some(stored) => {
                *stored = job.clone();
                Ok(job.clone())
            }
            None => Err(RepositoryError::NoRowsAffected(job.id.to_string())),
        }
    }

    async fn delete(&self, id: JobId) -> Result<bool, RepositoryError> {
        Ok(self.jobs.write().await.remove(&id).is_some())
    }
}
