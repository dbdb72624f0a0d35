use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{
    Device, Job, JobId, JobStatus, TranscriptionResult, Translation,
};

const JOB_COLUMNS: &str = "id, status, file_name, source_url, language, model_size, task, \
    device, beam_size, initial_prompt, hotwords, result, translations, error_message, \
    created_at, updated_at";

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(
        &self,
        condition: &str,
        statuses: Vec<String>,
    ) -> Result<Vec<Job>, RepositoryError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE {condition}");
        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(statuses)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(JobRow::into_job).collect()
    }
}

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    status: String,
    file_name: String,
    source_url: Option<String>,
    language: String,
    model_size: String,
    task: String,
    device: String,
    beam_size: Option<i32>,
    initial_prompt: Option<String>,
    hotwords: Json<Vec<String>>,
    result: Option<Json<TranscriptionResult>>,
    translations: Json<Vec<Translation>>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl JobRow {
    fn into_job(self) -> Result<Job, RepositoryError> {
        let status = self
            .status
            .parse::<JobStatus>()
            .map_err(RepositoryError::QueryFailed)?;

        Ok(Job {
            id: JobId::from_uuid(self.id),
            status,
            file_name: self.file_name,
            source_url: self.source_url,
            language: self.language,
            model_size: self.model_size,
            task: self.task,
            device: Device::normalize(&self.device),
            beam_size: self.beam_size.and_then(|b| u32::try_from(b).ok()),
            initial_prompt: self.initial_prompt,
            hotwords: self.hotwords.0,
            result: self.result.map(|r| r.0),
            translations: self.translations.0,
            error_message: self.error_message,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn beam_size_column(job: &Job) -> Option<i32> {
    job.beam_size.and_then(|b| i32::try_from(b).ok())
}

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError> {
        let sql = format!(
            "INSERT INTO jobs ({JOB_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {JOB_COLUMNS}"
        );

        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(job.id.as_uuid())
            .bind(job.status.as_str())
            .bind(&job.file_name)
            .bind(&job.source_url)
            .bind(&job.language)
            .bind(&job.model_size)
            .bind(&job.task)
            .bind(job.device.as_str())
            .bind(beam_size_column(job))
            .bind(&job.initial_prompt)
            .bind(Json(&job.hotwords))
            .bind(job.result.as_ref().map(Json))
            .bind(Json(&job.translations))
            .bind(&job.error_message)
            .bind(job.created_at)
            .bind(job.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.into_job()
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.map(JobRow::into_job).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Job>, RepositoryError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(JobRow::into_job).collect()
    }

    #[instrument(skip(self))]
    async fn list_running(&self) -> Result<Vec<Job>, RepositoryError> {
        let statuses = JobStatus::RUNNING
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        self.fetch_where("status = ANY($1) ORDER BY created_at DESC", statuses)
            .await
    }

    #[instrument(skip(self))]
    async fn list_pending(&self) -> Result<Vec<Job>, RepositoryError> {
        let statuses = vec![JobStatus::Pending.as_str().to_string()];
        self.fetch_where("status = ANY($1) ORDER BY created_at ASC", statuses)
            .await
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, status = %job.status))]
    async fn update(&self, job: &Job) -> Result<Job, RepositoryError> {
        let sql = format!(
            "UPDATE jobs SET status = $2, file_name = $3, source_url = $4, language = $5, \
             model_size = $6, task = $7, device = $8, beam_size = $9, initial_prompt = $10, \
             hotwords = $11, result = $12, translations = $13, error_message = $14, \
             updated_at = $15 \
             WHERE id = $1 \
             RETURNING {JOB_COLUMNS}"
        );

        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(job.id.as_uuid())
            .bind(job.status.as_str())
            .bind(&job.file_name)
            .bind(&job.source_url)
            .bind(&job.language)
            .bind(&job.model_size)
            .bind(&job.task)
            .bind(job.device.as_str())
            .bind(beam_size_column(job))
            .bind(&job.initial_prompt)
            .bind(Json(&job.hotwords))
            .bind(job.result.as_ref().map(Json))
            .bind(Json(&job.translations))
            .bind(&job.error_message)
            .bind(job.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        match row {
            Some(row) => row.into_job(),
            None => Err(RepositoryError::NoRowsAffected(job.id.to_string())),
        }
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn delete(&self, id: JobId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
