use std::sync::Arc;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::presentation::config::{DatabaseSettings, PersistenceProviderSetting};

use super::pg_pool::{create_pool, run_migrations};
use super::repositories::{InMemoryJobRepository, PgJobRepository};

pub struct JobRepositoryFactory;

impl JobRepositoryFactory {
    pub async fn create(
        settings: &DatabaseSettings,
    ) -> Result<Arc<dyn JobRepository>, RepositoryError> {
        match settings.provider {
            PersistenceProviderSetting::Memory => {
                tracing::warn!("Using in-memory job store; jobs are lost on restart");
                Ok(Arc::new(InMemoryJobRepository::new()))
            }
            PersistenceProviderSetting::Postgres => {
                let url = settings.url.as_deref().ok_or_else(|| {
                    RepositoryError::ConnectionFailed("database.url required".into())
                })?;
                let pool = create_pool(url, settings.max_connections).await?;
                if settings.run_migrations {
                    run_migrations(&pool).await?;
                }
                Ok(Arc::new(PgJobRepository::new(pool)))
            }
        }
    }
}
