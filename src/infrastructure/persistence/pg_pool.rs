use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::application::ports::RepositoryError;

const CONNECT_ATTEMPTS: u32 = 6;
const FIRST_BACKOFF: Duration = Duration::from_millis(500);

/// Connects to the job database, backing off while Postgres is still starting.
#[instrument(skip(url))]
pub async fn create_pool(url: &str, max_connections: u32) -> Result<PgPool, RepositoryError> {
    let options = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10));
    let mut backoff = FIRST_BACKOFF;

    for attempt in 1..=CONNECT_ATTEMPTS {
        match options.clone().connect(url).await {
            Ok(pool) => {
                info!(max_connections, attempt, "Job database pool ready");
                return Ok(pool);
            }
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                warn!(
                    error = %e,
                    attempt,
                    backoff_ms = backoff.as_millis(),
                    "Job database unreachable, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => return Err(RepositoryError::ConnectionFailed(e.to_string())),
        }
    }

    Err(RepositoryError::ConnectionFailed(
        "no connection attempts made".into(),
    ))
}

/// Applies the embedded `migrations/` directory (the `jobs` table).
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(format!("applying jobs migrations: {e}")))?;
    info!("Jobs schema up to date");
    Ok(())
}
