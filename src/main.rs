use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use config::Environment as EnvironmentSource;
use config::{Config, File};
use tokio::net::TcpListener;

use listenbox::application::services::{
    HealthProber, JobLifecycleService, JobQueue, MediaAcquirer, ObserverRegistry,
    TranscriptionWorker,
};
use listenbox::infrastructure::asr::HttpAsrClient;
use listenbox::infrastructure::downloader::YtDlpDownloader;
use listenbox::infrastructure::observability::{TracingConfig, init_tracing};
use listenbox::infrastructure::persistence::JobRepositoryFactory;
use listenbox::infrastructure::storage::LocalMediaStore;
use listenbox::infrastructure::translation::LibreTranslateClient;
use listenbox::presentation::{AppState, Environment, Settings, create_router};

const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = match env::var("APP_ENVIRONMENT") {
        Ok(raw) => raw.parse::<Environment>().map_err(anyhow::Error::msg)?,
        Err(_) => Environment::default(),
    };

    let configuration = Config::builder()
        .add_source(
            File::with_name(&environment.settings_file()).required(false),
        )
        .add_source(
            EnvironmentSource::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let settings: Settings = configuration.try_deserialize()?;

    init_tracing(&TracingConfig::from_settings(environment, &settings.logging));

    tracing::info!(environment = %environment, "Application starting");

    let job_repository = JobRepositoryFactory::create(&settings.database).await?;
    let media_store = Arc::new(LocalMediaStore::new(PathBuf::from(
        &settings.storage.upload_dir,
    ))?);

    let asr_client = Arc::new(HttpAsrClient::new(
        &settings.asr.endpoint,
        Duration::from_secs(settings.asr.health_timeout_secs),
        settings.asr.dispatch_timeout_secs.map(Duration::from_secs),
    )?);
    let translator = Arc::new(LibreTranslateClient::new(
        &settings.translation.endpoint,
        settings.translation.api_key.clone(),
    ));
    let downloader = Arc::new(YtDlpDownloader::new(
        settings.downloader.binary.clone(),
        settings.downloader.format.clone(),
    ));

    let observers = Arc::new(ObserverRegistry::new());
    let queue = Arc::new(JobQueue::new(
        settings.queue.capacity,
        settings.queue.overflow,
    ));

    let lifecycle = Arc::new(JobLifecycleService::new(
        Arc::clone(&job_repository),
        media_store.clone(),
        translator,
        Arc::clone(&observers),
        Arc::clone(&queue),
        settings.lifecycle.fail_on_translation_error,
    ));

    let acquirer = Arc::new(MediaAcquirer::new(downloader, media_store.clone()));
    let worker = TranscriptionWorker::new(
        Arc::clone(&queue),
        Arc::clone(&lifecycle),
        Arc::clone(&job_repository),
        acquirer,
        asr_client.clone(),
        media_store,
    );
    let mut worker_handle = tokio::spawn(worker.run());

    let health_prober = Arc::new(HealthProber::new(asr_client, Arc::clone(&job_repository)));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;

    let state = AppState {
        lifecycle,
        health_prober,
        observers,
        settings,
    };
    let router = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Jobs still queued stay `pending` in the store and are picked up on the
    // next start; a job cut off here is settled then.
    queue.close();
    if tokio::time::timeout(WORKER_DRAIN_TIMEOUT, &mut worker_handle)
        .await
        .is_err()
    {
        tracing::warn!("Worker still busy at shutdown, aborting current job");
        worker_handle.abort();
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
