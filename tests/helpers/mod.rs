#![allow(dead_code)]

mod test_postgres;

#[allow(unused_imports)]
pub use test_postgres::TestPostgres;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::{self, BoxStream};

use listenbox::application::ports::{
    AsrClient, AsrError, DownloadError, DownloadedMedia, HealthResponse, JobRepository,
    MediaDownloader, MediaStore, MediaStoreError, RepositoryError, TranslationError, Translator,
};
use listenbox::application::services::{
    DeliveryError, JobLifecycleService, JobQueue, Observer, ObserverRegistry, OverflowPolicy,
};
use listenbox::domain::{Job, JobId, Segment, TranscriptionResult};
use listenbox::infrastructure::persistence::InMemoryJobRepository;
use listenbox::infrastructure::storage::LocalMediaStore;

pub fn sample_result() -> TranscriptionResult {
    TranscriptionResult {
        language: "en".to_string(),
        duration: Some(2.0),
        text: "hello world".to_string(),
        segments: vec![
            Segment {
                id: Some(0),
                start: 0.0,
                end: 1.0,
                text: "hello".to_string(),
                words: Vec::new(),
            },
            Segment {
                id: Some(1),
                start: 1.0,
                end: 2.0,
                text: "world".to_string(),
                words: Vec::new(),
            },
        ],
    }
}

/// Observer that keeps every payload it is handed.
#[derive(Default)]
pub struct RecordingObserver {
    pub payloads: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn received(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.received()
            .iter()
            .map(|p| {
                let value: serde_json::Value = serde_json::from_str(p).unwrap();
                value["status"].as_str().unwrap().to_string()
            })
            .collect()
    }
}

impl Observer for RecordingObserver {
    fn deliver(&self, payload: Arc<str>) -> Result<(), DeliveryError> {
        self.payloads.lock().unwrap().push(payload.to_string());
        Ok(())
    }
}

pub struct FailingObserver;

impl Observer for FailingObserver {
    fn deliver(&self, _payload: Arc<str>) -> Result<(), DeliveryError> {
        Err(DeliveryError::Closed)
    }
}

/// Job repository whose writes and listings can be switched to fail.
#[derive(Default)]
pub struct FlakyJobRepository {
    pub inner: InMemoryJobRepository,
    pub fail_creates: AtomicBool,
    pub fail_updates: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl FlakyJobRepository {
    pub fn failing_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn failing_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    fn read_guard(&self) -> Result<(), RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::QueryFailed("store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl JobRepository for FlakyJobRepository {
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(RepositoryError::QueryFailed("insert rejected".to_string()));
        }
        self.inner.create(job).await
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        self.inner.get_by_id(id).await
    }

    async fn list(&self) -> Result<Vec<Job>, RepositoryError> {
        self.read_guard()?;
        self.inner.list().await
    }

    async fn list_running(&self) -> Result<Vec<Job>, RepositoryError> {
        self.read_guard()?;
        self.inner.list_running().await
    }

    async fn list_pending(&self) -> Result<Vec<Job>, RepositoryError> {
        self.read_guard()?;
        self.inner.list_pending().await
    }

    async fn update(&self, job: &Job) -> Result<Job, RepositoryError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(RepositoryError::QueryFailed("update rejected".to_string()));
        }
        self.inner.update(job).await
    }

    async fn delete(&self, id: JobId) -> Result<bool, RepositoryError> {
        self.inner.delete(id).await
    }
}

/// Media store that performs the first rename and refuses every later one.
pub struct OneWayRenameStore {
    inner: Arc<LocalMediaStore>,
    renames: AtomicUsize,
}

impl OneWayRenameStore {
    pub fn new(inner: Arc<LocalMediaStore>) -> Self {
        Self {
            inner,
            renames: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl MediaStore for OneWayRenameStore {
    async fn store(
        &self,
        file_name: &str,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<u64, MediaStoreError> {
        self.inner.store(file_name, stream).await
    }

    async fn open(
        &self,
        file_name: &str,
    ) -> Result<BoxStream<'static, Result<Bytes, io::Error>>, MediaStoreError> {
        self.inner.open(file_name).await
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), MediaStoreError> {
        if self.renames.fetch_add(1, Ordering::SeqCst) > 0 {
            return Err(MediaStoreError::Io {
                path: from.to_string(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume"),
            });
        }
        self.inner.rename(from, to).await
    }

    async fn delete(&self, file_name: &str) -> Result<(), MediaStoreError> {
        self.inner.delete(file_name).await
    }
}

pub enum AsrBehavior {
    Succeed(TranscriptionResult),
    Fail(u16, String),
}

pub enum HealthBehavior {
    Respond(HealthResponse),
    Unreachable(String),
}

/// Speech recognition stand-in that records the jobs it was asked to
/// transcribe along with the bytes it received.
pub struct StubAsrClient {
    pub transcribe: Mutex<AsrBehavior>,
    pub health: Mutex<HealthBehavior>,
    pub calls: Mutex<Vec<(Job, Vec<u8>)>>,
}

impl StubAsrClient {
    pub fn succeeding(result: TranscriptionResult) -> Self {
        Self {
            transcribe: Mutex::new(AsrBehavior::Succeed(result)),
            health: Mutex::new(HealthBehavior::Respond(HealthResponse {
                success: true,
                status: 200,
                body: "OK".to_string(),
            })),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16, body: &str) -> Self {
        let stub = Self::succeeding(sample_result());
        *stub.transcribe.lock().unwrap() = AsrBehavior::Fail(status, body.to_string());
        stub
    }

    pub fn with_health(self, behavior: HealthBehavior) -> Self {
        *self.health.lock().unwrap() = behavior;
        self
    }
}

#[async_trait::async_trait]
impl AsrClient for StubAsrClient {
    async fn transcribe(
        &self,
        job: &Job,
        mut media: BoxStream<'static, Result<Bytes, io::Error>>,
    ) -> Result<TranscriptionResult, AsrError> {
        let mut received = Vec::new();
        while let Some(chunk) = media.next().await {
            let chunk = chunk.map_err(|e| AsrError::Request(e.to_string()))?;
            received.extend_from_slice(&chunk);
        }
        self.calls.lock().unwrap().push((job.clone(), received));

        match &*self.transcribe.lock().unwrap() {
            AsrBehavior::Succeed(result) => Ok(result.clone()),
            AsrBehavior::Fail(status, body) => Err(AsrError::Service {
                status: *status,
                body: body.clone(),
            }),
        }
    }

    async fn health(&self) -> Result<HealthResponse, AsrError> {
        match &*self.health.lock().unwrap() {
            HealthBehavior::Respond(response) => Ok(response.clone()),
            HealthBehavior::Unreachable(message) => Err(AsrError::Request(message.clone())),
        }
    }
}

/// Translator that prefixes every text with the target language.
#[derive(Default)]
pub struct StubTranslator {
    pub fail: AtomicBool,
}

impl StubTranslator {
    pub fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
        }
    }
}

#[async_trait::async_trait]
impl Translator for StubTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TranslationError::Service {
                status: 500,
                body: "translator down".to_string(),
            });
        }
        Ok(format!("[{}] {}", target_language, text))
    }
}

pub enum DownloadBehavior {
    Media { title: String, chunks: Vec<&'static [u8]> },
    BrokenStream { title: String },
    ToolFails,
}

pub struct StubDownloader {
    pub behavior: DownloadBehavior,
}

#[async_trait::async_trait]
impl MediaDownloader for StubDownloader {
    async fn download(&self, source_url: &str) -> Result<DownloadedMedia, DownloadError> {
        if source_url.is_empty() {
            return Err(DownloadError::MissingSource);
        }
        match &self.behavior {
            DownloadBehavior::Media { title, chunks } => {
                let chunks: Vec<Result<Bytes, io::Error>> = chunks
                    .iter()
                    .map(|c| Ok(Bytes::from_static(c)))
                    .collect();
                Ok(DownloadedMedia {
                    title: title.clone(),
                    stream: stream::iter(chunks).boxed(),
                })
            }
            DownloadBehavior::BrokenStream { title } => {
                let chunks: Vec<Result<Bytes, io::Error>> = vec![
                    Ok(Bytes::from_static(b"partial")),
                    Err(io::Error::other("connection reset")),
                ];
                Ok(DownloadedMedia {
                    title: title.clone(),
                    stream: stream::iter(chunks).boxed(),
                })
            }
            DownloadBehavior::ToolFails => Err(DownloadError::ToolFailed {
                status: "exit status: 1".to_string(),
                stderr: "ERROR: unsupported URL".to_string(),
            }),
        }
    }
}

/// Lifecycle service wired to in-process collaborators.
pub struct Harness {
    pub lifecycle: Arc<JobLifecycleService>,
    pub repository: Arc<FlakyJobRepository>,
    pub media_store: Arc<LocalMediaStore>,
    pub observers: Arc<ObserverRegistry>,
    pub queue: Arc<JobQueue>,
    pub recorder: Arc<RecordingObserver>,
    pub upload_dir: PathBuf,
    _dir: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_translator(Arc::new(StubTranslator::default()), false)
    }

    pub fn with_translator(translator: Arc<dyn Translator>, fail_on_translation_error: bool) -> Self {
        Self::build(translator, fail_on_translation_error, |store| -> Arc<dyn MediaStore> {
            store
        })
    }

    /// Lifecycle whose media store is `wrap` applied to the on-disk store.
    pub fn with_media_store(
        wrap: impl FnOnce(Arc<LocalMediaStore>) -> Arc<dyn MediaStore>,
    ) -> Self {
        Self::build(Arc::new(StubTranslator::default()), false, wrap)
    }

    fn build(
        translator: Arc<dyn Translator>,
        fail_on_translation_error: bool,
        wrap: impl FnOnce(Arc<LocalMediaStore>) -> Arc<dyn MediaStore>,
    ) -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        let upload_dir = dir.path().to_path_buf();
        let repository = Arc::new(FlakyJobRepository::default());
        let media_store = Arc::new(LocalMediaStore::new(upload_dir.clone()).unwrap());
        let observers = Arc::new(ObserverRegistry::new());
        let queue = Arc::new(JobQueue::new(16, OverflowPolicy::Block));
        let recorder = Arc::new(RecordingObserver::default());
        observers.register(recorder.clone());

        let lifecycle = Arc::new(JobLifecycleService::new(
            repository.clone(),
            wrap(media_store.clone()),
            translator,
            Arc::clone(&observers),
            Arc::clone(&queue),
            fail_on_translation_error,
        ));

        Self {
            lifecycle,
            repository,
            media_store,
            observers,
            queue,
            recorder,
            upload_dir,
            _dir: dir,
        }
    }

    pub fn media_path(&self, file_name: &str) -> PathBuf {
        self.upload_dir.join(file_name)
    }
}
