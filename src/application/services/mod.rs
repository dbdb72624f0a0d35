mod health_prober;
mod job_lifecycle_service;
mod job_queue;
mod media_acquirer;
mod observer_registry;
mod transcription_worker;
mod translation;

pub use health_prober::{
    BUSY_SERVICE_MESSAGE, HealthProbe, HealthProber, ServiceState, ServiceStatus,
    UNAVAILABLE_MESSAGE,
};
pub use job_lifecycle_service::{JobLifecycleService, LifecycleError};
pub use job_queue::{JobQueue, OverflowPolicy, QueueError};
pub use media_acquirer::{AcquireError, MediaAcquirer};
pub use observer_registry::{
    ChannelObserver, DeliveryError, Observer, ObserverId, ObserverRegistry,
};
pub use transcription_worker::{INTERRUPTED_MESSAGE, TranscriptionWorker, WorkerError};
pub use translation::translate_result;
