//! Fan-out of job snapshots to connected observers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::domain::Job;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("observer buffer is full")]
    Full,
    #[error("observer connection is closed")]
    Closed,
}

/// A live connection that receives serialized job snapshots.
///
/// `deliver` must not wait on the peer: it is called while a job mutation is
/// being committed.
pub trait Observer: Send + Sync {
    fn deliver(&self, payload: Arc<str>) -> Result<(), DeliveryError>;
}

/// Observer backed by a bounded channel drained by the connection's own task.
pub struct ChannelObserver {
    sender: mpsc::Sender<Arc<str>>,
}

impl ChannelObserver {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Arc<str>>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

impl Observer for ChannelObserver {
    fn deliver(&self, payload: Arc<str>) -> Result<(), DeliveryError> {
        self.sender.try_send(payload).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Full,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

/// Set of connected observers guarded by a mutex. The lock is only held to
/// add, remove, or snapshot entries, never while delivering.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Mutex<Vec<(ObserverId, Arc<dyn Observer>)>>,
    next_id: AtomicU64,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, observer: Arc<dyn Observer>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut observers = self.lock();
        observers.push((id, observer));
        tracing::debug!(observer_id = id.0, connected = observers.len(), "Observer registered");
        id
    }

    /// Removing an id that is not registered is a no-op.
    pub fn unregister(&self, id: ObserverId) {
        let mut observers = self.lock();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        if observers.len() != before {
            tracing::debug!(observer_id = id.0, connected = observers.len(), "Observer unregistered");
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serializes `job` once and hands it to every observer. Failures are
    /// logged per observer and never propagate; failed observers stay
    /// registered until their own connection loop removes them.
    pub fn broadcast(&self, job: &Job) -> usize {
        let payload: Arc<str> = match serde_json::to_string(job) {
            Ok(json) => Arc::from(json),
            Err(e) => {
                tracing::error!(job_id = %job.id, error = %e, "Failed to serialize job snapshot");
                return 0;
            }
        };

        let targets: Vec<(ObserverId, Arc<dyn Observer>)> = self.lock().clone();

        let mut delivered = 0;
        for (id, observer) in targets {
            match observer.deliver(Arc::clone(&payload)) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(observer_id = id.0, job_id = %job.id, error = %e, "Failed to deliver job snapshot");
                }
            }
        }

        tracing::trace!(job_id = %job.id, status = %job.status, delivered, "Job snapshot broadcast");
        delivered
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(ObserverId, Arc<dyn Observer>)>> {
        // A panic while holding the lock leaves the list itself intact.
        self.observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
