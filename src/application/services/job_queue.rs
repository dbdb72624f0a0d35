use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;
use tokio::sync::{Notify, Semaphore};

use crate::domain::JobId;

/// What `enqueue` does when the queue is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Wait until the worker frees a slot.
    #[default]
    Block,
    /// Evict the oldest queued id. The evicted job stays `pending` in the
    /// store and is picked up again on the next worker start.
    DropOldest,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("job queue is closed")]
    Closed,
}

/// Bounded queue of job ids between the lifecycle service and the worker.
pub struct JobQueue {
    items: Mutex<VecDeque<JobId>>,
    capacity: usize,
    policy: OverflowPolicy,
    slots: Semaphore,
    available: Notify,
    closed: AtomicBool,
}

impl JobQueue {
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            policy,
            slots: Semaphore::new(capacity),
            available: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds `id` at the back. Returns the id evicted under
    /// `OverflowPolicy::DropOldest`, if any.
    pub async fn enqueue(&self, id: JobId) -> Result<Option<JobId>, QueueError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(QueueError::Closed);
        }

        let evicted = match self.policy {
            OverflowPolicy::Block => {
                let permit = self.slots.acquire().await.map_err(|_| QueueError::Closed)?;
                permit.forget();
                self.lock().push_back(id);
                None
            }
            OverflowPolicy::DropOldest => {
                let mut items = self.lock();
                let evicted = if items.len() >= self.capacity {
                    items.pop_front()
                } else {
                    None
                };
                items.push_back(id);
                evicted
            }
        };

        if let Some(dropped) = evicted {
            tracing::warn!(job_id = %dropped, capacity = self.capacity, "Job queue full, dropped oldest job");
        }

        self.available.notify_one();
        Ok(evicted)
    }

    /// Waits for the next id. Returns `None` once the queue is closed and
    /// drained.
    pub async fn dequeue(&self) -> Option<JobId> {
        loop {
            let next = self.lock().pop_front();
            if let Some(id) = next {
                if self.policy == OverflowPolicy::Block {
                    self.slots.add_permits(1);
                }
                return Some(id);
            }

            if self.closed.load(Ordering::Acquire) {
                return None;
            }

            self.available.notified().await;
        }
    }

    /// Stops accepting new ids and wakes the consumer and any blocked
    /// producers.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.slots.close();
        self.available.notify_one();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<JobId>> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
