//! In-process bookkeeping for extraction runs started through the API.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use revscope_core::RunHandle;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

/// A registered run: its status handle and the token that cancels it.
#[derive(Debug, Clone)]
pub struct RunEntry {
    pub handle: RunHandle,
    pub cancel: CancellationToken,
}

/// Runs keyed by id, a fixed number of execution slots, and the tracker
/// that owns every run's background task.
///
/// Finished runs stay registered so their status and files remain
/// reachable for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct RunRegistry {
    runs: Arc<Mutex<HashMap<Uuid, RunEntry>>>,
    slots: Arc<Semaphore>,
    tasks: TaskTracker,
}

impl RunRegistry {
    /// Creates a registry with `max_concurrent_runs` slots (at least one).
    #[must_use]
    pub fn new(max_concurrent_runs: usize) -> Self {
        Self {
            runs: Arc::new(Mutex::new(HashMap::new())),
            slots: Arc::new(Semaphore::new(max_concurrent_runs.max(1))),
            tasks: TaskTracker::new(),
        }
    }

    /// Claims a slot without waiting. The slot is released when the permit
    /// is dropped.
    #[must_use]
    pub fn try_reserve(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.slots).try_acquire_owned().ok()
    }

    #[must_use]
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    pub async fn insert(&self, run_id: Uuid, entry: RunEntry) {
        self.runs.lock().await.insert(run_id, entry);
    }

    pub async fn get(&self, run_id: Uuid) -> Option<RunEntry> {
        self.runs.lock().await.get(&run_id).cloned()
    }

    /// Cancels every run that has not been cancelled yet and returns how
    /// many were signalled.
    pub async fn cancel_running(&self) -> usize {
        let runs = self.runs.lock().await;
        let mut cancelled = 0;
        for entry in runs.values().filter(|entry| !entry.cancel.is_cancelled()) {
            if entry.handle.snapshot().await.running {
                entry.cancel.cancel();
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Runs `task` in the background, tracked so [`RunRegistry::shutdown`]
    /// can wait for it.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.spawn(task);
    }

    /// Cancels every running run and waits for all tracked tasks to finish
    /// writing their final status. Returns how many runs were signalled.
    pub async fn shutdown(&self) -> usize {
        let cancelled = self.cancel_running().await;
        self.tasks.close();
        self.tasks.wait().await;
        cancelled
    }
}
