//! Owner of background sync work.
//!
//! Coordinators never spawn detached tasks. They hand their initial sync to a
//! [`SyncScheduler`], which keeps the handles so the work can be awaited or
//! cancelled by whoever owns the scheduler.

use std::sync::Mutex;

use futures::future::BoxFuture;
use tokio::task::JoinSet;
use tracing::Instrument;

pub trait SyncScheduler: Send + Sync + 'static {
    /// Runs `task` in the background. `label` names the resource being synced.
    fn schedule(&self, label: &'static str, task: BoxFuture<'static, ()>);
}

/// Runs scheduled work on the Tokio runtime and tracks it in a [`JoinSet`].
///
/// Dropping the scheduler aborts whatever is still running.
#[derive(Default)]
pub struct TaskScheduler {
    tasks: Mutex<JoinSet<()>>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks not yet reaped.
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    /// Waits for every scheduled task, including tasks scheduled while
    /// waiting. Panicked tasks are logged.
    pub async fn join_all(&self) {
        loop {
            let mut batch = std::mem::take(&mut *self.lock());
            if batch.is_empty() {
                break;
            }
            while let Some(result) = batch.join_next().await {
                if let Err(e) = result {
                    if e.is_panic() {
                        tracing::error!("Background sync task panicked: {}", e);
                    }
                }
            }
        }
    }

    /// Cancels all running tasks.
    pub fn abort_all(&self) {
        self.lock().abort_all();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SyncScheduler for TaskScheduler {
    fn schedule(&self, label: &'static str, task: BoxFuture<'static, ()>) {
        let mut tasks = self.lock();
        // Reap finished tasks so the set does not grow without bound.
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task.instrument(tracing::info_span!("sync", resource = label)));
    }
}
