//! Per-resource sync coordinator.
//!
//! Reads always come from the cache. The first observation of a resource
//! claims a one-time background sync; `refresh` re-fetches every page and
//! swaps the cached set in one transaction. Mutations go to the server first
//! and only touch the cache once the server has answered.

use std::ops::Add;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};

use super::pagination::{fetch_all_pages, DEFAULT_PAGE_SIZE};
use super::scheduler::SyncScheduler;
use super::state::SyncState;
use super::{Resource, SyncError};
use crate::api::RemoteApi;
use crate::db::{CachedRecord, StoreError, Table};

/// What happens to the cached row when the server rejects a delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Flag the row, remove it only once the server confirms.
    #[default]
    ConfirmRemote,
    /// Remove the row right away and only log a remote failure.
    Optimistic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub page_size: u32,
    /// Start a background sync on first observation.
    pub auto_sync: bool,
    /// Let a failed initial sync be claimed again by the next observation.
    pub retry_failed_initial_sync: bool,
    pub delete_policy: DeletePolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            auto_sync: true,
            retry_failed_initial_sync: false,
            delete_policy: DeletePolicy::default(),
        }
    }
}

/// Outcome of a successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub resource: &'static str,
    /// Records written to the cache.
    pub records: usize,
    /// Parents whose children could not be fetched and were left as cached.
    pub skipped_parents: Vec<String>,
}

/// Outcome of [`SyncCoordinator::retry_pending_deletes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryReport {
    pub confirmed: usize,
    pub failed: usize,
}

impl Add for RetryReport {
    type Output = RetryReport;

    fn add(self, other: RetryReport) -> RetryReport {
        RetryReport {
            confirmed: self.confirmed + other.confirmed,
            failed: self.failed + other.failed,
        }
    }
}

/// The parent side of a child resource: which parent ids are cached, and a
/// way to wait until the parent's initial sync is done.
#[async_trait]
pub trait ParentScope: Send + Sync {
    async fn settle(&self);

    async fn parent_ids(&self) -> Result<Vec<String>, StoreError>;
}

pub struct SyncCoordinator<R: Resource> {
    inner: Arc<Inner<R>>,
}

struct Inner<R: Resource> {
    table: Table<R::Record>,
    api: Arc<dyn RemoteApi<R>>,
    scheduler: Arc<dyn SyncScheduler>,
    options: SyncOptions,
    parent: Option<Arc<dyn ParentScope>>,
    state: watch::Sender<SyncState>,
    refresh_lock: Mutex<()>,
}

impl<R: Resource> Clone for SyncCoordinator<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resource> SyncCoordinator<R> {
    /// Coordinator for a top-level resource.
    pub fn new(
        table: Table<R::Record>,
        api: Arc<dyn RemoteApi<R>>,
        scheduler: Arc<dyn SyncScheduler>,
        options: SyncOptions,
    ) -> Self {
        Self::build(table, api, scheduler, options, None)
    }

    /// Coordinator for a resource fetched per parent (list items per list).
    pub fn child_of(
        parent: Arc<dyn ParentScope>,
        table: Table<R::Record>,
        api: Arc<dyn RemoteApi<R>>,
        scheduler: Arc<dyn SyncScheduler>,
        options: SyncOptions,
    ) -> Self {
        Self::build(table, api, scheduler, options, Some(parent))
    }

    fn build(
        table: Table<R::Record>,
        api: Arc<dyn RemoteApi<R>>,
        scheduler: Arc<dyn SyncScheduler>,
        options: SyncOptions,
        parent: Option<Arc<dyn ParentScope>>,
    ) -> Self {
        let (state, _) = watch::channel(SyncState::NotSynced);
        Self {
            inner: Arc::new(Inner {
                table,
                api,
                scheduler,
                options,
                parent,
                state,
                refresh_lock: Mutex::new(()),
            }),
        }
    }

    pub fn table(&self) -> &Table<R::Record> {
        &self.inner.table
    }

    pub fn options(&self) -> &SyncOptions {
        &self.inner.options
    }

    pub fn sync_state(&self) -> SyncState {
        self.inner.state.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    /// All cached records, live. Triggers the initial sync.
    pub fn observe(&self) -> BoxStream<'static, Vec<R::Record>> {
        let stream = self.inner.table.observe_all();
        self.ensure_synced();
        stream
    }

    pub fn observe_one(&self, id: &str) -> BoxStream<'static, Option<R::Record>> {
        let stream = self.inner.table.observe_one(id);
        self.ensure_synced();
        stream
    }

    /// Cached children of `parent_id`, live. Triggers the initial sync.
    pub fn observe_children(&self, parent_id: &str) -> BoxStream<'static, Vec<R::Record>> {
        let stream = self.inner.table.observe_by_parent(parent_id);
        self.ensure_synced();
        stream
    }

    /// Schedules the initial sync unless it was already claimed.
    ///
    /// Never blocks and never fails; sync errors end up in the log and in
    /// [`SyncState::SyncFailed`].
    pub fn ensure_synced(&self) {
        let Some(claim) = self.try_claim() else {
            return;
        };
        let this = self.clone();
        self.inner.scheduler.schedule(
            R::NAME,
            Box::pin(async move { this.run_initial_sync(claim).await }),
        );
    }

    /// Runs the initial sync inline if nobody has claimed it, then waits until
    /// no sync of this resource is in progress.
    pub async fn settle(&self) {
        if let Some(claim) = self.try_claim() {
            self.run_initial_sync(claim).await;
        }
        let mut state = self.inner.state.subscribe();
        let _ = state.wait_for(SyncState::is_settled).await;
    }

    /// Claims the initial sync. The returned outcome must travel with the
    /// sync work: dropping it unfinished marks the sync as cancelled.
    fn try_claim(&self) -> Option<StateOutcome<R>> {
        if !self.inner.options.auto_sync {
            return None;
        }
        let retry = self.inner.options.retry_failed_initial_sync;
        let claimed = self.inner.state.send_if_modified(|state| {
            if state.can_claim(retry) {
                *state = SyncState::Syncing;
                true
            } else {
                false
            }
        });
        claimed.then(|| StateOutcome::new(Arc::clone(&self.inner)))
    }

    async fn run_initial_sync(&self, claim: StateOutcome<R>) {
        if let Some(parent) = &self.inner.parent {
            parent.settle().await;
        }

        let _guard = self.inner.refresh_lock.lock().await;
        match self.refresh_locked(claim).await {
            Ok(report) => tracing::info!(
                "Initial sync of {}: {} record(s)",
                report.resource,
                report.records
            ),
            Err(e) => tracing::warn!("Initial sync of {} failed: {}", R::NAME, e),
        }
    }

    /// Re-fetches every page and replaces the cached set.
    ///
    /// Concurrent refreshes of the same resource run one after another. On
    /// failure the cache is left as it was.
    pub async fn refresh(&self) -> Result<RefreshReport, SyncError> {
        let _guard = self.inner.refresh_lock.lock().await;
        self.inner.state.send_replace(SyncState::Syncing);
        self.refresh_locked(StateOutcome::new(Arc::clone(&self.inner)))
            .await
    }

    async fn refresh_locked(
        &self,
        mut outcome: StateOutcome<R>,
    ) -> Result<RefreshReport, SyncError> {
        let result = match &self.inner.parent {
            None => self.refresh_all_pages().await,
            Some(parent) => self.refresh_children(parent.as_ref()).await,
        };
        match &result {
            Ok(_) => outcome.finish(SyncState::Synced),
            Err(e) => outcome.finish(SyncState::SyncFailed(e.to_string())),
        }
        result
    }

    async fn refresh_all_pages(&self) -> Result<RefreshReport, SyncError> {
        let api = &self.inner.api;
        let wires = fetch_all_pages(
            |page, per_page| api.fetch_page(None, page, per_page),
            self.inner.options.page_size,
        )
        .await?;

        let records = Self::map_all(wires, None);
        self.inner.table.replace_all(&records).await?;

        Ok(RefreshReport {
            resource: R::NAME,
            records: records.len(),
            skipped_parents: Vec::new(),
        })
    }

    async fn refresh_children(&self, parent: &dyn ParentScope) -> Result<RefreshReport, SyncError> {
        let parent_ids = parent.parent_ids().await?;
        let api = &self.inner.api;

        let mut refreshed = Vec::new();
        let mut skipped = Vec::new();
        let mut records = Vec::new();

        for parent_id in &parent_ids {
            let result = fetch_all_pages(
                |page, per_page| api.fetch_page(Some(parent_id.as_str()), page, per_page),
                self.inner.options.page_size,
            )
            .await;

            match result {
                Ok(wires) => {
                    records.extend(Self::map_all(wires, Some(parent_id)));
                    refreshed.push(parent_id.clone());
                }
                Err(e) => {
                    tracing::warn!(
                        "Skipping {} of parent '{}' after fetch failure: {}",
                        R::NAME,
                        parent_id,
                        e
                    );
                    skipped.push(parent_id.clone());
                }
            }
        }

        self.inner
            .table
            .replace_scoped(&refreshed, &parent_ids, &records)
            .await?;

        Ok(RefreshReport {
            resource: R::NAME,
            records: records.len(),
            skipped_parents: skipped,
        })
    }

    fn map_all(wires: Vec<R::Wire>, parent: Option<&str>) -> Vec<R::Record> {
        wires
            .into_iter()
            .map(|wire| R::to_record(wire, parent))
            .filter(|record| {
                let keep = !record.id().is_empty();
                if !keep {
                    tracing::warn!("Dropping {} record without an id", R::NAME);
                }
                keep
            })
            .collect()
    }

    /// Creates a top-level record on the server, then caches it.
    pub async fn create(&self, input: &R::Input) -> Result<R::Record, SyncError> {
        if self.inner.parent.is_some() {
            return Err(SyncError::ParentRequired(R::NAME));
        }
        self.create_in(None, input).await
    }

    /// Creates a child record under `parent_id`, then caches it.
    pub async fn create_under(
        &self,
        parent_id: &str,
        input: &R::Input,
    ) -> Result<R::Record, SyncError> {
        self.create_in(Some(parent_id), input).await
    }

    async fn create_in(
        &self,
        parent: Option<&str>,
        input: &R::Input,
    ) -> Result<R::Record, SyncError> {
        let wire = self.inner.api.create(parent, input).await?;
        let record = R::to_record(wire, parent);
        if record.id().is_empty() {
            return Err(SyncError::MissingId(R::NAME));
        }
        self.inner.table.upsert(&record).await?;
        Ok(record)
    }

    pub async fn update(&self, id: &str, input: &R::Input) -> Result<R::Record, SyncError> {
        let parent = self.parent_of(id).await?;
        let wire = self.inner.api.update(parent.as_deref(), id, input).await?;
        let record = R::to_record(wire, parent.as_deref());
        if record.id().is_empty() {
            return Err(SyncError::MissingId(R::NAME));
        }
        self.inner.table.upsert(&record).await?;
        Ok(record)
    }

    /// Deletes on the server and then locally, following the configured
    /// [`DeletePolicy`]. A 404 from the server counts as deleted.
    pub async fn delete(&self, id: &str) -> Result<(), SyncError> {
        let parent = self.parent_of(id).await?;

        match self.inner.options.delete_policy {
            DeletePolicy::ConfirmRemote => {
                self.inner.table.set_pending_delete(id, true).await?;
                if let Err(e) = self.delete_remote(parent.as_deref(), id).await {
                    tracing::warn!("Delete of {} '{}' kept pending: {}", R::NAME, id, e);
                    return Err(SyncError::DeletePending {
                        id: id.to_string(),
                        source: e,
                    });
                }
            }
            DeletePolicy::Optimistic => {
                if let Err(e) = self.delete_remote(parent.as_deref(), id).await {
                    tracing::warn!("Remote delete of {} '{}' failed: {}", R::NAME, id, e);
                }
            }
        }

        self.inner.table.delete(id).await?;
        Ok(())
    }

    async fn delete_remote(
        &self,
        parent: Option<&str>,
        id: &str,
    ) -> Result<(), crate::api::ApiError> {
        match self.inner.api.delete(parent, id).await {
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} '{}' already gone on the server", R::NAME, id);
                Ok(())
            }
            other => other,
        }
    }

    /// Re-sends every delete the server has not confirmed yet.
    pub async fn retry_pending_deletes(&self) -> Result<RetryReport, SyncError> {
        let mut report = RetryReport::default();

        for record in self.inner.table.pending_deletes().await? {
            match self.delete_remote(record.parent_id(), record.id()).await {
                Ok(()) => {
                    self.inner.table.delete(record.id()).await?;
                    report.confirmed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "Delete of {} '{}' still pending: {}",
                        R::NAME,
                        record.id(),
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Drops the cached children of a parent that no longer exists. Local only.
    pub async fn evict_children_of(&self, parent_id: &str) -> Result<u64, SyncError> {
        Ok(self.inner.table.delete_by_parent(parent_id).await?)
    }

    async fn parent_of(&self, id: &str) -> Result<Option<String>, SyncError> {
        if self.inner.parent.is_none() {
            return Ok(None);
        }
        self.inner
            .table
            .get(id)
            .await?
            .and_then(|record| record.parent_id().map(String::from))
            .map(Some)
            .ok_or_else(|| SyncError::NotFound {
                resource: R::NAME,
                id: id.to_string(),
            })
    }
}

#[async_trait]
impl<P: Resource> ParentScope for SyncCoordinator<P> {
    async fn settle(&self) {
        SyncCoordinator::<P>::settle(self).await;
    }

    async fn parent_ids(&self) -> Result<Vec<String>, StoreError> {
        self.inner.table.ids().await
    }
}

/// Publishes the final sync state, or `SyncFailed` if the sync work is
/// dropped before finishing (task aborted before or during its run).
struct StateOutcome<R: Resource> {
    inner: Arc<Inner<R>>,
    finished: bool,
}

impl<R: Resource> StateOutcome<R> {
    fn new(inner: Arc<Inner<R>>) -> Self {
        Self {
            inner,
            finished: false,
        }
    }

    fn finish(&mut self, state: SyncState) {
        self.inner.state.send_replace(state);
        self.finished = true;
    }
}

impl<R: Resource> Drop for StateOutcome<R> {
    fn drop(&mut self) {
        if !self.finished {
            self.inner.state.send_if_modified(|state| {
                if *state == SyncState::Syncing {
                    *state = SyncState::SyncFailed("sync cancelled".to_string());
                    true
                } else {
                    false
                }
            });
        }
    }
}
