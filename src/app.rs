//! Wiring: config to cache, API client, scheduler and repositories.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::api::{HttpApi, OfflineApi};
use crate::config::Config;
use crate::db::init_db;
use crate::repo::{ListsRepository, PantryRepository, ProductsRepository, Remotes, Repositories};
use crate::sync::{RefreshReport, RetryReport, SyncError, SyncOptions, TaskScheduler};

/// An open cache with its repositories.
///
/// Owns the background sync tasks; call [`Comprartir::shutdown`] to let them
/// finish, or drop the value to cancel them.
pub struct Comprartir {
    repos: Repositories,
    scheduler: Arc<TaskScheduler>,
    pool: SqlitePool,
    online: bool,
}

impl Comprartir {
    /// Opens the cache at the configured path and connects the configured
    /// server. Without a server URL, or with `offline` set, every remote call
    /// fails and nothing syncs in the background.
    pub async fn open(config: &Config, offline: bool) -> Result<Self, SyncError> {
        let pool = init_db(&config.database_path.value).await?;
        let mut options = config.sync.value.options();

        let api = &config.api.value;
        let (remotes, online) = if offline {
            (Remotes::shared(Arc::new(OfflineApi::new("offline mode"))), false)
        } else if !api.is_configured() {
            tracing::info!("No api.base_url configured, working from the cache only");
            (
                Remotes::shared(Arc::new(OfflineApi::new("no api.base_url set"))),
                false,
            )
        } else {
            (Remotes::shared(Arc::new(HttpApi::from_config(api)?)), true)
        };
        if !online {
            options.auto_sync = false;
        }

        Ok(Self::from_parts(pool, remotes, options, online))
    }

    /// Builds the app from an existing pool and endpoints.
    pub fn from_parts(
        pool: SqlitePool,
        remotes: Remotes,
        options: SyncOptions,
        online: bool,
    ) -> Self {
        let scheduler = Arc::new(TaskScheduler::new());
        let repos = Repositories::new(&pool, remotes, scheduler.clone(), options);
        Self {
            repos,
            scheduler,
            pool,
            online,
        }
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn lists(&self) -> &ListsRepository {
        &self.repos.lists
    }

    pub fn pantry(&self) -> &PantryRepository {
        &self.repos.pantry
    }

    pub fn products(&self) -> &ProductsRepository {
        &self.repos.products
    }

    pub async fn refresh_all(&self) -> Result<Vec<RefreshReport>, SyncError> {
        self.repos.refresh_all().await
    }

    pub async fn retry_pending_deletes(&self) -> Result<RetryReport, SyncError> {
        self.repos.retry_pending_deletes().await
    }

    /// Waits for background syncs and closes the cache.
    pub async fn shutdown(self) {
        self.scheduler.join_all().await;
        self.pool.close().await;
    }
}
