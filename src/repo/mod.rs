//! Read-side facade over the sync coordinators.
//!
//! Repositories hand out joined, live views of the cache and forward
//! mutations to the coordinator that owns the affected table. Nothing outside
//! the coordinators writes to the cache.

mod combine;
mod join;
mod lists;
mod pantry;
mod products;

pub use combine::{combine_latest2, combine_latest3};
pub use join::{
    category_view, join_list, join_lists, join_pantries, join_pantry, join_product, join_products,
};
pub use lists::ListsRepository;
pub use pantry::PantryRepository;
pub use products::ProductsRepository;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::api::RemoteApi;
use crate::db::Table;
use crate::mapper::{Categories, ListItems, Pantries, PantryItems, Products, ShoppingLists};
use crate::sync::{
    RefreshReport, Resource, RetryReport, SyncCoordinator, SyncError, SyncOptions, SyncScheduler,
    SyncState,
};

/// Folds the states of the coordinators behind one view.
///
/// Any sync in progress wins, then any failure, then "not synced yet".
pub fn overall_state(states: &[SyncState]) -> SyncState {
    if states.iter().any(|s| *s == SyncState::Syncing) {
        return SyncState::Syncing;
    }
    if let Some(failed) = states
        .iter()
        .find(|s| matches!(s, SyncState::SyncFailed(_)))
    {
        return failed.clone();
    }
    if states.iter().any(|s| *s == SyncState::NotSynced) {
        return SyncState::NotSynced;
    }
    SyncState::Synced
}

/// One remote endpoint handle per resource type.
#[derive(Clone)]
pub struct Remotes {
    pub lists: Arc<dyn RemoteApi<ShoppingLists>>,
    pub list_items: Arc<dyn RemoteApi<ListItems>>,
    pub categories: Arc<dyn RemoteApi<Categories>>,
    pub products: Arc<dyn RemoteApi<Products>>,
    pub pantries: Arc<dyn RemoteApi<Pantries>>,
    pub pantry_items: Arc<dyn RemoteApi<PantryItems>>,
}

impl Remotes {
    /// Uses one client for every resource.
    pub fn shared<A>(api: Arc<A>) -> Self
    where
        A: RemoteApi<ShoppingLists>
            + RemoteApi<ListItems>
            + RemoteApi<Categories>
            + RemoteApi<Products>
            + RemoteApi<Pantries>
            + RemoteApi<PantryItems>
            + 'static,
    {
        Self {
            lists: api.clone(),
            list_items: api.clone(),
            categories: api.clone(),
            products: api.clone(),
            pantries: api.clone(),
            pantry_items: api,
        }
    }
}

/// Every repository, wired to one cache and one scheduler.
#[derive(Clone)]
pub struct Repositories {
    pub lists: ListsRepository,
    pub pantry: PantryRepository,
    pub products: ProductsRepository,
}

impl Repositories {
    pub fn new(
        pool: &SqlitePool,
        remotes: Remotes,
        scheduler: Arc<dyn SyncScheduler>,
        options: SyncOptions,
    ) -> Self {
        let categories = SyncCoordinator::<Categories>::new(
            Table::new(pool.clone(), Categories::NAME),
            remotes.categories,
            scheduler.clone(),
            options,
        );
        let products = SyncCoordinator::<Products>::new(
            Table::new(pool.clone(), Products::NAME),
            remotes.products,
            scheduler.clone(),
            options,
        );
        let catalogue = ProductsRepository::new(categories, products);

        let lists = SyncCoordinator::<ShoppingLists>::new(
            Table::new(pool.clone(), ShoppingLists::NAME),
            remotes.lists,
            scheduler.clone(),
            options,
        );
        let list_items = SyncCoordinator::<ListItems>::child_of(
            Arc::new(lists.clone()),
            Table::new(pool.clone(), ListItems::NAME),
            remotes.list_items,
            scheduler.clone(),
            options,
        );

        let pantries = SyncCoordinator::<Pantries>::new(
            Table::new(pool.clone(), Pantries::NAME),
            remotes.pantries,
            scheduler.clone(),
            options,
        );
        let pantry_items = SyncCoordinator::<PantryItems>::child_of(
            Arc::new(pantries.clone()),
            Table::new(pool.clone(), PantryItems::NAME),
            remotes.pantry_items,
            scheduler,
            options,
        );

        Self {
            lists: ListsRepository::new(lists, list_items, catalogue.clone()),
            pantry: PantryRepository::new(pantries, pantry_items, catalogue.clone()),
            products: catalogue,
        }
    }

    /// Refreshes everything: the product catalogue first, then lists and
    /// pantries. Stops at the first failing resource.
    pub async fn refresh_all(&self) -> Result<Vec<RefreshReport>, SyncError> {
        let mut reports = self.products.refresh().await?;
        reports.extend(self.lists.refresh().await?);
        reports.extend(self.pantry.refresh().await?);
        Ok(reports)
    }

    pub async fn retry_pending_deletes(&self) -> Result<RetryReport, SyncError> {
        let lists = self.lists.retry_pending_deletes().await?;
        let pantry = self.pantry.retry_pending_deletes().await?;
        let products = self.products.retry_pending_deletes().await?;
        Ok(lists + pantry + products)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::sync::fake::FakeApi;
    use crate::sync::TaskScheduler;
    use tempfile::TempDir;

    /// Repositories over in-memory fake endpoints, with direct access to the
    /// child coordinators for cache assertions.
    pub(crate) struct Harness {
        pub lists: ListsRepository,
        pub pantry: PantryRepository,
        pub products: ProductsRepository,
        pub items: SyncCoordinator<ListItems>,
        pub pantry_items: SyncCoordinator<PantryItems>,
        pub scheduler: Arc<TaskScheduler>,
        pub list_api: Arc<FakeApi<ShoppingLists>>,
        pub item_api: Arc<FakeApi<ListItems>>,
        pub category_api: Arc<FakeApi<Categories>>,
        pub product_api: Arc<FakeApi<Products>>,
        pub pantry_api: Arc<FakeApi<Pantries>>,
        pub pantry_item_api: Arc<FakeApi<PantryItems>>,
        _temp_dir: TempDir,
    }

    impl Harness {
        pub async fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
            let scheduler = Arc::new(TaskScheduler::new());
            let options = SyncOptions::default();

            let list_api = Arc::new(FakeApi::<ShoppingLists>::new());
            let item_api = Arc::new(FakeApi::<ListItems>::new());
            let category_api = Arc::new(FakeApi::<Categories>::new());
            let product_api = Arc::new(FakeApi::<Products>::new());
            let pantry_api = Arc::new(FakeApi::<Pantries>::new());
            let pantry_item_api = Arc::new(FakeApi::<PantryItems>::new());

            let categories = SyncCoordinator::<Categories>::new(
                Table::new(pool.clone(), Categories::NAME),
                category_api.clone(),
                scheduler.clone(),
                options,
            );
            let products = SyncCoordinator::<Products>::new(
                Table::new(pool.clone(), Products::NAME),
                product_api.clone(),
                scheduler.clone(),
                options,
            );
            let catalogue = ProductsRepository::new(categories, products);

            let lists = SyncCoordinator::<ShoppingLists>::new(
                Table::new(pool.clone(), ShoppingLists::NAME),
                list_api.clone(),
                scheduler.clone(),
                options,
            );
            let items = SyncCoordinator::<ListItems>::child_of(
                Arc::new(lists.clone()),
                Table::new(pool.clone(), ListItems::NAME),
                item_api.clone(),
                scheduler.clone(),
                options,
            );
            let pantries = SyncCoordinator::<Pantries>::new(
                Table::new(pool.clone(), Pantries::NAME),
                pantry_api.clone(),
                scheduler.clone(),
                options,
            );
            let pantry_items = SyncCoordinator::<PantryItems>::child_of(
                Arc::new(pantries.clone()),
                Table::new(pool.clone(), PantryItems::NAME),
                pantry_item_api.clone(),
                scheduler.clone(),
                options,
            );

            Self {
                lists: ListsRepository::new(lists, items.clone(), catalogue.clone()),
                pantry: PantryRepository::new(pantries, pantry_items.clone(), catalogue.clone()),
                products: catalogue,
                items,
                pantry_items,
                scheduler,
                list_api,
                item_api,
                category_api,
                product_api,
                pantry_api,
                pantry_item_api,
                _temp_dir: temp_dir,
            }
        }
    }

    #[test]
    fn test_overall_state() {
        let failed = SyncState::SyncFailed("down".to_string());
        assert_eq!(
            overall_state(&[SyncState::Synced, SyncState::Synced]),
            SyncState::Synced
        );
        assert_eq!(
            overall_state(&[SyncState::Synced, SyncState::NotSynced]),
            SyncState::NotSynced
        );
        assert_eq!(overall_state(&[failed.clone(), SyncState::NotSynced]), failed);
        assert_eq!(
            overall_state(&[failed, SyncState::Syncing]),
            SyncState::Syncing
        );
    }

    #[tokio::test]
    async fn test_refresh_all_order() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        let scheduler = Arc::new(TaskScheduler::new());
        let remotes = Remotes {
            lists: Arc::new(FakeApi::<ShoppingLists>::new()),
            list_items: Arc::new(FakeApi::<ListItems>::new()),
            categories: Arc::new(FakeApi::<Categories>::new()),
            products: Arc::new(FakeApi::<Products>::new()),
            pantries: Arc::new(FakeApi::<Pantries>::new()),
            pantry_items: Arc::new(FakeApi::<PantryItems>::new()),
        };

        let repos = Repositories::new(&pool, remotes, scheduler, SyncOptions::default());
        let reports = repos.refresh_all().await.unwrap();

        let names: Vec<&str> = reports.iter().map(|r| r.resource).collect();
        assert_eq!(
            names,
            vec![
                "categories",
                "products",
                "shopping_lists",
                "list_items",
                "pantries",
                "pantry_items"
            ]
        );
        assert_eq!(repos.lists.sync_state(), SyncState::Synced);
        assert_eq!(
            repos.retry_pending_deletes().await.unwrap(),
            RetryReport::default()
        );
    }
}
