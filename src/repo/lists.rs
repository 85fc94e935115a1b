use futures::stream::{BoxStream, StreamExt};

use super::combine::combine_latest3;
use super::join::{join_list, join_lists};
use super::overall_state;
use super::products::ProductsRepository;
use crate::db::CachedRecord;
use crate::mapper::{ListItems, ShoppingLists};
use crate::models::{ListInput, ListItemInput, ListItemRecord, ShoppingList, ShoppingListRecord};
use crate::sync::{
    RefreshReport, Resource, RetryReport, SyncCoordinator, SyncError, SyncState,
};

/// Shopping lists joined with their items and the products on them.
#[derive(Clone)]
pub struct ListsRepository {
    lists: SyncCoordinator<ShoppingLists>,
    items: SyncCoordinator<ListItems>,
    products: ProductsRepository,
}

impl ListsRepository {
    pub fn new(
        lists: SyncCoordinator<ShoppingLists>,
        items: SyncCoordinator<ListItems>,
        products: ProductsRepository,
    ) -> Self {
        Self {
            lists,
            items,
            products,
        }
    }

    pub fn observe_lists(&self) -> BoxStream<'static, Vec<ShoppingList>> {
        combine_latest3(
            self.lists.observe(),
            self.items.observe(),
            self.products.observe_products(),
        )
        .map(|(lists, items, products)| join_lists(&lists, &items, &products))
        .boxed()
    }

    /// One list with its items; `None` while the list is not cached.
    pub fn observe_list(&self, id: &str) -> BoxStream<'static, Option<ShoppingList>> {
        combine_latest3(
            self.lists.observe_one(id),
            self.items.observe_children(id),
            self.products.observe_products(),
        )
        .map(|(list, items, products)| list.map(|l| join_list(&l, &items, &products)))
        .boxed()
    }

    /// Refreshes lists, then the items of every cached list.
    pub async fn refresh(&self) -> Result<Vec<RefreshReport>, SyncError> {
        Ok(vec![self.lists.refresh().await?, self.items.refresh().await?])
    }

    pub fn sync_state(&self) -> SyncState {
        overall_state(&[self.lists.sync_state(), self.items.sync_state()])
    }

    pub async fn create_list(&self, input: &ListInput) -> Result<ShoppingListRecord, SyncError> {
        self.lists.create(input).await
    }

    pub async fn update_list(
        &self,
        id: &str,
        input: &ListInput,
    ) -> Result<ShoppingListRecord, SyncError> {
        self.lists.update(id, input).await
    }

    /// Deletes a list. Once the delete is confirmed its cached items go too.
    pub async fn delete_list(&self, id: &str) -> Result<(), SyncError> {
        self.lists.delete(id).await?;
        self.items.evict_children_of(id).await?;
        Ok(())
    }

    pub async fn add_item(
        &self,
        list_id: &str,
        input: &ListItemInput,
    ) -> Result<ListItemRecord, SyncError> {
        self.items.create_under(list_id, input).await
    }

    pub async fn update_item(
        &self,
        item_id: &str,
        input: &ListItemInput,
    ) -> Result<ListItemRecord, SyncError> {
        self.items.update(item_id, input).await
    }

    /// Checks or unchecks an item, keeping its other fields.
    pub async fn set_item_purchased(
        &self,
        item_id: &str,
        purchased: bool,
    ) -> Result<ListItemRecord, SyncError> {
        let item = self
            .items
            .table()
            .get(item_id)
            .await?
            .ok_or_else(|| SyncError::NotFound {
                resource: ListItems::NAME,
                id: item_id.to_string(),
            })?;

        let input = ListItemInput {
            purchased,
            ..ListItemInput::from(&item)
        };
        self.items.update(item_id, &input).await
    }

    pub async fn remove_item(&self, item_id: &str) -> Result<(), SyncError> {
        self.items.delete(item_id).await
    }

    /// Retries unconfirmed item and list deletes. Items of lists whose delete
    /// is now confirmed are evicted.
    pub async fn retry_pending_deletes(&self) -> Result<RetryReport, SyncError> {
        let items = self.items.retry_pending_deletes().await?;

        let pending_lists = self.lists.table().pending_deletes().await?;
        let lists = self.lists.retry_pending_deletes().await?;
        for list in &pending_lists {
            if self.lists.table().get(list.id()).await?.is_none() {
                self.items.evict_children_of(list.id()).await?;
            }
        }

        Ok(items + lists)
    }
}
