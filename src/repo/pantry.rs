use futures::stream::{BoxStream, StreamExt};

use super::combine::combine_latest3;
use super::join::{join_pantries, join_pantry};
use super::overall_state;
use super::products::ProductsRepository;
use crate::db::CachedRecord;
use crate::mapper::{Pantries, PantryItems};
use crate::models::{Pantry, PantryInput, PantryItemInput, PantryItemRecord, PantryRecord};
use crate::sync::{RefreshReport, RetryReport, SyncCoordinator, SyncError, SyncState};

/// Pantries joined with their stock and the products in it.
#[derive(Clone)]
pub struct PantryRepository {
    pantries: SyncCoordinator<Pantries>,
    items: SyncCoordinator<PantryItems>,
    products: ProductsRepository,
}

impl PantryRepository {
    pub fn new(
        pantries: SyncCoordinator<Pantries>,
        items: SyncCoordinator<PantryItems>,
        products: ProductsRepository,
    ) -> Self {
        Self {
            pantries,
            items,
            products,
        }
    }

    pub fn observe_pantries(&self) -> BoxStream<'static, Vec<Pantry>> {
        combine_latest3(
            self.pantries.observe(),
            self.items.observe(),
            self.products.observe_products(),
        )
        .map(|(pantries, items, products)| join_pantries(&pantries, &items, &products))
        .boxed()
    }

    pub fn observe_pantry(&self, id: &str) -> BoxStream<'static, Option<Pantry>> {
        combine_latest3(
            self.pantries.observe_one(id),
            self.items.observe_children(id),
            self.products.observe_products(),
        )
        .map(|(pantry, items, products)| pantry.map(|p| join_pantry(&p, &items, &products)))
        .boxed()
    }

    pub async fn refresh(&self) -> Result<Vec<RefreshReport>, SyncError> {
        Ok(vec![
            self.pantries.refresh().await?,
            self.items.refresh().await?,
        ])
    }

    pub fn sync_state(&self) -> SyncState {
        overall_state(&[self.pantries.sync_state(), self.items.sync_state()])
    }

    pub async fn create_pantry(&self, input: &PantryInput) -> Result<PantryRecord, SyncError> {
        self.pantries.create(input).await
    }

    pub async fn update_pantry(
        &self,
        id: &str,
        input: &PantryInput,
    ) -> Result<PantryRecord, SyncError> {
        self.pantries.update(id, input).await
    }

    pub async fn delete_pantry(&self, id: &str) -> Result<(), SyncError> {
        self.pantries.delete(id).await?;
        self.items.evict_children_of(id).await?;
        Ok(())
    }

    pub async fn add_item(
        &self,
        pantry_id: &str,
        input: &PantryItemInput,
    ) -> Result<PantryItemRecord, SyncError> {
        self.items.create_under(pantry_id, input).await
    }

    pub async fn update_item(
        &self,
        item_id: &str,
        input: &PantryItemInput,
    ) -> Result<PantryItemRecord, SyncError> {
        self.items.update(item_id, input).await
    }

    pub async fn remove_item(&self, item_id: &str) -> Result<(), SyncError> {
        self.items.delete(item_id).await
    }

    pub async fn retry_pending_deletes(&self) -> Result<RetryReport, SyncError> {
        let items = self.items.retry_pending_deletes().await?;

        let pending = self.pantries.table().pending_deletes().await?;
        let pantries = self.pantries.retry_pending_deletes().await?;
        for pantry in &pending {
            if self.pantries.table().get(pantry.id()).await?.is_none() {
                self.items.evict_children_of(pantry.id()).await?;
            }
        }

        Ok(items + pantries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::tests::Harness;
    use crate::sync::fake::{pantry, pantry_item, product};

    fn seed(h: &Harness) {
        h.product_api
            .seed(None, vec![product("p1", "Rice", None)]);
        h.pantry_api
            .seed(None, vec![pantry("P1", "Home"), pantry("P2", "Cabin")]);
        h.pantry_item_api
            .seed(Some("P1"), vec![pantry_item("s1", "p1", 2.0)]);
        h.pantry_item_api.seed(Some("P2"), vec![]);
    }

    #[tokio::test]
    async fn test_observe_pantries() {
        let h = Harness::new().await;
        seed(&h);
        h.products.refresh().await.unwrap();
        h.pantry.refresh().await.unwrap();

        let pantries = h.pantry.observe_pantries().next().await.unwrap();

        assert_eq!(pantries.len(), 2);
        assert_eq!(pantries[0].items.len(), 1);
        assert_eq!(pantries[0].items[0].product.as_ref().unwrap().name, "Rice");
        assert!(pantries[1].items.is_empty());
        assert_eq!(h.pantry.sync_state(), SyncState::Synced);
    }

    #[tokio::test]
    async fn test_pantry_item_failure_isolated() {
        let h = Harness::new().await;
        seed(&h);
        h.pantry_item_api.fail_parent(Some("P2"));

        let reports = h.pantry.refresh().await.unwrap();

        assert_eq!(reports[1].skipped_parents, vec!["P2".to_string()]);
        let pantry = h.pantry.observe_pantry("P1").next().await.unwrap().unwrap();
        assert_eq!(pantry.items.len(), 1);
    }

    #[tokio::test]
    async fn test_pantry_mutations() {
        let h = Harness::new().await;

        let created = h
            .pantry
            .create_pantry(&PantryInput::new("Garage"))
            .await
            .unwrap();
        let renamed = h
            .pantry
            .update_pantry(&created.id, &PantryInput::new("Shed"))
            .await
            .unwrap();
        assert_eq!(renamed.name, "Shed");

        let stock = h
            .pantry
            .add_item(&created.id, &PantryItemInput::new("p1", 5.0, "kg"))
            .await
            .unwrap();
        let updated = h
            .pantry
            .update_item(&stock.id, &PantryItemInput::new("p1", 3.5, "kg"))
            .await
            .unwrap();
        assert_eq!(updated.quantity, 3.5);
        assert_eq!(updated.pantry_id, created.id);

        h.pantry.remove_item(&stock.id).await.unwrap();
        assert_eq!(h.pantry_items.table().count().await.unwrap(), 0);

        h.pantry.delete_pantry(&created.id).await.unwrap();
        assert!(h.pantry_api.remote(None).is_empty());
    }

    #[tokio::test]
    async fn test_retry_pantry_delete() {
        let h = Harness::new().await;
        seed(&h);
        h.pantry.refresh().await.unwrap();
        h.pantry_api.fail_writes(true);

        assert!(h.pantry.delete_pantry("P1").await.is_err());
        let report = h.pantry.retry_pending_deletes().await.unwrap();
        assert_eq!(report.failed, 1);

        h.pantry_api.fail_writes(false);
        let report = h.pantry.retry_pending_deletes().await.unwrap();
        assert_eq!(report.confirmed, 1);
        assert_eq!(h.pantry_items.table().count().await.unwrap(), 0);
    }
}
