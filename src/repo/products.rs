use futures::stream::{BoxStream, StreamExt};

use super::combine::combine_latest2;
use super::join::{category_view, join_product, join_products};
use super::overall_state;
use crate::mapper::{Categories, Products};
use crate::models::{Category, CategoryInput, CategoryRecord, Product, ProductInput, ProductRecord};
use crate::sync::{RefreshReport, RetryReport, SyncCoordinator, SyncError, SyncState};

/// Product catalogue: products joined with their categories.
#[derive(Clone)]
pub struct ProductsRepository {
    categories: SyncCoordinator<Categories>,
    products: SyncCoordinator<Products>,
}

impl ProductsRepository {
    pub fn new(
        categories: SyncCoordinator<Categories>,
        products: SyncCoordinator<Products>,
    ) -> Self {
        Self {
            categories,
            products,
        }
    }

    pub fn observe_products(&self) -> BoxStream<'static, Vec<Product>> {
        combine_latest2(self.products.observe(), self.categories.observe())
            .map(|(products, categories)| join_products(&products, &categories))
            .boxed()
    }

    pub fn observe_product(&self, id: &str) -> BoxStream<'static, Option<Product>> {
        combine_latest2(self.products.observe_one(id), self.categories.observe())
            .map(|(product, categories)| product.map(|p| join_product(&p, &categories)))
            .boxed()
    }

    pub fn observe_categories(&self) -> BoxStream<'static, Vec<Category>> {
        self.categories
            .observe()
            .map(|categories| categories.iter().map(category_view).collect())
            .boxed()
    }

    /// Refreshes categories, then products.
    pub async fn refresh(&self) -> Result<Vec<RefreshReport>, SyncError> {
        Ok(vec![
            self.categories.refresh().await?,
            self.products.refresh().await?,
        ])
    }

    pub fn sync_state(&self) -> SyncState {
        overall_state(&[self.categories.sync_state(), self.products.sync_state()])
    }

    pub async fn create_product(&self, input: &ProductInput) -> Result<ProductRecord, SyncError> {
        self.products.create(input).await
    }

    pub async fn update_product(
        &self,
        id: &str,
        input: &ProductInput,
    ) -> Result<ProductRecord, SyncError> {
        self.products.update(id, input).await
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), SyncError> {
        self.products.delete(id).await
    }

    pub async fn create_category(
        &self,
        input: &CategoryInput,
    ) -> Result<CategoryRecord, SyncError> {
        self.categories.create(input).await
    }

    pub async fn update_category(
        &self,
        id: &str,
        input: &CategoryInput,
    ) -> Result<CategoryRecord, SyncError> {
        self.categories.update(id, input).await
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), SyncError> {
        self.categories.delete(id).await
    }

    pub async fn retry_pending_deletes(&self) -> Result<RetryReport, SyncError> {
        let products = self.products.retry_pending_deletes().await?;
        let categories = self.categories.retry_pending_deletes().await?;
        Ok(products + categories)
    }
}
