//! Remote API client.
//!
//! The sync layer talks to the server through [`RemoteApi`], one instance per
//! resource type. [`HttpApi`] implements it for every resource over the REST
//! endpoints; tests substitute in-memory fakes.

mod client;
mod error;
mod offline;

pub use client::HttpApi;
pub use error::ApiError;
pub use offline::OfflineApi;

use async_trait::async_trait;

use crate::models::Page;
use crate::sync::Resource;

/// Paginated list endpoint plus create/update/delete for one resource type.
///
/// `parent` scopes child resources (the list of a list item); it is `None`
/// for top-level resources.
#[async_trait]
pub trait RemoteApi<R: Resource>: Send + Sync {
    async fn fetch_page(
        &self,
        parent: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<Page<R::Wire>, ApiError>;

    async fn create(&self, parent: Option<&str>, input: &R::Input) -> Result<R::Wire, ApiError>;

    async fn update(
        &self,
        parent: Option<&str>,
        id: &str,
        input: &R::Input,
    ) -> Result<R::Wire, ApiError>;

    async fn delete(&self, parent: Option<&str>, id: &str) -> Result<(), ApiError>;
}
