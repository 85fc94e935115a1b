use async_trait::async_trait;

use super::{ApiError, RemoteApi};
use crate::models::Page;
use crate::sync::Resource;

/// Stand-in used when there is no server to talk to. Every call fails, so
/// reads serve the cache and writes are rejected without touching it.
#[derive(Debug, Clone)]
pub struct OfflineApi {
    reason: String,
}

impl OfflineApi {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> ApiError {
        ApiError::NotConfigured(self.reason.clone())
    }
}

#[async_trait]
impl<R: Resource> RemoteApi<R> for OfflineApi {
    async fn fetch_page(
        &self,
        _parent: Option<&str>,
        _page: u32,
        _per_page: u32,
    ) -> Result<Page<R::Wire>, ApiError> {
        Err(self.error())
    }

    async fn create(&self, _parent: Option<&str>, _input: &R::Input) -> Result<R::Wire, ApiError> {
        Err(self.error())
    }

    async fn update(
        &self,
        _parent: Option<&str>,
        _id: &str,
        _input: &R::Input,
    ) -> Result<R::Wire, ApiError> {
        Err(self.error())
    }

    async fn delete(&self, _parent: Option<&str>, _id: &str) -> Result<(), ApiError> {
        Err(self.error())
    }
}
