//! Cache synchronization.
//!
//! Each resource type gets a [`SyncCoordinator`] that owns its cache table,
//! its sync state and its refresh lock. Consumers read from the cache only;
//! the coordinator decides when to go to the network.
//!
//! ```no_run
//! # async fn demo(lists: comprartir::sync::SyncCoordinator<comprartir::mapper::ShoppingLists>) {
//! use futures::StreamExt;
//!
//! let mut cached = lists.observe();
//! while let Some(rows) = cached.next().await {
//!     println!("{} list(s)", rows.len());
//! }
//! # }
//! ```

mod coordinator;
mod error;
mod pagination;
mod resource;
mod scheduler;
mod state;

#[cfg(test)]
pub(crate) mod fake;

pub use coordinator::{
    DeletePolicy, ParentScope, RefreshReport, RetryReport, SyncCoordinator, SyncOptions,
};
pub use error::SyncError;
pub use pagination::{fetch_all_pages, DEFAULT_PAGE_SIZE};
pub use resource::Resource;
pub use scheduler::{SyncScheduler, TaskScheduler};
pub use state::SyncState;
