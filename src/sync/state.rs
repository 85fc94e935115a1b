use serde::Serialize;
use std::fmt;

/// Sync progress of one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum SyncState {
    /// Nothing fetched yet in this process
    NotSynced,
    /// A full refresh is running
    Syncing,
    /// The last full refresh succeeded
    Synced,
    /// The last full refresh failed; the cache keeps its previous contents
    SyncFailed(String),
}

impl SyncState {
    /// Whether the initial automatic sync may be claimed from this state.
    ///
    /// `NotSynced` always may. `SyncFailed` only when retries are enabled.
    pub fn can_claim(&self, retry_failed: bool) -> bool {
        match self {
            SyncState::NotSynced => true,
            SyncState::SyncFailed(_) => retry_failed,
            SyncState::Syncing | SyncState::Synced => false,
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, SyncState::Syncing)
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::NotSynced => write!(f, "not synced"),
            SyncState::Syncing => write!(f, "syncing"),
            SyncState::Synced => write!(f, "synced"),
            SyncState::SyncFailed(e) => write!(f, "sync failed: {}", e),
        }
    }
}
