use thiserror::Error;

use crate::api::ApiError;
use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No cached {resource} with id '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("{0} can only be created under a parent")]
    ParentRequired(&'static str),

    #[error("Server returned a {0} record without an id")]
    MissingId(&'static str),

    /// The server did not confirm a delete; the row stays cached and flagged.
    #[error("Delete of '{id}' not confirmed by the server, kept as pending: {source}")]
    DeletePending {
        id: String,
        #[source]
        source: ApiError,
    },
}

impl SyncError {
    /// Whether the error came from the network or server rather than the
    /// local cache.
    pub fn is_remote(&self) -> bool {
        matches!(self, SyncError::Api(_) | SyncError::DeletePending { .. })
    }
}
