use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::CachedRecord;

/// One entity kind synced independently: its endpoint, its cache table and
/// the mapping from wire shape to cache record.
pub trait Resource: Send + Sync + 'static {
    /// Cache table name, also used as the log label.
    const NAME: &'static str;

    type Wire: DeserializeOwned + Serialize + Clone + Send + Sync + 'static;
    type Record: CachedRecord;
    type Input: Serialize + Send + Sync + 'static;

    /// Collection endpoint, e.g. `/api/shopping-lists/4/items`.
    fn collection_path(parent: Option<&str>) -> String;

    /// Maps a wire record. `parent` is the scope it was fetched or created
    /// under, used when the payload does not repeat the foreign key.
    fn to_record(wire: Self::Wire, parent: Option<&str>) -> Self::Record;
}
