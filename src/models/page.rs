use serde::{Deserialize, Serialize};

/// One page of a paginated collection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
    /// Missing means "no further pages".
    #[serde(default)]
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total: u64, has_next: bool) -> Self {
        Self {
            data,
            page,
            per_page,
            total,
            has_next,
        }
    }

    /// Builds a page envelope by slicing `all` the way the server does.
    /// Used by fakes and test servers.
    pub fn slice(all: &[T], page: u32, per_page: u32) -> Self
    where
        T: Clone,
    {
        let per_page = per_page.max(1);
        let start = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
        let end = start.saturating_add(per_page as usize).min(all.len());
        let data = if start < all.len() {
            all[start..end].to_vec()
        } else {
            Vec::new()
        };
        Self {
            data,
            page,
            per_page,
            total: all.len() as u64,
            has_next: end < all.len(),
        }
    }
}
