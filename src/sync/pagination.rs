use std::future::Future;

use crate::models::Page;

/// Page size used when the config does not set one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Fetches every page of a collection, starting at page 1.
///
/// Stops when a page reports `has_next == false` or comes back empty, so a
/// server that keeps claiming more pages without sending data cannot loop us
/// forever. The first error is returned as is; no retries.
pub async fn fetch_all_pages<T, E, F, Fut>(mut fetch_page: F, per_page: u32) -> Result<Vec<T>, E>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let per_page = per_page.max(1);
    let mut all = Vec::new();
    let mut page = 1;

    loop {
        let Page { data, has_next, .. } = fetch_page(page, per_page).await?;
        tracing::debug!(page, count = data.len(), has_next, "Fetched page");

        if data.is_empty() {
            break;
        }
        all.extend(data);
        if !has_next {
            break;
        }
        page += 1;
    }

    Ok(all)
}
