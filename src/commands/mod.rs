mod categories;
mod config_cmd;
mod lists;
mod pantry;
mod products;
mod sync_cmd;

pub use categories::CategoriesCommand;
pub use config_cmd::ConfigCommand;
pub use lists::ListsCommand;
pub use pantry::PantryCommand;
pub use products::ProductsCommand;
pub use sync_cmd::SyncCommand;

use clap::ValueEnum;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::io::{self, Write};

use comprartir::sync::{RefreshReport, SyncError};
use comprartir::Comprartir;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Refreshes before a read when a server is available. Failures are printed
/// and the cached data is shown anyway.
pub async fn refresh_before_read<F>(app: &Comprartir, refresh: F)
where
    F: std::future::Future<Output = Result<Vec<RefreshReport>, SyncError>>,
{
    if !app.is_online() {
        return;
    }
    match refresh.await {
        Ok(reports) => {
            for report in reports.iter().filter(|r| !r.skipped_parents.is_empty()) {
                eprintln!(
                    "Warning: could not refresh {} of {}; showing cached data",
                    report.resource,
                    report.skipped_parents.join(", ")
                );
            }
        }
        Err(e) => eprintln!("Warning: refresh failed, showing cached data: {}", e),
    }
}

/// Current value of a cache view.
pub async fn current<T>(mut view: BoxStream<'static, T>) -> Result<T, Box<dyn std::error::Error>> {
    view.next()
        .await
        .ok_or_else(|| "cache view closed unexpectedly".into())
}

/// Asks for confirmation on stdin. Returns true for "y".
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Reports the outcome of a delete, which may be left pending.
pub fn report_delete(
    what: &str,
    result: Result<(), SyncError>,
) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Ok(()) => {
            println!("Deleted {}", what);
            Ok(())
        }
        Err(e @ SyncError::DeletePending { .. }) => {
            println!("Delete of {} is pending: {}", what, e);
            println!("Run 'retry-deletes' once the server is reachable.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
