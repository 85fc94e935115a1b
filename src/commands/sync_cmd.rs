//! Sync CLI commands for refreshing the cache from the server.

use clap::{Args, Subcommand};

use comprartir::config::Config;
use comprartir::Comprartir;

/// Sync with remote server
#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    command: Option<SyncSubcommand>,
}

#[derive(Debug, Subcommand)]
enum SyncSubcommand {
    /// Show sync configuration
    Status,
}

impl SyncCommand {
    pub async fn run(
        &self,
        app: &Comprartir,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            None => self.sync(app).await,
            Some(SyncSubcommand::Status) => {
                self.status(app, config);
                Ok(())
            }
        }
    }

    async fn sync(&self, app: &Comprartir) -> Result<(), Box<dyn std::error::Error>> {
        if !app.is_online() {
            return Err("No server available. Set api.base_url or drop --offline.".into());
        }

        println!("Syncing with server...");
        println!();

        let retried = app.retry_pending_deletes().await?;
        if retried.confirmed + retried.failed > 0 {
            println!(
                "  pending deletes: {} confirmed, {} still pending",
                retried.confirmed, retried.failed
            );
        }

        let reports = app.refresh_all().await?;
        let mut skipped = 0;
        for report in &reports {
            println!("  ✓ {} ({} cached)", report.resource, report.records);
            if !report.skipped_parents.is_empty() {
                skipped += report.skipped_parents.len();
                println!(
                    "    ✗ kept cached data for {}",
                    report.skipped_parents.join(", ")
                );
            }
        }

        println!();
        if skipped == 0 {
            println!("Sync complete.");
        } else {
            println!("Sync complete with {} parent(s) skipped.", skipped);
        }

        Ok(())
    }

    fn status(&self, app: &Comprartir, config: &Config) {
        println!("Sync Configuration");
        println!("==================");
        println!();

        let api = &config.api.value;
        let Some(base_url) = api.base_url.as_deref() else {
            println!("Status: Not configured");
            println!();
            println!("To enable sync, add to your config file:");
            println!();
            println!("  api:");
            println!("    base_url: \"https://comprartir.example.com\"");
            println!("    token: \"your-token\"");
            println!();
            println!("Or set environment variables:");
            println!("  COMPRARTIR_API_URL");
            println!("  COMPRARTIR_API_TOKEN");
            return;
        };

        let sync = &config.sync.value;
        println!("Server:    {}", base_url);
        println!(
            "Token:     {}",
            if api.token.is_some() { "set" } else { "not set" }
        );
        println!("Mode:      {}", if app.is_online() { "online" } else { "offline" });
        println!(
            "Auto-sync: {}",
            if sync.auto_sync { "enabled" } else { "disabled" }
        );
        println!("Page size: {}", sync.page_size);
        println!("Deletes:   {:?}", sync.delete_policy);
    }
}
