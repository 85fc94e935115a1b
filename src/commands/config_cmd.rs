use clap::{Args, Subcommand};

use comprartir::config::Config;

use super::OutputFormat;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("database_path: {}", config.database_path.value.display());
                        println!("  source: {}", config.database_path.source);
                        println!();

                        let api = &config.api.value;
                        println!(
                            "api.base_url: {}",
                            api.base_url.as_deref().unwrap_or("(not set, offline)")
                        );
                        println!(
                            "api.token: {}",
                            if api.token.is_some() { "********" } else { "(not set)" }
                        );
                        println!("api.timeout_secs: {}", api.timeout_secs);
                        println!("  source: {}", config.api.source);
                        println!();

                        let sync = &config.sync.value;
                        println!("sync.page_size: {}", sync.page_size);
                        println!("sync.auto_sync: {}", sync.auto_sync);
                        println!(
                            "sync.retry_failed_initial_sync: {}",
                            sync.retry_failed_initial_sync
                        );
                        println!("sync.delete_policy: {:?}", sync.delete_policy);
                        println!("  source: {}", config.sync.source);
                    }
                }
                Ok(())
            }
        }
    }
}
