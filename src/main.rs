use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{
    CategoriesCommand, ConfigCommand, ListsCommand, PantryCommand, ProductsCommand, SyncCommand,
};
use comprartir::config::Config;
use comprartir::Comprartir;

#[derive(Parser)]
#[command(name = "comprartir")]
#[command(version)]
#[command(about = "Shared shopping lists and pantries, cached for offline use", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Work from the local cache without contacting the server
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh the cache from the server
    Sync(SyncCommand),

    /// Manage shopping lists
    Lists(ListsCommand),

    /// Manage pantries
    Pantry(PantryCommand),

    /// Manage products
    Products(ProductsCommand),

    /// Manage product categories
    Categories(CategoriesCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comprartir=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;

    let command = match cli.command {
        Some(Commands::Config(cmd)) => return cmd.run(&config),
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };

    let app = Comprartir::open(&config, cli.offline).await?;
    let result = match command {
        Commands::Sync(cmd) => cmd.run(&app, &config).await,
        Commands::Lists(cmd) => cmd.run(&app).await,
        Commands::Pantry(cmd) => cmd.run(&app).await,
        Commands::Products(cmd) => cmd.run(&app).await,
        Commands::Categories(cmd) => cmd.run(&app).await,
        Commands::Config(_) => Ok(()),
    };
    app.shutdown().await;

    result
}
