use clap::{Args, Subcommand};

use comprartir::models::CategoryInput;
use comprartir::Comprartir;

use super::{current, refresh_before_read, OutputFormat};

#[derive(Args)]
pub struct CategoriesCommand {
    #[command(subcommand)]
    pub command: CategoriesSubcommand,
}

#[derive(Subcommand)]
pub enum CategoriesSubcommand {
    /// List all categories
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a new category
    Create {
        /// Name of the category
        name: String,
    },
}

impl CategoriesCommand {
    pub async fn run(&self, app: &Comprartir) -> Result<(), Box<dyn std::error::Error>> {
        let products = app.products();

        match &self.command {
            CategoriesSubcommand::List { format } => {
                refresh_before_read(app, products.refresh()).await;
                let all = current(products.observe_categories()).await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&all)?);
                    }
                    OutputFormat::Text if all.is_empty() => println!("No categories found"),
                    OutputFormat::Text => {
                        for category in &all {
                            println!("{}", category);
                        }
                    }
                }
                Ok(())
            }

            CategoriesSubcommand::Create { name } => {
                if name.trim().is_empty() {
                    return Err("Category name cannot be empty".into());
                }

                let created = products
                    .create_category(&CategoryInput::new(name.trim()))
                    .await?;
                println!("Created category '{}' (#{})", created.name, created.id);
                Ok(())
            }
        }
    }
}
