use clap::{Args, Subcommand};

use comprartir::models::ProductInput;
use comprartir::Comprartir;

use super::{confirm, current, refresh_before_read, report_delete, OutputFormat};

#[derive(Args)]
pub struct ProductsCommand {
    #[command(subcommand)]
    pub command: ProductsSubcommand,
}

#[derive(Subcommand)]
pub enum ProductsSubcommand {
    /// List all products
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a new product
    Create {
        /// Name of the product
        name: String,

        /// Category ID
        #[arg(long, short)]
        category: Option<String>,
    },

    /// Delete a product
    Delete {
        /// Product ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl ProductsCommand {
    pub async fn run(&self, app: &Comprartir) -> Result<(), Box<dyn std::error::Error>> {
        let products = app.products();

        match &self.command {
            ProductsSubcommand::List { format } => {
                refresh_before_read(app, products.refresh()).await;
                let all = current(products.observe_products()).await?;

                if all.is_empty() {
                    println!("No products found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&all)?);
                    }
                    OutputFormat::Text => {
                        for product in &all {
                            println!("{}", product);
                        }
                        println!("\nTotal: {} product(s)", all.len());
                    }
                }
                Ok(())
            }

            ProductsSubcommand::Create { name, category } => {
                if name.trim().is_empty() {
                    return Err("Product name cannot be empty".into());
                }

                let mut input = ProductInput::new(name.trim());
                if let Some(category) = category {
                    input = input.in_category(category.as_str());
                }

                let created = products.create_product(&input).await?;
                println!("Created product '{}' (#{})", created.name, created.id);
                Ok(())
            }

            ProductsSubcommand::Delete { id, force } => {
                let product = current(products.observe_product(id))
                    .await?
                    .ok_or_else(|| format!("Product not found: {}", id))?;

                if !force && !confirm(&format!("Delete product '{}'?", product.name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                report_delete(
                    &format!("product '{}'", product.name),
                    products.delete_product(id).await,
                )
            }
        }
    }
}
