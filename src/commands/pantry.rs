use clap::{Args, Subcommand};

use comprartir::models::{PantryInput, PantryItemInput};
use comprartir::sync::SyncError;
use comprartir::Comprartir;

use super::{confirm, current, refresh_before_read, report_delete, OutputFormat};

#[derive(Args)]
pub struct PantryCommand {
    #[command(subcommand)]
    pub command: PantrySubcommand,
}

#[derive(Subcommand)]
pub enum PantrySubcommand {
    /// List all pantries
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a pantry with its stock
    Show {
        /// Pantry ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a new pantry
    Create {
        /// Name of the pantry
        name: String,
    },

    /// Rename a pantry
    Rename {
        /// Pantry ID
        id: String,

        /// New name
        name: String,
    },

    /// Delete a pantry
    Delete {
        /// Pantry ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Stock a product in a pantry
    AddItem {
        /// Pantry ID
        pantry_id: String,

        /// Product ID
        product_id: String,

        /// Quantity
        #[arg(long, short, default_value_t = 1.0)]
        quantity: f64,

        /// Unit of measurement
        #[arg(long, short, default_value = "")]
        unit: String,
    },

    /// Remove an item from its pantry
    RemoveItem {
        /// Item ID
        item_id: String,
    },
}

impl PantryCommand {
    pub async fn run(&self, app: &Comprartir) -> Result<(), Box<dyn std::error::Error>> {
        let pantry = app.pantry();

        match &self.command {
            PantrySubcommand::List { format } => {
                refresh_before_read(app, async {
                    let mut reports = app.products().refresh().await?;
                    reports.extend(pantry.refresh().await?);
                    Ok::<_, SyncError>(reports)
                })
                .await;
                let all = current(pantry.observe_pantries()).await?;

                if all.is_empty() {
                    println!("No pantries found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&all)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<8}  {:<30}  {:<6}  OWNER", "ID", "NAME", "ITEMS");
                        println!("{}", "-".repeat(70));
                        for p in &all {
                            println!(
                                "{:<8}  {:<30}  {:<6}  {}{}",
                                p.id,
                                p.name,
                                p.items.len(),
                                p.owner.as_deref().unwrap_or("-"),
                                if p.pending_delete { " (delete pending)" } else { "" }
                            );
                        }
                        println!("\nTotal: {} pantry(ies)", all.len());
                    }
                }
                Ok(())
            }

            PantrySubcommand::Show { id, format } => {
                refresh_before_read(app, async {
                    let mut reports = app.products().refresh().await?;
                    reports.extend(pantry.refresh().await?);
                    Ok::<_, SyncError>(reports)
                })
                .await;

                let found = current(pantry.observe_pantry(id))
                    .await?
                    .ok_or_else(|| format!("Pantry not found: {}", id))?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&found)?);
                    }
                    OutputFormat::Text => {
                        print!("{}", found);
                    }
                }
                Ok(())
            }

            PantrySubcommand::Create { name } => {
                if name.trim().is_empty() {
                    return Err("Pantry name cannot be empty".into());
                }

                let created = pantry.create_pantry(&PantryInput::new(name.trim())).await?;
                println!("Created pantry '{}' (#{})", created.name, created.id);
                Ok(())
            }

            PantrySubcommand::Rename { id, name } => {
                if name.trim().is_empty() {
                    return Err("Pantry name cannot be empty".into());
                }

                let updated = pantry
                    .update_pantry(id, &PantryInput::new(name.trim()))
                    .await?;
                println!("Renamed pantry #{} to '{}'", updated.id, updated.name);
                Ok(())
            }

            PantrySubcommand::Delete { id, force } => {
                let found = current(pantry.observe_pantry(id))
                    .await?
                    .ok_or_else(|| format!("Pantry not found: {}", id))?;

                if !force && !confirm(&format!("Delete pantry '{}'?", found.name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                report_delete(
                    &format!("pantry '{}'", found.name),
                    pantry.delete_pantry(id).await,
                )
            }

            PantrySubcommand::AddItem {
                pantry_id,
                product_id,
                quantity,
                unit,
            } => {
                if *quantity <= 0.0 {
                    return Err("Quantity must be a positive number".into());
                }

                let input = PantryItemInput::new(product_id.as_str(), *quantity, unit.as_str());
                let item = pantry.add_item(pantry_id, &input).await?;
                println!("Added item #{} to pantry #{}", item.id, item.pantry_id);
                Ok(())
            }

            PantrySubcommand::RemoveItem { item_id } => {
                report_delete(&format!("item #{}", item_id), pantry.remove_item(item_id).await)
            }
        }
    }
}
