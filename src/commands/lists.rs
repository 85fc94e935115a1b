use clap::{Args, Subcommand};

use comprartir::models::{ListInput, ListItemInput};
use comprartir::sync::SyncError;
use comprartir::Comprartir;

use super::{confirm, current, refresh_before_read, report_delete, OutputFormat};

#[derive(Args)]
pub struct ListsCommand {
    #[command(subcommand)]
    pub command: ListsSubcommand,
}

#[derive(Subcommand)]
pub enum ListsSubcommand {
    /// List all shopping lists
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a list with its items
    Show {
        /// List ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a new shopping list
    Create {
        /// Name of the list
        name: String,

        /// Description
        #[arg(long)]
        description: Option<String>,

        /// Mark the list as recurring
        #[arg(long)]
        recurring: bool,
    },

    /// Rename a shopping list
    Rename {
        /// List ID
        id: String,

        /// New name
        name: String,
    },

    /// Delete a shopping list
    Delete {
        /// List ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Add a product to a list
    AddItem {
        /// List ID
        list_id: String,

        /// Product ID
        product_id: String,

        /// Quantity
        #[arg(long, short, default_value_t = 1.0)]
        quantity: f64,

        /// Unit of measurement
        #[arg(long, short, default_value = "")]
        unit: String,
    },

    /// Mark an item as purchased
    Check {
        /// Item ID
        item_id: String,
    },

    /// Mark an item as not purchased
    Uncheck {
        /// Item ID
        item_id: String,
    },

    /// Remove an item from its list
    RemoveItem {
        /// Item ID
        item_id: String,
    },

    /// Retry deletes the server has not confirmed yet
    RetryDeletes,
}

impl ListsCommand {
    pub async fn run(&self, app: &Comprartir) -> Result<(), Box<dyn std::error::Error>> {
        let lists = app.lists();

        match &self.command {
            ListsSubcommand::List { format } => {
                refresh_before_read(app, async {
                    let mut reports = app.products().refresh().await?;
                    reports.extend(lists.refresh().await?);
                    Ok::<_, SyncError>(reports)
                })
                .await;
                let all = current(lists.observe_lists()).await?;

                if all.is_empty() {
                    println!("No shopping lists found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&all)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<8}  {:<30}  ITEMS", "ID", "NAME");
                        println!("{}", "-".repeat(60));
                        for list in &all {
                            let name = if list.name.chars().count() > 30 {
                                format!("{}...", list.name.chars().take(27).collect::<String>())
                            } else {
                                list.name.clone()
                            };
                            let pending = if list.pending_delete {
                                " (delete pending)"
                            } else {
                                ""
                            };
                            println!(
                                "{:<8}  {:<30}  {}/{}{}",
                                list.id,
                                name,
                                list.purchased_count(),
                                list.items.len(),
                                pending
                            );
                        }
                        println!("\nTotal: {} list(s)", all.len());
                    }
                }
                Ok(())
            }

            ListsSubcommand::Show { id, format } => {
                refresh_before_read(app, async {
                    let mut reports = app.products().refresh().await?;
                    reports.extend(lists.refresh().await?);
                    Ok::<_, SyncError>(reports)
                })
                .await;

                match current(lists.observe_list(id)).await? {
                    Some(list) => {
                        match format {
                            OutputFormat::Json => {
                                println!("{}", serde_json::to_string_pretty(&list)?);
                            }
                            OutputFormat::Text => {
                                print!("{}", list);
                            }
                        }
                        Ok(())
                    }
                    None => Err(format!("Shopping list not found: {}", id).into()),
                }
            }

            ListsSubcommand::Create {
                name,
                description,
                recurring,
            } => {
                if name.trim().is_empty() {
                    return Err("List name cannot be empty".into());
                }

                let mut input = ListInput::new(name.trim()).recurring(*recurring);
                if let Some(description) = description {
                    input = input.with_description(description);
                }

                let created = lists.create_list(&input).await?;
                println!("Created list '{}' (#{})", created.name, created.id);
                Ok(())
            }

            ListsSubcommand::Rename { id, name } => {
                if name.trim().is_empty() {
                    return Err("List name cannot be empty".into());
                }

                let list = current(lists.observe_list(id))
                    .await?
                    .ok_or_else(|| format!("Shopping list not found: {}", id))?;

                let mut input = ListInput::new(name.trim()).recurring(list.recurring);
                if !list.description.is_empty() {
                    input = input.with_description(&list.description);
                }

                let updated = lists.update_list(id, &input).await?;
                println!("Renamed list #{} to '{}'", updated.id, updated.name);
                Ok(())
            }

            ListsSubcommand::Delete { id, force } => {
                let list = current(lists.observe_list(id))
                    .await?
                    .ok_or_else(|| format!("Shopping list not found: {}", id))?;

                if !force && !confirm(&format!("Delete list '{}'?", list.name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                report_delete(&format!("list '{}'", list.name), lists.delete_list(id).await)
            }

            ListsSubcommand::AddItem {
                list_id,
                product_id,
                quantity,
                unit,
            } => {
                if *quantity <= 0.0 {
                    return Err("Quantity must be a positive number".into());
                }

                let input = ListItemInput::new(product_id.as_str()).with_quantity(*quantity, unit);
                let item = lists.add_item(list_id, &input).await?;
                println!("Added item #{} to list #{}", item.id, item.list_id);
                Ok(())
            }

            ListsSubcommand::Check { item_id } => {
                lists.set_item_purchased(item_id, true).await?;
                println!("Checked item #{}", item_id);
                Ok(())
            }

            ListsSubcommand::Uncheck { item_id } => {
                lists.set_item_purchased(item_id, false).await?;
                println!("Unchecked item #{}", item_id);
                Ok(())
            }

            ListsSubcommand::RemoveItem { item_id } => {
                report_delete(&format!("item #{}", item_id), lists.remove_item(item_id).await)
            }

            ListsSubcommand::RetryDeletes => {
                let report = lists.retry_pending_deletes().await?;
                println!(
                    "Confirmed {} delete(s), {} still pending",
                    report.confirmed, report.failed
                );
                Ok(())
            }
        }
    }
}
