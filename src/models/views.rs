//! Denormalised read models assembled by the repositories.
//!
//! Every optional relation is explicit: an item whose product is not cached
//! carries `product: None` and still shows its `product_id`.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub pending_delete: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: Option<Category>,
    pub pending_delete: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListEntry {
    pub id: String,
    pub product_id: Option<String>,
    pub product: Option<Product>,
    pub quantity: f64,
    pub unit: String,
    pub purchased: bool,
    pub pending_delete: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShoppingList {
    pub id: String,
    pub name: String,
    pub description: String,
    pub recurring: bool,
    pub owner: Option<String>,
    pub shared_with: Vec<String>,
    pub items: Vec<ListEntry>,
    pub pending_delete: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PantryEntry {
    pub id: String,
    pub product_id: Option<String>,
    pub product: Option<Product>,
    pub quantity: f64,
    pub unit: String,
    pub pending_delete: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Pantry {
    pub id: String,
    pub name: String,
    pub owner: Option<String>,
    pub shared_with: Vec<String>,
    pub items: Vec<PantryEntry>,
    pub pending_delete: bool,
}

impl ShoppingList {
    pub fn purchased_count(&self) -> usize {
        self.items.iter().filter(|i| i.purchased).count()
    }
}

fn product_label(product: &Option<Product>, product_id: &Option<String>) -> String {
    match (product, product_id) {
        (Some(p), _) => p.name.clone(),
        (None, Some(id)) => format!("product #{}", id),
        (None, None) => "(unknown product)".to_string(),
    }
}

fn quantity_label(quantity: f64, unit: &str) -> String {
    if unit.is_empty() {
        format!("{}", quantity)
    } else {
        format!("{} {}", quantity, unit)
    }
}

fn pending_marker(pending: bool) -> &'static str {
    if pending {
        " (delete pending)"
    } else {
        ""
    }
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let check = if self.purchased { "[x]" } else { "[ ]" };
        write!(
            f,
            "{} {:<24} {}  #{}{}",
            check,
            product_label(&self.product, &self.product_id),
            quantity_label(self.quantity, &self.unit),
            self.id,
            pending_marker(self.pending_delete)
        )
    }
}

impl fmt::Display for ShoppingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("{} (#{})", self.name, self.id);
        writeln!(f, "{}{}", title, pending_marker(self.pending_delete))?;
        writeln!(f, "{}", "=".repeat(title.chars().count()))?;
        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
        }
        if let Some(owner) = &self.owner {
            writeln!(f, "Owner: {}", owner)?;
        }
        if !self.shared_with.is_empty() {
            writeln!(f, "Shared with: {}", self.shared_with.join(", "))?;
        }
        if self.recurring {
            writeln!(f, "Recurring")?;
        }

        if self.items.is_empty() {
            writeln!(f, "\nNo items.")?;
        } else {
            writeln!(
                f,
                "\nItems ({}/{} purchased):",
                self.purchased_count(),
                self.items.len()
            )?;
            for item in &self.items {
                writeln!(f, "  {}", item)?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for PantryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<24} {}  #{}{}",
            product_label(&self.product, &self.product_id),
            quantity_label(self.quantity, &self.unit),
            self.id,
            pending_marker(self.pending_delete)
        )
    }
}

impl fmt::Display for Pantry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("{} (#{})", self.name, self.id);
        writeln!(f, "{}{}", title, pending_marker(self.pending_delete))?;
        writeln!(f, "{}", "=".repeat(title.chars().count()))?;
        if let Some(owner) = &self.owner {
            writeln!(f, "Owner: {}", owner)?;
        }

        if self.items.is_empty() {
            writeln!(f, "\nEmpty.")?;
        } else {
            writeln!(f, "\nStock:")?;
            for item in &self.items {
                writeln!(f, "  {}", item)?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = self
            .category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        write!(
            f,
            "#{:<6} {:<24} {}{}",
            self.id,
            self.name,
            category,
            pending_marker(self.pending_delete)
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:<6} {}{}",
            self.id,
            self.name,
            pending_marker(self.pending_delete)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(purchased: bool, product: Option<Product>) -> ListEntry {
        ListEntry {
            id: "7".into(),
            product_id: Some("3".into()),
            product,
            quantity: 2.0,
            unit: "kg".into(),
            purchased,
            pending_delete: false,
        }
    }

    #[test]
    fn test_list_entry_display_without_product() {
        let output = format!("{}", entry(false, None));
        assert!(output.starts_with("[ ]"));
        assert!(output.contains("product #3"));
        assert!(output.contains("2 kg"));
    }

    #[test]
    fn test_shopping_list_display() {
        let list = ShoppingList {
            id: "1".into(),
            name: "Weekly".into(),
            description: "Groceries".into(),
            recurring: true,
            owner: Some("Ana".into()),
            shared_with: vec![],
            items: vec![
                entry(true, None),
                entry(
                    false,
                    Some(Product {
                        id: "3".into(),
                        name: "Rice".into(),
                        category: None,
                        pending_delete: false,
                    }),
                ),
            ],
            pending_delete: true,
        };

        let output = format!("{}", list);
        assert!(output.contains("Weekly (#1) (delete pending)"));
        assert!(output.contains("Owner: Ana"));
        assert!(output.contains("Items (1/2 purchased)"));
        assert!(output.contains("Rice"));
    }
}
