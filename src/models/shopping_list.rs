//! Shopping lists and their items: wire shape, cache record and mutation input.

use serde::{Deserialize, Serialize};

use super::id::{flexible_id, flexible_id_opt, null_default, WireRef};
use super::user::WireUser;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireShoppingList {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub recurring: bool,
    #[serde(default)]
    pub owner: Option<WireUser>,
    #[serde(default, deserialize_with = "null_default")]
    pub shared_with: Vec<WireUser>,
    #[serde(default)]
    pub last_purchased_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShoppingListRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub recurring: bool,
    pub owner: Option<String>,
    pub shared_with: Vec<String>,
    pub last_purchased_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(skip)]
    pub pending_delete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub recurring: bool,
}

impl ListInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            recurring: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn recurring(mut self, recurring: bool) -> Self {
        self.recurring = recurring;
        self
    }
}

impl From<&ShoppingListRecord> for ListInput {
    fn from(record: &ShoppingListRecord) -> Self {
        Self {
            name: record.name.clone(),
            description: Some(record.description.clone()).filter(|d| !d.is_empty()),
            recurring: record.recurring,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireListItem {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub product: Option<WireRef>,
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub product_id: Option<String>,
    #[serde(default = "default_quantity", deserialize_with = "quantity_or_default")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub unit: String,
    #[serde(default, deserialize_with = "null_default")]
    pub purchased: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListItemRecord {
    pub id: String,
    pub list_id: String,
    pub product_id: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub purchased: bool,
    #[serde(skip)]
    pub pending_delete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListItemInput {
    pub product_id: String,
    pub quantity: f64,
    pub unit: String,
    pub purchased: bool,
}

impl ListItemInput {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            quantity: 1.0,
            unit: String::new(),
            purchased: false,
        }
    }

    pub fn with_quantity(mut self, quantity: f64, unit: impl Into<String>) -> Self {
        self.quantity = quantity;
        self.unit = unit.into();
        self
    }
}

impl From<&ListItemRecord> for ListItemInput {
    fn from(record: &ListItemRecord) -> Self {
        Self {
            product_id: record.product_id.clone().unwrap_or_default(),
            quantity: record.quantity,
            unit: record.unit.clone(),
            purchased: record.purchased,
        }
    }
}

pub(crate) fn default_quantity() -> f64 {
    1.0
}

/// `null` quantities count as missing.
pub(crate) fn quantity_or_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_else(default_quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Page;

    #[test]
    fn test_wire_list_minimal() {
        let list: WireShoppingList = serde_json::from_str(r#"{"id": 12}"#).unwrap();
        assert_eq!(list.id, "12");
        assert_eq!(list.name, "");
        assert!(list.owner.is_none());
        assert!(list.shared_with.is_empty());
        assert!(!list.recurring);
    }

    #[test]
    fn test_wire_item_defaults_quantity() {
        let item: WireListItem =
            serde_json::from_str(r#"{"id": "5", "product": {"id": 8, "name": "Milk"}}"#).unwrap();
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.product.and_then(|p| p.id), Some("8".to_string()));
    }

    #[test]
    fn test_null_fields_take_defaults() {
        let page: Page<WireShoppingList> = serde_json::from_str(
            r#"{"data": [{"id": 1, "name": null, "description": null, "recurring": null,
                          "owner": null, "shared_with": null}],
                "page": 1, "per_page": 50, "total": 1, "has_next": false}"#,
        )
        .unwrap();
        let list = &page.data[0];
        assert_eq!(list.id, "1");
        assert_eq!(list.name, "");
        assert!(!list.recurring);
        assert!(list.shared_with.is_empty());

        let item: WireListItem = serde_json::from_str(
            r#"{"id": 5, "quantity": null, "unit": null, "purchased": null, "product_id": null}"#,
        )
        .unwrap();
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.unit, "");
        assert!(!item.purchased);
    }

    #[test]
    fn test_record_without_id_still_decodes() {
        let page: Page<WireListItem> = serde_json::from_str(
            r#"{"data": [{"unit": "kg"}, {"id": 2}], "has_next": false}"#,
        )
        .unwrap();
        assert_eq!(page.data[0].id, "");
        assert_eq!(page.data[1].id, "2");
    }

    #[test]
    fn test_list_input_from_record_drops_empty_description() {
        let record = ShoppingListRecord {
            id: "1".into(),
            name: "Weekly".into(),
            description: String::new(),
            recurring: true,
            owner: None,
            shared_with: vec![],
            last_purchased_at: None,
            updated_at: None,
            pending_delete: false,
        };
        let input = ListInput::from(&record);
        assert_eq!(input.description, None);
        assert!(input.recurring);
    }

    #[test]
    fn test_pending_delete_not_serialized() {
        let record = ListItemRecord {
            id: "1".into(),
            list_id: "L1".into(),
            product_id: None,
            quantity: 2.0,
            unit: "kg".into(),
            purchased: false,
            pending_delete: true,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("pending_delete"));
    }
}
