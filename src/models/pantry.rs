use serde::{Deserialize, Serialize};

use super::id::{flexible_id, flexible_id_opt, null_default, WireRef};
use super::shopping_list::{default_quantity, quantity_or_default};
use super::user::WireUser;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WirePantry {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default)]
    pub owner: Option<WireUser>,
    #[serde(default, deserialize_with = "null_default")]
    pub shared_with: Vec<WireUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PantryRecord {
    pub id: String,
    pub name: String,
    pub owner: Option<String>,
    pub shared_with: Vec<String>,
    #[serde(skip)]
    pub pending_delete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PantryInput {
    pub name: String,
}

impl PantryInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WirePantryItem {
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
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PantryItemRecord {
    pub id: String,
    pub pantry_id: String,
    pub product_id: Option<String>,
    pub quantity: f64,
    pub unit: String,
    #[serde(skip)]
    pub pending_delete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PantryItemInput {
    pub product_id: String,
    pub quantity: f64,
    pub unit: String,
}

impl PantryItemInput {
    pub fn new(product_id: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit: unit.into(),
        }
    }
}
