use serde::{Deserialize, Serialize};

use super::id::{flexible_id, flexible_id_opt, null_default, WireRef};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireCategory {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    #[serde(skip)]
    pub pending_delete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryInput {
    pub name: String,
}

impl CategoryInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireProduct {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default)]
    pub category: Option<WireRef>,
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub category_id: Option<String>,
    #[serde(skip)]
    pub pending_delete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl ProductInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category_id: None,
        }
    }

    pub fn in_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }
}
