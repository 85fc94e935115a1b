use serde::{Deserialize, Serialize};

use super::id::{flexible_id_opt, null_default};

/// A user as embedded in list and pantry payloads (owner, shared_with).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WireUser {
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub surname: String,
    #[serde(default, deserialize_with = "null_default")]
    pub email: String,
}

impl WireUser {
    /// "Name Surname", falling back to the email, then to the id.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.name.trim(), self.surname.trim());
        let full = full.trim();
        if !full.is_empty() {
            full.to_string()
        } else if !self.email.is_empty() {
            self.email.clone()
        } else {
            self.id.clone().unwrap_or_default()
        }
    }
}
