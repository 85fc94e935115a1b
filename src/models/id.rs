//! Identifier decoding.
//!
//! The API sends numeric ids, but older endpoints (and nested objects built by
//! hand on the server) sometimes send them as strings. The cache keys
//! everything by the string form, so both shapes normalise to `String`.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
            RawId::Float(f) if f.fract() == 0.0 && f.is_finite() => format!("{}", f as i64),
            RawId::Float(f) => f.to_string(),
            RawId::Text(s) => s.trim().to_string(),
        }
    }
}

/// Deserializes an id given as a JSON number or string. `null` becomes an
/// empty id; pair with `#[serde(default)]` so a missing id does too. Records
/// with an empty id are dropped by the sync layer.
pub fn flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(raw.map(RawId::into_string).unwrap_or_default())
}

/// Deserializes an optional id. `null`, a missing field and an empty string
/// all become `None`.
pub fn flexible_id_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(raw.map(RawId::into_string).filter(|s| !s.is_empty()))
}

/// Deserializes a field whose `null` means the same as a missing value.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A nested object of which only the id matters, e.g. `"product": {"id": 4, ...}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WireRef {
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub id: Option<String>,
}

/// Picks the id of a relation that may arrive nested (`"product": {...}`) or
/// flat (`"product_id": 4`). The nested form wins when both are present.
pub fn relation_id(nested: Option<WireRef>, flat: Option<String>) -> Option<String> {
    nested.and_then(|r| r.id).or(flat)
}
