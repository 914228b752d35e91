//! Typed ledger entities and their stored JSON encoding.
//!
//! All three kinds share one keyspace. A stored value is told apart by its
//! discriminating attribute (`role`, `areaType`, `Id`) rather than by key.

pub mod asset;
pub mod history;
pub mod participant;
pub mod station;

pub use asset::Asset;
pub use history::HistoryEntry;
pub use participant::Participant;
pub use station::Station;

use crate::core::StorageError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub trait LedgerEntity: Serialize + DeserializeOwned + Default + Clone {
    /// Name of the entity field in a serialized history entry.
    const HISTORY_FIELD: &'static str;

    /// Kind label used in log fields and error messages.
    const KIND: &'static str;

    /// Key this entity is stored under.
    fn key(&self) -> &str;

    /// Whether a decoded value carries this kind's discriminating attribute.
    fn is_kind(&self) -> bool;

    /// Decode a stored value; fails only when the bytes are not a JSON object
    /// of compatible shape.
    fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Decode without failing. Every entity field is a string, so a field of
    /// any other JSON type reads as empty while its siblings keep their
    /// values. Input that is not a JSON object becomes an empty-field entity.
    fn from_bytes_lenient(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(fields)) => {
                let fields: Map<String, Value> = fields
                    .into_iter()
                    .map(|(name, value)| match value {
                        Value::String(_) | Value::Null => (name, value),
                        _ => (name, Value::String(String::new())),
                    })
                    .collect();
                serde_json::from_value(Value::Object(fields)).unwrap_or_default()
            }
            _ => Self::default(),
        }
    }

    fn to_bytes(&self) -> Result<Vec<u8>, StorageError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Accepts a string or `null`; `null` reads as empty.
pub(crate) fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
