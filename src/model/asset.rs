use super::{LedgerEntity, string_or_null};
use serde::{Deserialize, Serialize};

/// A tracked physical item.
///
/// `Id` and `Holder` are capitalized on the wire while `owner` and
/// `station` are not; stored history depends on these exact names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Asset {
    #[serde(rename = "Id", deserialize_with = "string_or_null")]
    pub id: String,
    /// Participant currently in possession.
    #[serde(rename = "Holder", deserialize_with = "string_or_null")]
    pub holder: String,
    /// Participant that legally owns the asset.
    #[serde(deserialize_with = "string_or_null")]
    pub owner: String,
    /// Station observing the asset; empty when none.
    #[serde(deserialize_with = "string_or_null")]
    pub station: String,
}

impl Asset {
    pub fn new(
        id: impl Into<String>,
        holder: impl Into<String>,
        owner: impl Into<String>,
        station: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            holder: holder.into(),
            owner: owner.into(),
            station: station.into(),
        }
    }

    pub fn is_owner_or_holder(&self, public_key: &str) -> bool {
        self.owner == public_key || self.holder == public_key
    }

    pub fn has_station(&self) -> bool {
        !self.station.is_empty()
    }
}

impl LedgerEntity for Asset {
    const HISTORY_FIELD: &'static str = "asset";
    const KIND: &'static str = "asset";

    fn key(&self) -> &str {
        &self.id
    }

    fn is_kind(&self) -> bool {
        !self.id.is_empty()
    }
}
