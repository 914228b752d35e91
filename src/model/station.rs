use super::{LedgerEntity, string_or_null};
use serde::{Deserialize, Serialize};

/// An IoT local network observing assets at one physical location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Station {
    #[serde(rename = "publicKey", deserialize_with = "string_or_null")]
    pub public_key: String,
    /// Public key of the controlling participant; not checked on write.
    #[serde(deserialize_with = "string_or_null")]
    pub owner: String,
    #[serde(rename = "areaType", deserialize_with = "string_or_null")]
    pub area_type: String,
}

impl Station {
    pub fn new(
        public_key: impl Into<String>,
        owner: impl Into<String>,
        area_type: impl Into<String>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            owner: owner.into(),
            area_type: area_type.into(),
        }
    }

    pub fn is_owned_by(&self, public_key: &str) -> bool {
        self.owner == public_key
    }
}

impl LedgerEntity for Station {
    const HISTORY_FIELD: &'static str = "localNetwork";
    const KIND: &'static str = "station";

    fn key(&self) -> &str {
        &self.public_key
    }

    fn is_kind(&self) -> bool {
        !self.area_type.is_empty()
    }
}
