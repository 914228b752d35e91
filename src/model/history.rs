use super::LedgerEntity;
use crate::core::KeyModification;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// One committed version of an entity, as returned by the history queries.
///
/// Serializes as `{txId, <participant|localNetwork|asset>, timestamp, isDelete}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry<T> {
    pub tx_id: String,
    /// Decoded value at this version; empty fields for tombstones.
    pub value: T,
    pub timestamp: String,
    pub is_delete: bool,
}

impl<T: LedgerEntity> HistoryEntry<T> {
    pub fn from_modification(modification: KeyModification) -> Self {
        Self {
            value: T::from_bytes_lenient(&modification.value),
            timestamp: modification.timestamp.to_display_string(),
            tx_id: modification.tx_id,
            is_delete: modification.is_delete,
        }
    }
}

impl<T: LedgerEntity> Serialize for HistoryEntry<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entry = serializer.serialize_struct("HistoryEntry", 4)?;
        entry.serialize_field("txId", &self.tx_id)?;
        entry.serialize_field(T::HISTORY_FIELD, &self.value)?;
        entry.serialize_field("timestamp", &self.timestamp)?;
        entry.serialize_field("isDelete", &self.is_delete)?;
        entry.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TxTimestamp;
    use crate::model::{Asset, Participant, Station};

    fn modification(value: &[u8], is_delete: bool) -> KeyModification {
        KeyModification {
            tx_id: "tx9".into(),
            timestamp: TxTimestamp::new(0, 0),
            is_delete,
            value: value.to_vec(),
        }
    }

    #[test]
    fn test_entity_field_name_per_kind() {
        let entry: HistoryEntry<Station> = HistoryEntry::from_modification(modification(
            br#"{"publicKey":"pkS","owner":"pkA","areaType":"farm"}"#,
            false,
        ));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["txId"], "tx9");
        assert_eq!(json["localNetwork"]["areaType"], "farm");
        assert_eq!(json["timestamp"], "1970-01-01 00:00:00 +0000 UTC");
        assert_eq!(json["isDelete"], false);

        let entry: HistoryEntry<Asset> =
            HistoryEntry::from_modification(modification(br#"{"Id":"x1"}"#, false));
        assert_eq!(serde_json::to_value(&entry).unwrap()["asset"]["Id"], "x1");
    }

    #[test]
    fn test_tombstone_yields_empty_entity() {
        let entry: HistoryEntry<Participant> =
            HistoryEntry::from_modification(modification(b"", true));
        assert!(entry.is_delete);
        assert_eq!(entry.value, Participant::default());

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["participant"]["role"], "");
    }
}
