use super::{LedgerEntity, string_or_null};
use serde::{Deserialize, Serialize};

/// A legal actor identified by its public key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Participant {
    #[serde(rename = "publicKey", deserialize_with = "string_or_null")]
    pub public_key: String,
    /// e.g. `customer`, `carrier`; never empty for a real participant.
    #[serde(deserialize_with = "string_or_null")]
    pub role: String,
    /// Endpoint stations stream to on behalf of this participant.
    #[serde(deserialize_with = "string_or_null")]
    pub link: String,
}

impl Participant {
    pub fn new(
        public_key: impl Into<String>,
        role: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            role: role.into(),
            link: link.into(),
        }
    }
}

impl LedgerEntity for Participant {
    const HISTORY_FIELD: &'static str = "participant";
    const KIND: &'static str = "participant";

    fn key(&self) -> &str {
        &self.public_key
    }

    fn is_kind(&self) -> bool {
        !self.role.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let parti = Participant::new("pkA", "customer", "udp://a");
        let json = String::from_utf8(parti.to_bytes().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"publicKey":"pkA","role":"customer","link":"udp://a"}"#
        );
    }

    #[test]
    fn test_tolerant_decoding() {
        let parti = Participant::from_bytes(br#"{"role":"carrier","extra":1}"#).unwrap();
        assert_eq!(parti.role, "carrier");
        assert_eq!(parti.public_key, "");

        let parti = Participant::from_bytes(br#"{"publicKey":null,"role":"x"}"#).unwrap();
        assert_eq!(parti.public_key, "");
    }

    #[test]
    fn test_lenient_decoding_blanks_only_mistyped_fields() {
        let stored = br#"{"publicKey":"pkA","role":"customer","link":5}"#;
        assert!(Participant::from_bytes(stored).is_err());

        let parti = Participant::from_bytes_lenient(stored);
        assert_eq!(parti, Participant::new("pkA", "customer", ""));
        assert!(parti.is_kind());

        let parti = Participant::from_bytes_lenient(br#"{"publicKey":["pkA"],"role":null,"link":"L"}"#);
        assert_eq!(parti, Participant::new("", "", "L"));

        assert_eq!(Participant::from_bytes_lenient(b"[1,2]"), Participant::default());
        assert_eq!(Participant::from_bytes_lenient(b"not json"), Participant::default());
    }

    #[test]
    fn test_other_kind_is_not_participant() {
        let station = br#"{"publicKey":"pkS","owner":"pkA","areaType":"farm"}"#;
        let decoded = Participant::from_bytes(station).unwrap();
        assert!(!decoded.is_kind());
    }

    #[test]
    fn test_lenient_on_garbage_and_empty() {
        assert_eq!(Participant::from_bytes_lenient(b""), Participant::default());
        assert_eq!(Participant::from_bytes_lenient(b"not json"), Participant::default());
        assert!(Participant::from_bytes(b"[1,2]").is_err());
    }
}
