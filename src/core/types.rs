use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Commit timestamp as reported by the host: whole seconds plus nanos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxTimestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl TxTimestamp {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// Human-readable UTC rendering, e.g. `2024-01-02 03:04:05.5 +0000 UTC`.
    ///
    /// The fractional part has trailing zeros removed and is omitted
    /// entirely for whole seconds. Out-of-range values fall back to the
    /// raw `seconds.nanos` pair.
    pub fn to_display_string(&self) -> String {
        let nanos = u32::try_from(self.nanos).unwrap_or(0);
        let Some(at) = DateTime::<Utc>::from_timestamp(self.seconds, nanos) else {
            return format!("{}.{:09}", self.seconds, self.nanos);
        };

        let mut out = at.format("%Y-%m-%d %H:%M:%S").to_string();
        if nanos > 0 {
            let fraction = format!("{:09}", nanos);
            out.push('.');
            out.push_str(fraction.trim_end_matches('0'));
        }
        out.push_str(" +0000 UTC");
        out
    }
}

impl From<DateTime<Utc>> for TxTimestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self {
            seconds: at.timestamp(),
            nanos: at.timestamp_subsec_nanos() as i32,
        }
    }
}

impl std::fmt::Display for TxTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

/// One `(key, value)` pair yielded by a range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// One committed version of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyModification {
    pub tx_id: String,
    pub timestamp: TxTimestamp,
    pub is_delete: bool,
    pub value: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_whole_seconds() {
        let ts = TxTimestamp::new(0, 0);
        assert_eq!(ts.to_display_string(), "1970-01-01 00:00:00 +0000 UTC");
    }

    #[test]
    fn test_display_trims_fraction() {
        let ts = TxTimestamp::new(1_700_000_000, 500_000_000);
        assert_eq!(ts.to_display_string(), "2023-11-14 22:13:20.5 +0000 UTC");

        let ts = TxTimestamp::new(1_700_000_000, 123_456_789);
        assert!(ts.to_display_string().contains(":20.123456789 "));
    }

    #[test]
    fn test_negative_nanos_treated_as_zero() {
        let ts = TxTimestamp::new(60, -5);
        assert_eq!(ts.to_display_string(), "1970-01-01 00:01:00 +0000 UTC");
    }
}
