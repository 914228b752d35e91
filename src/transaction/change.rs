// ============================================================================
// Transaction Change Tracking
// ============================================================================
//
// Every mutation a transaction performs is recorded as a Change. On commit
// the puts form the write set and the emits become delivered events; on
// rollback the whole log is discarded.
//
// ============================================================================

/// A single buffered effect of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Write `value` at `key`
    Put { key: String, value: Vec<u8> },

    /// Emit `payload` on `topic` after commit
    Emit { topic: String, payload: Vec<u8> },
}

impl Change {
    pub fn is_write(&self) -> bool {
        matches!(self, Change::Put { .. })
    }

    pub fn is_event(&self) -> bool {
        matches!(self, Change::Emit { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_classification() {
        let put = Change::Put {
            key: "x1".to_string(),
            value: vec![],
        };
        assert!(put.is_write());
        assert!(!put.is_event());

        let emit = Change::Emit {
            topic: "pkS".to_string(),
            payload: b"Send:a".to_vec(),
        };
        assert!(emit.is_event());
        assert!(!emit.is_write());
    }
}
