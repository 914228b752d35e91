use super::engine::{HistoryIterator, ResultsIterator, StorageResult};
use crate::core::{KeyModification, KeyValue, StorageError, TxTimestamp};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::ops::Bound;
use tokio::sync::RwLock;

/// Committed world state plus the per-key version history.
///
/// This is the in-process stand-in for the ledger host: transactions read
/// from it directly and install their write sets through [`WorldState::apply`].
pub struct WorldState {
    /// Current value per key; ordered so range scans are stable.
    state: RwLock<BTreeMap<String, Vec<u8>>>,
    /// Every committed version per key, oldest first.
    history: RwLock<HashMap<String, Vec<KeyModification>>>,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(BTreeMap::new()),
            history: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.state.read().await.get(key).cloned()
    }

    /// Start inclusive, end exclusive, empty bound means unbounded.
    pub async fn range(&self, start_key: &str, end_key: &str) -> Vec<KeyValue> {
        let lower = if start_key.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start_key)
        };
        let upper = if end_key.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end_key)
        };

        // BTreeMap::range panics on inverted bounds
        if !start_key.is_empty() && !end_key.is_empty() && start_key >= end_key {
            return Vec::new();
        }

        let state = self.state.read().await;
        state
            .range::<str, _>((lower, upper))
            .map(|(key, value)| KeyValue {
                key: key.clone(),
                value: value.clone(),
            })
            .collect()
    }

    pub async fn history(&self, key: &str) -> Vec<KeyModification> {
        self.history
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Install a transaction's write set atomically.
    ///
    /// A key written more than once in the same transaction keeps only its
    /// last value and gains a single history entry.
    pub async fn apply(&self, tx_id: &str, timestamp: TxTimestamp, writes: Vec<(String, Vec<u8>)>) {
        let mut last_write: Vec<(String, Vec<u8>)> = Vec::with_capacity(writes.len());
        for (key, value) in writes {
            match last_write.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => last_write.push((key, value)),
            }
        }

        // Lock order: state, then history.
        let mut state = self.state.write().await;
        let mut history = self.history.write().await;

        for (key, value) in last_write {
            history.entry(key.clone()).or_default().push(KeyModification {
                tx_id: tx_id.to_string(),
                timestamp,
                is_delete: false,
                value: value.clone(),
            });
            state.insert(key, value);
        }
    }

    /// Administrative delete outside the transaction flow.
    ///
    /// Removes the current value and records a tombstone version with an
    /// empty payload. Returns `false` when the key was not present.
    pub async fn purge(&self, key: &str, tx_id: &str, timestamp: TxTimestamp) -> bool {
        let mut state = self.state.write().await;
        let mut history = self.history.write().await;

        if state.remove(key).is_none() {
            return false;
        }

        history.entry(key.to_string()).or_default().push(KeyModification {
            tx_id: tx_id.to_string(),
            timestamp,
            is_delete: true,
            value: Vec::new(),
        });
        true
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.is_empty()
    }
}

impl std::fmt::Debug for WorldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldState").finish_non_exhaustive()
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

/// Results iterator over a materialized scan.
pub struct VecResultsIterator {
    items: VecDeque<KeyValue>,
    closed: bool,
}

impl VecResultsIterator {
    pub fn new(items: Vec<KeyValue>) -> Self {
        Self {
            items: items.into(),
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl ResultsIterator for VecResultsIterator {
    fn has_next(&self) -> bool {
        !self.closed && !self.items.is_empty()
    }

    fn next(&mut self) -> StorageResult<KeyValue> {
        if self.closed {
            return Err(StorageError::Io("range iterator already closed".into()));
        }
        self.items
            .pop_front()
            .ok_or_else(|| StorageError::Io("range iterator exhausted".into()))
    }

    fn close(&mut self) {
        self.closed = true;
        self.items.clear();
    }
}

/// History iterator over a materialized version list.
pub struct VecHistoryIterator {
    items: VecDeque<KeyModification>,
    closed: bool,
}

impl VecHistoryIterator {
    pub fn new(items: Vec<KeyModification>) -> Self {
        Self {
            items: items.into(),
            closed: false,
        }
    }
}

impl HistoryIterator for VecHistoryIterator {
    fn has_next(&self) -> bool {
        !self.closed && !self.items.is_empty()
    }

    fn next(&mut self) -> StorageResult<KeyModification> {
        if self.closed {
            return Err(StorageError::Io("history iterator already closed".into()));
        }
        self.items
            .pop_front()
            .ok_or_else(|| StorageError::Io("history iterator exhausted".into()))
    }

    fn close(&mut self) {
        self.closed = true;
        self.items.clear();
    }
}
