// ============================================================================
// Transaction Context
// ============================================================================
//
// The handle a handler receives for the duration of one operation. It
// combines scoped access to the state store and the event sink; all effects
// are buffered as Changes until the TransactionManager commits them.
//
// ============================================================================

use super::manager::ActiveRegistration;
use super::{Change, TransactionId, TransactionState};
use crate::core::{EventError, StorageError, TxTimestamp};
use crate::events::{ChaincodeEvent, EventSink};
use crate::storage::{
    HistoryIterator, ResultsIterator, StateStore, StorageResult, VecHistoryIterator,
    VecResultsIterator, WorldState,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Everything a handler may touch while it runs.
pub trait TransactionContext: StateStore + EventSink {
    fn tx_id(&self) -> &TransactionId;

    fn timestamp(&self) -> TxTimestamp;
}

/// Collaborator failures to inject into a [`MemoryTransaction`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultPlan {
    /// Fail every put after this many have succeeded.
    pub fail_puts_after: Option<usize>,
    /// Fail every emit after this many have succeeded.
    pub fail_events_after: Option<usize>,
    /// Fail reads of this key.
    pub fail_reads_of: Option<String>,
}

impl FaultPlan {
    pub fn fail_puts_after(mut self, count: usize) -> Self {
        self.fail_puts_after = Some(count);
        self
    }

    pub fn fail_events_after(mut self, count: usize) -> Self {
        self.fail_events_after = Some(count);
        self
    }

    pub fn fail_reads_of(mut self, key: impl Into<String>) -> Self {
        self.fail_reads_of = Some(key.into());
        self
    }
}

/// In-process transaction over a shared [`WorldState`].
///
/// Reads observe committed state only; nothing written here is visible,
/// even to this transaction, until commit.
#[derive(Debug)]
pub struct MemoryTransaction {
    id: TransactionId,
    timestamp: TxTimestamp,
    state: TransactionState,
    world: Arc<WorldState>,
    changes: Vec<Change>,
    faults: FaultPlan,
    start_time: std::time::Instant,
    // Held for its Drop; removes the id from the manager's active set.
    _registration: Option<ActiveRegistration>,
}

impl MemoryTransaction {
    pub fn new(id: TransactionId, timestamp: TxTimestamp, world: Arc<WorldState>) -> Self {
        Self {
            id,
            timestamp,
            state: TransactionState::Active,
            world,
            changes: Vec::new(),
            faults: FaultPlan::default(),
            start_time: std::time::Instant::now(),
            _registration: None,
        }
    }

    pub(crate) fn registered(mut self, registration: ActiveRegistration) -> Self {
        self._registration = Some(registration);
        self
    }

    pub fn with_faults(mut self, faults: FaultPlan) -> Self {
        self.faults = faults;
        self
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn write_count(&self) -> usize {
        self.changes.iter().filter(|c| c.is_write()).count()
    }

    pub fn event_count(&self) -> usize {
        self.changes.iter().filter(|c| c.is_event()).count()
    }

    pub fn duration(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Host-side cancellation: every later store or sink call fails.
    pub fn cancel(&mut self) {
        if self.state.is_active() {
            self.state = TransactionState::Aborted;
        }
    }

    /// Split into the write set and the events to deliver, in call order.
    pub(crate) fn into_effects(self) -> (Vec<(String, Vec<u8>)>, Vec<ChaincodeEvent>) {
        let mut writes = Vec::new();
        let mut events = Vec::new();
        for change in self.changes {
            match change {
                Change::Put { key, value } => writes.push((key, value)),
                Change::Emit { topic, payload } => events.push(ChaincodeEvent {
                    tx_id: self.id.to_string(),
                    topic,
                    payload,
                }),
            }
        }
        (writes, events)
    }

    fn ensure_active(&self) -> StorageResult<()> {
        match self.state {
            TransactionState::Active => Ok(()),
            TransactionState::Aborted => Err(StorageError::Cancelled(self.id.to_string())),
        }
    }

    fn check_read(&self, key: &str) -> StorageResult<()> {
        self.ensure_active()?;
        if self.faults.fail_reads_of.as_deref() == Some(key) {
            return Err(StorageError::Io(format!("injected read failure for '{}'", key)));
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for MemoryTransaction {
    async fn get_state(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.check_read(key)?;
        Ok(self.world.get(key).await)
    }

    async fn put_state(&mut self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        self.ensure_active()?;
        if let Some(limit) = self.faults.fail_puts_after {
            if self.write_count() >= limit {
                return Err(StorageError::Io(format!("injected write failure for '{}'", key)));
            }
        }
        self.changes.push(Change::Put {
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    async fn get_state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> StorageResult<Box<dyn ResultsIterator>> {
        self.ensure_active()?;
        let items = self.world.range(start_key, end_key).await;
        Ok(Box::new(VecResultsIterator::new(items)))
    }

    async fn get_history_for_key(&self, key: &str) -> StorageResult<Box<dyn HistoryIterator>> {
        self.check_read(key)?;
        let items = self.world.history(key).await;
        Ok(Box::new(VecHistoryIterator::new(items)))
    }
}

#[async_trait]
impl EventSink for MemoryTransaction {
    async fn set_event(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), EventError> {
        if !self.state.is_active() {
            return Err(EventError::Inactive(self.id.to_string()));
        }
        if let Some(limit) = self.faults.fail_events_after {
            if self.event_count() >= limit {
                return Err(EventError::Rejected(format!(
                    "injected event failure on topic '{}'",
                    topic
                )));
            }
        }
        self.changes.push(Change::Emit {
            topic: topic.to_string(),
            payload,
        });
        Ok(())
    }
}

impl TransactionContext for MemoryTransaction {
    fn tx_id(&self) -> &TransactionId {
        &self.id
    }

    fn timestamp(&self) -> TxTimestamp {
        self.timestamp
    }
}
