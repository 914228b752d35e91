// ============================================================================
// Transaction Manager
// ============================================================================

use super::{MemoryTransaction, TransactionContext, TransactionId};
use crate::core::{LedgerError, Result, StorageError, TxTimestamp};
use crate::events::EventBus;
use crate::storage::WorldState;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;
use tracing::{Level, event};

/// Summary of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tx_id: TransactionId,
    pub timestamp: TxTimestamp,
    pub write_count: usize,
    pub event_count: usize,
}

type ActiveSet = Arc<Mutex<HashSet<TransactionId>>>;

fn lock_active(ids: &ActiveSet) -> MutexGuard<'_, HashSet<TransactionId>> {
    ids.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Membership of one transaction in its manager's active set. Dropping it
/// deregisters the transaction, so a context abandoned without commit or
/// rollback does not stay counted as active.
#[derive(Debug)]
pub(crate) struct ActiveRegistration {
    ids: ActiveSet,
    id: TransactionId,
}

impl Drop for ActiveRegistration {
    fn drop(&mut self) {
        lock_active(&self.ids).remove(&self.id);
    }
}

/// Hands out transaction contexts and commits or discards their effects.
///
/// Commits are serialized: the write set is installed into the world state
/// and only then are the transaction's events delivered, in emit order.
pub struct TransactionManager {
    world: Arc<WorldState>,
    bus: Arc<EventBus>,
    active_ids: ActiveSet,
    commit_lock: tokio::sync::Mutex<()>,
    global_version: Arc<RwLock<u64>>,
}

impl TransactionManager {
    pub fn new(world: Arc<WorldState>, bus: Arc<EventBus>) -> Self {
        Self {
            world,
            bus,
            active_ids: Arc::new(Mutex::new(HashSet::new())),
            commit_lock: tokio::sync::Mutex::new(()),
            global_version: Arc::new(RwLock::new(0)),
        }
    }

    pub async fn begin(&self) -> MemoryTransaction {
        let id = TransactionId::new();
        lock_active(&self.active_ids).insert(id.clone());
        event!(Level::DEBUG, tx_id = %id, "transaction started");
        let registration = ActiveRegistration {
            ids: self.active_ids.clone(),
            id: id.clone(),
        };
        MemoryTransaction::new(id, TxTimestamp::now(), self.world.clone()).registered(registration)
    }

    pub async fn commit(&self, txn: MemoryTransaction) -> Result<CommitReceipt> {
        let tx_id = txn.id().clone();
        if !lock_active(&self.active_ids).remove(&tx_id) {
            return Err(LedgerError::Storage(StorageError::Inactive(tx_id.to_string())));
        }

        if !txn.state().is_active() {
            event!(Level::WARN, tx_id = %tx_id, "commit of cancelled transaction refused");
            return Err(LedgerError::Storage(StorageError::Cancelled(tx_id.to_string())));
        }

        let timestamp = txn.timestamp();
        let (writes, events) = txn.into_effects();
        let receipt = CommitReceipt {
            tx_id: tx_id.clone(),
            timestamp,
            write_count: writes.len(),
            event_count: events.len(),
        };

        {
            let _serial = self.commit_lock.lock().await;
            self.world.apply(tx_id.as_str(), timestamp, writes).await;
            self.bus.publish(events);
            let mut version = self.global_version.write().await;
            *version += 1;
        }

        event!(
            Level::DEBUG,
            tx_id = %tx_id,
            writes = receipt.write_count,
            events = receipt.event_count,
            "transaction committed"
        );
        Ok(receipt)
    }

    /// Discard every buffered write and event.
    pub async fn rollback(&self, txn: MemoryTransaction) -> Result<()> {
        let tx_id = txn.id().clone();
        if !lock_active(&self.active_ids).remove(&tx_id) {
            return Err(LedgerError::Storage(StorageError::Inactive(tx_id.to_string())));
        }
        event!(
            Level::DEBUG,
            tx_id = %tx_id,
            discarded = txn.changes().len(),
            "transaction rolled back"
        );
        Ok(())
    }

    /// Administrative delete of `key`, serialized with commits so the
    /// tombstone lands between two committed transactions.
    pub async fn purge(&self, key: &str) -> bool {
        let tx_id = TransactionId::new();
        let _serial = self.commit_lock.lock().await;
        let removed = self.world.purge(key, tx_id.as_str(), TxTimestamp::now()).await;
        if removed {
            *self.global_version.write().await += 1;
            event!(Level::WARN, tx_id = %tx_id, key = %key, "key purged");
        }
        removed
    }

    pub fn active_count(&self) -> usize {
        lock_active(&self.active_ids).len()
    }

    pub fn is_active(&self, tx_id: &TransactionId) -> bool {
        lock_active(&self.active_ids).contains(tx_id)
    }

    /// Number of committed transactions.
    pub async fn version(&self) -> u64 {
        *self.global_version.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventSink;
    use crate::storage::StateStore;

    fn manager() -> (TransactionManager, Arc<WorldState>, Arc<EventBus>) {
        let world = Arc::new(WorldState::new());
        let bus = Arc::new(EventBus::new(16));
        (
            TransactionManager::new(world.clone(), bus.clone()),
            world,
            bus,
        )
    }

    #[tokio::test]
    async fn test_commit_applies_writes_and_events() {
        let (tm, world, bus) = manager();
        let mut sub = bus.subscribe();

        let mut txn = tm.begin().await;
        txn.put_state("a", b"1".to_vec()).await.unwrap();
        txn.set_event("pkS", b"Send:a".to_vec()).await.unwrap();
        let receipt = tm.commit(txn).await.unwrap();

        assert_eq!(receipt.write_count, 1);
        assert_eq!(receipt.event_count, 1);
        assert_eq!(world.get("a").await, Some(b"1".to_vec()));
        assert_eq!(world.history("a").await[0].tx_id, receipt.tx_id.as_str());
        assert_eq!(sub.drain().len(), 1);
        assert_eq!(tm.version().await, 1);
        assert_eq!(tm.active_count(), 0);
    }

    #[tokio::test]
    async fn test_rollback_discards_everything() {
        let (tm, world, bus) = manager();
        let mut sub = bus.subscribe();

        let mut txn = tm.begin().await;
        txn.put_state("a", b"1".to_vec()).await.unwrap();
        txn.set_event("pkS", b"Send:a".to_vec()).await.unwrap();
        tm.rollback(txn).await.unwrap();

        assert!(world.get("a").await.is_none());
        assert!(sub.drain().is_empty());
        assert_eq!(tm.version().await, 0);
    }

    #[tokio::test]
    async fn test_cancelled_transaction_cannot_commit() {
        let (tm, world, _) = manager();

        let mut txn = tm.begin().await;
        txn.put_state("a", b"1".to_vec()).await.unwrap();
        txn.cancel();

        let err = tm.commit(txn).await.unwrap_err();
        assert!(matches!(err, LedgerError::Storage(StorageError::Cancelled(_))));
        assert!(world.get("a").await.is_none());
        assert_eq!(tm.active_count(), 0);
    }

    #[tokio::test]
    async fn test_foreign_transaction_rejected() {
        let (tm, _, _) = manager();
        let (other, _, _) = manager();

        let txn = other.begin().await;
        assert!(tm.commit(txn).await.is_err());
        assert_eq!(other.active_count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_transaction_leaves_active_set() {
        let (tm, world, _) = manager();

        let mut txn = tm.begin().await;
        let tx_id = txn.id().clone();
        txn.put_state("a", b"1".to_vec()).await.unwrap();
        assert!(tm.is_active(&tx_id));
        drop(txn);

        assert!(!tm.is_active(&tx_id));
        assert_eq!(tm.active_count(), 0);
        assert!(world.get("a").await.is_none());

        for _ in 0..3 {
            let _abandoned = tm.begin().await;
        }
        let kept = tm.begin().await;
        assert_eq!(tm.active_count(), 1);
        tm.rollback(kept).await.unwrap();
        assert_eq!(tm.active_count(), 0);
    }

    #[tokio::test]
    async fn test_purge_records_tombstone() {
        let (tm, world, _) = manager();

        let mut txn = tm.begin().await;
        txn.put_state("a", b"1".to_vec()).await.unwrap();
        tm.commit(txn).await.unwrap();

        assert!(tm.purge("a").await);
        assert!(!tm.purge("a").await);

        let history = world.history("a").await;
        assert_eq!(history.len(), 2);
        assert!(history[1].is_delete);
        assert!(history[1].value.is_empty());
        assert_eq!(tm.version().await, 2);
    }
}
