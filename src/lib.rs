// ============================================================================
// Custody Ledger Library
// ============================================================================
//
// Provenance and custody tracking for physical assets observed by IoT
// stations. Participants, stations and assets share one versioned keyspace;
// every mutation runs inside a transaction whose writes and station events
// commit together.
//
// ============================================================================

pub mod config;
pub mod contract;
pub mod core;
pub mod events;
pub mod facade;
pub mod model;
pub mod storage;
pub mod transaction;

// Re-export main types for convenience
pub use config::{AddPolicy, LedgerConfig, UnauthorizedChangePolicy};
pub use contract::{CustodyContract, Operation};
pub use crate::core::{ErrorKind, ErrorRecord, EventError, LedgerError, Result, StorageError, TxTimestamp};
pub use events::{ChaincodeEvent, EventBus, EventSink, EventSubscription, StationCommand};
pub use facade::Ledger;
pub use model::{Asset, HistoryEntry, LedgerEntity, Participant, Station};
pub use storage::{StateStore, WorldState};
pub use transaction::{
    CommitReceipt, FaultPlan, MemoryTransaction, TransactionContext, TransactionManager,
};
