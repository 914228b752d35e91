// ============================================================================
// Transaction Management Module
// ============================================================================
//
// One operation runs inside one transaction. Its writes and events are
// buffered (command pattern) and become visible together on commit, or are
// dropped together on rollback.
//
// ============================================================================

pub mod change;
pub mod context;
pub mod manager;
pub mod state;

pub use change::Change;
pub use context::{FaultPlan, MemoryTransaction, TransactionContext};
pub use manager::{CommitReceipt, TransactionManager};
pub use state::{TransactionId, TransactionState};
