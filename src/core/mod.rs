pub mod error;
pub mod types;

pub use error::{ErrorKind, ErrorRecord, EventError, LedgerError, Result, StorageError};
pub use types::{KeyModification, KeyValue, TxTimestamp};
