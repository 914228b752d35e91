use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by the state store collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Transaction cancelled: {0}")]
    Cancelled(String),

    #[error("Transaction {0} is not active")]
    Inactive(String),
}

/// Failures reported by the event sink collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Event rejected: {0}")]
    Rejected(String),

    #[error("Transaction {0} is not active")]
    Inactive(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{0} does not exist")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Dependent {role} '{key}' could not be loaded")]
    DependentNotFound { role: &'static str, key: String },

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Coarse error taxonomy surfaced to callers of the operation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    StorageError,
    EventError,
    DependentNotFound,
    AlreadyExists,
    InvalidArgument,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            LedgerError::Storage(_) => ErrorKind::StorageError,
            LedgerError::Event(_) => ErrorKind::EventError,
            LedgerError::DependentNotFound { .. } => ErrorKind::DependentNotFound,
            LedgerError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            LedgerError::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.into())
    }
}

/// The `{kind, message}` record returned in place of a result when an
/// operation fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&LedgerError> for ErrorRecord {
    fn from(err: &LedgerError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_key() {
        let err = LedgerError::NotFound("pkA".into());
        assert_eq!(err.to_string(), "pkA does not exist");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_storage_error_converts() {
        let err: LedgerError = StorageError::Io("disk gone".into()).into();
        assert_eq!(err.kind(), ErrorKind::StorageError);

        let err: LedgerError = EventError::Rejected("full".into()).into();
        assert_eq!(err.kind(), ErrorKind::EventError);
    }

    #[test]
    fn test_error_record_serializes_kind() {
        let err = LedgerError::DependentNotFound {
            role: "station",
            key: "pkS".into(),
        };
        let record = ErrorRecord::from(&err);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "DependentNotFound");
        assert!(json["message"].as_str().unwrap().contains("pkS"));
    }
}
