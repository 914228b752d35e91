use crate::core::{KeyModification, KeyValue, StorageError};
use async_trait::async_trait;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Cursor over a key range, as handed out by the host.
///
/// Callers must `close()` it once done; [`ResultsScan`] does that on drop.
pub trait ResultsIterator: Send + Sync {
    fn has_next(&self) -> bool;
    fn next(&mut self) -> StorageResult<KeyValue>;
    fn close(&mut self);
}

/// Cursor over the committed versions of a single key.
pub trait HistoryIterator: Send + Sync {
    fn has_next(&self) -> bool;
    fn next(&mut self) -> StorageResult<KeyModification>;
    fn close(&mut self);
}

/// Key/value state store scoped to one transaction.
///
/// Writes become visible only when the owning transaction commits; a read
/// of a key written earlier in the same transaction may return the old
/// value.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// `Ok(None)` means the key is absent, which is distinct from an empty value.
    async fn get_state(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    async fn put_state(&mut self, key: &str, value: Vec<u8>) -> StorageResult<()>;

    /// Start inclusive, end exclusive. Empty bounds are unbounded, so
    /// `("", "")` yields every key.
    async fn get_state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> StorageResult<Box<dyn ResultsIterator>>;

    async fn get_history_for_key(&self, key: &str) -> StorageResult<Box<dyn HistoryIterator>>;
}

/// Owning guard over a [`ResultsIterator`] that closes it on every exit path.
pub struct ResultsScan {
    inner: Box<dyn ResultsIterator>,
    closed: bool,
}

impl ResultsScan {
    pub fn new(inner: Box<dyn ResultsIterator>) -> Self {
        Self { inner, closed: false }
    }

    pub fn close(&mut self) {
        if !self.closed {
            self.inner.close();
            self.closed = true;
        }
    }
}

impl Iterator for ResultsScan {
    type Item = StorageResult<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed || !self.inner.has_next() {
            return None;
        }
        Some(self.inner.next())
    }
}

impl Drop for ResultsScan {
    fn drop(&mut self) {
        self.close();
    }
}

/// Owning guard over a [`HistoryIterator`] that closes it on every exit path.
pub struct HistoryScan {
    inner: Box<dyn HistoryIterator>,
    closed: bool,
}

impl HistoryScan {
    pub fn new(inner: Box<dyn HistoryIterator>) -> Self {
        Self { inner, closed: false }
    }

    pub fn close(&mut self) {
        if !self.closed {
            self.inner.close();
            self.closed = true;
        }
    }
}

impl Iterator for HistoryScan {
    type Item = StorageResult<KeyModification>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed || !self.inner.has_next() {
            return None;
        }
        Some(self.inner.next())
    }
}

impl Drop for HistoryScan {
    fn drop(&mut self) {
        self.close();
    }
}
