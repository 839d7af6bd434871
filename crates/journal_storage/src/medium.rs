//! Storage medium trait definition.

use crate::error::StorageResult;

/// A durable string-keyed, string-valued map.
///
/// Media are **opaque value stores**. The journal cache decides what the
/// keys mean and how values are encoded.
///
/// # Invariants
///
/// - `get` returns exactly the value last passed to `set` for that key
/// - `remove` of an absent key succeeds
/// - a failed `set` leaves the previous value (if any) in place
/// - `flush` makes every successful `set`/`remove` durable
///
/// # Implementors
///
/// - [`super::InMemoryMedium`] - For testing
/// - [`super::DirectoryMedium`] - For persistent storage
pub trait StorageMedium: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value exists but cannot be read.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::QuotaExceeded`] when the medium is full,
    /// or an I/O error.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes the value stored under `key`. Absent keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn remove(&mut self, key: &str) -> StorageResult<()>;

    /// Lists every key that starts with `prefix`, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the key listing cannot be read.
    fn keys(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Flushes pending writes to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&mut self) -> StorageResult<()>;
}

impl<M: StorageMedium + ?Sized> StorageMedium for Box<M> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        (**self).keys(prefix)
    }

    fn flush(&mut self) -> StorageResult<()> {
        (**self).flush()
    }
}
