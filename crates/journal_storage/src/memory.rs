//! In-memory storage medium for testing.

use crate::error::{StorageError, StorageResult};
use crate::medium::StorageMedium;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory storage medium.
///
/// This medium keeps all values in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Sessions that don't need persistence
///
/// An optional quota (in bytes, counting keys and values) makes writes fail
/// the way a full browser storage area does.
///
/// # Example
///
/// ```rust
/// use journal_storage::{InMemoryMedium, StorageMedium};
///
/// let mut medium = InMemoryMedium::with_quota(8);
/// assert!(medium.set("k", "small").is_ok());
/// assert!(medium.set("k2", "much too large").is_err());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryMedium {
    data: RwLock<BTreeMap<String, String>>,
    quota: RwLock<Option<usize>>,
}

impl InMemoryMedium {
    /// Creates a new empty in-memory medium without a quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty medium that rejects writes beyond `limit` bytes.
    #[must_use]
    pub fn with_quota(limit: usize) -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            quota: RwLock::new(Some(limit)),
        }
    }

    /// Creates a medium with pre-existing values.
    ///
    /// Useful for testing reloads and corrupt records.
    #[must_use]
    pub fn with_data(data: BTreeMap<String, String>) -> Self {
        Self {
            data: RwLock::new(data),
            quota: RwLock::new(None),
        }
    }

    /// Returns a copy of every stored key and value.
    #[must_use]
    pub fn data(&self) -> BTreeMap<String, String> {
        self.data.read().clone()
    }

    /// Changes the quota. `None` removes the limit.
    pub fn set_quota(&self, limit: Option<usize>) {
        *self.quota.write() = limit;
    }

    /// Number of bytes currently used by keys and values.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        Self::footprint(&self.data.read())
    }

    fn footprint(data: &BTreeMap<String, String>) -> usize {
        data.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl StorageMedium for InMemoryMedium {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self.data.write();

        if let Some(limit) = *self.quota.read() {
            let replaced = data.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let needed = Self::footprint(&data) - replaced + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        Ok(self
            .data
            .read()
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }

    fn flush(&mut self) -> StorageResult<()> {
        // Nothing is buffered
        Ok(())
    }
}
