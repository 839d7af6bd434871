//! Error types for the journal core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The storage medium rejected a read or write.
    #[error("storage error: {0}")]
    Storage(#[from] journal_storage::StorageError),

    /// An entry could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A string is not a valid entry id.
    #[error("invalid entry id: {id:?}")]
    InvalidEntryId {
        /// The rejected id.
        id: String,
    },

    /// No local id above `last` is left to allocate.
    #[error("local ids exhausted after offline_{last}")]
    LocalIdsExhausted {
        /// Highest stamp already in use.
        last: u64,
    },
}

impl CoreError {
    /// Returns true if the error came from persisting to the storage medium.
    pub fn is_persistence(&self) -> bool {
        matches!(self, CoreError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_storage::StorageError;

    #[test]
    fn storage_errors_are_persistence() {
        let err = CoreError::from(StorageError::QuotaExceeded {
            key: "k".into(),
            needed: 2,
            limit: 1,
        });
        assert!(err.is_persistence());
        assert!(err.to_string().starts_with("storage error"));
    }

    #[test]
    fn invalid_id_display() {
        let err = CoreError::InvalidEntryId { id: String::new() };
        assert!(!err.is_persistence());
        assert!(err.to_string().contains("invalid entry id"));
    }

    #[test]
    fn exhausted_ids_are_not_persistence() {
        let err = CoreError::LocalIdsExhausted { last: u64::MAX };
        assert!(!err.is_persistence());
        assert!(err.to_string().contains("offline_18446744073709551615"));
    }
}
