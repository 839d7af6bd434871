//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The write would exceed the medium's storage quota.
    #[error("storage quota exceeded writing {key}: {needed} bytes needed, limit {limit}")]
    QuotaExceeded {
        /// The key being written.
        key: String,
        /// Total bytes the medium would hold after the write.
        needed: usize,
        /// The configured limit in bytes.
        limit: usize,
    },

    /// A stored value could not be read back as text.
    #[error("storage corrupted: {0}")]
    Corrupted(String),
}

impl StorageError {
    /// Returns true if the failure is due to the medium running out of space.
    pub fn is_quota(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}
