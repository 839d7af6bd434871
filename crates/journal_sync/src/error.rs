//! Error types for the sync coordinator.

use journal_core::{CoreError, EntryId};
use journal_protocol::ProtocolError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// No principal, or the remote service rejected it.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The remote service could not be reached.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The remote service rejected the request.
    #[error("server error{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    ServerError {
        /// HTTP status, when the transport has one.
        status: Option<u16>,
        /// Reason reported by the server.
        message: String,
    },

    /// The remote service has no such entry for the principal.
    #[error("not found: {0}")]
    NotFound(String),

    /// The local cache could not persist a change.
    #[error("persistence error: {0}")]
    Persistence(#[source] CoreError),

    /// The operation does not apply to the entry in its current state.
    #[error("invalid state for entry {id}: {reason}")]
    InvalidState {
        /// Entry the operation targeted.
        id: EntryId,
        /// Why the operation was refused.
        reason: String,
    },

    /// Invalid write state transition.
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Current state.
        from: String,
        /// Attempted target state.
        to: String,
    },

    /// Another reconciliation is running.
    #[error("reconciliation already in progress")]
    ReconcileInProgress,

    /// A message could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Local cache error other than persistence.
    #[error("cache error: {0}")]
    Core(#[source] CoreError),
}

impl SyncError {
    /// Creates a server error without a status code.
    pub fn server(message: impl Into<String>) -> Self {
        Self::ServerError {
            status: None,
            message: message.into(),
        }
    }

    /// Returns true if the coordinator may fall back to the local cache.
    ///
    /// Only a missing or rejected principal and network failures qualify.
    /// Server errors are hard failures.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            SyncError::Unauthenticated(_) | SyncError::NetworkFailure(_)
        )
    }
}

impl From<CoreError> for SyncError {
    fn from(err: CoreError) -> Self {
        if err.is_persistence() {
            SyncError::Persistence(err)
        } else {
            SyncError::Core(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_storage::StorageError;

    #[test]
    fn fallback_eligibility() {
        assert!(SyncError::Unauthenticated("no session".into()).is_fallback_eligible());
        assert!(SyncError::NetworkFailure("offline".into()).is_fallback_eligible());
        assert!(!SyncError::server("boom").is_fallback_eligible());
        assert!(!SyncError::ReconcileInProgress.is_fallback_eligible());
        assert!(!SyncError::NotFound("srv-1".into()).is_fallback_eligible());
    }

    #[test]
    fn core_errors_split_on_persistence() {
        let quota = CoreError::Storage(StorageError::QuotaExceeded {
            key: "k".into(),
            needed: 10,
            limit: 5,
        });
        assert!(matches!(SyncError::from(quota), SyncError::Persistence(_)));

        let bad_id = CoreError::InvalidEntryId { id: String::new() };
        assert!(matches!(SyncError::from(bad_id), SyncError::Core(_)));
    }

    #[test]
    fn server_error_display() {
        let err = SyncError::ServerError {
            status: Some(422),
            message: "content must not be empty".into(),
        };
        assert_eq!(
            err.to_string(),
            "server error (422): content must not be empty"
        );
        assert_eq!(SyncError::server("down").to_string(), "server error: down");
    }

    #[test]
    fn state_transition_display() {
        let err = SyncError::InvalidStateTransition {
            from: "Pending".into(),
            to: "Confirmed".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid state transition from Pending to Confirmed"
        );
    }
}
