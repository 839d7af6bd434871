//! Write states, statistics and reconciliation reports.

use crate::error::{SyncError, SyncResult};
use journal_core::EntryId;
use std::time::{Duration, Instant};

/// Where a write stands relative to the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    /// The remote call is in flight.
    Attempting,
    /// The remote service holds the entry.
    Confirmed,
    /// The entry exists only in the local cache.
    Pending,
    /// A reconciliation is replaying the entry.
    ReconcileInFlight,
    /// The last replay failed; the entry is still pending.
    ReconcileFailed,
}

impl WriteState {
    /// Returns true if the entry exists only locally.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            WriteState::Pending | WriteState::ReconcileInFlight | WriteState::ReconcileFailed
        )
    }

    /// Returns true if `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: WriteState) -> bool {
        use WriteState::*;
        matches!(
            (self, next),
            (Attempting, Confirmed)
                | (Attempting, Pending)
                | (Pending, ReconcileInFlight)
                | (ReconcileFailed, ReconcileInFlight)
                | (ReconcileInFlight, Confirmed)
                | (ReconcileInFlight, ReconcileFailed)
        )
    }

    /// Moves to `next`, rejecting illegal transitions.
    pub fn transition(self, next: WriteState) -> SyncResult<WriteState> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(SyncError::InvalidStateTransition {
                from: format!("{self:?}"),
                to: format!("{next:?}"),
            })
        }
    }
}

/// Statistics about coordinator operations.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Creates confirmed by the remote service.
    pub creates_confirmed: u64,
    /// Creates stored as pending entries.
    pub creates_pending: u64,
    /// Reads served from the cache after a remote failure or without a principal.
    pub cache_fallbacks: u64,
    /// Completed reconciliation passes.
    pub reconcile_passes: u64,
    /// Pending entries swapped for confirmed copies.
    pub entries_reconciled: u64,
    /// Failed replays across all passes.
    pub reconcile_failures: u64,
    /// Cache writes that could not be persisted.
    pub persistence_warnings: u64,
    /// Last reconciliation time.
    pub last_reconcile: Option<Instant>,
    /// Last error message.
    pub last_error: Option<String>,
}

/// A pending entry that was confirmed during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledEntry {
    /// Local id the entry had while pending.
    pub local_id: EntryId,
    /// Server id it carries now.
    pub server_id: EntryId,
}

/// A pending entry that could not be replayed.
#[derive(Debug)]
pub struct ReconcileFailure {
    /// Entry that stays pending.
    pub id: EntryId,
    /// Why the replay failed.
    pub error: SyncError,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Pending entries found at the start of the pass.
    pub attempted: usize,
    /// Entries confirmed, oldest first.
    pub confirmed: Vec<ReconciledEntry>,
    /// Entries left pending.
    pub failed: Vec<ReconcileFailure>,
    /// Wall time of the pass.
    pub duration: Duration,
}

impl ReconcileReport {
    /// Returns true if every attempted entry was confirmed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Returns the server id assigned to a local id during this pass.
    pub fn server_id_for(&self, local_id: &EntryId) -> Option<&EntryId> {
        self.confirmed
            .iter()
            .find(|r| &r.local_id == local_id)
            .map(|r| &r.server_id)
    }
}
