//! Remote journal service abstraction.

use crate::auth::Principal;
use crate::error::{SyncError, SyncResult};
use chrono::Utc;
use journal_core::{EntryId, EntryPatch, JournalEntry, NewEntry};
use journal_protocol::{ListResponse, SearchQuery};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// The authenticated remote journal service.
///
/// Every call is scoped to the principal's entries. Implementations report
/// a missing or rejected principal as [`SyncError::Unauthenticated`], an
/// unreachable service as [`SyncError::NetworkFailure`] and any other
/// rejection as [`SyncError::ServerError`]. They never touch the local cache.
pub trait JournalRemote: Send + Sync {
    /// Creates an entry and returns the authoritative server record.
    fn create_remote(&self, principal: &Principal, entry: &NewEntry) -> SyncResult<JournalEntry>;

    /// Patches an entry and returns the authoritative server record.
    fn update_remote(
        &self,
        principal: &Principal,
        id: &EntryId,
        patch: &EntryPatch,
    ) -> SyncResult<JournalEntry>;

    /// Deletes an entry.
    fn delete_remote(&self, principal: &Principal, id: &EntryId) -> SyncResult<()>;

    /// Lists entries newest first, with the exact total.
    fn list_remote(
        &self,
        principal: &Principal,
        offset: usize,
        limit: usize,
    ) -> SyncResult<ListResponse>;

    /// Searches entries by tags or text, newest first.
    fn search_remote(
        &self,
        principal: &Principal,
        query: &SearchQuery,
    ) -> SyncResult<Vec<JournalEntry>>;
}

impl<R: JournalRemote + ?Sized> JournalRemote for Arc<R> {
    fn create_remote(&self, principal: &Principal, entry: &NewEntry) -> SyncResult<JournalEntry> {
        (**self).create_remote(principal, entry)
    }

    fn update_remote(
        &self,
        principal: &Principal,
        id: &EntryId,
        patch: &EntryPatch,
    ) -> SyncResult<JournalEntry> {
        (**self).update_remote(principal, id, patch)
    }

    fn delete_remote(&self, principal: &Principal, id: &EntryId) -> SyncResult<()> {
        (**self).delete_remote(principal, id)
    }

    fn list_remote(
        &self,
        principal: &Principal,
        offset: usize,
        limit: usize,
    ) -> SyncResult<ListResponse> {
        (**self).list_remote(principal, offset, limit)
    }

    fn search_remote(
        &self,
        principal: &Principal,
        query: &SearchQuery,
    ) -> SyncResult<Vec<JournalEntry>> {
        (**self).search_remote(principal, query)
    }
}

/// Remote operations, used to script [`MockRemote`] failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    /// `create_remote`
    Create,
    /// `update_remote`
    Update,
    /// `delete_remote`
    Delete,
    /// `list_remote`
    List,
    /// `search_remote`
    Search,
}

/// Failure injected into a [`MockRemote`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Fails with [`SyncError::Unauthenticated`].
    Unauthenticated,
    /// Fails with [`SyncError::NetworkFailure`].
    Network,
    /// Fails with [`SyncError::ServerError`].
    Server,
}

impl FailureKind {
    fn into_error(self, op: RemoteOp) -> SyncError {
        match self {
            FailureKind::Unauthenticated => {
                SyncError::Unauthenticated(format!("{op:?} rejected the principal"))
            }
            FailureKind::Network => SyncError::NetworkFailure(format!("{op:?} unreachable")),
            FailureKind::Server => SyncError::server(format!("{op:?} failed")),
        }
    }
}

/// An in-memory remote service for testing.
///
/// Behaves like the real service (owner scoping, newest-first listing,
/// exact totals) and lets tests take it offline or queue one-shot failures
/// per operation.
#[derive(Debug, Default)]
pub struct MockRemote {
    entries: RwLock<Vec<JournalEntry>>,
    next_id: AtomicU64,
    offline: AtomicBool,
    failures: Mutex<HashMap<RemoteOp, VecDeque<FailureKind>>>,
    calls: Mutex<HashMap<RemoteOp, u64>>,
}

impl MockRemote {
    /// Creates an empty, online mock remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether every call fails with a network failure.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Queues a failure for the next call of `op`.
    pub fn fail_next(&self, op: RemoteOp, kind: FailureKind) {
        self.failures.lock().entry(op).or_default().push_back(kind);
    }

    /// Number of times `op` was called, including failed calls.
    pub fn calls(&self, op: RemoteOp) -> u64 {
        self.calls.lock().get(&op).copied().unwrap_or(0)
    }

    /// All stored entries, in insertion order.
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.read().clone()
    }

    /// Stores an entry as if another device had created it.
    pub fn insert(&self, entry: JournalEntry) {
        self.entries.write().push(entry);
    }

    fn begin(&self, op: RemoteOp) -> SyncResult<()> {
        *self.calls.lock().entry(op).or_insert(0) += 1;
        if self.offline.load(Ordering::SeqCst) {
            return Err(FailureKind::Network.into_error(op));
        }
        if let Some(kind) = self
            .failures
            .lock()
            .get_mut(&op)
            .and_then(VecDeque::pop_front)
        {
            return Err(kind.into_error(op));
        }
        Ok(())
    }

    fn owned_newest_first<F>(&self, principal: &Principal, mut keep: F) -> Vec<JournalEntry>
    where
        F: FnMut(&JournalEntry) -> bool,
    {
        let mut owned: Vec<JournalEntry> = self
            .entries
            .read()
            .iter()
            .filter(|e| e.owner.as_deref() == Some(principal.user_id()) && keep(e))
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        owned
    }
}

impl JournalRemote for MockRemote {
    fn create_remote(&self, principal: &Principal, entry: &NewEntry) -> SyncResult<JournalEntry> {
        self.begin(RemoteOp::Create)?;
        if entry.content.trim().is_empty() {
            return Err(SyncError::server("content must not be empty"));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let confirmed = JournalEntry::confirmed(
            EntryId::Server(format!("srv-{n:06}")),
            entry.clone(),
            principal.user_id(),
            Utc::now(),
        );
        self.entries.write().push(confirmed.clone());
        Ok(confirmed)
    }

    fn update_remote(
        &self,
        principal: &Principal,
        id: &EntryId,
        patch: &EntryPatch,
    ) -> SyncResult<JournalEntry> {
        self.begin(RemoteOp::Update)?;
        let mut entries = self.entries.write();
        let entry = entries
            .iter_mut()
            .find(|e| &e.id == id && e.owner.as_deref() == Some(principal.user_id()))
            .ok_or_else(|| SyncError::NotFound(id.to_string()))?;
        patch.apply(entry, Utc::now());
        Ok(entry.clone())
    }

    fn delete_remote(&self, principal: &Principal, id: &EntryId) -> SyncResult<()> {
        self.begin(RemoteOp::Delete)?;
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| !(&e.id == id && e.owner.as_deref() == Some(principal.user_id())));
        if entries.len() == before {
            return Err(SyncError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn list_remote(
        &self,
        principal: &Principal,
        offset: usize,
        limit: usize,
    ) -> SyncResult<ListResponse> {
        self.begin(RemoteOp::List)?;
        let owned = self.owned_newest_first(principal, |_| true);
        let total_count = owned.len();
        let entries = owned.into_iter().skip(offset).take(limit).collect();
        Ok(ListResponse {
            entries,
            total_count,
        })
    }

    fn search_remote(
        &self,
        principal: &Principal,
        query: &SearchQuery,
    ) -> SyncResult<Vec<JournalEntry>> {
        self.begin(RemoteOp::Search)?;
        Ok(match query {
            SearchQuery::Tags(tags) => self.owned_newest_first(principal, |e| e.has_all_tags(tags)),
            SearchQuery::Text(term) => self.owned_newest_first(principal, |e| e.matches_text(term)),
        })
    }
}
