//! Sync coordinator.
//!
//! Routes every journal operation between the remote service and the local
//! cache. The fallback policy lives here and nowhere else:
//!
//! | operation | remote fails with `Unauthenticated`/`NetworkFailure` | `ServerError` |
//! |-----------|------------------------------------------------------|---------------|
//! | create    | pending entry in the cache                           | error         |
//! | update    | error                                                | error         |
//! | delete    | error, cached copy kept                              | error (`NotFound` removes the cached copy) |
//! | get_page  | cache page                                           | error         |
//! | search    | cache filter                                         | error         |

use crate::auth::{AuthProvider, Principal};
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::remote::JournalRemote;
use crate::state::{ReconcileFailure, ReconcileReport, ReconciledEntry, SyncStats, WriteState};
use chrono::Utc;
use journal_core::{
    page_bounds, CoreError, EntryId, EntryPatch, JournalEntry, LocalCache, LocalIdGenerator,
    NewEntry, Page, PageSource,
};
use journal_protocol::SearchQuery;
use journal_storage::StorageMedium;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Coordinates a session's journal operations across remote and cache.
///
/// The coordinator owns the cache for the lifetime of the session: build it
/// with [`SyncCoordinator::open`] and end it with [`SyncCoordinator::close`],
/// which flushes the cache and hands back its medium.
///
/// # Example
///
/// ```rust
/// use journal_core::{CacheConfig, LocalCache, NewEntry};
/// use journal_storage::InMemoryMedium;
/// use journal_sync::{MockRemote, Principal, StaticAuth, SyncConfig, SyncCoordinator};
///
/// let cache = LocalCache::open(InMemoryMedium::new(), CacheConfig::default()).unwrap();
/// let auth = StaticAuth::signed_out();
/// let coordinator =
///     SyncCoordinator::open(cache, MockRemote::new(), auth, SyncConfig::default()).unwrap();
///
/// // Offline: the entry is kept locally until reconciled.
/// let entry = coordinator.create(NewEntry::new("hello")).unwrap();
/// assert!(entry.pending);
/// assert_eq!(coordinator.pending_count(), 1);
/// ```
pub struct SyncCoordinator<M: StorageMedium, R: JournalRemote, A: AuthProvider> {
    config: SyncConfig,
    cache: Mutex<LocalCache<M>>,
    remote: R,
    auth: A,
    ids: LocalIdGenerator,
    states: RwLock<HashMap<EntryId, WriteState>>,
    stats: RwLock<SyncStats>,
    reconciling: AtomicBool,
}

/// Clears the reconcile flag when a pass ends, including on early return.
struct ReconcileGuard<'a>(&'a AtomicBool);

impl Drop for ReconcileGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<M: StorageMedium, R: JournalRemote, A: AuthProvider> SyncCoordinator<M, R, A> {
    /// Opens a session over an already opened cache.
    ///
    /// Local ids issued from now on sort after every local id in the cache.
    /// With [`SyncConfig::reconcile_on_open`] set and a principal present,
    /// pending entries are reconciled before this returns; failures stay in
    /// the cache for the next pass.
    ///
    /// # Errors
    ///
    /// Returns an error only if the on-open reconciliation cannot start.
    pub fn open(cache: LocalCache<M>, remote: R, auth: A, config: SyncConfig) -> SyncResult<Self> {
        let ids = LocalIdGenerator::new();
        if let Some(stamp) = cache.max_local_stamp() {
            ids.observe(&EntryId::Local(stamp));
        }

        let coordinator = Self {
            config,
            cache: Mutex::new(cache),
            remote,
            auth,
            ids,
            states: RwLock::new(HashMap::new()),
            stats: RwLock::new(SyncStats::default()),
            reconciling: AtomicBool::new(false),
        };

        if coordinator.config.reconcile_on_open && coordinator.auth.current_principal().is_some() {
            let report = coordinator.reconcile()?;
            info!(
                confirmed = report.confirmed.len(),
                failed = report.failed.len(),
                "reconciled pending entries on open"
            );
        }

        Ok(coordinator)
    }

    /// Ends the session, flushing the cache and returning its medium.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Persistence`] if the final flush fails.
    pub fn close(self) -> SyncResult<M> {
        let medium = self.cache.into_inner().close()?;
        debug!("closed journal session");
        Ok(medium)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns a snapshot of the statistics.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Returns the remote service.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Returns the auth provider.
    pub fn auth(&self) -> &A {
        &self.auth
    }

    /// Runs `f` against the cache.
    pub fn with_cache<T>(&self, f: impl FnOnce(&LocalCache<M>) -> T) -> T {
        f(&*self.cache.lock())
    }

    /// Returns the cached copy of an entry.
    pub fn get(&self, id: &EntryId) -> Option<JournalEntry> {
        self.cache.lock().get(id).cloned()
    }

    /// Pending entries, newest first.
    pub fn pending_entries(&self) -> Vec<JournalEntry> {
        self.cache.lock().find_pending()
    }

    /// Number of pending entries.
    pub fn pending_count(&self) -> usize {
        self.cache.lock().pending_count()
    }

    /// Returns true while a reconciliation runs.
    pub fn is_reconciling(&self) -> bool {
        self.reconciling.load(Ordering::SeqCst)
    }

    /// Write state of a cached entry.
    pub fn write_state(&self, id: &EntryId) -> Option<WriteState> {
        let pending = self.cache.lock().get(id)?.pending;
        if !pending {
            return Some(WriteState::Confirmed);
        }
        Some(
            self.states
                .read()
                .get(id)
                .copied()
                .unwrap_or(WriteState::Pending),
        )
    }

    /// Creates an entry.
    ///
    /// Online, the confirmed server copy is written through to the cache and
    /// returned. Without a principal or without a network, the entry is
    /// stored in the cache under a fresh local id with `pending` set, and
    /// that pending entry is returned.
    ///
    /// A failed cache write does not fail the call: the
    /// returned entry is still live in memory, and the failure is counted in
    /// [`SyncStats::persistence_warnings`] with its message in
    /// [`SyncStats::last_error`]. Check [`Self::stats`] to learn whether the
    /// entry will survive a restart.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ServerError`] (or a protocol error) when the
    /// remote service rejects the entry. Nothing is cached in that case.
    /// Returns [`SyncError::Core`] if no local id is left to allocate.
    pub fn create(&self, new: NewEntry) -> SyncResult<JournalEntry> {
        let state = WriteState::Attempting;
        let outcome = match self.auth.current_principal() {
            Some(principal) => self.remote.create_remote(&principal, &new),
            None => Err(SyncError::Unauthenticated("no current principal".into())),
        };

        match outcome {
            Ok(confirmed) => {
                state.transition(WriteState::Confirmed)?;
                self.cache_write("create", |cache| cache.put(confirmed.clone()));
                self.stats.write().creates_confirmed += 1;
                debug!(id = %confirmed.id, "created entry");
                Ok(confirmed)
            }
            Err(err) if err.is_fallback_eligible() => {
                state.transition(WriteState::Pending)?;
                let id = self
                    .ids
                    .next_id()
                    .map_err(|e| self.record_error(e.into()))?;
                let pending = JournalEntry::pending(id, new, Utc::now());
                warn!(id = %pending.id, reason = %err, "remote create unavailable, entry kept pending");
                self.cache_write("create", |cache| cache.put(pending.clone()));
                self.stats.write().creates_pending += 1;
                Ok(pending)
            }
            Err(err) => Err(self.record_error(err)),
        }
    }

    /// Updates a confirmed entry.
    ///
    /// The confirmed copy is written through to the cache; a failed write is
    /// reported through [`Self::stats`] as for [`Self::create`].
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidState`] for pending entries (local ids)
    /// - [`SyncError::Unauthenticated`] without a principal
    /// - any remote failure, unchanged; there is no cache fallback
    pub fn update(&self, id: &EntryId, patch: EntryPatch) -> SyncResult<JournalEntry> {
        if id.is_local() {
            return Err(SyncError::InvalidState {
                id: id.clone(),
                reason: "pending entries cannot be updated until reconciled".into(),
            });
        }
        let principal = self.require_principal()?;

        let updated = self
            .remote
            .update_remote(&principal, id, &patch)
            .map_err(|e| self.record_error(e))?;
        self.cache_write("update", |cache| cache.put(updated.clone()));
        debug!(id = %updated.id, "updated entry");
        Ok(updated)
    }

    /// Deletes an entry.
    ///
    /// A pending entry is deleted from the cache only. A confirmed entry is
    /// deleted remotely first and leaves the cache only after the remote
    /// service confirms. A [`SyncError::NotFound`] reply confirms the entry
    /// is already gone remotely (deleted from another device, say), so the
    /// cached copy is dropped and the call succeeds.
    ///
    /// Failed cache removals are reported through [`Self::stats`].
    ///
    /// # Errors
    ///
    /// For confirmed entries, [`SyncError::Unauthenticated`] without a
    /// principal, or any other remote failure. The cached copy is kept in
    /// both cases.
    pub fn delete(&self, id: &EntryId) -> SyncResult<()> {
        if id.is_local() {
            self.cache_write("delete", |cache| cache.remove(id).map(|_| ()));
            self.states.write().remove(id);
            debug!(id = %id, "deleted pending entry");
            return Ok(());
        }

        let principal = self.require_principal()?;
        match self.remote.delete_remote(&principal, id) {
            Ok(()) => {}
            Err(SyncError::NotFound(_)) => {
                debug!(id = %id, "entry already gone remotely, dropping cached copy");
            }
            Err(err) => {
                warn!(id = %id, error = %err, "remote delete failed, cached copy kept");
                return Err(self.record_error(err));
            }
        }
        self.cache_write("delete", |cache| cache.remove(id).map(|_| ()));
        debug!(id = %id, "deleted entry");
        Ok(())
    }

    /// Replays pending entries against the remote service, oldest first.
    ///
    /// Entries are replayed one at a time in batches of
    /// [`SyncConfig::reconcile_batch_size`], pausing
    /// [`SyncConfig::reconcile_batch_delay`] between batches. Each confirmed
    /// entry is swapped into the cache in place of its pending copy. A failed
    /// replay is recorded in the report and the entry stays pending.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Unauthenticated`] without a principal
    /// - [`SyncError::ReconcileInProgress`] if another pass is running
    pub fn reconcile(&self) -> SyncResult<ReconcileReport> {
        let principal = self.require_principal()?;
        if self
            .reconciling
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SyncError::ReconcileInProgress);
        }
        let _guard = ReconcileGuard(&self.reconciling);

        let start = Instant::now();
        let mut pending = self.cache.lock().find_pending();
        pending.reverse();

        let mut report = ReconcileReport {
            attempted: pending.len(),
            ..ReconcileReport::default()
        };
        if !pending.is_empty() {
            info!(pending = pending.len(), "reconciling pending entries");
        }

        for (batch_index, batch) in pending.chunks(self.config.batch_size()).enumerate() {
            if batch_index > 0 && !self.config.reconcile_batch_delay.is_zero() {
                std::thread::sleep(self.config.reconcile_batch_delay);
            }
            for entry in batch {
                match self.replay(&principal, entry) {
                    Ok(confirmed) => report.confirmed.push(confirmed),
                    Err(error) => {
                        warn!(id = %entry.id, error = %error, "pending entry not reconciled");
                        report.failed.push(ReconcileFailure {
                            id: entry.id.clone(),
                            error,
                        });
                    }
                }
            }
        }

        report.duration = start.elapsed();
        {
            let mut stats = self.stats.write();
            stats.reconcile_passes += 1;
            stats.entries_reconciled += report.confirmed.len() as u64;
            stats.reconcile_failures += report.failed.len() as u64;
            stats.last_reconcile = Some(Instant::now());
            if let Some(failure) = report.failed.last() {
                stats.last_error = Some(failure.error.to_string());
            }
        }
        Ok(report)
    }

    fn replay(&self, principal: &Principal, entry: &JournalEntry) -> SyncResult<ReconciledEntry> {
        let current = self.states.read().get(&entry.id).copied();
        let in_flight = current
            .unwrap_or(WriteState::Pending)
            .transition(WriteState::ReconcileInFlight)?;
        self.states.write().insert(entry.id.clone(), in_flight);

        match self.remote.create_remote(principal, &entry.to_new_entry()) {
            Ok(confirmed) => {
                in_flight.transition(WriteState::Confirmed)?;
                self.states.write().remove(&entry.id);
                let server_id = confirmed.id.clone();
                self.cache_write("reconcile", |cache| cache.swap(&entry.id, confirmed));
                debug!(local = %entry.id, server = %server_id, "reconciled entry");
                Ok(ReconciledEntry {
                    local_id: entry.id.clone(),
                    server_id,
                })
            }
            Err(err) => {
                let failed = in_flight.transition(WriteState::ReconcileFailed)?;
                self.states.write().insert(entry.id.clone(), failed);
                Err(err)
            }
        }
    }

    /// Returns page `page_index` (0-based) of `page_size` entries, newest first.
    ///
    /// With a principal the page comes from the remote service and is
    /// mirrored into the cache. Without one, or when the network fails, the
    /// page is sliced from the cache. A page past the end is empty and still
    /// carries the correct total.
    ///
    /// # Errors
    ///
    /// Returns remote failures other than `Unauthenticated`/`NetworkFailure`.
    pub fn get_page(&self, page_index: usize, page_size: usize) -> SyncResult<Page> {
        let (offset, limit) = page_bounds(page_index, page_size);

        if let Some(principal) = self.auth.current_principal() {
            match self.remote.list_remote(&principal, offset, limit) {
                Ok(listed) => {
                    self.cache_write("mirror", |cache| {
                        let mut first = Ok(());
                        for entry in &listed.entries {
                            let stored = cache.put(entry.clone());
                            if first.is_ok() {
                                first = stored;
                            }
                        }
                        first
                    });
                    return Ok(Page {
                        entries: listed.entries,
                        total_count: listed.total_count,
                        page_index,
                        page_size,
                        source: PageSource::Remote,
                    });
                }
                Err(err) if err.is_fallback_eligible() => self.note_fallback("list", &err),
                Err(err) => return Err(self.record_error(err)),
            }
        }

        let slice = self.cache.lock().list_page(offset, limit);
        Ok(Page {
            entries: slice.entries,
            total_count: slice.total_count,
            page_index,
            page_size,
            source: PageSource::Cache,
        })
    }

    /// Returns page `page_index` using [`SyncConfig::default_page_size`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_page`].
    pub fn page(&self, page_index: usize) -> SyncResult<Page> {
        self.get_page(page_index, self.config.default_page_size)
    }

    /// Entries carrying every tag in `tags`, newest first.
    ///
    /// # Errors
    ///
    /// Returns remote failures other than `Unauthenticated`/`NetworkFailure`.
    pub fn search_by_tags(&self, tags: &[String]) -> SyncResult<Vec<JournalEntry>> {
        self.search(SearchQuery::Tags(tags.to_vec()), |cache| {
            cache.search_tags(tags)
        })
    }

    /// Entries whose content contains `term`, ignoring case, newest first.
    ///
    /// # Errors
    ///
    /// Returns remote failures other than `Unauthenticated`/`NetworkFailure`.
    pub fn search_by_text(&self, term: &str) -> SyncResult<Vec<JournalEntry>> {
        self.search(SearchQuery::Text(term.to_string()), |cache| {
            cache.search_text(term)
        })
    }

    fn search<F>(&self, query: SearchQuery, offline: F) -> SyncResult<Vec<JournalEntry>>
    where
        F: FnOnce(&LocalCache<M>) -> Vec<JournalEntry>,
    {
        if let Some(principal) = self.auth.current_principal() {
            match self.remote.search_remote(&principal, &query) {
                Ok(entries) => return Ok(entries),
                Err(err) if err.is_fallback_eligible() => self.note_fallback("search", &err),
                Err(err) => return Err(self.record_error(err)),
            }
        }
        Ok(offline(&*self.cache.lock()))
    }

    fn require_principal(&self) -> SyncResult<Principal> {
        self.auth
            .current_principal()
            .ok_or_else(|| SyncError::Unauthenticated("no current principal".into()))
    }

    /// Applies a cache write. Persistence failures are logged and counted;
    /// the in-memory cache already reflects the write.
    fn cache_write<F>(&self, op: &'static str, write: F)
    where
        F: FnOnce(&mut LocalCache<M>) -> Result<(), CoreError>,
    {
        if let Err(err) = write(&mut *self.cache.lock()) {
            warn!(op, error = %err, "cache write not persisted");
            let mut stats = self.stats.write();
            stats.persistence_warnings += 1;
            stats.last_error = Some(err.to_string());
        }
    }

    fn note_fallback(&self, op: &'static str, err: &SyncError) {
        debug!(op, reason = %err, "serving from local cache");
        self.stats.write().cache_fallbacks += 1;
    }

    fn record_error(&self, err: SyncError) -> SyncError {
        self.stats.write().last_error = Some(err.to_string());
        err
    }
}
