//! Local cache store of journal entries.
//!
//! The cache keeps every entry in memory, ordered for listing, and writes
//! each one through to a [`StorageMedium`] as a JSON record under
//! `<key_prefix><entry id>`.
//!
//! Writes update memory first and then the medium. If the medium rejects
//! the write (for example because its quota is exhausted) the error is
//! returned, but the in-memory state keeps the change so the session stays
//! consistent with what the caller was told.

mod index;

use crate::config::CacheConfig;
use crate::entry::{EntryId, JournalEntry};
use crate::error::{CoreError, CoreResult};
use index::OrderIndex;
use journal_storage::StorageMedium;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A slice of the cache in listing order, plus the size of the whole set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSlice {
    /// Entries in `[offset, offset + limit)`.
    pub entries: Vec<JournalEntry>,
    /// Number of entries in the cache.
    pub total_count: usize,
}

/// Durable, ordered cache of journal entries.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use journal_core::{CacheConfig, EntryId, JournalEntry, LocalCache, NewEntry};
/// use journal_storage::InMemoryMedium;
///
/// let mut cache = LocalCache::open(InMemoryMedium::new(), CacheConfig::default()).unwrap();
/// let entry = JournalEntry::pending(EntryId::Local(1), NewEntry::new("hello"), Utc::now());
/// cache.put(entry).unwrap();
///
/// let slice = cache.list_page(0, 10);
/// assert_eq!(slice.total_count, 1);
/// assert_eq!(cache.find_pending().len(), 1);
/// ```
pub struct LocalCache<M: StorageMedium> {
    medium: M,
    config: CacheConfig,
    entries: HashMap<EntryId, JournalEntry>,
    order: OrderIndex,
    corrupt_keys: Vec<String>,
}

impl<M: StorageMedium> LocalCache<M> {
    /// Opens a cache over `medium`, loading every stored record.
    ///
    /// Malformed records are skipped and reported by [`Self::corrupt_keys`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the medium cannot list its keys.
    pub fn open(medium: M, config: CacheConfig) -> CoreResult<Self> {
        let keys = medium.keys(&config.key_prefix)?;
        let mut cache = Self {
            medium,
            config,
            entries: HashMap::new(),
            order: OrderIndex::default(),
            corrupt_keys: Vec::new(),
        };

        for key in keys {
            match cache.load_record(&key) {
                Ok(entry) => {
                    cache.insert_memory(entry);
                }
                Err(reason) => {
                    warn!(key = %key, reason = %reason, "skipping corrupt cache record");
                    cache.corrupt_keys.push(key);
                }
            }
        }

        debug!(
            entries = cache.entries.len(),
            corrupt = cache.corrupt_keys.len(),
            "opened journal cache"
        );
        Ok(cache)
    }

    fn load_record(&self, key: &str) -> Result<JournalEntry, String> {
        let raw = self
            .medium
            .get(key)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "record vanished during load".to_string())?;
        let entry: JournalEntry = serde_json::from_str(&raw).map_err(|e| e.to_string())?;

        if self.key_for(&entry.id) != key {
            return Err(format!("record holds id {}", entry.id));
        }
        if entry.pending != entry.id.is_local() {
            return Err(format!(
                "pending flag {} does not match id space of {}",
                entry.pending, entry.id
            ));
        }
        Ok(entry)
    }

    fn key_for(&self, id: &EntryId) -> String {
        format!("{}{}", self.config.key_prefix, id)
    }

    fn insert_memory(&mut self, entry: JournalEntry) -> Option<JournalEntry> {
        let previous = self.entries.remove(&entry.id);
        if let Some(prev) = &previous {
            self.order.remove(prev);
        }
        self.order.insert(&entry);
        self.entries.insert(entry.id.clone(), entry);
        previous
    }

    /// Inserts `entry`, replacing any cached entry with the same id.
    ///
    /// Confirmed writes may evict the oldest confirmed entries when
    /// [`CacheConfig::max_confirmed`] is set.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if the medium rejected the write. The
    /// entry is cached in memory regardless.
    pub fn put(&mut self, entry: JournalEntry) -> CoreResult<()> {
        let json = serde_json::to_string(&entry)?;
        let key = self.key_for(&entry.id);
        let confirmed = !entry.pending;

        self.insert_memory(entry);
        let persisted = self.medium.set(&key, &json).map_err(CoreError::from);

        let evicted = match (confirmed, self.config.max_confirmed) {
            (true, Some(limit)) => self.evict_confirmed(limit).map(|_| ()),
            _ => Ok(()),
        };
        persisted.and(evicted)
    }

    /// Removes the entry with `id`. Absent ids are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if the medium could not delete the
    /// record. The entry is gone from memory regardless.
    pub fn remove(&mut self, id: &EntryId) -> CoreResult<Option<JournalEntry>> {
        let previous = self.entries.remove(id);
        if let Some(prev) = &previous {
            self.order.remove(prev);
        }
        self.medium.remove(&self.key_for(id))?;
        Ok(previous)
    }

    /// Replaces a pending entry by its confirmed server copy.
    ///
    /// The pending record is removed before the confirmed one is written, so
    /// an interruption in between loses only the cached copy of a record the
    /// server already holds.
    ///
    /// # Errors
    ///
    /// Returns the first persistence error. Both steps are always attempted
    /// and memory reflects the swap.
    pub fn swap(&mut self, pending_id: &EntryId, confirmed: JournalEntry) -> CoreResult<()> {
        let removed = self.remove(pending_id).map(|_| ());
        let stored = self.put(confirmed);
        removed.and(stored)
    }

    /// Evicts the oldest confirmed entries beyond `keep`.
    ///
    /// Pending entries are never evicted.
    ///
    /// # Errors
    ///
    /// Returns the first persistence error; eviction continues past it.
    pub fn evict_confirmed(&mut self, keep: usize) -> CoreResult<Vec<EntryId>> {
        let victims: Vec<EntryId> = self
            .list_all()
            .filter(|entry| !entry.pending)
            .skip(keep)
            .map(|entry| entry.id.clone())
            .collect();

        let mut first_error = None;
        for id in &victims {
            if let Err(e) = self.remove(id) {
                first_error.get_or_insert(e);
            }
        }

        if !victims.is_empty() {
            debug!(evicted = victims.len(), keep, "evicted confirmed entries");
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(victims),
        }
    }

    /// Gets a cached entry.
    #[must_use]
    pub fn get(&self, id: &EntryId) -> Option<&JournalEntry> {
        self.entries.get(id)
    }

    /// Returns true if an entry with `id` is cached.
    #[must_use]
    pub fn contains(&self, id: &EntryId) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `[offset, offset + limit)` in listing order.
    ///
    /// An offset past the end yields an empty slice with the correct total.
    #[must_use]
    pub fn list_page(&self, offset: usize, limit: usize) -> CacheSlice {
        let entries = self
            .list_all()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        CacheSlice {
            entries,
            total_count: self.order.len(),
        }
    }

    /// All entries in listing order.
    ///
    /// The iterator is lazy and can be restarted by calling this again.
    pub fn list_all(&self) -> impl DoubleEndedIterator<Item = &JournalEntry> + '_ {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Entries not yet confirmed by the remote service, newest first.
    #[must_use]
    pub fn find_pending(&self) -> Vec<JournalEntry> {
        self.filter(|entry| entry.pending)
    }

    /// Number of pending entries.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.entries.values().filter(|e| e.pending).count()
    }

    /// Entries matching `predicate`, in listing order.
    pub fn filter<F>(&self, mut predicate: F) -> Vec<JournalEntry>
    where
        F: FnMut(&JournalEntry) -> bool,
    {
        self.list_all().filter(|e| predicate(*e)).cloned().collect()
    }

    /// Entries carrying every tag in `tags`.
    #[must_use]
    pub fn search_tags(&self, tags: &[String]) -> Vec<JournalEntry> {
        self.filter(|entry| entry.has_all_tags(tags))
    }

    /// Entries whose content contains `term`, ignoring case.
    #[must_use]
    pub fn search_text(&self, term: &str) -> Vec<JournalEntry> {
        self.filter(|entry| entry.matches_text(term))
    }

    /// Highest local id stamp in the cache.
    #[must_use]
    pub fn max_local_stamp(&self) -> Option<u64> {
        self.entries.keys().filter_map(EntryId::local_stamp).max()
    }

    /// Keys skipped as corrupt when the cache was opened.
    #[must_use]
    pub fn corrupt_keys(&self) -> &[String] {
        &self.corrupt_keys
    }

    /// Deletes corrupt records from the medium and returns how many went.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium refuses a deletion; records not yet
    /// deleted stay listed.
    pub fn purge_corrupt(&mut self) -> CoreResult<usize> {
        let mut purged = 0;
        while let Some(key) = self.corrupt_keys.last() {
            self.medium.remove(key)?;
            self.corrupt_keys.pop();
            purged += 1;
        }
        Ok(purged)
    }

    /// Returns the cache configuration.
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the underlying medium.
    #[must_use]
    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Flushes the medium.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot flush.
    pub fn flush(&mut self) -> CoreResult<()> {
        self.medium.flush()?;
        Ok(())
    }

    /// Flushes and closes the cache, handing back the medium.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    pub fn close(mut self) -> CoreResult<M> {
        self.flush()?;
        Ok(self.medium)
    }
}
