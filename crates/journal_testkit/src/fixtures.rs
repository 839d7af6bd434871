//! Test fixtures and cache helpers.

use chrono::{DateTime, TimeZone, Utc};
use journal_core::{CacheConfig, EntryId, JournalEntry, LocalCache, NewEntry};
use journal_storage::{DirectoryMedium, InMemoryMedium};
use std::path::Path;
use tempfile::TempDir;

/// Owner used by fixtures that need one.
pub const TEST_OWNER: &str = "test-user";

/// Fixed base time for deterministic fixtures (2024-01-01T00:00:00Z).
pub fn base_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_704_067_200, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// `base_time()` plus `secs` seconds.
pub fn at(secs: i64) -> DateTime<Utc> {
    base_time() + chrono::Duration::seconds(secs)
}

/// A confirmed entry with server id `srv-<n>` created `n` seconds after
/// [`base_time`].
pub fn confirmed_entry(n: u32, content: &str) -> JournalEntry {
    JournalEntry::confirmed(
        EntryId::Server(format!("srv-{n:04}")),
        NewEntry::new(content),
        TEST_OWNER,
        at(i64::from(n)),
    )
}

/// A pending entry with local id `offline_<stamp>` created `stamp` seconds
/// after [`base_time`].
pub fn pending_entry(stamp: u64, content: &str) -> JournalEntry {
    let secs = i64::try_from(stamp).expect("fixture stamp fits in i64");
    JournalEntry::pending(EntryId::Local(stamp), NewEntry::new(content), at(secs))
}

/// Opens an empty in-memory cache.
pub fn memory_cache() -> LocalCache<InMemoryMedium> {
    LocalCache::open(InMemoryMedium::new(), CacheConfig::default())
        .expect("Failed to open in-memory cache")
}

/// A temporary directory holding a directory-backed cache.
///
/// The directory is removed on drop. Opening the cache more than once
/// simulates separate sessions on the same device.
pub struct TempJournalDir {
    dir: TempDir,
}

impl TempJournalDir {
    /// Creates an empty temporary directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Opens a cache over the directory with the default configuration.
    pub fn open_cache(&self) -> LocalCache<DirectoryMedium> {
        self.open_cache_with(CacheConfig::default())
    }

    /// Opens a cache over the directory.
    pub fn open_cache_with(&self, config: CacheConfig) -> LocalCache<DirectoryMedium> {
        let medium = DirectoryMedium::open(self.dir.path()).expect("Failed to open directory medium");
        LocalCache::open(medium, config).expect("Failed to open directory cache")
    }
}

impl Default for TempJournalDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// `count` confirmed entries, oldest first, created one second apart.
    pub fn dated_entries(count: u32) -> Vec<JournalEntry> {
        (1..=count)
            .map(|n| confirmed_entry(n, &format!("entry {n}")))
            .collect()
    }

    /// An in-memory cache holding [`dated_entries`]`(count)`.
    pub fn populated_cache(count: u32) -> LocalCache<InMemoryMedium> {
        let mut cache = memory_cache();
        for entry in dated_entries(count) {
            cache.put(entry).expect("Failed to put entry");
        }
        cache
    }

    /// An in-memory cache with `confirmed` confirmed entries followed by
    /// `pending` pending entries (the pending ones are newer).
    pub fn mixed_cache(confirmed: u32, pending: u64) -> LocalCache<InMemoryMedium> {
        let mut cache = populated_cache(confirmed);
        let first = u64::from(confirmed) + 1;
        for stamp in first..first + pending {
            cache
                .put(pending_entry(stamp, &format!("draft {stamp}")))
                .expect("Failed to put entry");
        }
        cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populated_scenario() {
        let cache = scenarios::populated_cache(5);
        assert_eq!(cache.len(), 5);
        assert_eq!(cache.list_page(0, 1).entries[0].content, "entry 5");
    }

    #[test]
    fn mixed_scenario() {
        let cache = scenarios::mixed_cache(3, 2);
        assert_eq!(cache.len(), 5);
        assert_eq!(cache.pending_count(), 2);
        assert!(cache.list_page(0, 1).entries[0].pending);
    }

    #[test]
    fn temp_dir_reopens() {
        let dir = TempJournalDir::new();
        {
            let mut cache = dir.open_cache();
            cache.put(pending_entry(1, "kept")).unwrap();
            cache.close().unwrap();
        }
        let cache = dir.open_cache();
        assert_eq!(cache.find_pending().len(), 1);
    }
}
