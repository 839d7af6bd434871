//! Uniform page shape for cached and remote listings.

use crate::entry::JournalEntry;
use serde::{Deserialize, Serialize};

/// Where a page's entries came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSource {
    /// Listed by the remote service (and mirrored into the cache).
    Remote,
    /// Read from the local cache.
    Cache,
}

/// One page of entries, newest first.
///
/// A page owns its entries: later writes to the cache or the remote service
/// never change a page that was already returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Entries on this page.
    pub entries: Vec<JournalEntry>,
    /// Total number of entries across all pages.
    pub total_count: usize,
    /// 0-based page index.
    pub page_index: usize,
    /// Requested page size.
    pub page_size: usize,
    /// Source of the entries.
    pub source: PageSource,
}

impl Page {
    /// Number of pages needed for `total_count` entries.
    #[must_use]
    pub fn page_count(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size)
    }

    /// Returns true if a later page holds entries.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page_index.saturating_add(1) < self.page_count()
    }

    /// Returns true if this page holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Converts a 0-based page index into an `(offset, limit)` pair.
///
/// Saturates instead of overflowing on absurd indexes, which then simply
/// land past the end of any result set.
#[must_use]
pub fn page_bounds(page_index: usize, page_size: usize) -> (usize, usize) {
    (page_index.saturating_mul(page_size), page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total_count: usize, page_index: usize, page_size: usize) -> Page {
        Page {
            entries: Vec::new(),
            total_count,
            page_index,
            page_size,
            source: PageSource::Cache,
        }
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page(12, 0, 5).page_count(), 3);
        assert_eq!(page(10, 0, 5).page_count(), 2);
        assert_eq!(page(0, 0, 5).page_count(), 0);
        assert_eq!(page(3, 0, 0).page_count(), 0);
    }

    #[test]
    fn has_next() {
        assert!(page(12, 1, 5).has_next());
        assert!(!page(12, 2, 5).has_next());
        assert!(!page(12, 7, 5).has_next());
    }

    #[test]
    fn bounds() {
        assert_eq!(page_bounds(2, 5), (10, 5));
        assert_eq!(page_bounds(usize::MAX, 2), (usize::MAX, 2));
    }

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PageSource::Remote).unwrap(), "\"remote\"");
    }
}
