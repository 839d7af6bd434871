//! Listing order index.

use crate::entry::{EntryId, JournalEntry};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::BTreeSet;

/// Sort key: newest first, ties broken by id descending.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct OrderKey {
    created_at: Reverse<DateTime<Utc>>,
    id: Reverse<EntryId>,
}

impl OrderKey {
    fn of(entry: &JournalEntry) -> Self {
        Self {
            created_at: Reverse(entry.created_at),
            id: Reverse(entry.id.clone()),
        }
    }
}

/// Ordered set of entry ids in listing order.
///
/// The index holds one key per cached entry. Callers must remove the old key
/// (via the previous copy of the entry) before inserting a replacement whose
/// `created_at` may differ.
#[derive(Debug, Default)]
pub(crate) struct OrderIndex {
    keys: BTreeSet<OrderKey>,
}

impl OrderIndex {
    pub(crate) fn insert(&mut self, entry: &JournalEntry) {
        self.keys.insert(OrderKey::of(entry));
    }

    pub(crate) fn remove(&mut self, entry: &JournalEntry) {
        self.keys.remove(&OrderKey::of(entry));
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    /// Ids in listing order.
    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = &EntryId> + '_ {
        self.keys.iter().map(|key| &key.id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::NewEntry;
    use chrono::TimeZone;

    fn entry(id: EntryId, secs: i64) -> JournalEntry {
        JournalEntry::pending(id, NewEntry::new("x"), Utc.timestamp_opt(secs, 0).unwrap())
    }

    #[test]
    fn newest_first_with_id_tiebreak() {
        let mut index = OrderIndex::default();
        index.insert(&entry(EntryId::Local(1), 10));
        index.insert(&entry(EntryId::Local(2), 30));
        index.insert(&entry(EntryId::Local(3), 30));
        index.insert(&entry(EntryId::Local(4), 20));

        let order: Vec<_> = index.iter().cloned().collect();
        assert_eq!(
            order,
            vec![
                EntryId::Local(3),
                EntryId::Local(2),
                EntryId::Local(4),
                EntryId::Local(1)
            ]
        );
    }

    #[test]
    fn remove_uses_entry_key() {
        let mut index = OrderIndex::default();
        let e = entry(EntryId::Local(1), 10);
        index.insert(&e);
        assert_eq!(index.len(), 1);
        index.remove(&e);
        assert_eq!(index.len(), 0);
    }
}
