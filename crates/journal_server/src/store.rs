//! Owner-scoped entry storage.

use crate::error::{ServerError, ServerResult};
use chrono::{DateTime, Utc};
use journal_core::{EntryId, EntryPatch, JournalEntry, NewEntry};
use journal_protocol::SearchQuery;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Server-side store of journal entries.
///
/// Every operation is scoped to an owner; entries of other owners are
/// invisible to it. Ids are random UUIDs, which never collide with the
/// `offline_` local id space.
#[derive(Debug, Default)]
pub struct EntryStore {
    entries: RwLock<HashMap<EntryId, JournalEntry>>,
}

impl EntryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new entry for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidRequest`] when the content is blank.
    pub fn create(
        &self,
        owner: &str,
        new: NewEntry,
        now: DateTime<Utc>,
    ) -> ServerResult<JournalEntry> {
        if new.content.trim().is_empty() {
            return Err(ServerError::InvalidRequest(
                "content must not be empty".into(),
            ));
        }
        let entry = JournalEntry::confirmed(
            EntryId::Server(Uuid::new_v4().to_string()),
            new,
            owner,
            now,
        );
        self.entries.write().insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    /// Applies `patch` to one of `owner`'s entries.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotFound`] for unknown or foreign entries and
    /// [`ServerError::InvalidRequest`] for a patch blanking the content.
    pub fn update(
        &self,
        owner: &str,
        id: &EntryId,
        patch: &EntryPatch,
        now: DateTime<Utc>,
    ) -> ServerResult<JournalEntry> {
        if patch.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(ServerError::InvalidRequest(
                "content must not be empty".into(),
            ));
        }
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(id)
            .filter(|e| e.owner.as_deref() == Some(owner))
            .ok_or_else(|| ServerError::NotFound(id.to_string()))?;
        patch.apply(entry, now);
        Ok(entry.clone())
    }

    /// Deletes one of `owner`'s entries.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotFound`] for unknown or foreign entries.
    pub fn delete(&self, owner: &str, id: &EntryId) -> ServerResult<JournalEntry> {
        let mut entries = self.entries.write();
        match entries.get(id) {
            Some(e) if e.owner.as_deref() == Some(owner) => entries
                .remove(id)
                .ok_or_else(|| ServerError::NotFound(id.to_string())),
            _ => Err(ServerError::NotFound(id.to_string())),
        }
    }

    /// Returns `owner`'s entries in `[offset, offset + limit)`, newest first,
    /// with the total number of entries the owner has.
    pub fn list(&self, owner: &str, offset: usize, limit: usize) -> (Vec<JournalEntry>, usize) {
        let owned = self.owned(owner, |_| true);
        let total = owned.len();
        (owned.into_iter().skip(offset).take(limit).collect(), total)
    }

    /// Searches `owner`'s entries, newest first.
    pub fn search(&self, owner: &str, query: &SearchQuery) -> Vec<JournalEntry> {
        match query {
            SearchQuery::Tags(tags) => self.owned(owner, |e| e.has_all_tags(tags)),
            SearchQuery::Text(term) => self.owned(owner, |e| e.matches_text(term)),
        }
    }

    /// Number of stored entries across all owners.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn owned<F>(&self, owner: &str, mut keep: F) -> Vec<JournalEntry>
    where
        F: FnMut(&JournalEntry) -> bool,
    {
        let mut owned: Vec<JournalEntry> = self
            .entries
            .read()
            .values()
            .filter(|e| e.owner.as_deref() == Some(owner) && keep(e))
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn create_assigns_uuid() {
        let store = EntryStore::new();
        let entry = store.create("alice", NewEntry::new("hi"), at(0)).unwrap();
        assert!(!entry.id.is_local());
        assert!(Uuid::parse_str(&entry.id.to_string()).is_ok());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn blank_content_is_rejected() {
        let store = EntryStore::new();
        let err = store.create("alice", NewEntry::new(" "), at(0)).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(store.is_empty());
    }

    #[test]
    fn list_is_paged_newest_first() {
        let store = EntryStore::new();
        for i in 0..12 {
            store
                .create("alice", NewEntry::new(format!("entry {i}")), at(i))
                .unwrap();
        }
        store.create("bob", NewEntry::new("other"), at(99)).unwrap();

        let (first, total) = store.list("alice", 0, 5);
        assert_eq!(total, 12);
        assert_eq!(first.len(), 5);
        assert_eq!(first[0].content, "entry 11");

        let (last, _) = store.list("alice", 10, 5);
        assert_eq!(last.len(), 2);

        let (beyond, total) = store.list("alice", 15, 5);
        assert!(beyond.is_empty());
        assert_eq!(total, 12);
    }

    #[test]
    fn foreign_entries_are_not_found() {
        let store = EntryStore::new();
        let entry = store.create("alice", NewEntry::new("mine"), at(0)).unwrap();

        let patch = EntryPatch::new().content("theirs");
        assert!(matches!(
            store.update("bob", &entry.id, &patch, at(1)),
            Err(ServerError::NotFound(_))
        ));
        assert!(store.delete("bob", &entry.id).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_stamps_updated_at() {
        let store = EntryStore::new();
        let entry = store.create("alice", NewEntry::new("v1"), at(0)).unwrap();
        let updated = store
            .update("alice", &entry.id, &EntryPatch::new().content("v2"), at(5))
            .unwrap();
        assert_eq!(updated.content, "v2");
        assert_eq!(updated.created_at, at(0));
        assert_eq!(updated.updated_at, at(5));
    }

    #[test]
    fn search_variants() {
        let store = EntryStore::new();
        store
            .create("alice", NewEntry::new("Quiet morning").with_tags(["calm", "am"]), at(0))
            .unwrap();
        store
            .create("alice", NewEntry::new("busy day").with_tag("work"), at(1))
            .unwrap();

        let calm = store.search("alice", &SearchQuery::Tags(vec!["calm".into(), "am".into()]));
        assert_eq!(calm.len(), 1);
        let text = store.search("alice", &SearchQuery::Text("QUIET".into()));
        assert_eq!(text.len(), 1);
        assert!(store
            .search("bob", &SearchQuery::Text("quiet".into()))
            .is_empty());
    }
}
