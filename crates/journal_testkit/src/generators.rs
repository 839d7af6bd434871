//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random journal data that keeps the
//! entry invariants: pending entries carry local ids and confirmed entries
//! carry server ids.

use crate::fixtures::{at, TEST_OWNER};
use journal_core::{EntryId, JournalEntry, NewEntry};
use proptest::prelude::*;

/// Strategy for generating tags.
pub fn tag_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,8}").expect("Invalid regex")
}

/// Strategy for generating entry payloads with non-empty content.
pub fn new_entry_strategy() -> impl Strategy<Value = NewEntry> {
    (
        prop::string::string_regex("[a-zA-Z0-9 ]{1,40}").expect("Invalid regex"),
        prop::option::of(prop::string::string_regex("[a-z ?]{1,20}").expect("Invalid regex")),
        prop::collection::vec(tag_strategy(), 0..4),
    )
        .prop_filter("content must not be blank", |(content, _, _)| {
            !content.trim().is_empty()
        })
        .prop_map(|(content, prompt, tags)| {
            let entry = NewEntry::new(content).with_prompt(prompt.unwrap_or_default());
            tags.into_iter().fold(entry, |e, tag| e.with_tag(tag))
        })
}

/// Strategy for generating server ids.
pub fn server_id_strategy() -> impl Strategy<Value = EntryId> {
    prop::string::string_regex("[a-f0-9]{8}")
        .expect("Invalid regex")
        .prop_map(EntryId::Server)
}

/// Strategy for generating entries with unique ids and arbitrary creation
/// times, mixing pending and confirmed entries.
pub fn entries_strategy(max: usize) -> impl Strategy<Value = Vec<JournalEntry>> {
    prop::collection::vec(
        (new_entry_strategy(), 0i64..1_000, any::<bool>()),
        0..=max,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (new, secs, pending))| {
                let n = i as u64 + 1;
                if pending {
                    JournalEntry::pending(EntryId::Local(n), new, at(secs))
                } else {
                    JournalEntry::confirmed(
                        EntryId::Server(format!("srv-{n:04}")),
                        new,
                        TEST_OWNER,
                        at(secs),
                    )
                }
            })
            .collect()
    })
}

/// A cache operation for model-based tests.
#[derive(Debug, Clone)]
pub enum CacheOperation {
    /// Put an entry
    Put(JournalEntry),
    /// Remove an entry by id
    Remove(EntryId),
}

/// Strategy for generating a sequence of cache operations over a small id
/// space, so puts replace and removes hit existing entries.
pub fn cache_operations_strategy(len: usize) -> impl Strategy<Value = Vec<CacheOperation>> {
    let op = (0u64..8, any::<bool>(), new_entry_strategy(), 0i64..100).prop_map(
        |(n, remove, new, secs)| {
            let id = if n % 2 == 0 {
                EntryId::Local(n + 1)
            } else {
                EntryId::Server(format!("srv-{n}"))
            };
            if remove {
                CacheOperation::Remove(id)
            } else if id.is_local() {
                CacheOperation::Put(JournalEntry::pending(id, new, at(secs)))
            } else {
                CacheOperation::Put(JournalEntry::confirmed(id, new, TEST_OWNER, at(secs)))
            }
        },
    );
    prop::collection::vec(op, 0..len)
}
