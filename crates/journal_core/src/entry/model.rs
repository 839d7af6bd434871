//! Journal entry records.

use crate::entry::EntryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A journal entry, either confirmed by the remote service or pending locally.
///
/// Equality treats `tags` as a set: two entries whose tags differ only in
/// order are equal. Rendering keeps insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Entry identifier.
    pub id: EntryId,
    /// Text body.
    pub content: String,
    /// Prompt the entry answers.
    #[serde(default)]
    pub prompt: String,
    /// Tags in insertion order.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Owning principal; `None` until the remote service confirms the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// True while the entry exists only in the local cache.
    #[serde(default)]
    pub pending: bool,
}

impl JournalEntry {
    /// Builds a pending entry under a local id.
    pub fn pending(id: EntryId, new: NewEntry, now: DateTime<Utc>) -> Self {
        debug_assert!(id.is_local(), "pending entries carry local ids");
        Self {
            id,
            content: new.content,
            prompt: new.prompt,
            tags: new.tags,
            created_at: now,
            updated_at: now,
            owner: None,
            pending: true,
        }
    }

    /// Builds a confirmed entry as issued by a remote service.
    pub fn confirmed(
        id: EntryId,
        new: NewEntry,
        owner: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            content: new.content,
            prompt: new.prompt,
            tags: new.tags,
            created_at: now,
            updated_at: now,
            owner: Some(owner.into()),
            pending: false,
        }
    }

    /// The create request that would recreate this entry's payload.
    #[must_use]
    pub fn to_new_entry(&self) -> NewEntry {
        NewEntry {
            content: self.content.clone(),
            prompt: self.prompt.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Returns true if content, prompt and tags (as a set) match.
    #[must_use]
    pub fn same_payload(&self, other: &JournalEntry) -> bool {
        self.content == other.content
            && self.prompt == other.prompt
            && same_tags(&self.tags, &other.tags)
    }

    /// Returns true if the entry carries every tag in `tags`.
    #[must_use]
    pub fn has_all_tags(&self, tags: &[String]) -> bool {
        tags.iter().all(|t| self.tags.contains(t))
    }

    /// Case-insensitive substring match over the content.
    #[must_use]
    pub fn matches_text(&self, term: &str) -> bool {
        self.content.to_lowercase().contains(&term.to_lowercase())
    }
}

impl PartialEq for JournalEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.same_payload(other)
            && self.created_at == other.created_at
            && self.updated_at == other.updated_at
            && self.owner == other.owner
            && self.pending == other.pending
    }
}

impl Eq for JournalEntry {}

fn same_tags(a: &[String], b: &[String]) -> bool {
    let mut a: Vec<&String> = a.iter().collect();
    let mut b: Vec<&String> = b.iter().collect();
    a.sort();
    a.dedup();
    b.sort();
    b.dedup();
    a == b
}

/// Payload of a create request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    /// Text body; callers validate it is non-empty.
    pub content: String,
    /// Prompt the entry answers.
    #[serde(default)]
    pub prompt: String,
    /// Tags in insertion order.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewEntry {
    /// Creates a payload with the given content and no prompt or tags.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Sets the prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Adds a tag, ignoring duplicates.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Replaces the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial update of a confirmed entry. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPatch {
    /// New content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// New tag list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl EntryPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the content.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the prompt.
    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.prompt.is_none() && self.tags.is_none()
    }

    /// Applies the patch and stamps `updated_at`.
    pub fn apply(&self, entry: &mut JournalEntry, now: DateTime<Utc>) {
        if let Some(content) = &self.content {
            entry.content.clone_from(content);
        }
        if let Some(prompt) = &self.prompt {
            entry.prompt.clone_from(prompt);
        }
        if let Some(tags) = &self.tags {
            entry.tags.clone_from(tags);
        }
        entry.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn pending_entry_has_no_owner() {
        let entry = JournalEntry::pending(EntryId::Local(1), NewEntry::new("hello"), at(10));
        assert!(entry.pending);
        assert!(entry.owner.is_none());
        assert_eq!(entry.created_at, entry.updated_at);
        assert_eq!(entry.prompt, "");
        assert!(entry.tags.is_empty());
    }

    #[test]
    fn tag_order_does_not_affect_equality() {
        let a = JournalEntry::confirmed(
            EntryId::Server("s".into()),
            NewEntry::new("x").with_tags(["a", "b"]),
            "u1",
            at(1),
        );
        let mut b = a.clone();
        b.tags = vec!["b".into(), "a".into()];
        assert_eq!(a, b);
        assert_eq!(b.tags, vec!["b", "a"]);
    }

    #[test]
    fn same_payload_ignores_id_and_time() {
        let new = NewEntry::new("body").with_prompt("p").with_tag("t");
        let pending = JournalEntry::pending(EntryId::Local(5), new.clone(), at(1));
        let confirmed = JournalEntry::confirmed(EntryId::Server("s".into()), new, "u", at(9));
        assert!(pending.same_payload(&confirmed));
        assert_ne!(pending, confirmed);
    }

    #[test]
    fn json_shape() {
        let entry = JournalEntry::pending(EntryId::Local(3), NewEntry::new("hi"), at(0));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["id"], "offline_3");
        assert_eq!(value["pending"], true);
        assert_eq!(value["created_at"], "1970-01-01T00:00:00Z");
        assert!(value.get("owner").is_none());
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{"id":"srv","content":"c","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}"#;
        let entry: JournalEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.prompt, "");
        assert!(entry.tags.is_empty());
        assert!(!entry.pending);
    }

    #[test]
    fn with_tag_deduplicates() {
        let new = NewEntry::new("x").with_tag("a").with_tag("a").with_tag("b");
        assert_eq!(new.tags, vec!["a", "b"]);
    }

    #[test]
    fn patch_apply() {
        let mut entry = JournalEntry::confirmed(
            EntryId::Server("s".into()),
            NewEntry::new("old").with_prompt("keep"),
            "u",
            at(1),
        );
        let patch = EntryPatch::new().content("new").tags(["x"]);
        assert!(!patch.is_empty());
        patch.apply(&mut entry, at(5));

        assert_eq!(entry.content, "new");
        assert_eq!(entry.prompt, "keep");
        assert_eq!(entry.tags, vec!["x"]);
        assert_eq!(entry.updated_at, at(5));
        assert_eq!(entry.created_at, at(1));
    }

    #[test]
    fn search_helpers() {
        let entry = JournalEntry::pending(
            EntryId::Local(1),
            NewEntry::new("A Quiet Morning").with_tags(["calm", "home"]),
            at(0),
        );
        assert!(entry.matches_text("quiet"));
        assert!(!entry.matches_text("loud"));
        assert!(entry.has_all_tags(&["calm".into()]));
        assert!(entry.has_all_tags(&[]));
        assert!(!entry.has_all_tags(&["calm".into(), "work".into()]));
    }
}
