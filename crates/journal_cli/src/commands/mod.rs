//! CLI command implementations.

pub mod add;
pub mod delete;
pub mod evict;
pub mod inspect;
pub mod list;
pub mod pending;
pub mod sync;
pub mod verify;

use journal_core::JournalEntry;

/// One-line rendering shared by the listing commands.
pub(crate) fn entry_line(entry: &JournalEntry) -> String {
    let marker = if entry.pending { "*" } else { " " };
    let tags = if entry.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", entry.tags.join(", "))
    };
    format!(
        "{marker} {:<24} {}  {}{tags}",
        entry.id.to_string(),
        entry.created_at.format("%Y-%m-%d %H:%M"),
        first_line(&entry.content),
    )
}

fn first_line(content: &str) -> &str {
    content.lines().next().unwrap_or("")
}
