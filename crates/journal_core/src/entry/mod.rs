//! Journal entries and their identifiers.

mod id;
mod model;

pub use id::{EntryId, LocalIdGenerator, LOCAL_ID_PREFIX};
pub use model::{EntryPatch, JournalEntry, NewEntry};
