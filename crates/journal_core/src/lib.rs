//! # Journal Core
//!
//! Journal entry model and the local cache store.
//!
//! This crate provides:
//! - [`JournalEntry`] and its two id spaces ([`EntryId`])
//! - Monotonic local id allocation for offline entries
//! - [`LocalCache`], a durable, ordered cache over any [`StorageMedium`]
//! - [`Page`], the uniform page shape shared by cached and remote listings
//!
//! ## Key Invariants
//!
//! - At most one cached copy per entry id
//! - Pending entries always carry local ids
//! - Listing order is `created_at` descending, ties broken by id descending
//! - A failed medium write never rolls back the in-memory cache
//!
//! [`StorageMedium`]: journal_storage::StorageMedium

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
mod config;
pub mod entry;
mod error;
mod page;

pub use cache::{CacheSlice, LocalCache};
pub use config::CacheConfig;
pub use entry::{EntryId, EntryPatch, JournalEntry, LocalIdGenerator, NewEntry, LOCAL_ID_PREFIX};
pub use error::{CoreError, CoreResult};
pub use page::{page_bounds, Page, PageSource};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
