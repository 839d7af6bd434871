//! # Journal Storage
//!
//! Durable storage media for the journal cache.
//!
//! A storage medium is a **string-keyed, string-valued persistent map**. It
//! does not interpret the values it stores; the journal cache owns the
//! record format.
//!
//! ## Design Principles
//!
//! - Media are simple maps (get, set, remove, prefix scan, flush)
//! - No knowledge of journal entries or their serialization
//! - Must be `Send + Sync` so a session can be moved across threads
//! - A failed write leaves previously stored values untouched
//!
//! ## Available Media
//!
//! - [`InMemoryMedium`] - For tests and ephemeral sessions, with an optional quota
//! - [`DirectoryMedium`] - One file per key inside a directory
//!
//! ## Example
//!
//! ```rust
//! use journal_storage::{InMemoryMedium, StorageMedium};
//!
//! let mut medium = InMemoryMedium::new();
//! medium.set("journal:entry:1", "{}").unwrap();
//! assert_eq!(medium.get("journal:entry:1").unwrap().as_deref(), Some("{}"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod directory;
mod error;
mod medium;
mod memory;

pub use directory::DirectoryMedium;
pub use error::{StorageError, StorageResult};
pub use medium::StorageMedium;
pub use memory::InMemoryMedium;
