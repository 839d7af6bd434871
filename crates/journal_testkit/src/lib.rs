//! # Journal Testkit
//!
//! Test utilities for the journal crates.
//!
//! This crate provides:
//! - Cache fixtures over in-memory and temporary-directory media
//! - Entry builders with fixed timestamps
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use journal_testkit::prelude::*;
//!
//! let cache = scenarios::populated_cache(12);
//! assert_eq!(cache.list_page(10, 5).entries.len(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
