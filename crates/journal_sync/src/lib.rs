//! # Journal Sync
//!
//! Offline-first synchronization of journal entries.
//!
//! This crate provides:
//! - The [`JournalRemote`] seam to the authenticated remote journal service
//! - An HTTP implementation of that seam over a pluggable [`HttpClient`]
//! - The [`SyncCoordinator`], which routes writes and reads between the
//!   remote service and the local cache
//! - Reconciliation of pending entries
//!
//! ## Architecture
//!
//! Every operation tries the remote service first:
//! 1. On success the result is mirrored into the local cache (write-through)
//! 2. When the caller is unauthenticated or the network fails, creates land
//!    in the cache as pending entries and reads are served from the cache
//! 3. [`SyncCoordinator::reconcile`] replays pending entries and swaps each
//!    one for its confirmed server copy
//!
//! ## Key Invariants
//!
//! - Pending entries carry local ids; confirmed entries carry server ids
//! - A confirmed entry is removed locally only after the remote delete succeeds
//! - Updates apply to confirmed entries only
//! - Only one reconciliation runs at a time

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod config;
mod coordinator;
mod error;
mod http;
mod remote;
mod state;

pub use auth::{AuthProvider, Principal, StaticAuth};
pub use config::SyncConfig;
pub use coordinator::SyncCoordinator;
pub use error::{SyncError, SyncResult};
pub use http::{HttpClient, HttpRemote, HttpResponse, LoopbackClient, LoopbackServer};
pub use remote::{FailureKind, JournalRemote, MockRemote, RemoteOp};
pub use state::{ReconcileFailure, ReconcileReport, ReconciledEntry, SyncStats, WriteState};
