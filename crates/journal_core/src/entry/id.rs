//! Entry identifiers.

use crate::error::{CoreError, CoreResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix of every locally issued id.
pub const LOCAL_ID_PREFIX: &str = "offline_";

/// Identifier of a journal entry.
///
/// Entry ids live in two disjoint spaces:
/// - `Local` ids (`offline_<millis>`) are issued on this device for entries
///   the remote service has not confirmed
/// - `Server` ids are opaque strings issued by the remote service
///
/// A server id can never take the form of a local id, so the two spaces
/// cannot collide.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntryId {
    /// Locally issued id, holding a millisecond timestamp (with tie-break).
    Local(u64),
    /// Server issued id.
    Server(String),
}

impl EntryId {
    /// Creates a server id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidEntryId`] for empty strings and for strings
    /// in the local id space.
    pub fn server(id: impl Into<String>) -> CoreResult<Self> {
        let id = id.into();
        if id.is_empty() || id.starts_with(LOCAL_ID_PREFIX) {
            return Err(CoreError::InvalidEntryId { id });
        }
        Ok(EntryId::Server(id))
    }

    /// Returns true for ids issued on this device.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, EntryId::Local(_))
    }

    /// Returns the timestamp of a local id.
    #[must_use]
    pub fn local_stamp(&self) -> Option<u64> {
        match self {
            EntryId::Local(stamp) => Some(*stamp),
            EntryId::Server(_) => None,
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Local(stamp) => write!(f, "{LOCAL_ID_PREFIX}{stamp}"),
            EntryId::Server(id) => f.write_str(id),
        }
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({self})")
    }
}

impl FromStr for EntryId {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.strip_prefix(LOCAL_ID_PREFIX) {
            Some(stamp) => stamp
                .parse::<u64>()
                .map(EntryId::Local)
                .map_err(|_| CoreError::InvalidEntryId { id: s.to_string() }),
            None => EntryId::server(s),
        }
    }
}

impl TryFrom<String> for EntryId {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        value.parse()
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.to_string()
    }
}

/// Allocates local ids from a monotonic millisecond clock.
///
/// Two allocations within the same millisecond (or after the wall clock
/// stepped backwards) still receive distinct, increasing ids: the generator
/// never hands out a stamp lower than or equal to the last one.
#[derive(Debug, Default)]
pub struct LocalIdGenerator {
    last: AtomicU64,
}

impl LocalIdGenerator {
    /// Creates a generator with no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an id from the current wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LocalIdsExhausted`] once `offline_<u64::MAX>` has
    /// been issued or observed.
    pub fn next_id(&self) -> CoreResult<EntryId> {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_at(now)
    }

    /// Allocates an id as if the clock read `now_millis`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_id`]. No id is ever handed out twice.
    pub fn next_at(&self, now_millis: u64) -> CoreResult<EntryId> {
        let mut last = self.last.load(Ordering::SeqCst);
        loop {
            let floor = last
                .checked_add(1)
                .ok_or(CoreError::LocalIdsExhausted { last })?;
            let candidate = now_millis.max(floor);
            match self
                .last
                .compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return Ok(EntryId::Local(candidate)),
                Err(actual) => last = actual,
            }
        }
    }

    /// Records an id issued earlier so later allocations stay above it.
    pub fn observe(&self, id: &EntryId) {
        if let Some(stamp) = id.local_stamp() {
            self.last.fetch_max(stamp, Ordering::SeqCst);
        }
    }
}
