//! Protocol messages.

use crate::error::{ProtocolError, ProtocolResult};
use journal_core::{EntryId, EntryPatch, JournalEntry, NewEntry};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Endpoint paths of the remote journal service.
pub mod endpoints {
    /// Create an entry.
    pub const CREATE: &str = "/journal/create";
    /// Update an entry.
    pub const UPDATE: &str = "/journal/update";
    /// Delete an entry.
    pub const DELETE: &str = "/journal/delete";
    /// List a page of entries.
    pub const LIST: &str = "/journal/list";
    /// Search entries by tags or text.
    pub const SEARCH: &str = "/journal/search";
}

/// JSON encoding shared by every message.
pub trait WireMessage: Serialize + DeserializeOwned {
    /// Message name used in error reports.
    const NAME: &'static str;

    /// Encodes to JSON bytes.
    fn encode(&self) -> ProtocolResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|source| ProtocolError::Encode {
            message: Self::NAME,
            source,
        })
    }

    /// Decodes from JSON bytes.
    fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        serde_json::from_slice(bytes).map_err(|source| ProtocolError::Decode {
            message: Self::NAME,
            source,
        })
    }
}

/// Create an entry owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    /// Entry payload.
    pub entry: NewEntry,
}

/// Patch one of the caller's entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Target entry.
    pub id: EntryId,
    /// Fields to change.
    pub patch: EntryPatch,
}

/// Delete one of the caller's entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    /// Target entry.
    pub id: EntryId,
}

/// List the caller's entries, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequest {
    /// Number of entries to skip.
    pub offset: usize,
    /// Maximum number of entries to return.
    pub limit: usize,
}

/// Search variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SearchQuery {
    /// Entries carrying every listed tag.
    Tags(Vec<String>),
    /// Entries whose content contains the term.
    Text(String),
}

/// Search the caller's entries, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// What to search for.
    pub query: SearchQuery,
}

/// The authoritative record after a create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryResponse {
    /// Server copy of the entry.
    pub entry: JournalEntry,
}

/// Outcome of a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Deleted entry.
    pub id: EntryId,
}

/// One page of entries with the exact total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    /// Entries on the page.
    pub entries: Vec<JournalEntry>,
    /// Number of entries the caller owns.
    pub total_count: usize,
}

/// Search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matching entries.
    pub entries: Vec<JournalEntry>,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable reason.
    pub error: String,
}

impl ErrorResponse {
    /// Creates an error body.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl WireMessage for CreateRequest {
    const NAME: &'static str = "create request";
}

impl WireMessage for UpdateRequest {
    const NAME: &'static str = "update request";
}

impl WireMessage for DeleteRequest {
    const NAME: &'static str = "delete request";
}

impl WireMessage for ListRequest {
    const NAME: &'static str = "list request";
}

impl WireMessage for SearchRequest {
    const NAME: &'static str = "search request";
}

impl WireMessage for EntryResponse {
    const NAME: &'static str = "entry response";
}

impl WireMessage for DeleteResponse {
    const NAME: &'static str = "delete response";
}

impl WireMessage for ListResponse {
    const NAME: &'static str = "list response";
}

impl WireMessage for SearchResponse {
    const NAME: &'static str = "search response";
}

impl WireMessage for ErrorResponse {
    const NAME: &'static str = "error response";
}
