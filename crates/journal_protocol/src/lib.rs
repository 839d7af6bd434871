//! # Journal Protocol
//!
//! JSON wire messages exchanged with the remote journal service.
//!
//! This crate provides:
//! - Request/response messages for create, update, delete, list and search
//! - Endpoint paths
//! - JSON encoding/decoding via [`WireMessage`]
//!
//! This is a pure protocol crate with no I/O operations. Authentication
//! travels out of band as a bearer token.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod messages;

pub use error::{ProtocolError, ProtocolResult};
pub use messages::{
    endpoints, CreateRequest, DeleteRequest, DeleteResponse, EntryResponse, ErrorResponse,
    ListRequest, ListResponse, SearchQuery, SearchRequest, SearchResponse, UpdateRequest,
    WireMessage,
};
