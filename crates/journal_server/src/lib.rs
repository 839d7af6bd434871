//! # Journal Server
//!
//! Reference implementation of the remote journal service.
//!
//! This crate provides:
//! - Owner-scoped entry storage with server-issued ids
//! - JSON endpoints for create, update, delete, list and search
//! - Authentication middleware (HMAC-SHA256 bearer tokens)
//!
//! # Authentication
//!
//! With an auth secret configured, every request must carry a token issued
//! by [`TokenValidator::create_token`]:
//!
//! ```rust
//! use journal_server::{AuthConfig, ServerConfig, TokenValidator};
//!
//! let secret = b"my-secure-secret-32-bytes-long!".to_vec();
//! let config = ServerConfig::default().with_auth(secret.clone());
//!
//! let validator = TokenValidator::new(AuthConfig::new(secret));
//! let token = validator.create_token("user-1").unwrap();
//! assert_eq!(validator.validate(&token).unwrap(), "user-1");
//! ```
//!
//! Without a secret the bearer token is taken as the user id, which is
//! convenient for local development and tests.
//!
//! # Transport
//!
//! The server is transport-agnostic. [`JournalServer::handle_post`] takes a
//! path, a bearer token and a JSON body and returns a status code and a JSON
//! body, so it can be mounted behind any HTTP stack or called in-process.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod auth;
mod config;
mod error;
mod handler;
mod server;
mod store;

pub use auth::{AuthConfig, TokenValidator};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{HandlerContext, RequestHandler};
pub use server::JournalServer;
pub use store::EntryStore;
