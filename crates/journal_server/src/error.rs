//! Error types for the journal server.

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the journal server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid request format or content.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Missing, malformed or expired credentials.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// The entry does not exist for this user.
    #[error("entry not found: {0}")]
    NotFound(String),

    /// Unknown endpoint.
    #[error("no route for {0}")]
    NoRoute(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::InvalidRequest(_) => 400,
            ServerError::NotAuthorized(_) => 401,
            ServerError::NotFound(_) | ServerError::NoRoute(_) => 404,
            ServerError::Internal(_) => 500,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl From<journal_protocol::ProtocolError> for ServerError {
    fn from(err: journal_protocol::ProtocolError) -> Self {
        ServerError::InvalidRequest(err.to_string())
    }
}
