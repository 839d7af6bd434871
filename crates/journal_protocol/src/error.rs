//! Protocol errors.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while encoding or decoding messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A message could not be encoded.
    #[error("failed to encode {message}: {source}")]
    Encode {
        /// Message type name.
        message: &'static str,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A message could not be decoded.
    #[error("failed to decode {message}: {source}")]
    Decode {
        /// Message type name.
        message: &'static str,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}
