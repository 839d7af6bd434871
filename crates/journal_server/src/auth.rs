//! Authentication support for the journal server.
//!
//! This module provides bearer tokens signed with HMAC-SHA256. Tokens
//! include a timestamp for expiration checking.
//!
//! ## Token Format
//!
//! `<user_id>.<issued_at_millis>.<hex signature>`
//!
//! The signature covers `<user_id>.<issued_at_millis>`. User ids must not
//! contain `.`.

use crate::error::{ServerError, ServerResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key for HMAC.
    pub secret: Vec<u8>,
    /// Token expiration duration.
    pub token_expiry: Duration,
}

impl AuthConfig {
    /// Creates a new auth configuration.
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret,
            token_expiry: Duration::from_secs(24 * 60 * 60),
        }
    }

    /// Sets the token expiration duration.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.token_expiry = expiry;
        self
    }
}

/// Issues and validates bearer tokens.
#[derive(Clone)]
pub struct TokenValidator {
    config: AuthConfig,
}

impl TokenValidator {
    /// Creates a new token validator.
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Creates a token for `user_id`, issued now.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidRequest`] for empty user ids or ids
    /// containing `.`.
    pub fn create_token(&self, user_id: &str) -> ServerResult<String> {
        self.create_token_at(user_id, now_millis())
    }

    /// Creates a token for `user_id` as if issued at `issued_at` (Unix millis).
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_token`].
    pub fn create_token_at(&self, user_id: &str, issued_at: u64) -> ServerResult<String> {
        if user_id.is_empty() || user_id.contains('.') {
            return Err(ServerError::InvalidRequest(format!(
                "user id {user_id:?} cannot be encoded in a token"
            )));
        }
        let claims = format!("{user_id}.{issued_at}");
        let signature = hex::encode(self.mac(&claims)?.finalize().into_bytes());
        Ok(format!("{claims}.{signature}"))
    }

    /// Validates a token and returns the user id it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotAuthorized`] for malformed, tampered or
    /// expired tokens.
    pub fn validate(&self, token: &str) -> ServerResult<String> {
        let mut parts = token.rsplitn(3, '.');
        let (Some(signature), Some(issued_at), Some(user_id)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(ServerError::NotAuthorized("malformed token".into()));
        };

        let signature = hex::decode(signature)
            .map_err(|_| ServerError::NotAuthorized("malformed token signature".into()))?;
        self.mac(&format!("{user_id}.{issued_at}"))?
            .verify_slice(&signature)
            .map_err(|_| ServerError::NotAuthorized("invalid signature".into()))?;

        let issued_at: u64 = issued_at
            .parse()
            .map_err(|_| ServerError::NotAuthorized("malformed token timestamp".into()))?;
        let expiry_millis = u64::try_from(self.config.token_expiry.as_millis()).unwrap_or(u64::MAX);
        if now_millis() > issued_at.saturating_add(expiry_millis) {
            return Err(ServerError::NotAuthorized("token expired".into()));
        }

        Ok(user_id.to_string())
    }

    fn mac(&self, claims: &str) -> ServerResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.config.secret)
            .map_err(|e| ServerError::Internal(format!("invalid HMAC key: {e}")))?;
        mac.update(claims.as_bytes());
        Ok(mac)
    }
}

fn now_millis() -> u64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    u64::try_from(millis).unwrap_or(u64::MAX)
}
