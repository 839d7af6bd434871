//! Authentication seam.
//!
//! The coordinator never signs users in. It asks an [`AuthProvider`] for the
//! current principal before each remote call and treats `None` as
//! unauthenticated.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// An authenticated user together with the bearer token the remote service
/// accepts for them.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: String,
    access_token: String,
}

impl Principal {
    /// Creates a principal.
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: access_token.into(),
        }
    }

    /// The user the principal stands for.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Bearer token sent to the remote service.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Source of the current principal.
pub trait AuthProvider: Send + Sync {
    /// Returns the signed-in principal, or `None`.
    fn current_principal(&self) -> Option<Principal>;
}

impl<A: AuthProvider + ?Sized> AuthProvider for Arc<A> {
    fn current_principal(&self) -> Option<Principal> {
        (**self).current_principal()
    }
}

/// An auth provider holding a principal set by the caller.
#[derive(Debug, Default)]
pub struct StaticAuth {
    principal: RwLock<Option<Principal>>,
}

impl StaticAuth {
    /// Creates a provider with no principal.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Creates a provider already signed in.
    pub fn signed_in(principal: Principal) -> Self {
        Self {
            principal: RwLock::new(Some(principal)),
        }
    }

    /// Replaces the current principal.
    pub fn sign_in(&self, principal: Principal) {
        *self.principal.write() = Some(principal);
    }

    /// Clears the current principal.
    pub fn sign_out(&self) {
        *self.principal.write() = None;
    }
}

impl AuthProvider for StaticAuth {
    fn current_principal(&self) -> Option<Principal> {
        self.principal.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_and_out() {
        let auth = StaticAuth::signed_out();
        assert!(auth.current_principal().is_none());

        auth.sign_in(Principal::new("user-1", "token"));
        assert_eq!(auth.current_principal().unwrap().user_id(), "user-1");

        auth.sign_out();
        assert!(auth.current_principal().is_none());
    }

    #[test]
    fn shared_provider() {
        let auth = Arc::new(StaticAuth::signed_in(Principal::new("u", "t")));
        let shared: Arc<StaticAuth> = Arc::clone(&auth);
        auth.sign_out();
        assert!(shared.current_principal().is_none());
    }

    #[test]
    fn debug_hides_token() {
        let principal = Principal::new("user-1", "secret-token");
        let rendered = format!("{principal:?}");
        assert!(rendered.contains("user-1"));
        assert!(!rendered.contains("secret-token"));
    }
}
