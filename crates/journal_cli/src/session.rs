//! Opening the cache and sync sessions from command-line options.

use crate::client::ReqwestClient;
use clap::Args;
use journal_core::{CacheConfig, LocalCache};
use journal_storage::DirectoryMedium;
use journal_sync::{HttpRemote, Principal, StaticAuth, SyncConfig, SyncCoordinator};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Sync session over the directory cache.
pub type Session = SyncCoordinator<DirectoryMedium, HttpRemote<ReqwestClient>, StaticAuth>;

/// Remote service options.
#[derive(Args, Debug, Clone, Default)]
pub struct RemoteArgs {
    /// Base URL of the journal service
    #[arg(long)]
    pub server: Option<String>,

    /// User id of the signed-in principal
    #[arg(long)]
    pub user: Option<String>,

    /// Bearer token of the signed-in principal
    #[arg(long)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,
}

impl RemoteArgs {
    /// The principal, when a server, user and token are all given.
    pub fn principal(&self) -> Option<Principal> {
        match (&self.server, &self.user, &self.token) {
            (Some(_), Some(user), Some(token)) => Some(Principal::new(user, token)),
            _ => None,
        }
    }
}

/// Opens the cache stored under `path`.
pub fn open_cache(path: &Path) -> Result<LocalCache<DirectoryMedium>, Box<dyn std::error::Error>> {
    let medium = DirectoryMedium::open(path)?;
    Ok(LocalCache::open(medium, CacheConfig::default())?)
}

/// Opens a sync session. Without a complete principal the session is
/// signed out and works against the cache only.
pub fn open_session(
    path: &Path,
    remote: &RemoteArgs,
    config: SyncConfig,
) -> Result<Session, Box<dyn std::error::Error>> {
    let cache = open_cache(path)?;
    debug!(
        path = %path.display(),
        server = remote.server.as_deref().unwrap_or("-"),
        signed_in = remote.principal().is_some(),
        "opening sync session"
    );
    let auth = match remote.principal() {
        Some(principal) => StaticAuth::signed_in(principal),
        None => StaticAuth::signed_out(),
    };
    let client = ReqwestClient::new(Duration::from_secs(remote.timeout))?;
    let base_url = remote.server.clone().unwrap_or_default();
    Ok(SyncCoordinator::open(
        cache,
        HttpRemote::new(base_url, client),
        auth,
        config,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_needs_all_parts() {
        let mut args = RemoteArgs {
            server: Some("http://localhost:8080".into()),
            user: Some("alice".into()),
            ..RemoteArgs::default()
        };
        assert!(args.principal().is_none());

        args.token = Some("t".into());
        assert_eq!(args.principal().unwrap().user_id(), "alice");

        args.server = None;
        assert!(args.principal().is_none());
    }
}
