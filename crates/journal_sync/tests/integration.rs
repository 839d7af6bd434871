//! Integration tests for the sync coordinator and the reference server.

use journal_core::{CacheConfig, EntryId, LocalCache, NewEntry, PageSource};
use journal_server::{JournalServer, ServerConfig};
use journal_storage::{InMemoryMedium, StorageMedium};
use journal_sync::{
    HttpRemote, HttpResponse, LoopbackClient, LoopbackServer, Principal, StaticAuth, SyncConfig,
    SyncCoordinator, SyncError,
};
use journal_testkit::{memory_cache, scenarios, TempJournalDir};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Routes loopback requests into an in-process server.
struct ServerHandle(Arc<JournalServer>);

impl LoopbackServer for ServerHandle {
    fn handle_post(&self, path: &str, bearer: Option<&str>, body: &[u8]) -> HttpResponse {
        let (status, body) = self.0.handle_post(path, bearer, body);
        HttpResponse::new(status, body)
    }
}

type Remote = Arc<HttpRemote<LoopbackClient<ServerHandle>>>;

struct Setup {
    server: Arc<JournalServer>,
    remote: Remote,
    auth: Arc<StaticAuth>,
}

impl Setup {
    fn new() -> Self {
        Self::with_config(ServerConfig::default().with_auth(b"integration-secret".to_vec()))
    }

    fn with_config(config: ServerConfig) -> Self {
        let server = Arc::new(JournalServer::new(config));
        let client = LoopbackClient::new(ServerHandle(Arc::clone(&server)));
        let remote = Arc::new(HttpRemote::new("http://journal.test", client));
        Self {
            server,
            remote,
            auth: Arc::new(StaticAuth::signed_out()),
        }
    }

    fn sign_in(&self, user: &str) {
        let token = self.server.issue_token(user).unwrap();
        self.auth.sign_in(Principal::new(user, token));
    }

    fn set_online(&self, online: bool) {
        self.remote.client().set_healthy(online);
    }

    fn open<M: StorageMedium>(
        &self,
        cache: LocalCache<M>,
        config: SyncConfig,
    ) -> SyncCoordinator<M, Remote, Arc<StaticAuth>> {
        SyncCoordinator::open(cache, Arc::clone(&self.remote), Arc::clone(&self.auth), config)
            .unwrap()
    }

    fn session(&self) -> SyncCoordinator<InMemoryMedium, Remote, Arc<StaticAuth>> {
        self.open(memory_cache(), fast_config())
    }
}

fn fast_config() -> SyncConfig {
    SyncConfig::new().with_reconcile_batch_delay(Duration::ZERO)
}

#[test]
fn offline_create_then_reconcile() {
    let setup = Setup::new();
    let session = setup.session();

    let pending = session.create(NewEntry::new("hello")).unwrap();
    assert!(pending.pending);
    assert!(pending.id.to_string().starts_with("offline_"));
    assert_eq!(setup.server.entry_count(), 0);

    setup.sign_in("alice");
    let report = session.reconcile().unwrap();
    assert!(report.is_complete());

    let page = session.get_page(0, 10).unwrap();
    assert_eq!(page.source, PageSource::Remote);
    assert_eq!(page.total_count, 1);
    let confirmed = &page.entries[0];
    assert_eq!(confirmed.content, "hello");
    assert_ne!(confirmed.id, pending.id);
    assert_eq!(report.server_id_for(&pending.id), Some(&confirmed.id));
    assert!(session.get(&pending.id).is_none());
    assert_eq!(session.pending_count(), 0);
}

#[test]
fn network_failure_create_then_reconcile() {
    let setup = Setup::new();
    setup.sign_in("alice");
    let session = setup.session();

    setup.set_online(false);
    let pending = session.create(NewEntry::new("on the train")).unwrap();
    assert!(pending.pending);

    setup.set_online(true);
    session.reconcile().unwrap();
    assert_eq!(setup.server.entry_count(), 1);

    // Nothing new pending: a second pass sends nothing.
    let again = session.reconcile().unwrap();
    assert_eq!(again.attempted, 0);
    assert_eq!(setup.server.entry_count(), 1);
}

#[test]
fn pagination_over_remote() {
    let setup = Setup::new();
    setup.sign_in("alice");
    let session = setup.session();
    for i in 0..12 {
        session.create(NewEntry::new(format!("entry {i}"))).unwrap();
    }

    let sizes: Vec<(usize, usize)> = [0, 2, 3]
        .into_iter()
        .map(|index| {
            let page = session.get_page(index, 5).unwrap();
            (page.entries.len(), page.total_count)
        })
        .collect();
    assert_eq!(sizes, vec![(5, 12), (2, 12), (0, 12)]);
}

#[test]
fn pagination_falls_back_to_cache_when_offline() {
    let setup = Setup::new();
    setup.sign_in("alice");
    let session = setup.open(scenarios::populated_cache(12), fast_config());
    setup.set_online(false);

    let page = session.get_page(2, 5).unwrap();
    assert_eq!(page.source, PageSource::Cache);
    assert_eq!((page.entries.len(), page.total_count), (2, 12));
}

#[test]
fn failed_delete_keeps_entry() {
    let setup = Setup::new();
    setup.sign_in("alice");
    let session = setup.session();
    let entry = session.create(NewEntry::new("precious")).unwrap();

    setup.set_online(false);
    let err = session.delete(&entry.id).unwrap_err();
    assert!(matches!(err, SyncError::NetworkFailure(_)));

    let page = session.get_page(0, 10).unwrap();
    assert!(page.entries.iter().any(|e| e.id == entry.id));

    setup.set_online(true);
    session.delete(&entry.id).unwrap();
    assert!(session.get(&entry.id).is_none());
    assert_eq!(setup.server.entry_count(), 0);
}

#[test]
fn delete_after_another_device_deleted() {
    let setup = Setup::new();
    setup.sign_in("alice");
    let phone = setup.session();
    let laptop = setup.session();

    let entry = phone.create(NewEntry::new("shared")).unwrap();
    laptop.get_page(0, 10).unwrap();
    assert!(laptop.get(&entry.id).is_some());

    phone.delete(&entry.id).unwrap();
    laptop.delete(&entry.id).unwrap();
    assert!(laptop.get(&entry.id).is_none());

    setup.set_online(false);
    let page = laptop.get_page(0, 10).unwrap();
    assert_eq!(page.source, PageSource::Cache);
    assert_eq!(page.total_count, 0);
}

#[test]
fn burst_creates_get_distinct_ids() {
    let setup = Setup::new();
    let session = setup.session();

    let ids: HashSet<EntryId> = (0..20)
        .map(|i| session.create(NewEntry::new(format!("burst {i}"))).unwrap().id)
        .collect();
    assert_eq!(ids.len(), 20);
}

#[test]
fn rejected_token_falls_back() {
    let setup = Setup::new();
    setup.auth.sign_in(Principal::new("alice", "forged-token"));
    let session = setup.session();

    let entry = session.create(NewEntry::new("kept locally")).unwrap();
    assert!(entry.pending);

    let report = session.reconcile().unwrap();
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0].error, SyncError::Unauthenticated(_)));
    assert_eq!(session.pending_count(), 1);

    setup.sign_in("alice");
    let report = session.reconcile().unwrap();
    assert!(report.is_complete());
    assert_eq!(setup.server.entry_count(), 1);
}

#[test]
fn blank_content_is_a_server_error() {
    let setup = Setup::new();
    setup.sign_in("alice");
    let session = setup.session();

    let err = session.create(NewEntry::new("   ")).unwrap_err();
    assert!(matches!(err, SyncError::ServerError { status: Some(400), .. }));
    assert!(session.with_cache(|cache| cache.is_empty()));
}

#[test]
fn update_round_trip() {
    let setup = Setup::new();
    setup.sign_in("alice");
    let session = setup.session();
    let entry = session
        .create(NewEntry::new("draft").with_tags(["a", "b"]))
        .unwrap();

    let updated = session
        .update(&entry.id, journal_core::EntryPatch::new().tags(["b", "a"]).content("final"))
        .unwrap();
    assert_eq!(updated.content, "final");
    assert_eq!(updated.tags, vec!["b", "a"]);
    assert!(updated.updated_at >= entry.updated_at);
    assert_eq!(session.get(&entry.id), Some(updated));
}

#[test]
fn search_online_and_offline() {
    let setup = Setup::new();
    setup.sign_in("alice");
    let session = setup.session();
    session
        .create(NewEntry::new("Sunrise run").with_tag("exercise"))
        .unwrap();
    session.create(NewEntry::new("late dinner")).unwrap();

    let online = session.search_by_tags(&["exercise".into()]).unwrap();
    assert_eq!(online.len(), 1);

    setup.set_online(false);
    let offline = session.search_by_text("SUNRISE").unwrap();
    assert_eq!(offline.len(), 1);
    assert_eq!(offline[0].id, online[0].id);
}

#[test]
fn users_do_not_see_each_other() {
    let setup = Setup::new();
    setup.sign_in("alice");
    let alice = setup.session();
    alice.create(NewEntry::new("alice's")).unwrap();

    setup.sign_in("bob");
    let bob = setup.session();
    let page = bob.get_page(0, 10).unwrap();
    assert_eq!(page.total_count, 0);
}

#[test]
fn pending_entries_survive_restart() {
    let dir = TempJournalDir::new();
    let setup = Setup::new();

    let first = setup.open(dir.open_cache(), fast_config());
    let pending = first.create(NewEntry::new("written offline")).unwrap();
    first.close().unwrap();

    setup.sign_in("alice");
    let second = setup.open(dir.open_cache(), fast_config().with_reconcile_on_open(true));
    assert_eq!(second.pending_count(), 0);
    assert!(second.get(&pending.id).is_none());
    assert_eq!(setup.server.entry_count(), 1);
    second.close().unwrap();

    let reopened = dir.open_cache();
    assert_eq!(reopened.len(), 1);
    assert!(reopened.find_pending().is_empty());
}

#[test]
fn evicted_cache_keeps_pending() {
    let setup = Setup::new();
    let cache = LocalCache::open(InMemoryMedium::new(), CacheConfig::new().max_confirmed(2)).unwrap();
    let session = setup.open(cache, fast_config());

    session.create(NewEntry::new("offline draft")).unwrap();
    setup.sign_in("alice");
    for i in 0..4 {
        session.create(NewEntry::new(format!("online {i}"))).unwrap();
    }

    session.with_cache(|cache| {
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.pending_count(), 1);
    });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn cache_pages_tile_the_listing(count in 0u32..30, page_size in 1usize..8) {
        let setup = Setup::new();
        let session = setup.open(scenarios::populated_cache(count), fast_config());

        let mut seen = Vec::new();
        let mut index = 0;
        loop {
            let page = session.get_page(index, page_size).unwrap();
            prop_assert_eq!(page.total_count, count as usize);
            if page.is_empty() {
                break;
            }
            prop_assert!(page.entries.len() <= page_size);
            seen.extend(page.entries.into_iter().map(|e| e.id));
            index += 1;
        }

        let listed: Vec<EntryId> =
            session.with_cache(|cache| cache.list_all().map(|e| e.id.clone()).collect());
        prop_assert_eq!(seen, listed);
    }
}
