//! HTTP implementation of the remote journal service.
//!
//! The actual HTTP client is abstracted via a trait to allow different
//! implementations (reqwest, hyper, an in-process loopback, etc.).

use crate::auth::Principal;
use crate::error::{SyncError, SyncResult};
use crate::remote::JournalRemote;
use journal_core::{EntryId, EntryPatch, JournalEntry, NewEntry};
use journal_protocol::{
    endpoints, CreateRequest, DeleteRequest, DeleteResponse, EntryResponse, ErrorResponse,
    ListRequest, ListResponse, SearchQuery, SearchRequest, SearchResponse, UpdateRequest,
    WireMessage,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// `Err` means the request never produced a response (connection refused,
/// timeout, DNS failure).
pub trait HttpClient: Send + Sync {
    /// Sends a JSON POST request with an optional bearer token.
    fn post(&self, url: &str, bearer: Option<&str>, body: Vec<u8>)
        -> Result<HttpResponse, String>;

    /// Checks if the client is connected/healthy.
    fn is_healthy(&self) -> bool;
}

/// Remote journal service reached over HTTP with JSON bodies.
pub struct HttpRemote<C: HttpClient> {
    base_url: String,
    client: C,
    last_error: RwLock<Option<String>>,
}

impl<C: HttpClient> HttpRemote<C> {
    /// Creates a remote for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, client: C) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            last_error: RwLock::new(None),
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the HTTP client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns the last error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    fn fail(&self, err: SyncError) -> SyncError {
        *self.last_error.write() = Some(err.to_string());
        err
    }

    fn post_json<Req, Res>(
        &self,
        endpoint: &str,
        principal: &Principal,
        request: &Req,
    ) -> SyncResult<Res>
    where
        Req: WireMessage,
        Res: WireMessage,
    {
        if !self.client.is_healthy() {
            return Err(self.fail(SyncError::NetworkFailure("client is offline".into())));
        }

        let body = request.encode()?;
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(url = %url, "posting journal request");

        let response = self
            .client
            .post(&url, Some(principal.access_token()), body)
            .map_err(|e| self.fail(SyncError::NetworkFailure(e)))?;

        if !response.is_success() {
            return Err(self.fail(status_error(&response)));
        }

        *self.last_error.write() = None;
        Ok(Res::decode(&response.body)?)
    }
}

/// Maps a non-2xx response onto the sync error taxonomy.
fn status_error(response: &HttpResponse) -> SyncError {
    let message = ErrorResponse::decode(&response.body)
        .map(|e| e.error)
        .unwrap_or_else(|_| format!("HTTP {}", response.status));

    match response.status {
        401 | 403 => SyncError::Unauthenticated(message),
        404 => SyncError::NotFound(message),
        502..=504 => SyncError::NetworkFailure(message),
        status => SyncError::ServerError {
            status: Some(status),
            message,
        },
    }
}

impl<C: HttpClient> JournalRemote for HttpRemote<C> {
    fn create_remote(&self, principal: &Principal, entry: &NewEntry) -> SyncResult<JournalEntry> {
        let request = CreateRequest {
            entry: entry.clone(),
        };
        let response: EntryResponse = self.post_json(endpoints::CREATE, principal, &request)?;
        Ok(response.entry)
    }

    fn update_remote(
        &self,
        principal: &Principal,
        id: &EntryId,
        patch: &EntryPatch,
    ) -> SyncResult<JournalEntry> {
        let request = UpdateRequest {
            id: id.clone(),
            patch: patch.clone(),
        };
        let response: EntryResponse = self.post_json(endpoints::UPDATE, principal, &request)?;
        Ok(response.entry)
    }

    fn delete_remote(&self, principal: &Principal, id: &EntryId) -> SyncResult<()> {
        let request = DeleteRequest { id: id.clone() };
        let _: DeleteResponse = self.post_json(endpoints::DELETE, principal, &request)?;
        Ok(())
    }

    fn list_remote(
        &self,
        principal: &Principal,
        offset: usize,
        limit: usize,
    ) -> SyncResult<ListResponse> {
        self.post_json(endpoints::LIST, principal, &ListRequest { offset, limit })
    }

    fn search_remote(
        &self,
        principal: &Principal,
        query: &SearchQuery,
    ) -> SyncResult<Vec<JournalEntry>> {
        let request = SearchRequest {
            query: query.clone(),
        };
        let response: SearchResponse = self.post_json(endpoints::SEARCH, principal, &request)?;
        Ok(response.entries)
    }
}

/// Trait for servers that can handle loopback requests.
pub trait LoopbackServer {
    /// Handles a POST request and returns the response.
    fn handle_post(&self, path: &str, bearer: Option<&str>, body: &[u8]) -> HttpResponse;
}

/// A loopback HTTP client that routes requests directly to a server.
///
/// Useful for testing without actual network overhead. Marking the client
/// unhealthy simulates losing connectivity.
pub struct LoopbackClient<S: LoopbackServer> {
    server: S,
    healthy: AtomicBool,
}

impl<S: LoopbackServer + Send + Sync> LoopbackClient<S> {
    /// Creates a new loopback client connected to the given server.
    pub fn new(server: S) -> Self {
        Self {
            server,
            healthy: AtomicBool::new(true),
        }
    }

    /// Sets whether requests reach the server.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Returns the server.
    pub fn server(&self) -> &S {
        &self.server
    }
}

impl<S: LoopbackServer + Send + Sync> HttpClient for LoopbackClient<S> {
    fn post(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: Vec<u8>,
    ) -> Result<HttpResponse, String> {
        if !self.is_healthy() {
            return Err("connection refused".into());
        }
        let path = url.find("/journal/").map(|i| &url[i..]).unwrap_or(url);
        Ok(self.server.handle_post(path, bearer, &body))
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct TestClient {
        response: RwLock<Option<Result<HttpResponse, String>>>,
        seen: RwLock<Vec<(String, Option<String>)>>,
    }

    impl TestClient {
        fn new() -> Self {
            Self {
                response: RwLock::new(None),
                seen: RwLock::new(Vec::new()),
            }
        }

        fn respond(&self, status: u16, body: Vec<u8>) {
            *self.response.write() = Some(Ok(HttpResponse::new(status, body)));
        }

        fn refuse(&self) {
            *self.response.write() = Some(Err("connection refused".into()));
        }
    }

    impl HttpClient for TestClient {
        fn post(
            &self,
            url: &str,
            bearer: Option<&str>,
            _body: Vec<u8>,
        ) -> Result<HttpResponse, String> {
            self.seen
                .write()
                .push((url.to_string(), bearer.map(str::to_string)));
            self.response
                .read()
                .clone()
                .unwrap_or_else(|| Err("no response set".into()))
        }

        fn is_healthy(&self) -> bool {
            true
        }
    }

    fn principal() -> Principal {
        Principal::new("alice", "token-a")
    }

    fn error_body(message: &str) -> Vec<u8> {
        ErrorResponse::new(message).encode().unwrap()
    }

    #[test]
    fn remote_creation() {
        let remote = HttpRemote::new("https://journal.example.com/", TestClient::new());
        assert_eq!(remote.base_url(), "https://journal.example.com");
        assert!(remote.last_error().is_none());
    }

    #[test]
    fn create_posts_with_bearer() {
        let client = TestClient::new();
        let confirmed = JournalEntry::confirmed(
            EntryId::Server("srv-1".into()),
            NewEntry::new("hello"),
            "alice",
            Utc::now(),
        );
        client.respond(
            200,
            EntryResponse {
                entry: confirmed.clone(),
            }
            .encode()
            .unwrap(),
        );
        let remote = HttpRemote::new("https://journal.example.com", client);

        let entry = remote
            .create_remote(&principal(), &NewEntry::new("hello"))
            .unwrap();
        assert_eq!(entry, confirmed);

        let seen = remote.client().seen.read().clone();
        assert_eq!(seen[0].0, "https://journal.example.com/journal/create");
        assert_eq!(seen[0].1.as_deref(), Some("token-a"));
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (401, "unauthenticated"),
            (403, "unauthenticated"),
            (503, "network"),
            (504, "network"),
            (404, "not found"),
            (400, "server"),
            (500, "server"),
        ];
        for (status, expected) in cases {
            let client = TestClient::new();
            client.respond(status, error_body("nope"));
            let remote = HttpRemote::new("http://x", client);
            let err = remote.list_remote(&principal(), 0, 10).unwrap_err();
            let kind = match err {
                SyncError::Unauthenticated(_) => "unauthenticated",
                SyncError::NetworkFailure(_) => "network",
                SyncError::NotFound(_) => "not found",
                SyncError::ServerError { .. } => "server",
                other => panic!("unexpected error {other:?}"),
            };
            assert_eq!(kind, expected, "status {status}");
        }
    }

    #[test]
    fn server_error_keeps_message() {
        let client = TestClient::new();
        client.respond(422, error_body("content must not be empty"));
        let remote = HttpRemote::new("http://x", client);

        let err = remote
            .create_remote(&principal(), &NewEntry::new(""))
            .unwrap_err();
        assert!(matches!(
            &err,
            SyncError::ServerError { status: Some(422), message } if message == "content must not be empty"
        ));
        assert!(remote.last_error().unwrap().contains("422"));
    }

    #[test]
    fn transport_error_is_network_failure() {
        let client = TestClient::new();
        client.refuse();
        let remote = HttpRemote::new("http://x", client);
        let err = remote
            .delete_remote(&principal(), &EntryId::Server("s".into()))
            .unwrap_err();
        assert!(err.is_fallback_eligible());
        assert!(matches!(err, SyncError::NetworkFailure(_)));
    }

    #[test]
    fn undecodable_body_is_protocol_error() {
        let client = TestClient::new();
        client.respond(200, b"not json".to_vec());
        let remote = HttpRemote::new("http://x", client);
        let err = remote.list_remote(&principal(), 0, 10).unwrap_err();
        assert!(matches!(err, SyncError::Protocol(_)));
    }

    struct EchoServer;

    impl LoopbackServer for EchoServer {
        fn handle_post(&self, path: &str, bearer: Option<&str>, _body: &[u8]) -> HttpResponse {
            HttpResponse::new(200, format!("{path} {}", bearer.unwrap_or("-")).into_bytes())
        }
    }

    #[test]
    fn loopback_strips_host() {
        let client = LoopbackClient::new(EchoServer);
        let response = client
            .post("http://localhost:8080/journal/list", Some("t"), Vec::new())
            .unwrap();
        assert_eq!(response.body, b"/journal/list t");
    }

    #[test]
    fn unhealthy_loopback_refuses() {
        let client = LoopbackClient::new(EchoServer);
        client.set_healthy(false);
        assert!(client.post("http://x/journal/list", None, Vec::new()).is_err());

        let remote = HttpRemote::new("http://x", client);
        let err = remote.list_remote(&principal(), 0, 1).unwrap_err();
        assert!(matches!(err, SyncError::NetworkFailure(_)));
    }
}
