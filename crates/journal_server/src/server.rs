//! Main journal server.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::{HandlerContext, RequestHandler};
use crate::store::EntryStore;
use journal_protocol::{endpoints, ErrorResponse, WireMessage};
use std::sync::Arc;
use tracing::debug;

/// The journal server.
///
/// # Example
///
/// ```
/// use journal_protocol::{endpoints, CreateRequest, EntryResponse, WireMessage};
/// use journal_core::NewEntry;
/// use journal_server::{JournalServer, ServerConfig};
///
/// let server = JournalServer::new(ServerConfig::default());
///
/// let body = CreateRequest { entry: NewEntry::new("hello") }.encode().unwrap();
/// let (status, response) = server.handle_post(endpoints::CREATE, Some("alice"), &body);
/// assert_eq!(status, 200);
/// let created = EntryResponse::decode(&response).unwrap().entry;
/// assert_eq!(created.owner.as_deref(), Some("alice"));
/// ```
pub struct JournalServer {
    handler: RequestHandler,
    context: Arc<HandlerContext>,
}

impl JournalServer {
    /// Creates a new journal server.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_store(config, Arc::new(EntryStore::new()))
    }

    /// Creates a journal server with an existing store.
    pub fn with_store(config: ServerConfig, store: Arc<EntryStore>) -> Self {
        let context = Arc::new(HandlerContext::new(config, store));
        let handler = RequestHandler::new(Arc::clone(&context));

        Self { handler, context }
    }

    /// Handles a POST request and returns the status code and JSON body.
    ///
    /// Errors are answered with their status code and an [`ErrorResponse`].
    pub fn handle_post(&self, path: &str, bearer: Option<&str>, body: &[u8]) -> (u16, Vec<u8>) {
        match self.dispatch(path, bearer, body) {
            Ok(body) => (200, body),
            Err(err) => {
                debug!(path, error = %err, "request failed");
                let body = ErrorResponse::new(err.to_string())
                    .encode()
                    .unwrap_or_else(|_| err.to_string().into_bytes());
                (err.status_code(), body)
            }
        }
    }

    fn dispatch(&self, path: &str, bearer: Option<&str>, body: &[u8]) -> ServerResult<Vec<u8>> {
        let known = [
            endpoints::CREATE,
            endpoints::UPDATE,
            endpoints::DELETE,
            endpoints::LIST,
            endpoints::SEARCH,
        ];
        if !known.contains(&path) {
            return Err(ServerError::NoRoute(path.to_string()));
        }

        let user = self.context.authenticate(bearer)?;
        let encoded = match path {
            endpoints::CREATE => self
                .handler
                .handle_create(&user, WireMessage::decode(body)?)?
                .encode(),
            endpoints::UPDATE => self
                .handler
                .handle_update(&user, WireMessage::decode(body)?)?
                .encode(),
            endpoints::DELETE => self
                .handler
                .handle_delete(&user, WireMessage::decode(body)?)?
                .encode(),
            endpoints::LIST => self
                .handler
                .handle_list(&user, WireMessage::decode(body)?)?
                .encode(),
            _ => self
                .handler
                .handle_search(&user, WireMessage::decode(body)?)?
                .encode(),
        };
        encoded.map_err(|e| ServerError::Internal(e.to_string()))
    }

    /// Issues a bearer token for `user_id`.
    ///
    /// Without an auth secret the user id itself is the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the user id cannot be encoded in a token.
    pub fn issue_token(&self, user_id: &str) -> ServerResult<String> {
        match self.context.validator() {
            Some(validator) => validator.create_token(user_id),
            None => Ok(user_id.to_string()),
        }
    }

    /// Returns the entry store.
    pub fn store(&self) -> &Arc<EntryStore> {
        &self.context.store
    }

    /// Returns the number of stored entries.
    pub fn entry_count(&self) -> usize {
        self.context.store.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_core::NewEntry;
    use journal_protocol::{
        CreateRequest, EntryResponse, ListRequest, ListResponse, SearchQuery, SearchRequest,
        SearchResponse,
    };

    fn create(server: &JournalServer, token: &str, content: &str) -> (u16, Vec<u8>) {
        let body = CreateRequest {
            entry: NewEntry::new(content),
        }
        .encode()
        .unwrap();
        server.handle_post(endpoints::CREATE, Some(token), &body)
    }

    fn error_message(body: &[u8]) -> String {
        ErrorResponse::decode(body).unwrap().error
    }

    #[test]
    fn server_lifecycle() {
        let server = JournalServer::new(ServerConfig::default());
        assert_eq!(server.entry_count(), 0);

        let (status, body) = create(&server, "alice", "hello");
        assert_eq!(status, 200);
        let entry = EntryResponse::decode(&body).unwrap().entry;
        assert_eq!(entry.content, "hello");
        assert_eq!(server.entry_count(), 1);
    }

    #[test]
    fn full_journal_flow() {
        let server = JournalServer::new(ServerConfig::default());
        for i in 0..3 {
            assert_eq!(create(&server, "alice", &format!("entry {i}")).0, 200);
        }

        let list = ListRequest {
            offset: 0,
            limit: 2,
        }
        .encode()
        .unwrap();
        let (status, body) = server.handle_post(endpoints::LIST, Some("alice"), &list);
        assert_eq!(status, 200);
        let page = ListResponse::decode(&body).unwrap();
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.total_count, 3);

        let search = SearchRequest {
            query: SearchQuery::Text("ENTRY 1".into()),
        }
        .encode()
        .unwrap();
        let (_, body) = server.handle_post(endpoints::SEARCH, Some("alice"), &search);
        assert_eq!(SearchResponse::decode(&body).unwrap().entries.len(), 1);
    }

    #[test]
    fn missing_token_is_401() {
        let server = JournalServer::new(ServerConfig::default());
        let body = CreateRequest {
            entry: NewEntry::new("x"),
        }
        .encode()
        .unwrap();
        let (status, body) = server.handle_post(endpoints::CREATE, None, &body);
        assert_eq!(status, 401);
        assert!(error_message(&body).contains("bearer"));
    }

    #[test]
    fn signed_tokens() {
        let server = JournalServer::new(ServerConfig::default().with_auth(b"secret".to_vec()));
        assert_eq!(create(&server, "alice", "x").0, 401);

        let token = server.issue_token("alice").unwrap();
        let (status, body) = create(&server, &token, "x");
        assert_eq!(status, 200);
        let entry = EntryResponse::decode(&body).unwrap().entry;
        assert_eq!(entry.owner.as_deref(), Some("alice"));
    }

    #[test]
    fn blank_content_is_400() {
        let server = JournalServer::new(ServerConfig::default());
        let (status, body) = create(&server, "alice", "");
        assert_eq!(status, 400);
        assert!(error_message(&body).contains("empty"));
    }

    #[test]
    fn malformed_body_is_400() {
        let server = JournalServer::new(ServerConfig::default());
        let (status, _) = server.handle_post(endpoints::LIST, Some("alice"), b"{");
        assert_eq!(status, 400);
    }

    #[test]
    fn unknown_route_is_404() {
        let server = JournalServer::new(ServerConfig::default());
        let (status, _) = server.handle_post("/journal/export", Some("alice"), b"{}");
        assert_eq!(status, 404);
    }

    #[test]
    fn shared_store() {
        let store = Arc::new(EntryStore::new());
        let server = JournalServer::with_store(ServerConfig::default(), Arc::clone(&store));
        create(&server, "alice", "shared");
        assert_eq!(store.len(), 1);
    }
}
