//! Request handlers for journal endpoints.

use crate::auth::{AuthConfig, TokenValidator};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::store::EntryStore;
use chrono::Utc;
use journal_protocol::{
    CreateRequest, DeleteRequest, DeleteResponse, EntryResponse, ListRequest, ListResponse,
    SearchRequest, SearchResponse, UpdateRequest,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Context for request handling.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// Entry store (shared across all handlers).
    pub store: Arc<EntryStore>,
    validator: Option<TokenValidator>,
}

impl HandlerContext {
    /// Creates a new handler context.
    pub fn new(config: ServerConfig, store: Arc<EntryStore>) -> Self {
        let validator = config.auth_secret.clone().map(|secret| {
            TokenValidator::new(AuthConfig::new(secret).with_expiry(config.token_expiry))
        });
        Self {
            config,
            store,
            validator,
        }
    }

    /// Token validator, when authentication is enabled.
    pub fn validator(&self) -> Option<&TokenValidator> {
        self.validator.as_ref()
    }

    /// Resolves the caller's user id from a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotAuthorized`] when the token is missing or
    /// does not validate.
    pub fn authenticate(&self, bearer: Option<&str>) -> ServerResult<String> {
        let token = bearer
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServerError::NotAuthorized("missing bearer token".into()))?;
        match &self.validator {
            Some(validator) => validator.validate(token).inspect_err(|e| {
                warn!(error = %e, "rejected bearer token");
            }),
            None => Ok(token.to_string()),
        }
    }
}

/// Handler for journal requests.
///
/// Every handler takes the already authenticated user id.
pub struct RequestHandler {
    context: Arc<HandlerContext>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    /// Handles a create request.
    pub fn handle_create(&self, user: &str, request: CreateRequest) -> ServerResult<EntryResponse> {
        let entry = self.context.store.create(user, request.entry, Utc::now())?;
        debug!(user, id = %entry.id, "created entry");
        Ok(EntryResponse { entry })
    }

    /// Handles an update request.
    pub fn handle_update(&self, user: &str, request: UpdateRequest) -> ServerResult<EntryResponse> {
        let entry = self
            .context
            .store
            .update(user, &request.id, &request.patch, Utc::now())?;
        debug!(user, id = %entry.id, "updated entry");
        Ok(EntryResponse { entry })
    }

    /// Handles a delete request.
    pub fn handle_delete(&self, user: &str, request: DeleteRequest) -> ServerResult<DeleteResponse> {
        let entry = self.context.store.delete(user, &request.id)?;
        debug!(user, id = %entry.id, "deleted entry");
        Ok(DeleteResponse { id: entry.id })
    }

    /// Handles a list request. The limit is clamped to the configured
    /// maximum page size.
    pub fn handle_list(&self, user: &str, request: ListRequest) -> ServerResult<ListResponse> {
        let limit = request.limit.min(self.context.config.max_page_size);
        let (entries, total_count) = self.context.store.list(user, request.offset, limit);
        Ok(ListResponse {
            entries,
            total_count,
        })
    }

    /// Handles a search request.
    pub fn handle_search(&self, user: &str, request: SearchRequest) -> ServerResult<SearchResponse> {
        let entries = self.context.store.search(user, &request.query);
        Ok(SearchResponse { entries })
    }
}
