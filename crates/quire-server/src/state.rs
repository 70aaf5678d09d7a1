//! Application state.
//!
//! Shared state for all request handlers. Nothing in it changes after
//! startup.

use std::sync::Arc;

use quire_storage::ContentStore;

use crate::auth::TokenSet;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Content store for pages, directories and media.
    pub(crate) store: Arc<dyn ContentStore>,
    /// Accepted bearer tokens for mutating routes.
    pub(crate) tokens: TokenSet,
    /// Upload and page body size cap in bytes.
    pub(crate) max_upload_bytes: u64,
    /// Application version, mixed into page `ETag`s.
    pub(crate) version: String,
}
