//! Search API endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use quire_storage::SearchHit;
use serde::Deserialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Query parameters for GET /api/search.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Handle GET /api/search?q=Q.
///
/// Walks the whole storage tree on every call. An empty query is rejected.
pub(crate) async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>, ServerError> {
    let hits = state.store.search(&query.q)?;

    tracing::debug!(query = %query.q, hits = hits.len(), "Search finished");
    Ok(Json(hits))
}
