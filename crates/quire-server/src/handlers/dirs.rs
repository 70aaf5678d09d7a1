//! Directory API endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use quire_storage::Entry;
use serde::Deserialize;

use crate::auth::Authorized;
use crate::error::ServerError;
use crate::handlers::PathQuery;
use crate::state::AppState;

/// Request body for POST /api/dir.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateDirectory {
    /// Name of the new subdirectory.
    name: String,
}

/// Handle GET /api/dir?path=P.
pub(crate) async fn list_directory(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
) -> Result<Json<Vec<Entry>>, ServerError> {
    Ok(Json(state.store.list_directory(&query.path)?))
}

/// Handle POST /api/dir?path=P with body `{"name": S}`.
pub(crate) async fn create_directory(
    _auth: Authorized,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
    payload: Result<Json<CreateDirectory>, JsonRejection>,
) -> Result<String, ServerError> {
    let Json(CreateDirectory { name }) =
        payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    state.store.create_directory(&query.path, &name)?;

    tracing::info!(parent = %query.path, name = %name, "Directory created");
    Ok(format!("Directory {name} created"))
}

/// Handle DELETE /api/dir?path=P.
pub(crate) async fn delete_directory(
    _auth: Authorized,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
) -> Result<String, ServerError> {
    state.store.delete_directory(&query.path)?;

    tracing::info!(path = %query.path, "Directory deleted");
    Ok(format!("Directory {} deleted", query.path))
}
