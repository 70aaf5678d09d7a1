//! Media upload API endpoint.
//!
//! Uploads arrive as `multipart/form-data` with a single `file` field. The
//! field is read chunk by chunk and rejected as soon as it passes the size
//! cap, so oversized uploads are never buffered in full.

use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Multipart, Query, State};
use quire_storage::{StorageError, StorageErrorKind};
use serde::Deserialize;

use crate::auth::Authorized;
use crate::error::ServerError;
use crate::handlers::PathQuery;
use crate::state::AppState;

/// Name of the multipart field carrying the file.
const FILE_FIELD: &str = "file";

/// Query parameters for DELETE /api/upload.
#[derive(Debug, Deserialize)]
pub(crate) struct DeleteUploadQuery {
    #[serde(default)]
    path: String,
    #[serde(default)]
    file: String,
}

/// Handle POST /api/upload?path=P with multipart field `file`.
pub(crate) async fn upload_file(
    _auth: Authorized,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<String, ServerError> {
    let mut multipart = multipart.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(base_name)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| ServerError::BadRequest("missing file name".to_owned()))?;

        let content = read_capped(field, state.max_upload_bytes).await?;
        state.store.upload_file(
            &query.path,
            &filename,
            &mut content.as_slice(),
            state.max_upload_bytes,
        )?;

        tracing::info!(
            dir = %query.path,
            filename = %filename,
            bytes = content.len(),
            "File uploaded"
        );
        return Ok(format!("File {filename} uploaded"));
    }

    Err(ServerError::BadRequest(format!(
        "missing multipart field '{FILE_FIELD}'"
    )))
}

/// Handle DELETE /api/upload?path=P&file=F.
pub(crate) async fn delete_file(
    _auth: Authorized,
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeleteUploadQuery>,
) -> Result<String, ServerError> {
    if query.file.is_empty() {
        return Err(ServerError::BadRequest("missing file parameter".to_owned()));
    }
    state.store.delete_file(&query.path, &query.file)?;

    tracing::info!(dir = %query.path, filename = %query.file, "File deleted");
    Ok(format!("File {} deleted", query.file))
}

/// Read a multipart field, failing once it exceeds `max_bytes`.
async fn read_capped(mut field: Field<'_>, max_bytes: u64) -> Result<Vec<u8>, ServerError> {
    let mut content = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if (content.len() + chunk.len()) as u64 > max_bytes {
            return Err(StorageError::new(StorageErrorKind::PayloadTooLarge).into());
        }
        content.extend_from_slice(&chunk);
    }
    Ok(content)
}

fn multipart_error(err: MultipartError) -> ServerError {
    ServerError::BadRequest(err.body_text())
}

/// Last segment of a client-supplied file name.
///
/// Some clients send the full local path; only the final segment is kept.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}
