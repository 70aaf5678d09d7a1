//! Pages API endpoint.
//!
//! Reads return the raw page bytes with `ETag` and `Last-Modified` headers;
//! writes store the request body verbatim.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};

use crate::auth::Authorized;
use crate::error::ServerError;
use crate::handlers::PathQuery;
use crate::state::AppState;

/// Content type of page responses.
const PAGE_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Handle GET /api/page?path=P.
pub(crate) async fn get_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let path = query.required()?;
    let content = state.store.read_page(path)?;
    let modified = state.store.page_modified(path)?;

    let etag = compute_etag(&state.version, &content);

    // Check If-None-Match header for conditional request
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    let last_modified: DateTime<Utc> = modified.into();

    Ok((
        [
            (header::CONTENT_TYPE, PAGE_CONTENT_TYPE.to_owned()),
            (header::ETAG, etag),
            (
                header::LAST_MODIFIED,
                last_modified
                    .format("%a, %d %b %Y %H:%M:%S GMT")
                    .to_string(),
            ),
        ],
        content,
    )
        .into_response())
}

/// Handle POST /api/page?path=P.
pub(crate) async fn save_page(
    _auth: Authorized,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
    body: Bytes,
) -> Result<String, ServerError> {
    let path = query.required()?;
    state.store.write_page(path, &body)?;

    tracing::info!(path, bytes = body.len(), "Page saved");
    Ok(format!("File {path} saved"))
}

/// Handle DELETE /api/page?path=P.
pub(crate) async fn delete_page(
    _auth: Authorized,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
) -> Result<String, ServerError> {
    let path = query.required()?;
    state.store.delete_page(path)?;

    tracing::info!(path, "Page deleted");
    Ok(format!("File {path} deleted"))
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(version.as_bytes());
    hasher.update(b":");
    hasher.update(content);
    format!("\"{}\"", &hex::encode(hasher.finalize())[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_etag_includes_version() {
        let etag1 = compute_etag("1.0.0", b"content");
        let etag2 = compute_etag("1.0.1", b"content");

        assert_ne!(etag1, etag2);
    }

    #[test]
    fn test_compute_etag_includes_content() {
        let etag1 = compute_etag("1.0.0", b"content1");
        let etag2 = compute_etag("1.0.0", b"content2");

        assert_ne!(etag1, etag2);
    }

    #[test]
    fn test_compute_etag_format() {
        let etag = compute_etag("1.0.0", b"content");

        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        // 16 hex chars + 2 quotes = 18 total
        assert_eq!(etag.len(), 18);
    }

    #[test]
    fn test_compute_etag_is_stable() {
        assert_eq!(compute_etag("v", b"hello"), compute_etag("v", b"hello"));
    }
}
