//! Static file serving.
//!
//! Everything outside `/api` is served from the static directory (the
//! editing front-end) with `tower-http`'s `ServeDir`.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Add a static file fallback to `router` when `static_dir` exists.
///
/// Without a static directory every non-API path answers 404.
pub(crate) fn with_static_files(
    router: Router<Arc<AppState>>,
    static_dir: Option<&Path>,
) -> Router<Arc<AppState>> {
    match static_dir {
        Some(dir) if dir.is_dir() => {
            router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
        }
        Some(dir) => {
            tracing::warn!(path = %dir.display(), "Static directory not found, not serving static files");
            router
        }
        None => router,
    }
}
