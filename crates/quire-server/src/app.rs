//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers::{dirs, pages, search, uploads};
use crate::middleware::security;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `static_dir` - Directory served for non-API paths, if any
pub(crate) fn create_router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    // Page bodies share the upload cap; uploads count their own bytes.
    let page_limit = usize::try_from(state.max_upload_bytes).unwrap_or(usize::MAX);

    // API routes
    let api_routes = Router::new()
        .route(
            "/api/page",
            get(pages::get_page)
                .post(pages::save_page)
                .delete(pages::delete_page)
                .layer(DefaultBodyLimit::max(page_limit)),
        )
        .route(
            "/api/dir",
            get(dirs::list_directory)
                .post(dirs::create_directory)
                .delete(dirs::delete_directory),
        )
        .route(
            "/api/upload",
            post(uploads::upload_file)
                .delete(uploads::delete_file)
                .layer(DefaultBodyLimit::disable()),
        )
        .route("/api/search", get(search::search));

    // Static files for everything else
    let router = static_files::with_static_files(Router::new().merge(api_routes), static_dir);

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}
