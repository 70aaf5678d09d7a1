//! HTTP server for the Quire content store.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - API endpoints for pages, directories, media uploads and search
//! - Static files for the editing front-end
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use quire_server::{ServerConfig, TokenSet, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_owned(),
//!         port: 8080,
//!         storage_dir: PathBuf::from("public_html/content"),
//!         static_dir: Some(PathBuf::from("public_html")),
//!         tokens: TokenSet::from_lines("s3cret"),
//!         max_upload_bytes: 10 << 20,
//!         version: "1.0.0".to_owned(),
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Client ──HTTP──► axum router (quire-server)
//!                        │
//!                        ├─► /api/* handlers
//!                        │       │
//!                        │       ├─► Authorized extractor (mutations only)
//!                        │       │
//!                        │       └─► ContentStore (quire-storage-fs)
//!                        │
//!                        └─► Static files (tower-http ServeDir)
//! ```

mod app;
mod auth;
mod error;
mod handlers;
mod middleware;
mod state;
mod static_files;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use quire_storage::{ContentStore, StorageError};
use quire_storage_fs::FsStore;
use state::AppState;

pub use auth::TokenSet;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Storage root directory (created if missing).
    pub storage_dir: PathBuf,
    /// Static asset directory (`None` disables static files).
    pub static_dir: Option<PathBuf>,
    /// Accepted bearer tokens.
    pub tokens: TokenSet,
    /// Upload and page body size cap in bytes.
    pub max_upload_bytes: u64,
    /// Application version (mixed into `ETag`s).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            storage_dir: PathBuf::from("public_html/content"),
            static_dir: Some(PathBuf::from("public_html")),
            tokens: TokenSet::default(),
            max_upload_bytes: quire_storage::DEFAULT_MAX_UPLOAD_BYTES,
            version: String::new(),
        }
    }
}

/// Error starting the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Storage root could not be opened.
    #[error("Cannot open storage root: {0}")]
    Storage(#[from] StorageError),

    /// Token file could not be read.
    #[error("Cannot read token file {}: {source}", .path.display())]
    Tokens {
        /// Configured token file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Listen address is invalid.
    #[error("Invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),

    /// Binding or serving failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the storage root cannot be opened or the server fails
/// to start.
pub async fn run_server(config: ServerConfig) -> Result<(), StartupError> {
    let store: Arc<dyn ContentStore> = Arc::new(FsStore::open(config.storage_dir)?);

    if config.tokens.is_empty() {
        tracing::warn!("No bearer tokens loaded, all mutating requests will be rejected");
    }

    // Create app state
    let state = Arc::new(AppState {
        store,
        tokens: config.tokens,
        max_upload_bytes: config.max_upload_bytes,
        version: config.version,
    });

    // Create router
    let app = app::create_router(state, config.static_dir.as_deref());

    // Bind and run server
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from Quire config.
///
/// Loads the configured token file. A configured file that does not exist
/// is an error; no configured file means no tokens.
///
/// # Arguments
///
/// * `config` - Quire configuration
/// * `version` - Application version
///
/// # Errors
///
/// Returns [`StartupError::Tokens`] if the token file cannot be read.
pub fn server_config_from_config(
    config: &quire_config::Config,
    version: String,
) -> Result<ServerConfig, StartupError> {
    let tokens = match &config.auth_resolved.tokens_file {
        Some(path) => TokenSet::load(path).map_err(|source| StartupError::Tokens {
            path: path.clone(),
            source,
        })?,
        None => TokenSet::default(),
    };

    Ok(ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        storage_dir: config.storage_resolved.dir.clone(),
        static_dir: Some(config.static_resolved.dir.clone()),
        tokens,
        max_upload_bytes: config.storage_resolved.max_upload_bytes,
        version,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    fn load_config(dir: &Path, toml: &str) -> quire_config::Config {
        let config_path = dir.join("quire.toml");
        std::fs::write(&config_path, toml).unwrap();
        quire_config::Config::load(Some(config_path.as_path()), None).unwrap()
    }

    #[test]
    fn test_server_config_from_config_loads_tokens() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("auth_tokens.txt"), "one\ntwo\n").unwrap();
        let config = load_config(temp_dir.path(), "[server]\nport = 9001\n");

        let server_config = server_config_from_config(&config, "1.2.3".to_owned()).unwrap();

        assert_eq!(server_config.port, 9001);
        assert_eq!(server_config.tokens.len(), 2);
        assert_eq!(
            server_config.storage_dir,
            temp_dir.path().join("public_html/content")
        );
        assert_eq!(
            server_config.static_dir,
            Some(temp_dir.path().join("public_html"))
        );
        assert_eq!(server_config.version, "1.2.3");
    }

    #[test]
    fn test_server_config_from_config_missing_token_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = load_config(temp_dir.path(), "");

        let result = server_config_from_config(&config, String::new());

        assert!(matches!(result, Err(StartupError::Tokens { .. })));
    }

    #[test]
    fn test_server_config_from_config_without_token_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = load_config(temp_dir.path(), "[auth]\ntokens_file = \"\"\n");

        let server_config = server_config_from_config(&config, String::new()).unwrap();

        assert!(server_config.tokens.is_empty());
    }
}
