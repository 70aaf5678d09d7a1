//! `quire serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use quire_config::{CliSettings, Config};
use quire_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover quire.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Storage root holding pages and media (overrides config).
    #[arg(short, long, env = "QUIRE_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// Bearer token file, one token per line (overrides config).
    #[arg(long, env = "QUIRE_TOKENS_FILE")]
    tokens_file: Option<PathBuf>,

    /// Directory of static front-end files (overrides config).
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Maximum upload size in bytes (overrides config).
    #[arg(long)]
    max_upload_bytes: Option<u64>,

    /// Enable verbose output (request and storage logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        // Build CLI settings from args
        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            storage_dir: self.storage_dir,
            tokens_file: self.tokens_file,
            static_dir: self.static_dir,
            max_upload_bytes: self.max_upload_bytes,
        };

        // Load config
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::debug!(path = %path.display(), "Loaded configuration");
        }

        let server_config = server_config_from_config(&config, version.to_owned())?;

        // Print startup info
        output.highlight(&format!(
            "Starting server on {}:{}",
            server_config.host, server_config.port
        ));
        output.info(&format!(
            "Storage directory: {}",
            server_config.storage_dir.display()
        ));

        match &config.auth_resolved.tokens_file {
            Some(path) if server_config.tokens.is_empty() => {
                output.warning(&format!(
                    "No tokens in {}: editing is disabled",
                    path.display()
                ));
            }
            Some(path) => output.info(&format!(
                "Tokens: {} loaded from {}",
                server_config.tokens.len(),
                path.display()
            )),
            None => output.warning("No token file configured: editing is disabled"),
        }

        if let Some(static_dir) = &server_config.static_dir {
            output.info(&format!("Static directory: {}", static_dir.display()));
        }
        output.info(&format!(
            "Upload limit: {} bytes",
            server_config.max_upload_bytes
        ));

        run_server(server_config).await?;

        Ok(())
    }
}
