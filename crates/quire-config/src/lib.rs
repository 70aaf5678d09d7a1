//! Configuration management for Quire.
//!
//! Parses `quire.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `storage.dir`
//! - `auth.tokens_file`
//! - `static_files.dir`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use quire_storage::DEFAULT_MAX_UPLOAD_BYTES;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override storage root directory.
    pub storage_dir: Option<PathBuf>,
    /// Override token file.
    pub tokens_file: Option<PathBuf>,
    /// Override static asset directory.
    pub static_dir: Option<PathBuf>,
    /// Override upload size cap.
    pub max_upload_bytes: Option<u64>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quire.toml";

/// Default storage root, relative to the config directory.
const DEFAULT_STORAGE_DIR: &str = "public_html/content";

/// Default token file, relative to the config directory.
const DEFAULT_TOKENS_FILE: &str = "auth_tokens.txt";

/// Default static asset directory, relative to the config directory.
const DEFAULT_STATIC_DIR: &str = "public_html";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Storage configuration (paths are relative strings from TOML).
    storage: StorageConfigRaw,
    /// Authentication configuration (paths are relative strings from TOML).
    auth: AuthConfigRaw,
    /// Static asset configuration (paths are relative strings from TOML).
    static_files: StaticFilesConfigRaw,

    /// Resolved storage configuration (set after loading).
    #[serde(skip)]
    pub storage_resolved: StorageConfig,
    /// Resolved authentication configuration (set after loading).
    #[serde(skip)]
    pub auth_resolved: AuthConfig,
    /// Resolved static asset configuration (set after loading).
    #[serde(skip)]
    pub static_resolved: StaticFilesConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

/// Raw storage configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StorageConfigRaw {
    dir: Option<String>,
    max_upload_bytes: Option<u64>,
}

/// Resolved storage configuration with absolute paths.
#[derive(Debug)]
pub struct StorageConfig {
    /// Storage root holding pages and media.
    pub dir: PathBuf,
    /// Maximum accepted upload (and page body) size in bytes.
    pub max_upload_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Raw authentication configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AuthConfigRaw {
    tokens_file: Option<String>,
}

/// Resolved authentication configuration.
#[derive(Debug, Default)]
pub struct AuthConfig {
    /// Token file, one bearer token per line.
    ///
    /// `None` disables the file: no token is valid and every mutation is
    /// rejected.
    pub tokens_file: Option<PathBuf>,
}

/// Raw static asset configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StaticFilesConfigRaw {
    dir: Option<String>,
}

/// Resolved static asset configuration.
#[derive(Debug)]
pub struct StaticFilesConfig {
    /// Directory served for every non-API path.
    pub dir: PathBuf,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`storage.dir`").
        field: String,
        /// Error message (e.g., "${`QUIRE_STORAGE`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quire.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(storage_dir) = &settings.storage_dir {
            self.storage_resolved.dir.clone_from(storage_dir);
        }
        if let Some(tokens_file) = &settings.tokens_file {
            self.auth_resolved.tokens_file = Some(tokens_file.clone());
        }
        if let Some(static_dir) = &settings.static_dir {
            self.static_resolved.dir.clone_from(static_dir);
        }
        if let Some(max_upload_bytes) = settings.max_upload_bytes {
            self.storage_resolved.max_upload_bytes = max_upload_bytes;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfigRaw::default(),
            auth: AuthConfigRaw::default(),
            static_files: StaticFilesConfigRaw::default(),
            storage_resolved: StorageConfig {
                dir: base.join(DEFAULT_STORAGE_DIR),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            auth_resolved: AuthConfig {
                tokens_file: Some(base.join(DEFAULT_TOKENS_FILE)),
            },
            static_resolved: StaticFilesConfig {
                dir: base.join(DEFAULT_STATIC_DIR),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_storage()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate storage configuration.
    fn validate_storage(&self) -> Result<(), ConfigError> {
        if self.storage_resolved.dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "storage.dir cannot be empty".to_owned(),
            ));
        }
        if self.storage_resolved.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "storage.max_upload_bytes must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref dir) = self.storage.dir {
            self.storage.dir = Some(expand::expand_env(dir, "storage.dir")?);
        }
        if let Some(ref tokens_file) = self.auth.tokens_file {
            self.auth.tokens_file = Some(expand::expand_env(tokens_file, "auth.tokens_file")?);
        }
        if let Some(ref dir) = self.static_files.dir {
            self.static_files.dir = Some(expand::expand_env(dir, "static_files.dir")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    ///
    /// An empty `auth.tokens_file` disables the token file.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.storage_resolved = StorageConfig {
            dir: resolve(self.storage.dir.as_deref(), DEFAULT_STORAGE_DIR),
            max_upload_bytes: self
                .storage
                .max_upload_bytes
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        };

        self.auth_resolved = AuthConfig {
            tokens_file: match self.auth.tokens_file.as_deref() {
                Some("") => None,
                other => Some(resolve(other, DEFAULT_TOKENS_FILE)),
            },
        };

        self.static_resolved = StaticFilesConfig {
            dir: resolve(self.static_files.dir.as_deref(), DEFAULT_STATIC_DIR),
        };
    }
}
