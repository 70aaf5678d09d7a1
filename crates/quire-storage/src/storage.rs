//! Content store trait and error types.
//!
//! Provides the core [`ContentStore`] trait for page, directory and media
//! operations, along with [`StorageError`] for unified error handling across
//! backends.
//!
//! # Path Convention
//!
//! All path parameters are **client paths** relative to the storage root:
//! - `""` - the root directory itself
//! - `"notes"` - a directory (or file) directly below the root
//! - `"notes/a.md"` - a nested page
//!
//! Implementations confine every client path to their root with
//! [`resolve`](crate::resolve) before touching storage.

use std::io::Read;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::Serialize;

/// Upload size cap applied when none is configured (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 << 20;

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file (page or media).
    File,
    /// Directory.
    Dir,
}

/// Directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// File or directory name (single path segment).
    pub name: String,
    /// Whether the entry is a file or a directory.
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// A file matched by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Path relative to the storage root, `/`-separated.
    pub path: String,
    /// File name.
    pub name: String,
}

/// Semantic error categories.
///
/// The set is closed: callers can match exhaustively and map each kind to
/// exactly one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// File or directory does not exist.
    NotFound,
    /// Target of a create already exists.
    AlreadyExists,
    /// Directory still has children.
    NotEmpty,
    /// Upload exceeds the configured size cap.
    PayloadTooLarge,
    /// Resolved path would leave the storage root.
    PathEscape,
    /// Invalid name, empty query or other malformed input.
    InvalidInput,
    /// Unclassified I/O failure.
    Io,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    kind: StorageErrorKind,
    path: Option<PathBuf>,
    backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Semantic error category.
    #[must_use]
    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    /// Path context, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }

    /// Backend identifier (e.g., "Fs"), if any.
    #[must_use]
    pub fn backend(&self) -> Option<&'static str> {
        self.backend
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create an invalid input error with a message as its source.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::new(StorageErrorKind::InvalidInput).with_source(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            message,
        ))
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            // A file in place of an ancestor directory means the target is absent.
            std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory => {
                StorageErrorKind::NotFound
            }
            std::io::ErrorKind::AlreadyExists => StorageErrorKind::AlreadyExists,
            std::io::ErrorKind::DirectoryNotEmpty => StorageErrorKind::NotEmpty,
            _ => StorageErrorKind::Io,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::AlreadyExists => "Already exists",
            StorageErrorKind::NotEmpty => "Directory not empty",
            StorageErrorKind::PayloadTooLarge => "Payload too large",
            StorageErrorKind::PathEscape => "Path escapes storage root",
            StorageErrorKind::InvalidInput => "Invalid input",
            StorageErrorKind::Io => "I/O error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Page, directory and media operations over a single storage root.
///
/// There is no coordination between concurrent callers: the backing store is
/// the only source of truth, concurrent writers to one path race with
/// last-write-wins, and nothing is transactional across calls.
pub trait ContentStore: Send + Sync {
    /// Read the full content of a page.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotFound`] if the page is absent or the
    /// path names a directory.
    fn read_page(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Modification time of a page.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotFound`] if the page is absent.
    fn page_modified(&self, path: &str) -> Result<SystemTime, StorageError>;

    /// Create or overwrite a page, creating missing ancestor directories.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::Io`] if the write fails.
    fn write_page(&self, path: &str, content: &[u8]) -> Result<(), StorageError>;

    /// Delete a page.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotFound`] if the page is absent.
    fn delete_page(&self, path: &str) -> Result<(), StorageError>;

    /// List the immediate children of a directory in enumeration order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotFound`] if the directory does not exist.
    fn list_directory(&self, path: &str) -> Result<Vec<Entry>, StorageError>;

    /// Create directory `name` inside `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::AlreadyExists`] if the target exists and
    /// [`StorageErrorKind::NotFound`] if `parent` is missing.
    fn create_directory(&self, parent: &str, name: &str) -> Result<(), StorageError>;

    /// Delete an empty directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotEmpty`] if it has children and
    /// [`StorageErrorKind::NotFound`] if it does not exist.
    fn delete_directory(&self, path: &str) -> Result<(), StorageError>;

    /// Store `filename` inside `dir`, overwriting any existing file.
    ///
    /// At most `max_bytes` are read from `content`. Larger input fails with
    /// [`StorageErrorKind::PayloadTooLarge`] and nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::PayloadTooLarge`] on overflow and
    /// [`StorageErrorKind::NotFound`] if `dir` does not exist.
    fn upload_file(
        &self,
        dir: &str,
        filename: &str,
        content: &mut dyn Read,
        max_bytes: u64,
    ) -> Result<(), StorageError>;

    /// Delete `filename` inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotFound`] if the file does not exist.
    fn delete_file(&self, dir: &str, filename: &str) -> Result<(), StorageError>;

    /// Find files whose name, or page content, contains `query`
    /// (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::InvalidInput`] for an empty query.
    fn search(&self, query: &str) -> Result<Vec<SearchHit>, StorageError>;
}
