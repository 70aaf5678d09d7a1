//! Filesystem storage implementation for the Quire content store.
//!
//! This crate provides [`FsStore`], a filesystem-based implementation of the
//! [`ContentStore`](quire_storage::ContentStore) trait. It handles:
//!
//! - Page reads and writes (with missing ancestor directories created)
//! - Directory listing, creation and removal
//! - Size-capped media uploads
//! - Live, unindexed search over file names and page contents
//!
//! The directory tree under the root is the whole database: there are no
//! sidecar files and no in-process caches. Writes go straight to their target
//! file, so a crash mid-write can leave a partially written file.
//!
//! # Example
//!
//! ```ignore
//! use quire_storage::ContentStore;
//! use quire_storage_fs::FsStore;
//!
//! let store = FsStore::open("public_html/content")?;
//! store.write_page("notes/a.md", b"hello")?;
//! assert_eq!(store.read_page("notes/a.md")?, b"hello");
//! ```

mod search;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use quire_storage::{
    ContentStore, Entry, EntryKind, SearchHit, StorageError, StorageErrorKind, resolve,
    resolve_child,
};

use search::SearchEngine;

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Create a storage error from an I/O error, tagged with the client path.
fn io_error(err: std::io::Error, path: &str) -> StorageError {
    StorageError::io(err, Some(PathBuf::from(path))).with_backend(BACKEND)
}

/// Filesystem content store rooted at a single directory.
pub struct FsStore {
    /// Absolute storage root.
    root: PathBuf,
}

impl FsStore {
    /// Open a store, creating the root directory if it does not exist.
    ///
    /// Only the root itself is created (its parent must exist). The returned
    /// store uses the canonical absolute form of `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be created or canonicalized.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        match fs::create_dir(&root) {
            Ok(()) => tracing::info!(path = %root.display(), "Created storage root"),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(StorageError::io(e, Some(root)).with_backend(BACKEND));
            }
        }

        let root = fs::canonicalize(&root)
            .map_err(|e| StorageError::io(e, Some(root.clone())).with_backend(BACKEND))?;
        if !root.is_dir() {
            return Err(StorageError::new(StorageErrorKind::InvalidInput)
                .with_path(root)
                .with_backend(BACKEND));
        }

        Ok(Self { root })
    }

    /// Storage root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a client path inside the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        resolve(&self.root, path).map_err(|e| e.with_backend(BACKEND))
    }

    /// Resolve `name` inside the client directory `dir`.
    fn resolve_child(&self, dir: &str, name: &str) -> Result<PathBuf, StorageError> {
        resolve_child(&self.root, dir, name).map_err(|e| e.with_backend(BACKEND))
    }

    /// Resolve a client path that must name an existing directory.
    fn resolve_existing_dir(&self, path: &str) -> Result<PathBuf, StorageError> {
        let dir_path = self.resolve(path)?;
        if dir_path.is_dir() {
            Ok(dir_path)
        } else {
            Err(StorageError::not_found(path).with_backend(BACKEND))
        }
    }

    /// Resolve a client path that must name an existing regular file.
    fn resolve_existing_file(
        &self,
        file_path: PathBuf,
        path: &str,
    ) -> Result<(PathBuf, fs::Metadata), StorageError> {
        match fs::metadata(&file_path) {
            Ok(meta) if meta.is_file() => Ok((file_path, meta)),
            Ok(_) => Err(StorageError::not_found(path).with_backend(BACKEND)),
            Err(e) => Err(io_error(e, path)),
        }
    }
}

impl ContentStore for FsStore {
    fn read_page(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let (file_path, _) = self.resolve_existing_file(self.resolve(path)?, path)?;
        fs::read(&file_path).map_err(|e| io_error(e, path))
    }

    fn page_modified(&self, path: &str) -> Result<SystemTime, StorageError> {
        let (_, meta) = self.resolve_existing_file(self.resolve(path)?, path)?;
        meta.modified().map_err(|e| io_error(e, path))
    }

    fn write_page(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let file_path = self.resolve(path)?;
        if file_path == self.root {
            return Err(StorageError::invalid_input("page path cannot be the storage root")
                .with_backend(BACKEND));
        }
        if file_path.is_dir() {
            return Err(StorageError::new(StorageErrorKind::AlreadyExists)
                .with_path(path)
                .with_backend(BACKEND));
        }

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(e, path))?;
        }
        fs::write(&file_path, content).map_err(|e| io_error(e, path))?;

        tracing::debug!(path, bytes = content.len(), "Saved page");
        Ok(())
    }

    fn delete_page(&self, path: &str) -> Result<(), StorageError> {
        let (file_path, _) = self.resolve_existing_file(self.resolve(path)?, path)?;
        fs::remove_file(&file_path).map_err(|e| io_error(e, path))?;

        tracing::debug!(path, "Deleted page");
        Ok(())
    }

    fn list_directory(&self, path: &str) -> Result<Vec<Entry>, StorageError> {
        let dir_path = self.resolve_existing_dir(path)?;
        let entries = fs::read_dir(&dir_path).map_err(|e| io_error(e, path))?;

        Ok(entries
            .filter_map(Result::ok)
            .map(|e| {
                let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
                Entry {
                    name: e.file_name().to_string_lossy().into_owned(),
                    kind: if is_dir { EntryKind::Dir } else { EntryKind::File },
                }
            })
            .collect())
    }

    fn create_directory(&self, parent: &str, name: &str) -> Result<(), StorageError> {
        let target = self.resolve_child(parent, name)?;
        self.resolve_existing_dir(parent)?;

        fs::create_dir(&target).map_err(|e| {
            let client_path = Path::new(parent).join(name);
            StorageError::io(e, Some(client_path)).with_backend(BACKEND)
        })?;

        tracing::debug!(parent, name, "Created directory");
        Ok(())
    }

    fn delete_directory(&self, path: &str) -> Result<(), StorageError> {
        let dir_path = self.resolve_existing_dir(path)?;
        if dir_path == self.root {
            return Err(
                StorageError::invalid_input("cannot delete the storage root").with_backend(BACKEND)
            );
        }

        let mut children = fs::read_dir(&dir_path).map_err(|e| io_error(e, path))?;
        if children.next().is_some() {
            return Err(StorageError::new(StorageErrorKind::NotEmpty)
                .with_path(path)
                .with_backend(BACKEND));
        }
        fs::remove_dir(&dir_path).map_err(|e| io_error(e, path))?;

        tracing::debug!(path, "Deleted directory");
        Ok(())
    }

    fn upload_file(
        &self,
        dir: &str,
        filename: &str,
        content: &mut dyn Read,
        max_bytes: u64,
    ) -> Result<(), StorageError> {
        let target = self.resolve_child(dir, filename)?;
        self.resolve_existing_dir(dir)?;
        if target.is_dir() {
            return Err(StorageError::new(StorageErrorKind::AlreadyExists)
                .with_path(Path::new(dir).join(filename))
                .with_backend(BACKEND));
        }

        // Read one byte past the cap so overflow is detectable without
        // buffering the rest of the stream.
        let mut buffer = Vec::new();
        content
            .take(max_bytes.saturating_add(1))
            .read_to_end(&mut buffer)
            .map_err(|e| StorageError::io(e, None).with_backend(BACKEND))?;
        if buffer.len() as u64 > max_bytes {
            return Err(StorageError::new(StorageErrorKind::PayloadTooLarge)
                .with_path(Path::new(dir).join(filename))
                .with_backend(BACKEND));
        }

        fs::write(&target, &buffer).map_err(|e| {
            StorageError::io(e, Some(Path::new(dir).join(filename))).with_backend(BACKEND)
        })?;

        tracing::debug!(dir, filename, bytes = buffer.len(), "Stored upload");
        Ok(())
    }

    fn delete_file(&self, dir: &str, filename: &str) -> Result<(), StorageError> {
        let client_path = Path::new(dir).join(filename);
        let client_path = client_path.to_string_lossy();
        let (file_path, _) =
            self.resolve_existing_file(self.resolve_child(dir, filename)?, &client_path)?;
        fs::remove_file(&file_path).map_err(|e| io_error(e, &client_path))?;

        tracing::debug!(dir, filename, "Deleted file");
        Ok(())
    }

    fn search(&self, query: &str) -> Result<Vec<SearchHit>, StorageError> {
        SearchEngine::new(&self.root)
            .search(query)
            .map_err(|e| e.with_backend(BACKEND))
    }
}
