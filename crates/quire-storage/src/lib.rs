//! Storage abstraction for the Quire content store.
//!
//! This crate provides a [`ContentStore`] trait for the page, directory and
//! media operations the HTTP layer exposes, independent of the backend that
//! performs them.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`ContentStore`] trait with page, directory, upload and search methods
//! - [`Entry`], [`EntryKind`] and [`SearchHit`] result types
//! - [`StorageError`] with a closed [`StorageErrorKind`] taxonomy
//! - [`resolve`] and [`resolve_child`] for confining client paths to the
//!   storage root
//!
//! The filesystem backend lives in `quire-storage-fs`.
//!
//! # Example
//!
//! ```ignore
//! use quire_storage::ContentStore;
//! use quire_storage_fs::FsStore;
//!
//! let store = FsStore::open("content")?;
//! store.write_page("notes/a.md", b"hello")?;
//! for entry in store.list_directory("notes")? {
//!     println!("{} ({:?})", entry.name, entry.kind);
//! }
//! ```

mod path;
mod storage;

pub use path::{resolve, resolve_child};
pub use storage::{
    ContentStore, DEFAULT_MAX_UPLOAD_BYTES, Entry, EntryKind, SearchHit, StorageError,
    StorageErrorKind,
};
