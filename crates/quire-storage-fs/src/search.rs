//! Live search by filesystem walking.
//!
//! Every call walks the whole storage tree; there is no index. Entries that
//! cannot be read are skipped and the walk carries on.

use std::fs;
use std::path::{Component, Path};

use quire_storage::{SearchHit, StorageError};

/// Extension of page files whose content is searched.
const PAGE_EXTENSION: &str = "md";

/// Matches file names and page contents below a root directory.
pub(crate) struct SearchEngine<'a> {
    root: &'a Path,
}

impl<'a> SearchEngine<'a> {
    /// Create a search engine over `root`.
    pub fn new(root: &'a Path) -> Self {
        Self { root }
    }

    /// Walk the tree and return every file matching `query`.
    ///
    /// A file matches when its name contains the query, or when it is a page
    /// whose content contains the query. Both comparisons ignore case.
    /// Directories never match. Results are in traversal order.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, StorageError> {
        if query.is_empty() {
            return Err(StorageError::invalid_input("empty search query"));
        }

        let needle = query.to_lowercase();
        let mut hits = Vec::new();
        self.walk(self.root, &needle, &mut hits);
        Ok(hits)
    }

    /// Recurse into `dir`, collecting matches.
    fn walk(&self, dir: &Path, needle: &str, hits: &mut Vec<SearchHit>) {
        let Ok(entries) = fs::read_dir(dir) else {
            tracing::debug!(path = %dir.display(), "Skipping unreadable directory");
            return;
        };

        for entry in entries.filter_map(Result::ok) {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();

            if file_type.is_dir() {
                self.walk(&path, needle, hits);
                continue;
            }

            // Symlinked directories are not descended into.
            if file_type.is_symlink() && path.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if matches(&path, &name, needle)
                && let Some(rel_path) = relative_url(self.root, &path)
            {
                hits.push(SearchHit {
                    path: rel_path,
                    name,
                });
            }
        }
    }
}

/// Check a single file against the lower-cased query.
fn matches(path: &Path, name: &str, needle: &str) -> bool {
    if name.to_lowercase().contains(needle) {
        return true;
    }

    is_page(path)
        && fs::read(path).is_ok_and(|content| {
            String::from_utf8_lossy(&content)
                .to_lowercase()
                .contains(needle)
        })
}

/// Whether a file is a page (markdown document).
fn is_page(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == PAGE_EXTENSION)
}

/// Convert an absolute path below `root` to a `/`-separated relative path.
fn relative_url(root: &Path, path: &Path) -> Option<String> {
    let rel_path = path.strip_prefix(root).ok()?;
    let segments: Vec<_> = rel_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect();
    Some(segments.join("/"))
}
