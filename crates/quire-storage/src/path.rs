//! Client path resolution.
//!
//! Every path a client sends is joined onto the storage root lexically and
//! then checked for containment component by component. No filesystem access
//! happens here, so symlinks inside the root are neither followed nor
//! rejected.

use std::path::{Component, Path, PathBuf};

use crate::storage::{StorageError, StorageErrorKind};

/// Resolve a client path to an absolute path inside `root`.
///
/// `.` segments are dropped and `..` segments remove the previous component.
/// Root and prefix components inside `relative` are ignored, so `"/notes"`
/// resolves like `"notes"`. An empty path resolves to `root` itself.
///
/// # Errors
///
/// Returns [`StorageErrorKind::PathEscape`] if the result is not `root` or a
/// descendant of it.
pub fn resolve(root: &Path, relative: &str) -> Result<PathBuf, StorageError> {
    let mut resolved = root.to_path_buf();

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(segment) => resolved.push(segment),
            Component::ParentDir => {
                // Popping past the root is caught by the containment check.
                resolved.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    // Path::starts_with compares whole components: "/data2/x" is not under "/data".
    if resolved.starts_with(root) {
        Ok(resolved)
    } else {
        Err(StorageError::new(StorageErrorKind::PathEscape).with_path(relative))
    }
}

/// Resolve `name` inside the client directory `dir`.
///
/// # Errors
///
/// Returns [`StorageErrorKind::InvalidInput`] if `name` is not a single plain
/// path segment, or [`StorageErrorKind::PathEscape`] if `dir` escapes `root`.
pub fn resolve_child(root: &Path, dir: &str, name: &str) -> Result<PathBuf, StorageError> {
    validate_name(name)?;
    Ok(resolve(root, dir)?.join(name))
}

/// Check that `name` is usable as a single file or directory name.
///
/// # Errors
///
/// Returns [`StorageErrorKind::InvalidInput`] for empty names, `.`, `..`, or
/// names containing a path separator.
pub(crate) fn validate_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(StorageError::invalid_input(format!("invalid name: {name:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_resolve_nested_path() {
        let resolved = resolve(Path::new("/data"), "notes/a.md").unwrap();

        assert_eq!(resolved, PathBuf::from("/data/notes/a.md"));
    }

    #[test]
    fn test_resolve_empty_is_root() {
        assert_eq!(resolve(Path::new("/data"), "").unwrap(), PathBuf::from("/data"));
        assert_eq!(resolve(Path::new("/data"), ".").unwrap(), PathBuf::from("/data"));
    }

    #[test]
    fn test_resolve_collapses_dot_segments() {
        let resolved = resolve(Path::new("/data"), "./notes/../guides/./b.md").unwrap();

        assert_eq!(resolved, PathBuf::from("/data/guides/b.md"));
    }

    #[test]
    fn test_resolve_leading_slash_stays_inside_root() {
        let resolved = resolve(Path::new("/data"), "/etc/passwd").unwrap();

        assert_eq!(resolved, PathBuf::from("/data/etc/passwd"));
    }

    #[test]
    fn test_resolve_rejects_parent_escape() {
        let err = resolve(Path::new("/data"), "../etc/passwd").unwrap_err();

        assert_eq!(err.kind(), StorageErrorKind::PathEscape);
    }

    #[test]
    fn test_resolve_rejects_sibling_with_shared_prefix() {
        let err = resolve(Path::new("/data"), "../data2/x").unwrap_err();

        assert_eq!(err.kind(), StorageErrorKind::PathEscape);
    }

    #[test]
    fn test_resolve_rejects_deep_escape_after_descent() {
        let err = resolve(Path::new("/data"), "notes/../../../tmp").unwrap_err();

        assert_eq!(err.kind(), StorageErrorKind::PathEscape);
    }

    #[test]
    fn test_resolve_allows_parent_that_stays_inside() {
        let resolved = resolve(Path::new("/data"), "notes/sub/../a.md").unwrap();

        assert_eq!(resolved, PathBuf::from("/data/notes/a.md"));
    }

    #[test]
    fn test_resolve_results_are_descendants() {
        let root = Path::new("/srv/content");
        for relative in ["a", "a/b", "a/./b", "x/y/z.md", "deep/er/../est", "/lead"] {
            let resolved = resolve(root, relative).unwrap();
            assert!(resolved.starts_with(root), "{relative} -> {resolved:?}");
            assert!(!resolved.starts_with("/srv/content2"));
        }
    }

    #[test]
    fn test_resolve_child_joins_name() {
        let resolved = resolve_child(Path::new("/data"), "notes", "img.png").unwrap();

        assert_eq!(resolved, PathBuf::from("/data/notes/img.png"));
    }

    #[test]
    fn test_resolve_child_rejects_traversal_names() {
        for name in ["", ".", "..", "../x", "a/b", "a\\b"] {
            let err = resolve_child(Path::new("/data"), "notes", name).unwrap_err();
            assert_eq!(err.kind(), StorageErrorKind::InvalidInput, "{name:?}");
        }
    }

    #[test]
    fn test_resolve_child_rejects_escaping_dir() {
        let err = resolve_child(Path::new("/data"), "..", "x").unwrap_err();

        assert_eq!(err.kind(), StorageErrorKind::PathEscape);
    }
}
