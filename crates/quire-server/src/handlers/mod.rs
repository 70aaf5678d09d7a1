//! HTTP request handlers.
//!
//! Reads and search are open. Every mutating handler takes
//! [`Authorized`](crate::auth::Authorized) as its first extractor.

pub(crate) mod dirs;
pub(crate) mod pages;
pub(crate) mod search;
pub(crate) mod uploads;

use serde::Deserialize;

use crate::error::ServerError;

/// `?path=` query parameter shared by page, directory and upload routes.
///
/// A missing parameter deserializes to the empty string, which stores treat
/// as the storage root.
#[derive(Debug, Deserialize)]
pub(crate) struct PathQuery {
    #[serde(default)]
    pub(crate) path: String,
}

impl PathQuery {
    /// The path, rejecting a missing or empty one.
    pub(crate) fn required(&self) -> Result<&str, ServerError> {
        if self.path.is_empty() {
            return Err(ServerError::BadRequest("missing path parameter".to_owned()));
        }
        Ok(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_query_defaults_to_root() {
        let query: PathQuery = serde_urlencoded::from_str("").unwrap();

        assert_eq!(query.path, "");
        assert!(matches!(query.required(), Err(ServerError::BadRequest(_))));
    }

    #[test]
    fn test_path_query_required_returns_path() {
        let query: PathQuery = serde_urlencoded::from_str("path=notes%2Fa.md").unwrap();

        assert_eq!(query.required().unwrap(), "notes/a.md");
    }
}
