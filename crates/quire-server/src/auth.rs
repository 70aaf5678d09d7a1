//! Bearer token authentication for mutating routes.
//!
//! Tokens are loaded once at startup from a plain-text file (one token per
//! line) into an immutable [`TokenSet`]. Mutating handlers take an
//! [`Authorized`] extractor as their first argument, so unauthenticated
//! requests are rejected before the body is read.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::error::ServerError;
use crate::state::AppState;

/// Authorization scheme prefix, including the separating space.
const BEARER_PREFIX: &str = "Bearer ";

/// Immutable set of accepted bearer tokens.
#[derive(Debug, Default, Clone)]
pub struct TokenSet {
    tokens: HashSet<String>,
}

impl TokenSet {
    /// Parse tokens from text, one per line.
    ///
    /// Lines are trimmed and blank lines are ignored.
    pub fn from_lines(text: &str) -> Self {
        let tokens = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        Self { tokens }
    }

    /// Load tokens from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_lines(&text))
    }

    /// Number of loaded tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no token is loaded.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Exact membership test.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// Check an `Authorization` header value.
    ///
    /// Accepts exactly `Bearer <token>` where the trimmed token is non-empty
    /// and present in the set.
    pub(crate) fn authorize(&self, header_value: Option<&str>) -> Result<(), ServerError> {
        let value = header_value.ok_or(ServerError::Unauthorized("missing Authorization header"))?;
        let token = value
            .strip_prefix(BEARER_PREFIX)
            .ok_or(ServerError::Unauthorized("expected Bearer token"))?
            .trim();

        if token.is_empty() || !self.contains(token) {
            return Err(ServerError::Unauthorized("invalid token"));
        }
        Ok(())
    }
}

/// Proof that the request carried a valid bearer token.
pub(crate) struct Authorized;

impl FromRequestParts<Arc<AppState>> for Authorized {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .map(|value| {
                value
                    .to_str()
                    .map_err(|_| ServerError::Unauthorized("invalid Authorization header"))
            })
            .transpose()?;

        state.tokens.authorize(header_value)?;
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> TokenSet {
        TokenSet::from_lines("alpha\n  beta  \n\n\t\ngamma-123\n")
    }

    #[test]
    fn test_from_lines_trims_and_skips_blank_lines() {
        let set = tokens();

        assert_eq!(set.len(), 3);
        assert!(set.contains("alpha"));
        assert!(set.contains("beta"));
        assert!(set.contains("gamma-123"));
        assert!(!set.contains(""));
    }

    #[test]
    fn test_load_reads_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("auth_tokens.txt");
        std::fs::write(&path, "one\r\ntwo\r\n").unwrap();

        let set = TokenSet::load(&path).unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.contains("one"));
        assert!(set.contains("two"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let temp_dir = tempfile::tempdir().unwrap();

        let result = TokenSet::load(&temp_dir.path().join("missing.txt"));

        assert!(result.is_err());
    }

    #[test]
    fn test_authorize_accepts_known_token() {
        assert!(tokens().authorize(Some("Bearer alpha")).is_ok());
        assert!(tokens().authorize(Some("Bearer beta")).is_ok());
    }

    #[test]
    fn test_authorize_trims_token() {
        assert!(tokens().authorize(Some("Bearer   alpha  ")).is_ok());
    }

    #[test]
    fn test_authorize_rejects_bad_headers() {
        let set = tokens();
        for value in [
            None,
            Some(""),
            Some("alpha"),
            Some("bearer alpha"),
            Some("Basic alpha"),
            Some("Bearer"),
            Some("Bearer "),
            Some("Bearer    "),
            Some("Bearer delta"),
            Some("Bearer alph"),
        ] {
            let result = set.authorize(value);
            assert!(
                matches!(result, Err(ServerError::Unauthorized(_))),
                "{value:?}"
            );
        }
    }

    #[test]
    fn test_empty_set_rejects_everything() {
        let set = TokenSet::default();

        assert!(set.is_empty());
        assert!(set.authorize(Some("Bearer anything")).is_err());
    }
}
