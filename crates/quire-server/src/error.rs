//! Error types for the HTTP server.
//!
//! Every failure is answered with a plain-text body and exactly one status
//! code per error kind.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use quire_storage::{StorageError, StorageErrorKind};

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Malformed request (missing parameter, bad body).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or rejected bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    /// Storage operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServerError {
    /// HTTP status for this error.
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Storage(e) => match e.kind() {
                StorageErrorKind::InvalidInput | StorageErrorKind::PathEscape => {
                    StatusCode::BAD_REQUEST
                }
                StorageErrorKind::NotFound => StatusCode::NOT_FOUND,
                StorageErrorKind::AlreadyExists | StorageErrorKind::NotEmpty => {
                    StatusCode::CONFLICT
                }
                StorageErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
                StorageErrorKind::Io => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = match &self {
            // Internal details stay in the log.
            Self::Storage(e) if e.kind() == StorageErrorKind::Io => "Internal error".to_owned(),
            _ => self.to_string(),
        };

        if matches!(self, Self::Unauthorized(_)) {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(kind: StorageErrorKind) -> ServerError {
        ServerError::Storage(StorageError::new(kind))
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ServerError::BadRequest("x".to_owned()), StatusCode::BAD_REQUEST),
            (ServerError::Unauthorized("x"), StatusCode::UNAUTHORIZED),
            (storage(StorageErrorKind::InvalidInput), StatusCode::BAD_REQUEST),
            (storage(StorageErrorKind::PathEscape), StatusCode::BAD_REQUEST),
            (storage(StorageErrorKind::NotFound), StatusCode::NOT_FOUND),
            (storage(StorageErrorKind::AlreadyExists), StatusCode::CONFLICT),
            (storage(StorageErrorKind::NotEmpty), StatusCode::CONFLICT),
            (
                storage(StorageErrorKind::PayloadTooLarge),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                storage(StorageErrorKind::Io),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status(), expected, "{error:?}");
        }
    }

    #[test]
    fn test_unauthorized_sets_challenge_header() {
        let response = ServerError::Unauthorized("missing token").into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn test_io_error_body_hides_details() {
        let error = ServerError::Storage(
            StorageError::new(StorageErrorKind::Io).with_path("/srv/secret/location"),
        );

        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_storage_error_display_is_transparent() {
        let error = storage(StorageErrorKind::NotEmpty);

        assert_eq!(error.to_string(), "Directory not empty");
    }
}
