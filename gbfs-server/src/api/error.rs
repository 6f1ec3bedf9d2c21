//! HTTP error mapping for feed requests.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gbfs_feeds::FeedBuildError;
use log::{error, warn};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested network or feed does not exist.
    #[error("{message}")]
    NotFound {
        /// Human readable description.
        message: String,
    },
    /// Feed construction failed on the server side.
    #[error(transparent)]
    Internal(FeedBuildError),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Internal(FeedBuildError::Integrity(_)) => "data_integrity",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<FeedBuildError> for ApiError {
    fn from(err: FeedBuildError) -> Self {
        match err {
            FeedBuildError::NetworkNotFound { .. } | FeedBuildError::UnsupportedFeed { .. } => {
                Self::NotFound {
                    message: err.to_string(),
                }
            }
            other => Self::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::NotFound { message } => warn!("{message}"),
            Self::Internal(err) => error!("feed build failed: {err}"),
        }
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbfs_core::StoreError;
    use gbfs_feeds::{FeedError, FeedName, GbfsVersion};
    use rstest::rstest;

    #[rstest]
    fn unknown_networks_map_to_not_found() {
        let err = ApiError::from(FeedBuildError::NetworkNotFound { uid: "x".into() });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "not_found");
        assert_eq!(err.to_string(), "network x not found");
    }

    #[rstest]
    fn unsupported_feeds_map_to_not_found() {
        let err = ApiError::from(FeedBuildError::UnsupportedFeed {
            version: GbfsVersion::V3,
            feed: FeedName::GbfsVersions,
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    fn integrity_failures_are_server_errors() {
        let err = ApiError::from(FeedBuildError::Integrity(FeedError::MissingField {
            entity: "station",
            uid: "s1".into(),
            field: "latitude",
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "data_integrity");
    }

    #[rstest]
    fn store_failures_are_server_errors() {
        let err = ApiError::from(FeedBuildError::Store(StoreError::backend(
            std::io::Error::other("disk on fire"),
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "internal_error");
    }
}
