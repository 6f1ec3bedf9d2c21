//! Errors raised while shaping GBFS documents.

use gbfs_core::StoreError;
use thiserror::Error;

use crate::{FeedName, GbfsVersion};

/// An entity lacks data a feed requires.
///
/// These are data-integrity failures: the request was valid but what is
/// stored cannot be published.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedError {
    /// A required field is absent.
    #[error("{entity} {uid} is missing required field {field}")]
    MissingField {
        /// Kind of entity.
        entity: &'static str,
        /// Identifier of the entity.
        uid: String,
        /// Name of the absent field.
        field: &'static str,
    },
    /// A timestamp could not be parsed as ISO-8601.
    #[error("{entity} {uid} has an unparseable timestamp {value:?}")]
    InvalidTimestamp {
        /// Kind of entity.
        entity: &'static str,
        /// Identifier of the entity.
        uid: String,
        /// The offending value.
        value: String,
        /// Parser failure.
        #[source]
        source: chrono::ParseError,
    },
}

/// Errors returned by [`crate::build_feed`].
#[derive(Debug, Error)]
pub enum FeedBuildError {
    /// The requested network does not exist.
    #[error("network {uid} not found")]
    NetworkNotFound {
        /// Requested network tag.
        uid: String,
    },
    /// The feed is not part of the requested version.
    #[error("feed {feed} is not served by GBFS {version}")]
    UnsupportedFeed {
        /// Requested version.
        version: GbfsVersion,
        /// Requested feed.
        feed: FeedName,
    },
    /// A network-scoped feed was requested without a network.
    #[error("feed {feed} requires a network")]
    MissingNetwork {
        /// Requested feed.
        feed: FeedName,
    },
    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Stored data cannot be published.
    #[error(transparent)]
    Integrity(#[from] FeedError),
}
