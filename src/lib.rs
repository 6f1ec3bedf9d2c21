//! Facade crate for the Citybikes GBFS service.
//!
//! This crate re-exports the domain model and the feed builders, and exposes
//! the SQLite store and the HTTP surface behind feature flags.

#![forbid(unsafe_code)]

pub use gbfs_core::{
    FeedStore, Network, Station, StoreError, TypeKey, Vehicle, VehicleCount, VehicleDescriptor,
    VehicleTypePresence, infer_station_counts,
};
pub use gbfs_feeds::{
    BaseUrl, FeedBuildError, FeedContext, FeedDocument, FeedError, FeedName, FeedRequest,
    GbfsVersion, Publisher, UrlResolver, build_feed,
};

#[cfg(feature = "store-sqlite")]
pub use gbfs_data::{SqliteFeedStore, SqliteFeedStoreError, import_snapshot, migrate};

#[cfg(feature = "server")]
pub use gbfs_server::{AppState, create_router};
