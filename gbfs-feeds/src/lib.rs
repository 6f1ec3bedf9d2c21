//! GBFS 2.3 and 3.0 documents built from the Citybikes domain model.
//!
//! Each version has its own adapter module ([`v2`], [`v3`]) turning shared
//! domain entities into that version's wire structures. Version-independent
//! rules (coordinate rounding, count clamping, rental methods, vehicle type
//! resolution, discovery links) live beside them and are reused by both.
//! [`build_feed`] ties the pieces together for one request.
#![forbid(unsafe_code)]

mod discovery;
pub mod envelope;
mod error;
pub mod i18n;
mod pipeline;
mod publisher;
mod shape;
mod urls;
pub mod v2;
pub mod v3;
mod version;
pub mod wire;

pub use discovery::{DatasetLinks, FeedLink, VersionLink, feed_index, manifest_datasets, version_links};
pub use envelope::Envelope;
pub use error::{FeedBuildError, FeedError};
pub use pipeline::{FeedContext, FeedDocument, FeedRequest, build_feed};
pub use publisher::Publisher;
pub use shape::{TypedCount, published_vehicle_types, station_type_counts, vehicle_descriptor};
pub use urls::{BaseUrl, UrlResolver};
pub use version::{FeedName, GbfsVersion};
