//! Persisted Citybikes entities.
//!
//! Stores hand back rows made of flat columns plus embedded JSON blobs. The
//! `*Row` types mirror those rows and convert into the domain entities with
//! `TryFrom`, renaming the persisted keys (`tag`, `hash`) to `uid` on the way.

use thiserror::Error;

mod network;
mod station;
mod timestamp;
mod vehicle;

pub use network::{License, Network, NetworkMeta, NetworkRow};
pub use station::{Station, StationExtra, StationRow, StationStat};
pub use timestamp::Timestamp;
pub use vehicle::{Vehicle, VehicleExtra, VehicleRow, VehicleStat};

/// A persisted JSON blob could not be decoded into its entity.
#[derive(Debug, Error)]
#[error("failed to decode {field} of {entity} {uid}: {source}")]
pub struct RowDecodeError {
    /// Kind of entity being decoded.
    pub entity: &'static str,
    /// Identifier of the offending row.
    pub uid: String,
    /// Column holding the malformed blob.
    pub field: &'static str,
    /// JSON decoding failure.
    #[source]
    pub source: serde_json::Error,
}
