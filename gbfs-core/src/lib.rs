//! Core domain types for the Citybikes GBFS service.
//!
//! Responsibilities:
//! - Describe the vehicle taxonomy shared by every GBFS version.
//! - Infer per-type vehicle counts from loosely typed inventory data.
//! - Model persisted networks, stations and vehicles.
//! - Define the [`FeedStore`] seam between feed construction and storage.
//!
//! Boundaries:
//! - No wire formats live here; GBFS documents are shaped in `gbfs-feeds`.
//! - No storage engine lives here; SQLite support is in `gbfs-data`.
#![forbid(unsafe_code)]

pub mod inference;
pub mod model;
pub mod store;
pub mod taxonomy;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use inference::{
    VehicleCount, VehicleTally, infer_station_counts, station_type_keys, tally_vehicle_kinds,
};
pub use model::{
    License, Network, NetworkMeta, NetworkRow, RowDecodeError, Station, StationExtra, StationRow,
    StationStat, Timestamp, Vehicle, VehicleExtra, VehicleRow, VehicleStat,
};
pub use store::{FeedStore, StoreError, VehicleTypePresence};
pub use taxonomy::{
    FormFactor, Propulsion, TypeKey, UnknownTypeKey, VehicleClass, VehicleDescriptor,
    descriptor_for,
};
