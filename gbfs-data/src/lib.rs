//! SQLite persistence for the Citybikes GBFS service.
//!
//! Responsibilities:
//! - Create and migrate the database schema.
//! - Import network snapshots published by the ingestion bus.
//! - Serve persisted data through [`gbfs_core::FeedStore`].
//!
//! Boundaries:
//! - Do not shape GBFS documents (live in `gbfs-feeds`).
//! - Keep blocking SQLite calls off async executors.
#![forbid(unsafe_code)]

mod fs;
pub mod import;
pub mod schema;
mod store;

pub use import::{
    ImportError, ImportSummary, NetworkSnapshot, SnapshotMeta, StationSnapshot, VehicleSnapshot,
    import_snapshot, load_snapshots,
};
pub use schema::{
    MigrationReport, SCHEMA_VERSION, SchemaError, ensure_current, migrate, open_database,
    schema_version,
};
pub use store::{SqliteFeedStore, SqliteFeedStoreError};
