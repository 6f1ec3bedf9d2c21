//! Loading network snapshots into the database.
//!
//! A snapshot is the JSON message published by the Citybikes ingestion bus
//! for one network: its metadata plus the current state of every station
//! and free-floating vehicle. A snapshot file holds one message or an array
//! of them.

use std::io::BufReader;

use camino::{Utf8Path, Utf8PathBuf};
use gbfs_core::Timestamp;
use log::{info, warn};
use rusqlite::{Connection, Error as SqliteError, Transaction, params};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::fs::open_utf8_file;

/// Network metadata as published upstream.
///
/// Keys beyond name and position are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    /// Display name.
    pub name: String,
    /// Latitude of the network centre.
    pub latitude: Option<f64>,
    /// Longitude of the network centre.
    pub longitude: Option<f64>,
    /// Remaining metadata (companies, licence, city, ...).
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// One station in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSnapshot {
    /// Globally unique station hash.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Latitude.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Bikes available.
    #[serde(default)]
    pub bikes: Option<i64>,
    /// Free docks.
    #[serde(default)]
    pub free: Option<i64>,
    /// Observation time.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Vendor specific attributes.
    #[serde(default)]
    pub extra: Map<String, Value>,
}

/// One free-floating vehicle in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    /// Globally unique vehicle hash.
    pub id: String,
    /// Latitude.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Upstream vehicle kind such as `bike` or `scooter`.
    pub kind: String,
    /// Observation time.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Vendor specific attributes.
    #[serde(default)]
    pub extra: Map<String, Value>,
}

/// A full network snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    /// Network tag.
    pub tag: String,
    /// Network metadata.
    pub meta: SnapshotMeta,
    /// Current stations.
    #[serde(default)]
    pub stations: Vec<StationSnapshot>,
    /// Current free-floating vehicles.
    #[serde(default)]
    pub vehicles: Vec<VehicleSnapshot>,
}

impl NetworkSnapshot {
    /// Whether the snapshot lists neither stations nor vehicles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty() && self.vehicles.is_empty()
    }

    fn newest_observation(&self) -> Option<String> {
        let stations = self.stations.iter().filter_map(|s| s.timestamp.as_deref());
        let vehicles = self.vehicles.iter().filter_map(|v| v.timestamp.as_deref());
        Timestamp::newest(stations.chain(vehicles).map(Timestamp::new)).map(|ts| ts.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    Many(Vec<NetworkSnapshot>),
    One(Box<NetworkSnapshot>),
}

/// Outcome of importing one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Network tag.
    pub tag: String,
    /// Whether the network row was written. Empty updates to known networks
    /// are ignored.
    pub network_written: bool,
    /// Stations written.
    pub stations: usize,
    /// Vehicles written.
    pub vehicles: usize,
    /// Orphaned station rows deleted.
    pub removed_stations: usize,
    /// Orphaned vehicle rows deleted.
    pub removed_vehicles: usize,
}

/// Errors raised while importing snapshots.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The snapshot file could not be read.
    #[error("failed to read snapshot {path}")]
    Read {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The snapshot file is not valid JSON of the expected shape.
    #[error("failed to parse snapshot {path}")]
    Parse {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Serialising a stored JSON column failed.
    #[error("failed to encode {column} for {uid}")]
    Encode {
        /// Column being encoded.
        column: &'static str,
        /// Entity identifier.
        uid: String,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Beginning the transaction failed.
    #[error("failed to begin import transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Writing a row failed.
    #[error("failed to write {entity} {uid}")]
    Write {
        /// Kind of row.
        entity: &'static str,
        /// Row identifier.
        uid: String,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Deleting orphaned rows failed.
    #[error("failed to delete orphaned {entity} rows")]
    CollectOrphans {
        /// Kind of row.
        entity: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Committing the transaction failed.
    #[error("failed to commit import transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Read the snapshots stored in `path`.
///
/// # Errors
/// Fails when the file cannot be opened or parsed.
pub fn load_snapshots(path: &Utf8Path) -> Result<Vec<NetworkSnapshot>, ImportError> {
    let file = open_utf8_file(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document: SnapshotDocument =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ImportError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(match document {
        SnapshotDocument::Many(snapshots) => snapshots,
        SnapshotDocument::One(snapshot) => vec![*snapshot],
    })
}

/// Import one snapshot in a single transaction.
///
/// The network row is upserted unless the snapshot is empty and the network
/// already exists. Station and vehicle rows are upserted, then rows no
/// network references any more are deleted.
///
/// # Errors
/// Fails when any statement fails; nothing is written in that case.
pub fn import_snapshot(
    connection: &mut Connection,
    snapshot: &NetworkSnapshot,
) -> Result<ImportSummary, ImportError> {
    let transaction = connection
        .transaction()
        .map_err(|source| ImportError::BeginTransaction { source })?;

    let mut summary = ImportSummary {
        tag: snapshot.tag.clone(),
        network_written: upsert_network(&transaction, snapshot)?,
        ..ImportSummary::default()
    };
    if summary.network_written {
        summary.stations = upsert_stations(&transaction, snapshot)?;
        summary.vehicles = upsert_vehicles(&transaction, snapshot)?;
        summary.removed_stations = collect_orphans(&transaction, "stations")?;
        summary.removed_vehicles = collect_orphans(&transaction, "vehicles")?;
    } else {
        warn!("[{}] ignoring snapshot without stations or vehicles", snapshot.tag);
    }

    transaction
        .commit()
        .map_err(|source| ImportError::Commit { source })?;
    info!(
        "[{}] imported {} stations and {} vehicles",
        summary.tag, summary.stations, summary.vehicles
    );
    Ok(summary)
}

fn encode(column: &'static str, uid: &str, value: &impl Serialize) -> Result<String, ImportError> {
    serde_json::to_string(value).map_err(|source| ImportError::Encode {
        column,
        uid: uid.to_owned(),
        source,
    })
}

fn upsert_network(
    transaction: &Transaction<'_>,
    snapshot: &NetworkSnapshot,
) -> Result<bool, ImportError> {
    let tag = snapshot.tag.as_str();
    let meta = encode("meta", tag, &snapshot.meta)?;
    let stations = encode(
        "stations",
        tag,
        &snapshot.stations.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
    )?;
    let vehicles = encode(
        "vehicles",
        tag,
        &snapshot.vehicles.iter().map(|v| v.id.as_str()).collect::<Vec<_>>(),
    )?;
    let written = transaction
        .execute(
            "INSERT INTO networks (tag, name, latitude, longitude, meta, stations, vehicles, updated)
            VALUES (?1, ?2, ?3, ?4, json(?5), json(?6), json(?7), ?8)
            ON CONFLICT(tag) DO UPDATE SET
                name = excluded.name,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                meta = excluded.meta,
                stations = excluded.stations,
                vehicles = excluded.vehicles,
                updated = excluded.updated
            WHERE excluded.stations != '[]' OR excluded.vehicles != '[]'",
            params![
                tag,
                snapshot.meta.name,
                snapshot.meta.latitude,
                snapshot.meta.longitude,
                meta,
                stations,
                vehicles,
                snapshot.newest_observation(),
            ],
        )
        .map_err(|source| ImportError::Write {
            entity: "network",
            uid: tag.to_owned(),
            source,
        })?;
    Ok(written > 0)
}

fn upsert_stations(
    transaction: &Transaction<'_>,
    snapshot: &NetworkSnapshot,
) -> Result<usize, ImportError> {
    let write = |uid: &str, source| ImportError::Write {
        entity: "station",
        uid: uid.to_owned(),
        source,
    };
    let mut statement = transaction
        .prepare(
            "INSERT INTO stations (hash, name, latitude, longitude, stat, network_tag)
            VALUES (?1, ?2, ?3, ?4, json(?5), ?6)
            ON CONFLICT(hash) DO UPDATE SET
                name = excluded.name,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                stat = excluded.stat,
                network_tag = excluded.network_tag",
        )
        .map_err(|source| write(&snapshot.tag, source))?;
    for station in &snapshot.stations {
        let stat = encode(
            "stat",
            &station.id,
            &json!({
                "bikes": station.bikes,
                "free": station.free,
                "timestamp": station.timestamp,
                "extra": station.extra,
            }),
        )?;
        statement
            .execute(params![
                station.id,
                station.name,
                station.latitude,
                station.longitude,
                stat,
                snapshot.tag,
            ])
            .map_err(|source| write(&station.id, source))?;
    }
    Ok(snapshot.stations.len())
}

fn upsert_vehicles(
    transaction: &Transaction<'_>,
    snapshot: &NetworkSnapshot,
) -> Result<usize, ImportError> {
    let write = |uid: &str, source| ImportError::Write {
        entity: "vehicle",
        uid: uid.to_owned(),
        source,
    };
    let mut statement = transaction
        .prepare(
            "INSERT INTO vehicles (hash, latitude, longitude, kind, stat, network_tag)
            VALUES (?1, ?2, ?3, ?4, json(?5), ?6)
            ON CONFLICT(hash) DO UPDATE SET
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                kind = excluded.kind,
                stat = excluded.stat,
                network_tag = excluded.network_tag",
        )
        .map_err(|source| write(&snapshot.tag, source))?;
    for vehicle in &snapshot.vehicles {
        let stat = encode(
            "stat",
            &vehicle.id,
            &json!({
                "timestamp": vehicle.timestamp,
                "extra": vehicle.extra,
            }),
        )?;
        statement
            .execute(params![
                vehicle.id,
                vehicle.latitude,
                vehicle.longitude,
                vehicle.kind,
                stat,
                snapshot.tag,
            ])
            .map_err(|source| write(&vehicle.id, source))?;
    }
    Ok(snapshot.vehicles.len())
}

/// Delete rows from `table` that no network lists as a member.
fn collect_orphans(transaction: &Transaction<'_>, table: &'static str) -> Result<usize, ImportError> {
    let sql = format!(
        "DELETE FROM {table} WHERE hash NOT IN (
            SELECT member.value FROM networks n, json_each(n.{table}) AS member
        )"
    );
    transaction
        .execute(&sql, [])
        .map_err(|source| ImportError::CollectOrphans {
            entity: table,
            source,
        })
}
