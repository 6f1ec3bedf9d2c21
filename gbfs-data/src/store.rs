//! SQLite-backed [`FeedStore`].
//!
//! Queries run on Tokio's blocking pool against a single mutex-guarded
//! connection. Station and vehicle membership is read from the JSON arrays on
//! the network row, so rows left behind by older snapshots are never served.

use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use camino::Utf8Path;
use gbfs_core::{
    FeedStore, Network, NetworkRow, RowDecodeError, Station, StationRow, StoreError, Timestamp,
    Vehicle, VehicleRow, VehicleTypePresence,
};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use crate::schema::{SchemaError, ensure_current, open_database};

/// Errors raised by [`SqliteFeedStore`].
#[derive(Debug, Error)]
pub enum SqliteFeedStoreError {
    /// Opening or validating the database failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A query failed.
    #[error("failed to {operation}")]
    Query {
        /// What the store was doing.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A row held malformed JSON.
    #[error(transparent)]
    Decode(#[from] RowDecodeError),
    /// The blocking worker panicked or was cancelled.
    #[error("database worker failed while trying to {operation}")]
    Worker {
        /// What the store was doing.
        operation: &'static str,
        /// Join failure reported by Tokio.
        #[source]
        source: tokio::task::JoinError,
    },
    /// A previous query panicked while holding the connection.
    #[error("database connection is poisoned")]
    Poisoned,
}

impl From<SqliteFeedStoreError> for StoreError {
    fn from(err: SqliteFeedStoreError) -> Self {
        match err {
            SqliteFeedStoreError::Decode(source) => Self::Decode(source),
            other => Self::backend(other),
        }
    }
}

fn query(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> SqliteFeedStoreError {
    move |source| SqliteFeedStoreError::Query { operation, source }
}

const NETWORK: &str = "SELECT tag, name, meta, stations, vehicles, updated
    FROM networks WHERE tag = ?1";

const STATIONS: &str = "SELECT s.hash, s.name, s.latitude, s.longitude, s.stat
    FROM networks n, json_each(n.stations) AS member
    JOIN stations s ON s.hash = member.value
    WHERE n.tag = ?1
    ORDER BY s.hash";

const VEHICLES: &str = "SELECT v.hash, v.latitude, v.longitude, v.kind, v.stat
    FROM networks n, json_each(n.vehicles) AS member
    JOIN vehicles v ON v.hash = member.value
    WHERE n.tag = ?1
    ORDER BY v.hash";

const OBSERVATIONS: &str = "SELECT observed FROM (
        SELECT json_extract(s.stat, '$.timestamp') AS observed
        FROM networks n, json_each(n.stations) AS member
        JOIN stations s ON s.hash = member.value
        WHERE ?1 IS NULL OR n.tag = ?1
        UNION ALL
        SELECT json_extract(v.stat, '$.timestamp')
        FROM networks n, json_each(n.vehicles) AS member
        JOIN vehicles v ON v.hash = member.value
        WHERE ?1 IS NULL OR n.tag = ?1
    ) WHERE observed IS NOT NULL";

/// Read-only feed store over a migrated SQLite database.
pub struct SqliteFeedStore {
    connection: Arc<Mutex<Connection>>,
}

impl fmt::Debug for SqliteFeedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteFeedStore").finish_non_exhaustive()
    }
}

impl SqliteFeedStore {
    /// Open the database at `path`.
    ///
    /// # Errors
    /// Fails when the file cannot be opened or its schema is not current.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteFeedStoreError> {
        Self::from_connection(open_database(path)?)
    }

    /// Wrap an already opened connection.
    ///
    /// # Errors
    /// Fails when the schema is not current.
    pub fn from_connection(connection: Connection) -> Result<Self, SqliteFeedStoreError> {
        ensure_current(&connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    async fn run<T, F>(&self, operation: &'static str, work: F) -> Result<T, SqliteFeedStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, SqliteFeedStoreError> + Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let guard = connection
                .lock()
                .map_err(|_| SqliteFeedStoreError::Poisoned)?;
            work(&guard)
        })
        .await
        .map_err(|source| SqliteFeedStoreError::Worker { operation, source })?
    }

    async fn network(&self, tag: &str) -> Result<Option<Network>, SqliteFeedStoreError> {
        let tag = tag.to_owned();
        self.run("load network", move |connection| {
            let row = connection
                .query_row(NETWORK, params![tag], |row| {
                    Ok(NetworkRow {
                        tag: row.get(0)?,
                        name: row.get(1)?,
                        meta: row.get(2)?,
                        stations: row.get(3)?,
                        vehicles: row.get(4)?,
                        updated: row.get(5)?,
                    })
                })
                .optional()
                .map_err(query("load network"))?;
            Ok(row.map(Network::try_from).transpose()?)
        })
        .await
    }

    async fn stations(&self, tag: &str) -> Result<Vec<Station>, SqliteFeedStoreError> {
        let tag = tag.to_owned();
        self.run("load stations", move |connection| {
            let mut statement = connection
                .prepare_cached(STATIONS)
                .map_err(query("load stations"))?;
            let rows = statement
                .query_map(params![tag], |row| {
                    Ok(StationRow {
                        hash: row.get(0)?,
                        name: row.get(1)?,
                        latitude: row.get(2)?,
                        longitude: row.get(3)?,
                        stat: row.get(4)?,
                    })
                })
                .map_err(query("load stations"))?;
            let mut stations = Vec::new();
            for row in rows {
                stations.push(Station::try_from(row.map_err(query("load stations"))?)?);
            }
            Ok(stations)
        })
        .await
    }

    async fn vehicles(&self, tag: &str) -> Result<Vec<Vehicle>, SqliteFeedStoreError> {
        let tag = tag.to_owned();
        self.run("load vehicles", move |connection| {
            let mut statement = connection
                .prepare_cached(VEHICLES)
                .map_err(query("load vehicles"))?;
            let rows = statement
                .query_map(params![tag], |row| {
                    Ok(VehicleRow {
                        hash: row.get(0)?,
                        latitude: row.get(1)?,
                        longitude: row.get(2)?,
                        kind: row.get(3)?,
                        stat: row.get(4)?,
                    })
                })
                .map_err(query("load vehicles"))?;
            let mut vehicles = Vec::new();
            for row in rows {
                vehicles.push(Vehicle::try_from(row.map_err(query("load vehicles"))?)?);
            }
            Ok(vehicles)
        })
        .await
    }

    async fn exists(&self, tag: &str) -> Result<bool, SqliteFeedStoreError> {
        let tag = tag.to_owned();
        self.run("check network", move |connection| {
            connection
                .query_row(
                    "SELECT 1 FROM networks WHERE tag = ?1 LIMIT 1",
                    params![tag],
                    |_| Ok(()),
                )
                .optional()
                .map(|found| found.is_some())
                .map_err(query("check network"))
        })
        .await
    }

    async fn last_updated(
        &self,
        tag: Option<&str>,
    ) -> Result<Option<Timestamp>, SqliteFeedStoreError> {
        let tag = tag.map(str::to_owned);
        self.run("read last update", move |connection| {
            let mut statement = connection
                .prepare_cached(OBSERVATIONS)
                .map_err(query("read last update"))?;
            let observed = statement
                .query_map(params![tag], |row| row.get::<_, String>(0))
                .map_err(query("read last update"))?
                .map(|row| row.map(Timestamp::new))
                .collect::<Result<Vec<_>, _>>()
                .map_err(query("read last update"))?;
            Ok(Timestamp::newest(observed))
        })
        .await
    }

    async fn tags(&self) -> Result<Vec<String>, SqliteFeedStoreError> {
        self.run("list networks", |connection| {
            let mut statement = connection
                .prepare_cached("SELECT tag FROM networks ORDER BY tag")
                .map_err(query("list networks"))?;
            let tags = statement
                .query_map([], |row| row.get(0))
                .map_err(query("list networks"))?
                .collect::<Result<Vec<String>, _>>()
                .map_err(query("list networks"))?;
            Ok(tags)
        })
        .await
    }
}

#[async_trait]
impl FeedStore for SqliteFeedStore {
    async fn get_network(&self, tag: &str) -> Result<Option<Network>, StoreError> {
        Ok(self.network(tag).await?)
    }

    async fn get_stations(&self, tag: &str) -> Result<Vec<Station>, StoreError> {
        Ok(self.stations(tag).await?)
    }

    async fn get_vehicles(&self, tag: &str) -> Result<Vec<Vehicle>, StoreError> {
        Ok(self.vehicles(tag).await?)
    }

    async fn network_exists(&self, tag: &str) -> Result<bool, StoreError> {
        Ok(self.exists(tag).await?)
    }

    async fn get_last_updated(&self, tag: Option<&str>) -> Result<Option<Timestamp>, StoreError> {
        Ok(self.last_updated(tag).await?)
    }

    async fn vehicle_types(&self, tag: &str) -> Result<VehicleTypePresence, StoreError> {
        let stations = self.stations(tag).await?;
        let vehicles = self.vehicles(tag).await?;
        Ok(VehicleTypePresence::from_inventory(&stations, &vehicles))
    }

    async fn get_tags(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.tags().await?)
    }
}
