//! Database opening and schema migrations.
//!
//! The schema version lives in `PRAGMA user_version`. Each migration runs in
//! its own transaction together with the version bump, so a failed step
//! leaves the database at the previous version.

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use rusqlite::{Connection, Error as SqliteError};
use thiserror::Error;

use crate::fs::ensure_parent_dir;

const MIGRATIONS: [&str; 2] = [
    "CREATE TABLE networks (
        tag TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        latitude REAL,
        longitude REAL,
        meta TEXT NOT NULL DEFAULT '{}',
        stations TEXT NOT NULL DEFAULT '[]'
    );
    CREATE TABLE stations (
        hash TEXT PRIMARY KEY,
        name TEXT,
        latitude REAL,
        longitude REAL,
        stat TEXT NOT NULL DEFAULT '{}',
        network_tag TEXT
    );
    CREATE INDEX stations_network_tag ON stations (network_tag);",
    "ALTER TABLE networks ADD COLUMN vehicles TEXT NOT NULL DEFAULT '[]';
    ALTER TABLE networks ADD COLUMN updated TEXT;
    CREATE TABLE vehicles (
        hash TEXT PRIMARY KEY,
        latitude REAL,
        longitude REAL,
        kind TEXT NOT NULL,
        stat TEXT NOT NULL DEFAULT '{}',
        network_tag TEXT
    );
    CREATE INDEX vehicles_network_tag ON vehicles (network_tag);",
];

/// Schema version this crate reads and writes.
pub const SCHEMA_VERSION: u32 = 2;

/// Errors raised while opening or migrating a database.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Failed to create the parent directory for the database.
    #[error("failed to create parent directory for {path}")]
    CreateDirectory {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Switching to write-ahead logging failed.
    #[error("failed to enable write-ahead logging")]
    JournalMode {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Reading `user_version` failed.
    #[error("failed to read schema version")]
    ReadVersion {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// The database was written by a newer release.
    #[error("database schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the database.
        found: u32,
        /// Newest version this crate understands.
        supported: u32,
    },
    /// The database has not been migrated to the current version.
    #[error("database schema version {found} is older than {required}; run `gbfs migrate`")]
    Outdated {
        /// Version found in the database.
        found: u32,
        /// Version required to serve feeds.
        required: u32,
    },
    /// Applying a migration failed.
    #[error("failed to apply schema migration {version}")]
    Migrate {
        /// Version the migration upgrades to.
        version: u32,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Versions before and after [`migrate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    /// Version found when migration started.
    pub from: u32,
    /// Version after migration.
    pub to: u32,
}

impl MigrationReport {
    /// Whether any migration ran.
    #[must_use]
    pub const fn applied(&self) -> bool {
        self.from != self.to
    }
}

/// Open (creating if necessary) a database file in write-ahead logging mode.
///
/// # Errors
/// Fails when the parent directory cannot be created or SQLite refuses the
/// file.
pub fn open_database(path: &Utf8Path) -> Result<Connection, SchemaError> {
    ensure_parent_dir(path).map_err(|source| SchemaError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    let connection = Connection::open(path.as_std_path()).map_err(|source| SchemaError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    connection
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
        .map_err(|source| SchemaError::JournalMode { source })?;
    Ok(connection)
}

/// Current schema version of `connection`.
///
/// # Errors
/// Fails when the pragma cannot be read.
pub fn schema_version(connection: &Connection) -> Result<u32, SchemaError> {
    connection
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|source| SchemaError::ReadVersion { source })
}

/// Apply every pending migration.
///
/// # Errors
/// Fails when a migration fails or the database is newer than this crate.
pub fn migrate(connection: &mut Connection) -> Result<MigrationReport, SchemaError> {
    let from = schema_version(connection)?;
    if from > SCHEMA_VERSION {
        return Err(SchemaError::UnsupportedVersion {
            found: from,
            supported: SCHEMA_VERSION,
        });
    }
    for (version, script) in (1..).zip(MIGRATIONS) {
        if version <= from {
            continue;
        }
        info!("applying schema migration {version}");
        apply(connection, version, script)
            .map_err(|source| SchemaError::Migrate { version, source })?;
    }
    Ok(MigrationReport {
        from,
        to: SCHEMA_VERSION,
    })
}

fn apply(connection: &mut Connection, version: u32, script: &str) -> Result<(), SqliteError> {
    let transaction = connection.transaction()?;
    transaction.execute_batch(script)?;
    transaction.pragma_update(None, "user_version", version)?;
    transaction.commit()
}

/// Fail unless `connection` is at [`SCHEMA_VERSION`].
///
/// # Errors
/// Returns [`SchemaError::Outdated`] or [`SchemaError::UnsupportedVersion`]
/// on a mismatch.
pub fn ensure_current(connection: &Connection) -> Result<(), SchemaError> {
    let found = schema_version(connection)?;
    match found.cmp(&SCHEMA_VERSION) {
        std::cmp::Ordering::Less => Err(SchemaError::Outdated {
            found,
            required: SCHEMA_VERSION,
        }),
        std::cmp::Ordering::Equal => Ok(()),
        std::cmp::Ordering::Greater => Err(SchemaError::UnsupportedVersion {
            found,
            supported: SCHEMA_VERSION,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn memory() -> Connection {
        Connection::open_in_memory().expect("in-memory database")
    }

    #[rstest]
    fn fresh_databases_migrate_to_current(mut memory: Connection) {
        let report = migrate(&mut memory).expect("migrate");
        assert_eq!(report, MigrationReport { from: 0, to: SCHEMA_VERSION });
        assert!(report.applied());
        ensure_current(&memory).expect("current");
        let vehicles: i64 = memory
            .query_row("SELECT COUNT(*) FROM vehicles", [], |row| row.get(0))
            .expect("vehicles table");
        assert_eq!(vehicles, 0);
    }

    #[rstest]
    fn migrating_twice_is_a_no_op(mut memory: Connection) {
        migrate(&mut memory).expect("first");
        let report = migrate(&mut memory).expect("second");
        assert!(!report.applied());
    }

    #[rstest]
    fn partial_databases_resume(mut memory: Connection) {
        apply(&mut memory, 1, MIGRATIONS[0]).expect("first migration");
        assert!(matches!(
            ensure_current(&memory),
            Err(SchemaError::Outdated { found: 1, .. })
        ));
        let report = migrate(&mut memory).expect("migrate");
        assert_eq!(report.from, 1);
        ensure_current(&memory).expect("current");
    }

    #[rstest]
    fn newer_databases_are_rejected(mut memory: Connection) {
        memory
            .pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .expect("bump version");
        assert!(matches!(
            migrate(&mut memory),
            Err(SchemaError::UnsupportedVersion { .. })
        ));
    }

    #[rstest]
    fn open_database_creates_parents() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8");
        let path = root.join("nested/gbfs.db");
        let mut connection = open_database(&path).expect("open");
        migrate(&mut connection).expect("migrate");
        assert!(path.is_file());
    }
}
