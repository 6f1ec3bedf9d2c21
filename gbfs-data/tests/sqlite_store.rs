//! Integration tests for the SQLite feed store over imported snapshots.

use camino::Utf8PathBuf;
use gbfs_core::{FeedStore, StoreError, TypeKey};
use gbfs_data::{
    NetworkSnapshot, SchemaError, SqliteFeedStore, SqliteFeedStoreError, import_snapshot, migrate,
    open_database,
};
use rstest::{fixture, rstest};
use rusqlite::Connection;
use serde_json::json;
use tempfile::TempDir;

fn snapshot(value: serde_json::Value) -> NetworkSnapshot {
    serde_json::from_value(value).expect("snapshot")
}

fn demo() -> NetworkSnapshot {
    snapshot(json!({
        "tag": "demo",
        "meta": {
            "name": "Demo Bikes",
            "latitude": 41.38,
            "longitude": 2.17,
            "company": ["Ajuntament", "PBSC"],
            "license": {"name": "Open", "url": "https://example.org/license"}
        },
        "stations": [
            {
                "id": "s2", "name": "Second", "latitude": 41.39, "longitude": 2.18,
                "bikes": 10, "free": 0, "timestamp": "2024-05-01T09:00:00Z",
                "extra": {"ebikes": 3}
            },
            {
                "id": "s1", "name": "First", "latitude": 41.38, "longitude": 2.17,
                "bikes": 5, "free": 2, "timestamp": "2024-05-01T08:00:00Z",
                "extra": {}
            }
        ],
        "vehicles": [
            {
                "id": "v1", "latitude": 41.4, "longitude": 2.2, "kind": "scooter",
                "timestamp": "2024-05-01T09:30:00Z", "extra": {"battery": 80}
            }
        ]
    }))
}

fn other() -> NetworkSnapshot {
    snapshot(json!({
        "tag": "another",
        "meta": {"name": "Another", "latitude": 0.0, "longitude": 0.0, "company": null},
        "stations": [
            {
                "id": "o1", "name": "Only", "latitude": 0.0, "longitude": 0.0,
                "bikes": 1, "free": 1, "timestamp": "2024-05-02T00:00:00Z", "extra": {}
            }
        ]
    }))
}

struct Fixture {
    _dir: TempDir,
    path: Utf8PathBuf,
}

#[fixture]
fn database() -> Fixture {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
    let path = root.join("gbfs.db");
    let mut connection = open_database(&path).expect("open");
    migrate(&mut connection).expect("migrate");
    import_snapshot(&mut connection, &demo()).expect("import demo");
    import_snapshot(&mut connection, &other()).expect("import other");
    Fixture { _dir: dir, path }
}

#[rstest]
#[tokio::test]
async fn network_metadata_round_trips(database: Fixture) {
    let store = SqliteFeedStore::open(&database.path).expect("store");
    let network = store
        .get_network("demo")
        .await
        .expect("query")
        .expect("network");
    assert_eq!(network.name, "Demo Bikes");
    assert_eq!(network.meta.operator().as_deref(), Some("Ajuntament | PBSC"));
    assert_eq!(network.meta.license_url(), Some("https://example.org/license"));
    assert_eq!(network.station_ids, vec!["s2".to_owned(), "s1".to_owned()]);
    assert!(network.has_vehicles());
    assert!(store.get_network("nowhere").await.expect("query").is_none());
}

#[rstest]
#[tokio::test]
async fn members_are_sorted_by_identifier(database: Fixture) {
    let store = SqliteFeedStore::open(&database.path).expect("store");
    let stations = store.get_stations("demo").await.expect("stations");
    let ids: Vec<_> = stations.iter().map(|station| station.uid.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2"]);
    assert_eq!(stations.get(1).and_then(|s| s.stat.extra.ebikes), Some(3));
    let vehicles = store.get_vehicles("demo").await.expect("vehicles");
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles.first().and_then(|v| v.stat.extra.battery), Some(80.0));
}

#[rstest]
#[tokio::test]
async fn last_updated_is_scoped_or_global(database: Fixture) {
    let store = SqliteFeedStore::open(&database.path).expect("store");
    let scoped = store.get_last_updated(Some("demo")).await.expect("scoped");
    assert_eq!(scoped.map(|ts| ts.to_string()).as_deref(), Some("2024-05-01T09:30:00Z"));
    let global = store.get_last_updated(None).await.expect("global");
    assert_eq!(global.map(|ts| ts.to_string()).as_deref(), Some("2024-05-02T00:00:00Z"));
}

#[rstest]
#[tokio::test]
async fn last_updated_compares_instants_across_offsets(database: Fixture) {
    let mut connection = open_database(&database.path).expect("open");
    let offsets = snapshot(json!({
        "tag": "offsets",
        "meta": {"name": "Offsets", "latitude": 0.0, "longitude": 0.0},
        "stations": [
            {
                "id": "east", "name": "East", "latitude": 0.0, "longitude": 0.0,
                "bikes": 1, "free": 1, "timestamp": "2024-05-01T10:00:00+02:00", "extra": {}
            },
            {
                "id": "west", "name": "West", "latitude": 0.0, "longitude": 0.0,
                "bikes": 1, "free": 1, "timestamp": "2024-05-01T09:00:00Z", "extra": {}
            }
        ]
    }));
    import_snapshot(&mut connection, &offsets).expect("import offsets");
    drop(connection);
    let store = SqliteFeedStore::open(&database.path).expect("store");
    let newest = store.get_last_updated(Some("offsets")).await.expect("scoped");
    assert_eq!(newest.map(|ts| ts.to_string()).as_deref(), Some("2024-05-01T09:00:00Z"));
}

#[rstest]
#[tokio::test]
async fn vehicle_types_cover_inferred_and_vehicle_keys(database: Fixture) {
    let store = SqliteFeedStore::open(&database.path).expect("store");
    let presence = store.vehicle_types("demo").await.expect("presence");
    assert!(presence.contains(TypeKey::Ebikes));
    assert!(presence.contains(TypeKey::NormalBikes));
    assert!(presence.contains(TypeKey::Scooter));
    assert!(!presence.contains(TypeKey::Cargo));
}

#[rstest]
#[tokio::test]
async fn tags_and_existence(database: Fixture) {
    let store = SqliteFeedStore::open(&database.path).expect("store");
    assert_eq!(
        store.get_tags().await.expect("tags"),
        vec!["another".to_owned(), "demo".to_owned()]
    );
    assert!(store.network_exists("demo").await.expect("exists"));
    assert!(!store.network_exists("nowhere").await.expect("exists"));
}

#[rstest]
#[tokio::test]
async fn malformed_rows_surface_as_decode_errors(database: Fixture) {
    let connection = Connection::open(database.path.as_std_path()).expect("raw connection");
    connection
        .execute("UPDATE stations SET stat = 'not json' WHERE hash = 's1'", [])
        .expect("corrupt");
    drop(connection);
    let store = SqliteFeedStore::open(&database.path).expect("store");
    let err = store.get_stations("demo").await.expect_err("decode");
    assert!(matches!(err, StoreError::Decode(_)));
}

#[rstest]
fn unmigrated_databases_are_refused() {
    let connection = Connection::open_in_memory().expect("in-memory database");
    let err = SqliteFeedStore::from_connection(connection).expect_err("outdated");
    assert!(matches!(
        err,
        SqliteFeedStoreError::Schema(SchemaError::Outdated { found: 0, .. })
    ));
}
