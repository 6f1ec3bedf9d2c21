//! Unit tests covering subcommand configuration and database commands.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;
use crate::config::{
    ARG_DATABASE, ARG_SNAPSHOT, ENV_IMPORT_DATABASE, ENV_IMPORT_SNAPSHOT, ENV_MIGRATE_DATABASE,
    ENV_SERVE_DATABASE,
};
use camino::Utf8PathBuf;
use gbfs_core::FeedStore;
use gbfs_data::{SchemaError, schema_version};
use gbfs_feeds::{BaseUrl, Publisher};
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

fn temp_root() -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
    (dir, root)
}

#[rstest]
fn serve_requires_a_database() {
    let err = ServeConfig::try_from(ServeArgs::default()).expect_err("missing database");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_DATABASE);
            assert_eq!(env, ENV_SERVE_DATABASE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn serve_applies_defaults() {
    let args = ServeArgs {
        database: Some(Utf8PathBuf::from("gbfs.db")),
        ..ServeArgs::default()
    };
    let config = ServeConfig::try_from(args).expect("config");
    assert_eq!(config.bind.to_string(), "127.0.0.1:8000");
    assert_eq!(config.public_url, None);
    assert_eq!(config.publisher, Publisher::default());
    assert_eq!(config.ttl, 0);
}

#[rstest]
fn serve_overrides_publisher_details() {
    let args = ServeArgs {
        database: Some(Utf8PathBuf::from("gbfs.db")),
        bind: Some("0.0.0.0:9000".to_owned()),
        public_url: Some("https://gbfs.example.org/".to_owned()),
        feed_contact_email: Some("ops@example.org".to_owned()),
        timezone: Some("Europe/Madrid".to_owned()),
        ttl: Some(60),
    };
    let config = ServeConfig::try_from(args).expect("config");
    assert_eq!(config.bind.port(), 9000);
    assert_eq!(
        config.public_url,
        Some(BaseUrl::new("https://gbfs.example.org"))
    );
    assert_eq!(config.publisher.feed_contact_email, "ops@example.org");
    assert_eq!(config.publisher.timezone, "Europe/Madrid");
    assert_eq!(config.publisher.attribution_organization_name, "CityBikes");
    assert_eq!(config.ttl, 60);
}

#[rstest]
#[case("localhost")]
#[case("127.0.0.1")]
#[case("not an address")]
fn serve_rejects_malformed_bind_addresses(#[case] bind: &str) {
    let args = ServeArgs {
        database: Some(Utf8PathBuf::from("gbfs.db")),
        bind: Some(bind.to_owned()),
        ..ServeArgs::default()
    };
    match ServeConfig::try_from(args).expect_err("invalid bind") {
        CliError::InvalidBind { value, .. } => assert_eq!(value, bind),
        other => panic!("expected InvalidBind, found {other:?}"),
    }
}

#[rstest]
#[case("gbfs.example.org")]
#[case("https://")]
#[case("http://exa mple.org")]
fn serve_rejects_unparsable_public_urls(#[case] public_url: &str) {
    let args = ServeArgs {
        database: Some(Utf8PathBuf::from("gbfs.db")),
        public_url: Some(public_url.to_owned()),
        ..ServeArgs::default()
    };
    match ServeConfig::try_from(args).expect_err("unparsable url") {
        CliError::ParsePublicUrl { value, .. } => assert_eq!(value, public_url),
        other => panic!("expected ParsePublicUrl, found {other:?}"),
    }
}

#[rstest]
#[case("ftp://gbfs.example.org", "scheme must be http or https")]
#[case("https://gbfs.example.org/?lang=en", "query strings are not allowed")]
#[case("https://gbfs.example.org/#top", "fragments are not allowed")]
fn serve_rejects_unusable_public_urls(#[case] public_url: &str, #[case] expected: &str) {
    let args = ServeArgs {
        database: Some(Utf8PathBuf::from("gbfs.db")),
        public_url: Some(public_url.to_owned()),
        ..ServeArgs::default()
    };
    match ServeConfig::try_from(args).expect_err("unusable url") {
        CliError::InvalidPublicUrl { value, reason } => {
            assert_eq!(value, public_url);
            assert_eq!(reason, expected);
        }
        other => panic!("expected InvalidPublicUrl, found {other:?}"),
    }
}

#[rstest]
fn serve_keeps_public_url_paths() {
    let args = ServeArgs {
        database: Some(Utf8PathBuf::from("gbfs.db")),
        public_url: Some("https://example.org/gbfs/".to_owned()),
        ..ServeArgs::default()
    };
    let config = ServeConfig::try_from(args).expect("config");
    assert_eq!(
        config.public_url,
        Some(BaseUrl::new("https://example.org/gbfs"))
    );
}

#[rstest]
fn migrate_requires_a_database() {
    match MigrateConfig::try_from(MigrateArgs::default()).expect_err("missing database") {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_DATABASE);
            assert_eq!(env, ENV_MIGRATE_DATABASE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case(None, Some(Utf8PathBuf::from("gbfs.db")), ARG_SNAPSHOT, ENV_IMPORT_SNAPSHOT)]
#[case(Some(Utf8PathBuf::from("bicing.json")), None, ARG_DATABASE, ENV_IMPORT_DATABASE)]
fn import_requires_snapshot_and_database(
    #[case] snapshot: Option<Utf8PathBuf>,
    #[case] database: Option<Utf8PathBuf>,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = ImportArgs { snapshot, database };
    match ImportConfig::try_from(args).expect_err("missing field") {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn migrate_then_import_populates_the_store() {
    let (_dir, root) = temp_root();
    let database = root.join("data").join("gbfs.db");
    run_migrate(&MigrateConfig {
        database: database.clone(),
    })
    .expect("migrate");

    let snapshot = root.join("bicing.json");
    fs::write(
        &snapshot,
        r#"{
            "tag": "bicing",
            "meta": {"name": "Bicing", "latitude": 41.38, "longitude": 2.17},
            "stations": [{
                "id": "abc", "name": "Plaça", "latitude": 41.38, "longitude": 2.17,
                "bikes": 3, "free": 7, "timestamp": "2024-05-01T08:00:00Z", "extra": {}
            }]
        }"#,
    )
    .expect("write snapshot");
    run_import(&ImportConfig {
        database: database.clone(),
        snapshot,
    })
    .expect("import");

    let connection = gbfs_data::open_database(&database).expect("open");
    assert_eq!(
        schema_version(&connection).expect("version"),
        gbfs_data::SCHEMA_VERSION
    );
    drop(connection);

    let store = SqliteFeedStore::open(&database).expect("store");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    let tags = runtime.block_on(store.get_tags()).expect("tags");
    assert_eq!(tags, vec!["bicing".to_owned()]);
}

#[rstest]
fn import_refuses_unmigrated_databases() {
    let (_dir, root) = temp_root();
    let snapshot = root.join("empty.json");
    fs::write(&snapshot, "[]").expect("write snapshot");
    let err = run_import(&ImportConfig {
        database: root.join("gbfs.db"),
        snapshot,
    })
    .expect_err("outdated schema");
    match err {
        CliError::Schema {
            source: SchemaError::Outdated { found, .. },
            ..
        } => assert_eq!(found, 0),
        other => panic!("expected outdated schema, found {other:?}"),
    }
}
