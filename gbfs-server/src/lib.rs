//! HTTP service and command-line entry points for the Citybikes GBFS feeds.
//!
//! The [`api`] module exposes the axum router; [`run`] drives the `gbfs`
//! binary with its `serve`, `migrate` and `import` subcommands.
#![forbid(unsafe_code)]

use std::sync::Arc;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use gbfs_data::{SqliteFeedStore, ensure_current, import_snapshot, load_snapshots, migrate};
use log::{error, info};
use rusqlite::Connection;
use tokio::net::TcpListener;

pub mod api;
mod config;
mod error;

pub use api::{ApiError, AppState, create_router};
pub use error::CliError;

use config::{ImportArgs, ImportConfig, MigrateArgs, MigrateConfig, ServeArgs, ServeConfig};

/// Run the `gbfs` CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Serve(args) => run_serve(args.into_config()?),
        Command::Migrate(args) => run_migrate(&args.into_config()?),
        Command::Import(args) => run_import(&args.into_config()?),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "gbfs",
    about = "GBFS 2.3 and 3.0 feeds for Citybikes networks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve feeds over HTTP.
    Serve(ServeArgs),
    /// Create or upgrade the database schema.
    Migrate(MigrateArgs),
    /// Import network snapshots into the database.
    Import(ImportArgs),
}

fn run_serve(config: ServeConfig) -> Result<(), CliError> {
    let ServeConfig {
        database,
        bind,
        public_url,
        publisher,
        ttl,
    } = config;
    let store = SqliteFeedStore::open(&database).map_err(|source| CliError::OpenStore {
        path: database.clone(),
        source,
    })?;
    let mut state = AppState::new(Arc::new(store))
        .with_publisher(publisher)
        .with_ttl(ttl);
    if let Some(base) = public_url {
        state = state.with_public_url(base);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    runtime.block_on(async move {
        let listener = TcpListener::bind(bind)
            .await
            .map_err(|source| CliError::Bind { addr: bind, source })?;
        info!("serving {database} on http://{bind}");
        axum::serve(listener, create_router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(CliError::Serve)
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        return;
    }
    info!("shutting down");
}

fn run_migrate(config: &MigrateConfig) -> Result<(), CliError> {
    let schema_error = |source| CliError::Schema {
        path: config.database.clone(),
        source,
    };
    let mut connection = gbfs_data::open_database(&config.database).map_err(schema_error)?;
    let report = migrate(&mut connection).map_err(schema_error)?;
    if report.applied() {
        info!(
            "migrated {} from schema {} to {}",
            config.database, report.from, report.to
        );
    } else {
        info!("{} is already at schema {}", config.database, report.to);
    }
    Ok(())
}

fn run_import(config: &ImportConfig) -> Result<(), CliError> {
    let snapshots = load_snapshots(&config.snapshot)?;
    let mut connection = open_current(&config.database)?;
    for snapshot in &snapshots {
        let summary = import_snapshot(&mut connection, snapshot)?;
        if summary.removed_stations > 0 || summary.removed_vehicles > 0 {
            info!(
                "[{}] removed {} orphaned stations and {} orphaned vehicles",
                summary.tag, summary.removed_stations, summary.removed_vehicles
            );
        }
    }
    info!("imported {} snapshots into {}", snapshots.len(), config.database);
    Ok(())
}

fn open_current(path: &Utf8Path) -> Result<Connection, CliError> {
    let schema_error = |source| CliError::Schema {
        path: path.to_path_buf(),
        source,
    };
    let connection = gbfs_data::open_database(path).map_err(schema_error)?;
    ensure_current(&connection).map_err(schema_error)?;
    Ok(connection)
}

#[cfg(test)]
mod tests;
