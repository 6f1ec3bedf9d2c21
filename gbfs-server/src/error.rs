//! Error types emitted by the `gbfs` binary.

use std::sync::Arc;

use camino::Utf8PathBuf;
use gbfs_data::{ImportError, SchemaError, SqliteFeedStoreError};
use thiserror::Error;

/// Errors emitted by the `gbfs` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The bind address does not parse as `host:port`.
    #[error("invalid bind address {value:?}: {source}")]
    InvalidBind {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// The public URL does not parse.
    #[error("invalid public url {value:?}: {source}")]
    ParsePublicUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    /// The public URL parses but cannot serve as a link base.
    #[error("invalid public url {value:?}: {reason}")]
    InvalidPublicUrl { value: String, reason: &'static str },
    /// Building the async runtime failed.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Binding the listener failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// The HTTP server stopped with an error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
    /// Opening or migrating the database failed.
    #[error("database {path:?}: {source}")]
    Schema {
        path: Utf8PathBuf,
        #[source]
        source: SchemaError,
    },
    /// Opening the feed store failed.
    #[error("failed to open feed store at {path:?}: {source}")]
    OpenStore {
        path: Utf8PathBuf,
        #[source]
        source: SqliteFeedStoreError,
    },
    /// Reading or writing snapshots failed.
    #[error(transparent)]
    Import(#[from] ImportError),
}
