//! Layered configuration for the `gbfs` subcommands.
//!
//! Each subcommand parses into an `*Args` struct that `ortho_config` merges
//! with configuration files and `GBFS_CMDS_*` environment variables, then
//! resolves into a validated `*Config` through `TryFrom`.

use std::net::SocketAddr;

use camino::Utf8PathBuf;
use clap::Parser;
use gbfs_feeds::{BaseUrl, Publisher};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::CliError;

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_BIND: &str = "bind";
pub(crate) const ARG_PUBLIC_URL: &str = "public-url";
pub(crate) const ARG_FEED_CONTACT_EMAIL: &str = "feed-contact-email";
pub(crate) const ARG_TIMEZONE: &str = "timezone";
pub(crate) const ARG_TTL: &str = "ttl";
pub(crate) const ARG_SNAPSHOT: &str = "snapshot";
pub(crate) const ENV_SERVE_DATABASE: &str = "GBFS_CMDS_SERVE_DATABASE";
pub(crate) const ENV_MIGRATE_DATABASE: &str = "GBFS_CMDS_MIGRATE_DATABASE";
pub(crate) const ENV_IMPORT_DATABASE: &str = "GBFS_CMDS_IMPORT_DATABASE";
pub(crate) const ENV_IMPORT_SNAPSHOT: &str = "GBFS_CMDS_IMPORT_SNAPSHOT";

pub(crate) const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// CLI arguments for the `serve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Serve GBFS 2.3 and 3.0 feeds over HTTP from a migrated \
                 SQLite database. Links in discovery documents use the \
                 public URL when set, otherwise the request Host header.",
    about = "Serve GBFS feeds over HTTP"
)]
#[ortho_config(prefix = "GBFS")]
pub(crate) struct ServeArgs {
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Socket address to listen on.
    #[arg(long = ARG_BIND, value_name = "addr")]
    #[serde(default)]
    pub(crate) bind: Option<String>,
    /// Absolute base URL used in generated links (e.g. "https://gbfs.citybik.es").
    #[arg(long = ARG_PUBLIC_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) public_url: Option<String>,
    /// Contact address published in system information.
    #[arg(long = ARG_FEED_CONTACT_EMAIL, value_name = "email")]
    #[serde(default)]
    pub(crate) feed_contact_email: Option<String>,
    /// IANA timezone published in system information.
    #[arg(long = ARG_TIMEZONE, value_name = "tz")]
    #[serde(default)]
    pub(crate) timezone: Option<String>,
    /// Cache lifetime advertised in every envelope, in seconds.
    #[arg(long = ARG_TTL, value_name = "seconds")]
    #[serde(default)]
    pub(crate) ttl: Option<u32>,
}

impl ServeArgs {
    pub(crate) fn into_config(self) -> Result<ServeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ServeConfig::try_from(merged)
    }
}

/// Resolved `serve` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServeConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) bind: SocketAddr,
    pub(crate) public_url: Option<BaseUrl>,
    pub(crate) publisher: Publisher,
    pub(crate) ttl: u32,
}

impl TryFrom<ServeArgs> for ServeConfig {
    type Error = CliError;

    fn try_from(args: ServeArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_SERVE_DATABASE,
        })?;
        let raw_bind = args.bind.unwrap_or_else(|| DEFAULT_BIND.to_owned());
        let bind = raw_bind
            .parse::<SocketAddr>()
            .map_err(|source| CliError::InvalidBind {
                value: raw_bind.clone(),
                source,
            })?;
        let public_url = args.public_url.map(parse_public_url).transpose()?;

        let defaults = Publisher::default();
        let publisher = Publisher {
            feed_contact_email: args
                .feed_contact_email
                .unwrap_or(defaults.feed_contact_email),
            timezone: args.timezone.unwrap_or(defaults.timezone),
            ..defaults
        };

        Ok(Self {
            database,
            bind,
            public_url,
            publisher,
            ttl: args.ttl.unwrap_or(0),
        })
    }
}

fn parse_public_url(value: String) -> Result<BaseUrl, CliError> {
    let url = match Url::parse(&value) {
        Ok(url) => url,
        Err(source) => return Err(CliError::ParsePublicUrl { value, source }),
    };
    let reason = if !matches!(url.scheme(), "http" | "https") {
        Some("scheme must be http or https")
    } else if url.host_str().is_none_or(str::is_empty) {
        Some("a host is required")
    } else if url.query().is_some() {
        Some("query strings are not allowed")
    } else if url.fragment().is_some() {
        Some("fragments are not allowed")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(CliError::InvalidPublicUrl { value, reason }),
        None => Ok(BaseUrl::new(url.as_str())),
    }
}

/// CLI arguments for the `migrate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Create or upgrade the SQLite schema")]
#[ortho_config(prefix = "GBFS")]
pub(crate) struct MigrateArgs {
    /// Path to the SQLite database; created when missing.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl MigrateArgs {
    pub(crate) fn into_config(self) -> Result<MigrateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MigrateConfig::try_from(merged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MigrateConfig {
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<MigrateArgs> for MigrateConfig {
    type Error = CliError;

    fn try_from(args: MigrateArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_MIGRATE_DATABASE,
        })?;
        Ok(Self { database })
    }
}

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Import one network snapshot, or a JSON array of them, into \
                 a migrated database. Stations and vehicles no longer \
                 referenced by their network are removed.",
    about = "Import network snapshots"
)]
#[ortho_config(prefix = "GBFS")]
pub(crate) struct ImportArgs {
    /// Path to a network snapshot JSON document.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot: Option<Utf8PathBuf>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl ImportArgs {
    pub(crate) fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) snapshot: Utf8PathBuf,
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let snapshot = args.snapshot.ok_or(CliError::MissingArgument {
            field: ARG_SNAPSHOT,
            env: ENV_IMPORT_SNAPSHOT,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_IMPORT_DATABASE,
        })?;
        Ok(Self { database, snapshot })
    }
}
