//! Feed construction: fetch from the store, shape, then wrap.
//!
//! [`build_feed`] is the single entry point used by the HTTP layer. It is
//! strictly sequential per request and holds no state between calls; every
//! collaborator arrives through [`FeedContext`].

use chrono::{DateTime, FixedOffset, Utc};
use gbfs_core::{FeedStore, Network};
use log::debug;
use serde::Serialize;

use crate::discovery::{feed_index, manifest_datasets, version_links};
use crate::envelope::{self, Envelope};
use crate::wire::{epoch_seconds, rfc3339};
use crate::{FeedBuildError, FeedError, FeedName, GbfsVersion, Publisher, UrlResolver, v2, v3};

/// Identifier reported when a cross-network timestamp fails to parse.
const ALL_NETWORKS: &str = "*";

/// What to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedRequest<'a> {
    /// Target version.
    pub version: GbfsVersion,
    /// Target feed.
    pub feed: FeedName,
    /// Network tag for network-scoped feeds.
    pub network: Option<&'a str>,
}

impl<'a> FeedRequest<'a> {
    /// A request for a feed of one network.
    #[must_use]
    pub const fn network(version: GbfsVersion, feed: FeedName, uid: &'a str) -> Self {
        Self {
            version,
            feed,
            network: Some(uid),
        }
    }

    /// A request for a cross-network feed.
    #[must_use]
    pub const fn global(version: GbfsVersion, feed: FeedName) -> Self {
        Self {
            version,
            feed,
            network: None,
        }
    }
}

/// Collaborators and per-request inputs shared by every feed build.
pub struct FeedContext<'a> {
    /// Persistence.
    pub store: &'a dyn FeedStore,
    /// Absolute URL generation for discovery links.
    pub urls: &'a dyn UrlResolver,
    /// Publisher constants.
    pub publisher: &'a Publisher,
    /// Cache lifetime advertised in the envelope.
    pub ttl: u32,
    /// Request time, used when the store has no timestamp.
    pub now: DateTime<Utc>,
}

/// A built feed, ready to serialise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeedDocument {
    /// A GBFS 2.3 document.
    V2(Envelope<v2::Data, i64>),
    /// A GBFS 3.0 document.
    V3(Envelope<v3::Data, String>),
}

/// Build one feed document.
///
/// # Errors
/// Returns [`FeedBuildError::UnsupportedFeed`] when the version does not
/// publish the feed, [`FeedBuildError::NetworkNotFound`] for unknown networks,
/// [`FeedBuildError::Store`] when the store fails and
/// [`FeedBuildError::Integrity`] when stored data cannot be published.
pub async fn build_feed(
    context: &FeedContext<'_>,
    request: FeedRequest<'_>,
) -> Result<FeedDocument, FeedBuildError> {
    let FeedRequest {
        version,
        feed,
        network,
    } = request;
    if !version.serves(feed) {
        return Err(FeedBuildError::UnsupportedFeed { version, feed });
    }
    let scope = if feed.is_network_scoped() {
        let uid = network.ok_or(FeedBuildError::MissingNetwork { feed })?;
        if !context.store.network_exists(uid).await? {
            return Err(FeedBuildError::NetworkNotFound {
                uid: uid.to_owned(),
            });
        }
        Some(uid)
    } else {
        None
    };
    debug!(
        "building {feed} for GBFS {version} ({})",
        scope.unwrap_or(ALL_NETWORKS)
    );
    let last_updated = last_updated(context, scope).await?;
    let document = match version {
        GbfsVersion::V2 => FeedDocument::V2(envelope::build(
            version,
            context.ttl,
            build_v2(context, feed, scope).await?,
            epoch_seconds(&last_updated),
        )),
        GbfsVersion::V3 => FeedDocument::V3(envelope::build(
            version,
            context.ttl,
            build_v3(context, feed, scope).await?,
            rfc3339(&last_updated),
        )),
    };
    Ok(document)
}

async fn last_updated(
    context: &FeedContext<'_>,
    scope: Option<&str>,
) -> Result<DateTime<FixedOffset>, FeedBuildError> {
    let Some(timestamp) = context.store.get_last_updated(scope).await? else {
        return Ok(context.now.fixed_offset());
    };
    timestamp.parse().map_err(|source| {
        FeedBuildError::Integrity(FeedError::InvalidTimestamp {
            entity: "network",
            uid: scope.unwrap_or(ALL_NETWORKS).to_owned(),
            value: timestamp.as_str().to_owned(),
            source,
        })
    })
}

async fn require_network(
    context: &FeedContext<'_>,
    uid: &str,
) -> Result<Network, FeedBuildError> {
    context
        .store
        .get_network(uid)
        .await?
        .ok_or_else(|| FeedBuildError::NetworkNotFound {
            uid: uid.to_owned(),
        })
}

fn scoped(scope: Option<&str>, feed: FeedName) -> Result<&str, FeedBuildError> {
    scope.ok_or(FeedBuildError::MissingNetwork { feed })
}

async fn build_v2(
    context: &FeedContext<'_>,
    feed: FeedName,
    scope: Option<&str>,
) -> Result<v2::Data, FeedBuildError> {
    let version = GbfsVersion::V2;
    let uid = scoped(scope, feed)?;
    let data = match feed {
        FeedName::Gbfs => {
            let network = require_network(context, uid).await?;
            v2::Data::Gbfs(v2::feed_index(feed_index(version, &network, context.urls)))
        }
        FeedName::GbfsVersions => {
            v2::Data::Versions(v2::versions(version_links(uid, context.urls)))
        }
        FeedName::SystemInformation => {
            let network = require_network(context, uid).await?;
            v2::Data::SystemInformation(v2::system_information(&network, context.publisher))
        }
        FeedName::VehicleTypes => {
            let presence = context.store.vehicle_types(uid).await?;
            v2::Data::VehicleTypes(v2::vehicle_types(&presence))
        }
        FeedName::StationInformation => {
            let stations = context.store.get_stations(uid).await?;
            v2::Data::StationInformation(v2::StationInformationList {
                stations: stations
                    .iter()
                    .map(v2::station_information)
                    .collect::<Result<_, _>>()?,
            })
        }
        FeedName::StationStatus => {
            let stations = context.store.get_stations(uid).await?;
            v2::Data::StationStatus(v2::StationStatusList {
                stations: stations
                    .iter()
                    .map(v2::station_status)
                    .collect::<Result<_, _>>()?,
            })
        }
        FeedName::FreeBikeStatus => {
            let vehicles = context.store.get_vehicles(uid).await?;
            v2::Data::BikeStatus(v2::BikeStatusList {
                bikes: vehicles
                    .iter()
                    .map(v2::bike_status)
                    .collect::<Result<_, _>>()?,
            })
        }
        FeedName::Manifest | FeedName::VehicleStatus => {
            return Err(FeedBuildError::UnsupportedFeed { version, feed });
        }
    };
    Ok(data)
}

async fn build_v3(
    context: &FeedContext<'_>,
    feed: FeedName,
    scope: Option<&str>,
) -> Result<v3::Data, FeedBuildError> {
    let version = GbfsVersion::V3;
    if feed == FeedName::Manifest {
        let tags = context.store.get_tags().await?;
        return Ok(v3::Data::Manifest(v3::manifest(manifest_datasets(
            tags,
            context.urls,
        ))));
    }
    let uid = scoped(scope, feed)?;
    let data = match feed {
        FeedName::Gbfs => {
            let network = require_network(context, uid).await?;
            v3::Data::Feeds(v3::feed_index(feed_index(version, &network, context.urls)))
        }
        FeedName::SystemInformation => {
            let network = require_network(context, uid).await?;
            let manifest_url = context.urls.feed_url(version, None, FeedName::Manifest);
            v3::Data::SystemInformation(v3::system_information(
                &network,
                context.publisher,
                manifest_url,
            ))
        }
        FeedName::VehicleTypes => {
            let presence = context.store.vehicle_types(uid).await?;
            v3::Data::VehicleTypes(v3::vehicle_types(&presence))
        }
        FeedName::StationInformation => {
            let stations = context.store.get_stations(uid).await?;
            v3::Data::StationInformation(v3::StationInformationList {
                stations: stations
                    .iter()
                    .map(v3::station_information)
                    .collect::<Result<_, _>>()?,
            })
        }
        FeedName::StationStatus => {
            let stations = context.store.get_stations(uid).await?;
            v3::Data::StationStatus(v3::StationStatusList {
                stations: stations
                    .iter()
                    .map(v3::station_status)
                    .collect::<Result<_, _>>()?,
            })
        }
        FeedName::VehicleStatus => {
            let vehicles = context.store.get_vehicles(uid).await?;
            v3::Data::VehicleStatus(v3::VehicleStatusList {
                vehicles: vehicles
                    .iter()
                    .map(v3::vehicle_status)
                    .collect::<Result<_, _>>()?,
            })
        }
        FeedName::Manifest | FeedName::GbfsVersions | FeedName::FreeBikeStatus => {
            return Err(FeedBuildError::UnsupportedFeed { version, feed });
        }
    };
    Ok(data)
}
