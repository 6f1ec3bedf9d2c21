//! Version-independent discovery links: per-network feed indexes, version
//! lists and the cross-network manifest.
//!
//! The version adapters only rename these links into their wire shapes.

use gbfs_core::Network;

use crate::{FeedName, GbfsVersion, UrlResolver};

/// A feed and where to fetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLink {
    /// Logical feed.
    pub feed: FeedName,
    /// Absolute URL.
    pub url: String,
}

/// A version and the URL of its discovery document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLink {
    /// GBFS version.
    pub version: GbfsVersion,
    /// Absolute URL of that version's `gbfs.json`.
    pub url: String,
}

/// One network's entry in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLinks {
    /// Network tag.
    pub system_id: String,
    /// Versions the network can be discovered through.
    pub versions: Vec<VersionLink>,
}

/// Feeds advertised in a network's `gbfs.json`.
///
/// Vehicle feeds are listed only when the network has free-floating
/// vehicles.
pub fn feed_index(
    version: GbfsVersion,
    network: &Network,
    urls: &dyn UrlResolver,
) -> Vec<FeedLink> {
    let has_vehicles = network.has_vehicles();
    version
        .discoverable()
        .filter(|feed| has_vehicles || !feed.is_vehicle_feed())
        .map(|feed| FeedLink {
            feed,
            url: urls.feed_url(version, Some(&network.uid), feed),
        })
        .collect()
}

/// Every served version of a network's discovery document.
pub fn version_links(uid: &str, urls: &dyn UrlResolver) -> Vec<VersionLink> {
    GbfsVersion::ALL
        .into_iter()
        .map(|version| VersionLink {
            version,
            url: urls.feed_url(version, Some(uid), FeedName::Gbfs),
        })
        .collect()
}

/// Manifest entries for `tags`, in the order given.
///
/// Each network lists the versions that support manifest discovery; older
/// versions are found through `gbfs_versions.json` instead.
pub fn manifest_datasets(tags: Vec<String>, urls: &dyn UrlResolver) -> Vec<DatasetLinks> {
    tags.into_iter()
        .map(|system_id| {
            let versions = GbfsVersion::ALL
                .into_iter()
                .filter(|version| version.serves(FeedName::Manifest))
                .map(|version| VersionLink {
                    version,
                    url: urls.feed_url(version, Some(&system_id), FeedName::Gbfs),
                })
                .collect();
            DatasetLinks {
                system_id,
                versions,
            }
        })
        .collect()
}
