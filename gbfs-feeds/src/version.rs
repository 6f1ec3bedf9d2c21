//! Supported GBFS versions and the feeds each one publishes.

use std::fmt;

/// A GBFS major version served by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GbfsVersion {
    /// GBFS 2.3, mounted under `/2`.
    V2,
    /// GBFS 3.0, mounted under `/3`.
    V3,
}

impl GbfsVersion {
    /// Every served version, oldest first.
    pub const ALL: [Self; 2] = [Self::V2, Self::V3];

    /// Version string published in the envelope.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V2 => "2.3",
            Self::V3 => "3.0",
        }
    }

    /// Path segment the version is mounted under.
    #[must_use]
    pub const fn mount(self) -> &'static str {
        match self {
            Self::V2 => "2",
            Self::V3 => "3",
        }
    }

    /// Every feed served for this version.
    #[must_use]
    pub const fn routes(self) -> &'static [FeedName] {
        match self {
            Self::V2 => &[
                FeedName::Gbfs,
                FeedName::GbfsVersions,
                FeedName::SystemInformation,
                FeedName::VehicleTypes,
                FeedName::StationInformation,
                FeedName::StationStatus,
                FeedName::FreeBikeStatus,
            ],
            Self::V3 => &[
                FeedName::Manifest,
                FeedName::Gbfs,
                FeedName::SystemInformation,
                FeedName::VehicleTypes,
                FeedName::StationInformation,
                FeedName::StationStatus,
                FeedName::VehicleStatus,
            ],
        }
    }

    /// Whether `feed` is served for this version.
    #[must_use]
    pub fn serves(self, feed: FeedName) -> bool {
        self.routes().contains(&feed)
    }

    /// Feeds advertised in a network's discovery document, in order.
    ///
    /// The 2.3 document lists itself; 3.0 does not. Vehicle feeds are kept
    /// here and dropped by the caller when a network has no free-floating
    /// vehicles.
    pub fn discoverable(self) -> impl Iterator<Item = FeedName> {
        self.routes()
            .iter()
            .copied()
            .filter(move |&feed| match feed {
                FeedName::Manifest => false,
                FeedName::Gbfs => self == Self::V2,
                _ => true,
            })
    }
}

impl fmt::Display for GbfsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical feed names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedName {
    /// Cross-network manifest (3.0 only).
    Manifest,
    /// Discovery document of one network.
    Gbfs,
    /// Versions available for one network (2.3 only).
    GbfsVersions,
    /// System metadata.
    SystemInformation,
    /// Vehicle types present in the network.
    VehicleTypes,
    /// Static station data.
    StationInformation,
    /// Live station data.
    StationStatus,
    /// Free-floating vehicles (2.3 name).
    FreeBikeStatus,
    /// Free-floating vehicles (3.0 name).
    VehicleStatus,
}

impl FeedName {
    /// Feed name as published in discovery documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manifest => "manifest",
            Self::Gbfs => "gbfs",
            Self::GbfsVersions => "gbfs_versions",
            Self::SystemInformation => "system_information",
            Self::VehicleTypes => "vehicle_types",
            Self::StationInformation => "station_information",
            Self::StationStatus => "station_status",
            Self::FreeBikeStatus => "free_bike_status",
            Self::VehicleStatus => "vehicle_status",
        }
    }

    /// File name the feed is served under.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Manifest => "manifest.json",
            Self::Gbfs => "gbfs.json",
            Self::GbfsVersions => "gbfs_versions.json",
            Self::SystemInformation => "system_information.json",
            Self::VehicleTypes => "vehicle_types.json",
            Self::StationInformation => "station_information.json",
            Self::StationStatus => "station_status.json",
            Self::FreeBikeStatus => "free_bike_status.json",
            Self::VehicleStatus => "vehicle_status.json",
        }
    }

    /// Whether the feed is served under a network path.
    #[must_use]
    pub const fn is_network_scoped(self) -> bool {
        !matches!(self, Self::Manifest)
    }

    /// Whether the feed lists free-floating vehicles.
    #[must_use]
    pub const fn is_vehicle_feed(self) -> bool {
        matches!(self, Self::FreeBikeStatus | Self::VehicleStatus)
    }
}

impl fmt::Display for FeedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
