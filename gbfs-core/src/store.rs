//! Read access to persisted networks, stations and vehicles.
//!
//! The [`FeedStore`] trait is the only seam between feed construction and
//! persistence. Implementations must keep their result ordering stable:
//! stations and vehicles sorted by identifier, tags sorted lexically.

use std::collections::BTreeSet;
use std::error::Error as StdError;

use async_trait::async_trait;
use thiserror::Error;

use crate::inference::{station_type_keys, tally_vehicle_kinds};
use crate::{Network, RowDecodeError, Station, Timestamp, TypeKey, Vehicle};

/// Errors raised by [`FeedStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A persisted row could not be decoded.
    #[error(transparent)]
    Decode(#[from] RowDecodeError),
    /// The storage backend failed.
    #[error("store backend failed: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}

impl StoreError {
    /// Wrap a backend specific failure.
    pub fn backend<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Backend(Box::new(source))
    }
}

/// Vehicle-type keys observed in a network's inventory.
///
/// Keys iterate in taxonomy order. Only present keys are stored, so absence
/// reads as "not present".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleTypePresence {
    present: BTreeSet<TypeKey>,
}

impl VehicleTypePresence {
    /// Build the presence map from a network's stations and vehicles.
    ///
    /// Stations contribute every key their counts infer to, or the default key
    /// when they carry no type information. Vehicles contribute their kind
    /// when it is recognised.
    #[must_use]
    pub fn from_inventory(stations: &[Station], vehicles: &[Vehicle]) -> Self {
        let mut present: BTreeSet<TypeKey> =
            stations.iter().flat_map(station_type_keys).collect();
        present.extend(
            tally_vehicle_kinds(vehicles)
                .counts
                .into_iter()
                .map(|entry| entry.key),
        );
        Self { present }
    }

    /// Build a presence map from explicit keys.
    pub fn from_keys(keys: impl IntoIterator<Item = TypeKey>) -> Self {
        Self {
            present: keys.into_iter().collect(),
        }
    }

    /// Whether `key` was observed.
    #[must_use]
    pub fn contains(&self, key: TypeKey) -> bool {
        self.present.contains(&key)
    }

    /// Whether nothing was observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    /// Iterate the observed keys in taxonomy order.
    pub fn keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.present.iter().copied()
    }
}

/// Asynchronous read-only access to Citybikes data.
///
/// # Examples
///
/// ```rust
/// use gbfs_core::FeedStore;
///
/// async fn station_count(store: &dyn FeedStore, tag: &str) -> usize {
///     store.get_stations(tag).await.map(|stations| stations.len()).unwrap_or(0)
/// }
/// ```
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Fetch a network by tag.
    async fn get_network(&self, tag: &str) -> Result<Option<Network>, StoreError>;

    /// Fetch the stations listed by a network, sorted by identifier.
    ///
    /// Unknown tags yield an empty list.
    async fn get_stations(&self, tag: &str) -> Result<Vec<Station>, StoreError>;

    /// Fetch the free-floating vehicles listed by a network, sorted by
    /// identifier.
    async fn get_vehicles(&self, tag: &str) -> Result<Vec<Vehicle>, StoreError>;

    /// Whether a network with this tag exists.
    async fn network_exists(&self, tag: &str) -> Result<bool, StoreError>;

    /// Most recent observation timestamp, scoped to one network or global.
    ///
    /// Returns `None` when nothing has been observed in scope.
    async fn get_last_updated(&self, tag: Option<&str>) -> Result<Option<Timestamp>, StoreError>;

    /// Vehicle-type keys present in a network's inventory.
    async fn vehicle_types(&self, tag: &str) -> Result<VehicleTypePresence, StoreError>;

    /// All network tags, sorted.
    async fn get_tags(&self) -> Result<Vec<String>, StoreError>;
}
