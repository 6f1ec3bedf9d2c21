//! Test-only, in-memory `FeedStore` implementation used by unit and behaviour
//! tests across the workspace.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::{
    FeedStore, Network, NetworkMeta, Station, StationExtra, StationStat, StoreError, Timestamp,
    Vehicle, VehicleExtra, VehicleStat, VehicleTypePresence,
};

/// In-memory `FeedStore` implementation used in tests.
///
/// Networks own their stations and vehicles outright, so membership can never
/// dangle. Lookups are linear and intended only for small datasets.
#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    networks: BTreeMap<String, Entry>,
}

#[derive(Debug, Clone)]
struct Entry {
    network: Network,
    stations: BTreeMap<String, Station>,
    vehicles: BTreeMap<String, Vehicle>,
}

impl MemoryStore {
    /// Add a network named after its tag.
    #[must_use]
    pub fn with_network(self, tag: &str, stations: Vec<Station>, vehicles: Vec<Vehicle>) -> Self {
        self.with_network_entity(network(tag), stations, vehicles)
    }

    /// Add a fully specified network.
    ///
    /// The membership lists of `network` are replaced by the identifiers of
    /// `stations` and `vehicles`.
    #[must_use]
    pub fn with_network_entity(
        mut self,
        mut network: Network,
        stations: Vec<Station>,
        vehicles: Vec<Vehicle>,
    ) -> Self {
        let stations: BTreeMap<_, _> = stations
            .into_iter()
            .map(|station| (station.uid.clone(), station))
            .collect();
        let vehicles: BTreeMap<_, _> = vehicles
            .into_iter()
            .map(|vehicle| (vehicle.uid.clone(), vehicle))
            .collect();
        network.station_ids = stations.keys().cloned().collect();
        network.vehicle_ids = vehicles.keys().cloned().collect();
        self.networks.insert(
            network.uid.clone(),
            Entry {
                network,
                stations,
                vehicles,
            },
        );
        self
    }

    fn entries<'a>(&'a self, tag: Option<&'a str>) -> impl Iterator<Item = &'a Entry> + 'a {
        self.networks
            .iter()
            .filter(move |(uid, _)| tag.is_none_or(|wanted| wanted == uid.as_str()))
            .map(|(_, entry)| entry)
    }
}

#[async_trait]
impl FeedStore for MemoryStore {
    async fn get_network(&self, tag: &str) -> Result<Option<Network>, StoreError> {
        Ok(self.networks.get(tag).map(|entry| entry.network.clone()))
    }

    async fn get_stations(&self, tag: &str) -> Result<Vec<Station>, StoreError> {
        Ok(self
            .networks
            .get(tag)
            .map(|entry| entry.stations.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_vehicles(&self, tag: &str) -> Result<Vec<Vehicle>, StoreError> {
        Ok(self
            .networks
            .get(tag)
            .map(|entry| entry.vehicles.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn network_exists(&self, tag: &str) -> Result<bool, StoreError> {
        Ok(self.networks.contains_key(tag))
    }

    async fn get_last_updated(&self, tag: Option<&str>) -> Result<Option<Timestamp>, StoreError> {
        let observed = self.entries(tag).flat_map(|entry| {
            let stations = entry
                .stations
                .values()
                .filter_map(|station| station.stat.timestamp.clone());
            let vehicles = entry
                .vehicles
                .values()
                .filter_map(|vehicle| vehicle.stat.timestamp.clone());
            stations.chain(vehicles).collect::<Vec<_>>()
        });
        Ok(Timestamp::newest(observed))
    }

    async fn vehicle_types(&self, tag: &str) -> Result<VehicleTypePresence, StoreError> {
        Ok(self
            .networks
            .get(tag)
            .map(|entry| {
                let stations: Vec<_> = entry.stations.values().cloned().collect();
                let vehicles: Vec<_> = entry.vehicles.values().cloned().collect();
                VehicleTypePresence::from_inventory(&stations, &vehicles)
            })
            .unwrap_or_default())
    }

    async fn get_tags(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.networks.keys().cloned().collect())
    }
}

/// Build a network named after its tag with no companies or licence.
#[must_use]
pub fn network(tag: &str) -> Network {
    Network {
        uid: tag.to_owned(),
        name: tag.to_owned(),
        meta: NetworkMeta {
            name: Some(tag.to_owned()),
            ..NetworkMeta::default()
        },
        station_ids: Vec::new(),
        vehicle_ids: Vec::new(),
        updated: None,
    }
}

/// Build a named station at the origin holding `bikes` vehicles.
#[must_use]
pub fn station(uid: &str, bikes: i64, timestamp: &str) -> Station {
    Station {
        uid: uid.to_owned(),
        name: Some(format!("Station {uid}")),
        latitude: Some(0.0),
        longitude: Some(0.0),
        stat: StationStat {
            bikes: Some(bikes),
            free: Some(0),
            timestamp: Some(Timestamp::new(timestamp)),
            extra: StationExtra::default(),
        },
    }
}

/// Build an online vehicle at the origin observed at a fixed instant.
#[must_use]
pub fn vehicle(uid: &str, kind: &str) -> Vehicle {
    Vehicle {
        uid: uid.to_owned(),
        latitude: Some(0.0),
        longitude: Some(0.0),
        kind: kind.to_owned(),
        stat: VehicleStat {
            timestamp: Some(Timestamp::new("2024-05-01T08:30:00Z")),
            extra: VehicleExtra {
                online: Some(true),
                ..VehicleExtra::default()
            },
        },
    }
}
