//! Conversions from domain entities into GBFS 2.3 documents.

use gbfs_core::{Network, Station, Vehicle, VehicleDescriptor, VehicleTypePresence};

use super::{
    BikeStatus, Feed, Feeds, Gbfs, StationInformation, StationStatus, SystemInformation, Version,
    Versions, VehicleType, VehicleTypeCount, VehicleTypes,
};
use crate::discovery::{FeedLink, VersionLink};
use crate::i18n::LANGUAGE;
use crate::shape::{published_vehicle_types, station_type_counts, vehicle_descriptor};
use crate::wire::{
    epoch_seconds, fuel_fraction, non_negative, observed_at, rental_methods, require,
    round_coordinate,
};
use crate::{FeedError, Publisher};

fn vehicle_type(descriptor: &'static VehicleDescriptor) -> VehicleType {
    VehicleType {
        vehicle_type_id: descriptor.vehicle_type_id,
        form_factor: descriptor.form_factor.as_str(),
        propulsion_type: descriptor.propulsion.as_str(),
        name: descriptor.display_name,
        max_range_meters: descriptor.max_range_meters,
    }
}

/// Build `vehicle_types.json`.
#[must_use]
pub fn vehicle_types(presence: &VehicleTypePresence) -> VehicleTypes {
    VehicleTypes {
        vehicle_types: published_vehicle_types(presence)
            .into_iter()
            .map(vehicle_type)
            .collect(),
    }
}

/// Build `system_information.json`.
#[must_use]
pub fn system_information(network: &Network, publisher: &Publisher) -> SystemInformation {
    SystemInformation {
        system_id: network.uid.clone(),
        language: LANGUAGE,
        name: network.name.clone(),
        short_name: network.name.clone(),
        operator: network.meta.operator(),
        feed_contact_email: publisher.feed_contact_email.clone(),
        timezone: publisher.timezone.clone(),
        license_url: network.meta.license_url().map(str::to_owned),
    }
}

/// Build one `station_information.json` entry.
///
/// # Errors
/// Fails when the station lacks a name or coordinates.
pub fn station_information(station: &Station) -> Result<StationInformation, FeedError> {
    let name = require(station.name.as_deref(), "station", &station.uid, "name")?;
    let lat = require(station.latitude, "station", &station.uid, "latitude")?;
    let lon = require(station.longitude, "station", &station.uid, "longitude")?;
    let extra = &station.stat.extra;
    Ok(StationInformation {
        station_id: station.uid.clone(),
        name: name.to_owned(),
        lat: round_coordinate(lat),
        lon: round_coordinate(lon),
        address: extra.address.clone(),
        post_code: extra.post_code.clone(),
        rental_methods: rental_methods(extra),
        capacity: extra.slots.map(non_negative),
        rental_uris: extra.rental_uris.clone(),
    })
}

/// Build one `station_status.json` entry.
///
/// # Errors
/// Fails when the station lacks a raw bike count or an observation time.
pub fn station_status(station: &Station) -> Result<StationStatus, FeedError> {
    let bikes = require(station.stat.bikes, "station", &station.uid, "bikes")?;
    let observed = observed_at(station.stat.timestamp.as_ref(), "station", &station.uid)?;
    let online = station.stat.extra.online.unwrap_or(true);
    Ok(StationStatus {
        station_id: station.uid.clone(),
        num_bikes_available: non_negative(bikes),
        vehicle_types_available: station_type_counts(station)?
            .into_iter()
            .map(|typed| VehicleTypeCount {
                vehicle_type_id: typed.vehicle_type_id,
                count: typed.count,
            })
            .collect(),
        num_docks_available: station.stat.free.map(non_negative),
        is_installed: true,
        is_renting: online,
        is_returning: online,
        last_reported: epoch_seconds(&observed),
    })
}

/// Build one `free_bike_status.json` entry.
///
/// # Errors
/// Fails when the vehicle lacks coordinates or an observation time.
pub fn bike_status(vehicle: &Vehicle) -> Result<BikeStatus, FeedError> {
    let lat = require(vehicle.latitude, "vehicle", &vehicle.uid, "latitude")?;
    let lon = require(vehicle.longitude, "vehicle", &vehicle.uid, "longitude")?;
    let observed = observed_at(vehicle.stat.timestamp.as_ref(), "vehicle", &vehicle.uid)?;
    let descriptor = vehicle_descriptor(vehicle);
    let fuel = vehicle.stat.extra.battery.map(fuel_fraction);
    Ok(BikeStatus {
        bike_id: vehicle.uid.clone(),
        vehicle_type_id: descriptor.vehicle_type_id,
        lat: round_coordinate(lat),
        lon: round_coordinate(lon),
        is_reserved: false,
        is_disabled: !vehicle.stat.extra.online.unwrap_or(true),
        last_reported: epoch_seconds(&observed),
        current_range_meters: fuel
            .zip(descriptor.max_range_meters)
            .map(|(fraction, range)| (fraction * range).round()),
        current_fuel_percent: fuel,
    })
}

/// Build `gbfs.json` from discovery links.
#[must_use]
pub fn feed_index(links: Vec<FeedLink>) -> Gbfs {
    Gbfs {
        en: Feeds {
            feeds: links
                .into_iter()
                .map(|link| Feed {
                    name: link.feed.as_str(),
                    url: link.url,
                })
                .collect(),
        },
    }
}

/// Build `gbfs_versions.json` from version links.
#[must_use]
pub fn versions(links: Vec<VersionLink>) -> Versions {
    Versions {
        versions: links
            .into_iter()
            .map(|link| Version {
                version: link.version.as_str(),
                url: link.url,
            })
            .collect(),
    }
}
