//! Conversions from domain entities into GBFS 3.0 documents.

use gbfs_core::{Network, Station, Vehicle, VehicleDescriptor, VehicleTypePresence};

use super::{
    Dataset, Feed, Feeds, Manifest, StationInformation, StationStatus, SystemInformation,
    Version, VehicleStatus, VehicleType, VehicleTypeCount, VehicleTypes,
};
use crate::discovery::{DatasetLinks, FeedLink};
use crate::i18n::{LANGUAGE, localize};
use crate::shape::{published_vehicle_types, station_type_counts, vehicle_descriptor};
use crate::wire::{
    fuel_fraction, non_negative, observed_at, rental_methods, require, rfc3339, round_coordinate,
};
use crate::{FeedError, Publisher};

fn vehicle_type(descriptor: &'static VehicleDescriptor) -> VehicleType {
    VehicleType {
        vehicle_type_id: descriptor.vehicle_type_id,
        form_factor: descriptor.form_factor.as_str(),
        propulsion_type: descriptor.propulsion.as_str(),
        name: localize(descriptor.display_name),
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
pub fn system_information(
    network: &Network,
    publisher: &Publisher,
    manifest_url: String,
) -> SystemInformation {
    SystemInformation {
        system_id: network.uid.clone(),
        languages: vec![LANGUAGE],
        name: localize(network.name.as_str()),
        opening_hours: publisher.opening_hours.clone(),
        short_name: localize(network.name.as_str()),
        feed_contact_email: publisher.feed_contact_email.clone(),
        manifest_url,
        timezone: publisher.timezone.clone(),
        attribution_organization_name: localize(publisher.attribution_organization_name.as_str()),
        attribution_url: publisher.attribution_url.clone(),
        operator: network.meta.operator().map(localize),
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
        name: localize(name),
        lat: round_coordinate(lat),
        lon: round_coordinate(lon),
        address: extra.address.clone(),
        post_code: extra.post_code.clone(),
        rental_methods: rental_methods(extra),
        rental_uris: extra.rental_uris.clone(),
        capacity: extra.slots.map(non_negative),
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
        num_vehicles_available: non_negative(bikes),
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
        last_reported: rfc3339(&observed),
    })
}

/// Build one `vehicle_status.json` entry.
///
/// # Errors
/// Fails when the vehicle lacks coordinates or an observation time.
pub fn vehicle_status(vehicle: &Vehicle) -> Result<VehicleStatus, FeedError> {
    let lat = require(vehicle.latitude, "vehicle", &vehicle.uid, "latitude")?;
    let lon = require(vehicle.longitude, "vehicle", &vehicle.uid, "longitude")?;
    let observed = observed_at(vehicle.stat.timestamp.as_ref(), "vehicle", &vehicle.uid)?;
    let descriptor = vehicle_descriptor(vehicle);
    let fuel = vehicle.stat.extra.battery.map(fuel_fraction);
    Ok(VehicleStatus {
        vehicle_id: vehicle.uid.clone(),
        lat: round_coordinate(lat),
        lon: round_coordinate(lon),
        is_reserved: false,
        is_disabled: !vehicle.stat.extra.online.unwrap_or(true),
        vehicle_type_id: descriptor.vehicle_type_id,
        last_reported: rfc3339(&observed),
        current_range_meters: fuel
            .zip(descriptor.max_range_meters)
            .map(|(fraction, range)| (fraction * range).round()),
        current_fuel_percent: fuel,
    })
}

/// Build `gbfs.json` from discovery links.
#[must_use]
pub fn feed_index(links: Vec<FeedLink>) -> Feeds {
    Feeds {
        feeds: links
            .into_iter()
            .map(|link| Feed {
                name: link.feed.as_str(),
                url: link.url,
            })
            .collect(),
    }
}

/// Build `manifest.json` from discovery links.
#[must_use]
pub fn manifest(datasets: Vec<DatasetLinks>) -> Manifest {
    Manifest {
        datasets: datasets
            .into_iter()
            .map(|dataset| Dataset {
                system_id: dataset.system_id,
                versions: dataset
                    .versions
                    .into_iter()
                    .map(|link| Version {
                        version: link.version.as_str(),
                        url: link.url,
                    })
                    .collect(),
            })
            .collect(),
    }
}
