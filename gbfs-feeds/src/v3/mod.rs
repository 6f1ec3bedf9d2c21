//! GBFS 3.0 wire documents.
//!
//! Human readable strings are localised lists, timestamps are RFC 3339 and
//! discovery goes through a cross-network manifest.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::i18n::LocalizedText;

mod adapt;

pub use adapt::{
    feed_index, manifest, station_information, station_status, system_information,
    vehicle_status, vehicle_types,
};

/// A vehicle type entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleType {
    /// Stable identifier.
    pub vehicle_type_id: &'static str,
    /// GBFS form factor.
    pub form_factor: &'static str,
    /// GBFS propulsion type.
    pub propulsion_type: &'static str,
    /// Localised name.
    pub name: Vec<LocalizedText>,
    /// Range on a full charge, for electric vehicles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_range_meters: Option<f64>,
}

/// Count of available vehicles of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleTypeCount {
    /// Vehicle type identifier.
    pub vehicle_type_id: &'static str,
    /// Number available.
    pub count: u64,
}

/// `vehicle_types.json` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleTypes {
    /// Every vehicle type present in the network.
    pub vehicle_types: Vec<VehicleType>,
}

/// `system_information.json` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemInformation {
    /// Network tag.
    pub system_id: String,
    /// Languages of published text.
    pub languages: Vec<&'static str>,
    /// Localised system name.
    pub name: Vec<LocalizedText>,
    /// Opening hours in OSM syntax.
    pub opening_hours: String,
    /// Localised short name.
    pub short_name: Vec<LocalizedText>,
    /// Contact address for feed consumers.
    pub feed_contact_email: String,
    /// URL of the cross-network manifest.
    pub manifest_url: String,
    /// IANA timezone.
    pub timezone: String,
    /// Localised name of the credited organisation.
    pub attribution_organization_name: Vec<LocalizedText>,
    /// Link to the credited organisation.
    pub attribution_url: String,
    /// Localised operator name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<Vec<LocalizedText>>,
    /// Data licence URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
}

/// One station in `station_information.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationInformation {
    /// Station identifier.
    pub station_id: String,
    /// Localised station name.
    pub name: Vec<LocalizedText>,
    /// Latitude rounded to six places.
    pub lat: f64,
    /// Longitude rounded to six places.
    pub lon: f64,
    /// Street address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Postal code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_code: Option<String>,
    /// Accepted rental methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_methods: Option<Vec<String>>,
    /// Deep links keyed by platform.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_uris: Option<Map<String, Value>>,
    /// Number of docks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u64>,
}

/// One station in `station_status.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationStatus {
    /// Station identifier.
    pub station_id: String,
    /// Vehicles available for rent.
    pub num_vehicles_available: u64,
    /// Per-type breakdown of available vehicles.
    pub vehicle_types_available: Vec<VehicleTypeCount>,
    /// Free docks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_docks_available: Option<u64>,
    /// Whether the station is installed.
    pub is_installed: bool,
    /// Whether vehicles can be taken.
    pub is_renting: bool,
    /// Whether vehicles can be returned.
    pub is_returning: bool,
    /// Observation time.
    pub last_reported: String,
}

/// One vehicle in `vehicle_status.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleStatus {
    /// Vehicle identifier.
    pub vehicle_id: String,
    /// Latitude rounded to six places.
    pub lat: f64,
    /// Longitude rounded to six places.
    pub lon: f64,
    /// Whether the vehicle is reserved.
    pub is_reserved: bool,
    /// Whether the vehicle is out of service.
    pub is_disabled: bool,
    /// Vehicle type identifier.
    pub vehicle_type_id: &'static str,
    /// Observation time.
    pub last_reported: String,
    /// Remaining range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_range_meters: Option<f64>,
    /// Remaining charge as a fraction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_fuel_percent: Option<f64>,
}

/// `station_information.json` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationInformationList {
    /// Every station of the network, sorted by identifier.
    pub stations: Vec<StationInformation>,
}

/// `station_status.json` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationStatusList {
    /// Every station of the network, sorted by identifier.
    pub stations: Vec<StationStatus>,
}

/// `vehicle_status.json` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleStatusList {
    /// Every free-floating vehicle of the network, sorted by identifier.
    pub vehicles: Vec<VehicleStatus>,
}

/// A feed advertised by a discovery document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feed {
    /// Feed name.
    pub name: &'static str,
    /// Absolute feed URL.
    pub url: String,
}

/// `gbfs.json` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feeds {
    /// Advertised feeds.
    pub feeds: Vec<Feed>,
}

/// A version a dataset is available in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    /// Version string.
    pub version: &'static str,
    /// URL of that version's discovery document.
    pub url: String,
}

/// One network in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    /// Network tag.
    pub system_id: String,
    /// Available versions.
    pub versions: Vec<Version>,
}

/// `manifest.json` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// One entry per network, sorted by tag.
    pub datasets: Vec<Dataset>,
}

/// Any GBFS 3.0 payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Data {
    /// `gbfs.json`.
    Feeds(Feeds),
    /// `system_information.json`.
    SystemInformation(SystemInformation),
    /// `vehicle_types.json`.
    VehicleTypes(VehicleTypes),
    /// `station_information.json`.
    StationInformation(StationInformationList),
    /// `station_status.json`.
    StationStatus(StationStatusList),
    /// `vehicle_status.json`.
    VehicleStatus(VehicleStatusList),
    /// `manifest.json`.
    Manifest(Manifest),
}
