//! GBFS 2.3 wire documents.
//!
//! Strings are plain, timestamps are epoch seconds and the discovery document
//! nests its feeds under a language key.

use serde::Serialize;
use serde_json::{Map, Value};

mod adapt;

pub use adapt::{
    bike_status, feed_index, station_information, station_status, system_information,
    vehicle_types, versions,
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
    /// Display name.
    pub name: &'static str,
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
    /// Language of published text.
    pub language: &'static str,
    /// System name.
    pub name: String,
    /// Short system name.
    pub short_name: String,
    /// Operating companies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Contact address for feed consumers.
    pub feed_contact_email: String,
    /// IANA timezone.
    pub timezone: String,
    /// Data licence URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
}

/// One station in `station_information.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationInformation {
    /// Station identifier.
    pub station_id: String,
    /// Station name.
    pub name: String,
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
    /// Number of docks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u64>,
    /// Deep links keyed by platform.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_uris: Option<Map<String, Value>>,
}

/// One station in `station_status.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationStatus {
    /// Station identifier.
    pub station_id: String,
    /// Bikes available for rent.
    pub num_bikes_available: u64,
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
    /// Observation time in epoch seconds.
    pub last_reported: i64,
}

/// One vehicle in `free_bike_status.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BikeStatus {
    /// Vehicle identifier.
    pub bike_id: String,
    /// Vehicle type identifier.
    pub vehicle_type_id: &'static str,
    /// Latitude rounded to six places.
    pub lat: f64,
    /// Longitude rounded to six places.
    pub lon: f64,
    /// Whether the vehicle is reserved.
    pub is_reserved: bool,
    /// Whether the vehicle is out of service.
    pub is_disabled: bool,
    /// Observation time in epoch seconds.
    pub last_reported: i64,
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

/// `free_bike_status.json` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BikeStatusList {
    /// Every free-floating vehicle of the network, sorted by identifier.
    pub bikes: Vec<BikeStatus>,
}

/// A feed advertised by a discovery document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feed {
    /// Feed name.
    pub name: &'static str,
    /// Absolute feed URL.
    pub url: String,
}

/// Feeds available in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feeds {
    /// Advertised feeds.
    pub feeds: Vec<Feed>,
}

/// `gbfs.json` payload, keyed by language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gbfs {
    /// English feeds, the only language published.
    pub en: Feeds,
}

/// A version a network is available in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    /// Version string.
    pub version: &'static str,
    /// URL of that version's discovery document.
    pub url: String,
}

/// `gbfs_versions.json` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Versions {
    /// Every served version.
    pub versions: Vec<Version>,
}

/// Any GBFS 2.3 payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Data {
    /// `gbfs.json`.
    Gbfs(Gbfs),
    /// `gbfs_versions.json`.
    Versions(Versions),
    /// `system_information.json`.
    SystemInformation(SystemInformation),
    /// `vehicle_types.json`.
    VehicleTypes(VehicleTypes),
    /// `station_information.json`.
    StationInformation(StationInformationList),
    /// `station_status.json`.
    StationStatus(StationStatusList),
    /// `free_bike_status.json`.
    BikeStatus(BikeStatusList),
}
