//! Docking stations and their latest status sample.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{RowDecodeError, Timestamp};
use crate::TypeKey;

/// A docking station belonging to one network.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Station identifier (the persisted `hash`).
    pub uid: String,
    /// Display name, absent for some upstream feeds.
    pub name: Option<String>,
    /// WGS84 latitude in degrees.
    pub latitude: Option<f64>,
    /// WGS84 longitude in degrees.
    pub longitude: Option<f64>,
    /// Latest status sample.
    pub stat: StationStat,
}

/// The status sample recorded for a station.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StationStat {
    /// Total number of vehicles docked.
    pub bikes: Option<i64>,
    /// Free docks.
    pub free: Option<i64>,
    /// When the sample was observed.
    pub timestamp: Option<Timestamp>,
    /// Loosely typed upstream attributes.
    pub extra: StationExtra,
}

/// Optional attributes reported by upstream feeds.
///
/// Known attributes are typed; anything else is preserved in
/// [`StationExtra::other`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StationExtra {
    /// Whether the station is in service.
    pub online: Option<bool>,
    /// Docked pedal-assisted bicycles.
    pub ebikes: Option<i64>,
    /// Docked pedal bicycles.
    pub normal_bikes: Option<i64>,
    /// Docked cargo bicycles.
    pub cargo: Option<i64>,
    /// Docked electric cargo bicycles.
    pub ecargo: Option<i64>,
    /// Docked child bicycles.
    pub kid_bikes: Option<i64>,
    /// Street address.
    pub address: Option<String>,
    /// Postal code.
    pub post_code: Option<String>,
    /// Accepted payment methods.
    pub payment: Option<Vec<String>>,
    /// Whether a payment terminal is installed.
    #[serde(rename = "payment-terminal", alias = "payment_terminal")]
    pub payment_terminal: Option<bool>,
    /// Total number of docks.
    pub slots: Option<i64>,
    /// Deep links keyed by platform.
    pub rental_uris: Option<Map<String, Value>>,
    /// Attributes without a dedicated field.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl StationExtra {
    /// Return the per-type counter stored under a station key.
    ///
    /// Vehicle kinds are never station counters and always yield `None`.
    #[must_use]
    pub const fn count_for(&self, key: TypeKey) -> Option<i64> {
        match key {
            TypeKey::Ebikes => self.ebikes,
            TypeKey::NormalBikes => self.normal_bikes,
            TypeKey::Cargo => self.cargo,
            TypeKey::Ecargo => self.ecargo,
            TypeKey::KidBikes => self.kid_bikes,
            TypeKey::Bike | TypeKey::Ebike | TypeKey::Scooter => None,
        }
    }
}

/// Flat columns of a persisted station row.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRow {
    /// Primary key.
    pub hash: String,
    /// Nullable name column.
    pub name: Option<String>,
    /// Nullable latitude column.
    pub latitude: Option<f64>,
    /// Nullable longitude column.
    pub longitude: Option<f64>,
    /// JSON blob holding the status sample.
    pub stat: String,
}

impl TryFrom<StationRow> for Station {
    type Error = RowDecodeError;

    fn try_from(row: StationRow) -> Result<Self, Self::Error> {
        let stat = serde_json::from_str(&row.stat).map_err(|source| RowDecodeError {
            entity: "station",
            uid: row.hash.clone(),
            field: "stat",
            source,
        })?;
        Ok(Self {
            uid: row.hash,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            stat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn row() -> StationRow {
        StationRow {
            hash: "abc".into(),
            name: Some("Plaça Catalunya".into()),
            latitude: Some(41.387),
            longitude: Some(2.170),
            stat: r#"{
                "bikes": 7,
                "free": 3,
                "timestamp": "2024-05-01T08:00:00Z",
                "extra": {
                    "ebikes": 2,
                    "normal_bikes": 5,
                    "payment-terminal": true,
                    "payment": ["key"],
                    "uid": 42
                }
            }"#
            .into(),
        }
    }

    #[rstest]
    fn decodes_flat_columns_and_blob(row: StationRow) {
        let station = Station::try_from(row).expect("decode station");
        assert_eq!(station.uid, "abc");
        assert_eq!(station.stat.bikes, Some(7));
        assert_eq!(station.stat.free, Some(3));
        assert_eq!(
            station.stat.timestamp,
            Some(Timestamp::new("2024-05-01T08:00:00Z"))
        );
        assert_eq!(station.stat.extra.count_for(TypeKey::Ebikes), Some(2));
        assert_eq!(station.stat.extra.payment_terminal, Some(true));
        assert_eq!(station.stat.extra.other.get("uid"), Some(&Value::from(42)));
    }

    #[rstest]
    fn missing_extra_defaults_to_empty() {
        let row = StationRow {
            hash: "x".into(),
            name: None,
            latitude: None,
            longitude: None,
            stat: r#"{"bikes": 1, "free": 0, "timestamp": "2024-05-01T08:00:00Z"}"#.into(),
        };
        let station = Station::try_from(row).expect("decode station");
        assert_eq!(station.stat.extra, StationExtra::default());
    }

    #[rstest]
    fn malformed_blob_names_the_station(mut row: StationRow) {
        row.stat = "{not json".into();
        let err = Station::try_from(row).expect_err("malformed stat");
        assert_eq!(err.entity, "station");
        assert_eq!(err.uid, "abc");
        assert_eq!(err.field, "stat");
    }

    #[rstest]
    fn vehicle_kinds_are_not_station_counters() {
        let extra = StationExtra {
            normal_bikes: Some(3),
            ..StationExtra::default()
        };
        assert_eq!(extra.count_for(TypeKey::Bike), None);
        assert_eq!(extra.count_for(TypeKey::NormalBikes), Some(3));
    }
}
