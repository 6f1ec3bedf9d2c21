//! Free-floating vehicles.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{RowDecodeError, Timestamp};
use crate::TypeKey;

/// A vehicle parked outside any station.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    /// Vehicle identifier (the persisted `hash`).
    pub uid: String,
    /// WGS84 latitude in degrees.
    pub latitude: Option<f64>,
    /// WGS84 longitude in degrees.
    pub longitude: Option<f64>,
    /// Raw kind, expected to be one of [`TypeKey::VEHICLE_KINDS`].
    pub kind: String,
    /// Latest status sample.
    pub stat: VehicleStat,
}

impl Vehicle {
    /// Resolve the raw kind, returning `None` for kinds outside the taxonomy.
    #[must_use]
    pub fn type_key(&self) -> Option<TypeKey> {
        TypeKey::from_vehicle_kind(&self.kind)
    }
}

/// The status sample recorded for a vehicle.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VehicleStat {
    /// When the sample was observed.
    pub timestamp: Option<Timestamp>,
    /// Loosely typed upstream attributes.
    pub extra: VehicleExtra,
}

/// Optional vehicle attributes reported by upstream feeds.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VehicleExtra {
    /// Battery level, either as a fraction or as a percentage.
    pub battery: Option<f64>,
    /// Whether the vehicle can be rented.
    pub online: Option<bool>,
    /// Attributes without a dedicated field.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Flat columns of a persisted vehicle row.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRow {
    /// Primary key.
    pub hash: String,
    /// Nullable latitude column.
    pub latitude: Option<f64>,
    /// Nullable longitude column.
    pub longitude: Option<f64>,
    /// Raw kind column.
    pub kind: String,
    /// JSON blob holding the status sample.
    pub stat: String,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = RowDecodeError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        let stat = serde_json::from_str(&row.stat).map_err(|source| RowDecodeError {
            entity: "vehicle",
            uid: row.hash.clone(),
            field: "stat",
            source,
        })?;
        Ok(Self {
            uid: row.hash,
            latitude: row.latitude,
            longitude: row.longitude,
            kind: row.kind,
            stat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn decodes_battery_and_online() {
        let row = VehicleRow {
            hash: "v1".into(),
            latitude: Some(1.0),
            longitude: Some(2.0),
            kind: "ebike".into(),
            stat: r#"{"timestamp": "2024-05-01T08:00:00Z", "extra": {"battery": 55, "online": false}}"#
                .into(),
        };
        let vehicle = Vehicle::try_from(row).expect("decode vehicle");
        assert_eq!(vehicle.stat.extra.battery, Some(55.0));
        assert_eq!(vehicle.stat.extra.online, Some(false));
        assert_eq!(vehicle.type_key(), Some(TypeKey::Ebike));
    }

    #[rstest]
    #[case("tandem")]
    #[case("ebikes")]
    fn unknown_kinds_have_no_type_key(#[case] kind: &str) {
        let vehicle = Vehicle {
            uid: "v".into(),
            latitude: None,
            longitude: None,
            kind: kind.into(),
            stat: VehicleStat::default(),
        };
        assert_eq!(vehicle.type_key(), None);
    }
}
