//! Bike-share networks.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::{RowDecodeError, Timestamp};

/// A bike-share system, identified by its Citybikes tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    /// Network tag, used as the GBFS `system_id`.
    pub uid: String,
    /// Display name.
    pub name: String,
    /// Descriptive metadata.
    pub meta: NetworkMeta,
    /// Identifiers of the stations that belong to the network.
    pub station_ids: Vec<String>,
    /// Identifiers of the free-floating vehicles that belong to the network.
    pub vehicle_ids: Vec<String>,
    /// When the network row was last refreshed.
    pub updated: Option<Timestamp>,
}

impl Network {
    /// Whether the network publishes any free-floating vehicles.
    #[must_use]
    pub fn has_vehicles(&self) -> bool {
        !self.vehicle_ids.is_empty()
    }
}

/// Descriptive metadata attached to a network.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NetworkMeta {
    /// Display name as reported upstream.
    pub name: Option<String>,
    /// Centre latitude.
    pub latitude: Option<f64>,
    /// Centre longitude.
    pub longitude: Option<f64>,
    /// Operating companies, in upstream order.
    #[serde(deserialize_with = "null_as_default")]
    pub company: Vec<String>,
    /// Data licence, when the operator publishes one.
    pub license: Option<License>,
    /// Attributes without a dedicated field.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl NetworkMeta {
    /// Join the companies into a single operator string.
    ///
    /// Returns `None` when no company is listed.
    ///
    /// # Examples
    /// ```
    /// use gbfs_core::NetworkMeta;
    ///
    /// let meta = NetworkMeta {
    ///     company: vec!["Ajuntament".into(), "Serveis".into()],
    ///     ..NetworkMeta::default()
    /// };
    /// assert_eq!(meta.operator().as_deref(), Some("Ajuntament | Serveis"));
    /// ```
    #[must_use]
    pub fn operator(&self) -> Option<String> {
        if self.company.is_empty() {
            None
        } else {
            Some(self.company.join(" | "))
        }
    }

    /// Licence URL, when the licence names a non-empty one.
    #[must_use]
    pub fn license_url(&self) -> Option<&str> {
        self.license
            .as_ref()
            .and_then(|license| license.url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Licence details published by a network operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct License {
    /// Licence name.
    pub name: Option<String>,
    /// Licence URL.
    pub url: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Flat columns of a persisted network row.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkRow {
    /// Primary key.
    pub tag: String,
    /// Display name column.
    pub name: String,
    /// JSON object holding [`NetworkMeta`].
    pub meta: String,
    /// JSON array of station identifiers.
    pub stations: String,
    /// JSON array of vehicle identifiers.
    pub vehicles: String,
    /// Nullable refresh timestamp.
    pub updated: Option<String>,
}

impl TryFrom<NetworkRow> for Network {
    type Error = RowDecodeError;

    fn try_from(row: NetworkRow) -> Result<Self, Self::Error> {
        let decode_error = |field: &'static str| {
            let uid = row.tag.clone();
            move |source| RowDecodeError {
                entity: "network",
                uid,
                field,
                source,
            }
        };
        let meta = serde_json::from_str(&row.meta).map_err(decode_error("meta"))?;
        let station_ids = serde_json::from_str(&row.stations).map_err(decode_error("stations"))?;
        let vehicle_ids = serde_json::from_str(&row.vehicles).map_err(decode_error("vehicles"))?;
        Ok(Self {
            uid: row.tag,
            name: row.name,
            meta,
            station_ids,
            vehicle_ids,
            updated: row.updated.map(Timestamp::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn row() -> NetworkRow {
        NetworkRow {
            tag: "bicing".into(),
            name: "Bicing".into(),
            meta: r#"{
                "name": "Bicing",
                "latitude": 41.3,
                "longitude": 2.1,
                "company": ["Ajuntament de Barcelona", "PBSC"],
                "license": {"name": "Open Data", "url": "https://example.org/license"},
                "city": "Barcelona"
            }"#
            .into(),
            stations: r#"["a", "b"]"#.into(),
            vehicles: "[]".into(),
            updated: None,
        }
    }

    #[rstest]
    fn decodes_meta_and_membership(row: NetworkRow) {
        let network = Network::try_from(row).expect("decode network");
        assert_eq!(network.uid, "bicing");
        assert_eq!(network.station_ids, vec!["a", "b"]);
        assert!(!network.has_vehicles());
        assert_eq!(
            network.meta.operator().as_deref(),
            Some("Ajuntament de Barcelona | PBSC")
        );
        assert_eq!(network.meta.license_url(), Some("https://example.org/license"));
        assert_eq!(
            network.meta.other.get("city"),
            Some(&Value::from("Barcelona"))
        );
    }

    #[rstest]
    #[case(r#"{"company": null}"#)]
    #[case("{}")]
    fn tolerates_missing_companies(mut row: NetworkRow, #[case] meta: &str) {
        row.meta = meta.into();
        let network = Network::try_from(row).expect("decode network");
        assert!(network.meta.company.is_empty());
        assert_eq!(network.meta.operator(), None);
    }

    #[rstest]
    #[case(r#"{"license": {"name": "CC"}}"#)]
    #[case(r#"{"license": {"name": "CC", "url": ""}}"#)]
    fn license_without_url_has_no_license_url(mut row: NetworkRow, #[case] meta: &str) {
        row.meta = meta.into();
        let network = Network::try_from(row).expect("decode network");
        assert_eq!(network.meta.license_url(), None);
    }

    #[rstest]
    fn malformed_membership_names_the_field(mut row: NetworkRow) {
        row.stations = "not-json".into();
        let err = Network::try_from(row).expect_err("malformed stations");
        assert_eq!(err.field, "stations");
        assert_eq!(err.uid, "bicing");
    }
}
