//! Version-independent shaping of inventory into typed counts and
//! descriptors.

use gbfs_core::{
    Station, TypeKey, Vehicle, VehicleClass, VehicleDescriptor, VehicleTypePresence,
    infer_station_counts,
};
use log::warn;

use crate::FeedError;
use crate::wire::{non_negative, require};

/// A count of docked vehicles of one type, ready for publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedCount {
    /// Published vehicle type identifier.
    pub vehicle_type_id: &'static str,
    /// Non-negative count.
    pub count: u64,
}

/// Descriptors to publish in a vehicle types feed.
///
/// Present keys are walked in taxonomy order and deduplicated by
/// `vehicle_type_id`, so aliases publish once. An empty presence map yields
/// the default descriptor alone.
#[must_use]
pub fn published_vehicle_types(presence: &VehicleTypePresence) -> Vec<&'static VehicleDescriptor> {
    let mut descriptors: Vec<&'static VehicleDescriptor> = Vec::new();
    for key in presence.keys() {
        let descriptor = key.descriptor();
        if !descriptors
            .iter()
            .any(|known| known.vehicle_type_id == descriptor.vehicle_type_id)
        {
            descriptors.push(descriptor);
        }
    }
    if descriptors.is_empty() {
        descriptors.push(VehicleClass::DEFAULT.descriptor());
    }
    descriptors
}

/// Per-type counts available at a station.
///
/// Stations without any type information report their raw total under the
/// default type.
///
/// # Errors
/// Fails when the station carries no raw bike count.
pub fn station_type_counts(station: &Station) -> Result<Vec<TypedCount>, FeedError> {
    let counts = infer_station_counts(&station.stat.extra, station.stat.bikes);
    if counts.is_empty() {
        let total = require(station.stat.bikes, "station", &station.uid, "bikes")?;
        return Ok(vec![TypedCount {
            vehicle_type_id: TypeKey::DEFAULT.descriptor().vehicle_type_id,
            count: non_negative(total),
        }]);
    }
    Ok(counts
        .into_iter()
        .map(|entry| TypedCount {
            vehicle_type_id: entry.key.descriptor().vehicle_type_id,
            count: non_negative(entry.count),
        })
        .collect())
}

/// Descriptor for a free-floating vehicle.
///
/// Unknown kinds are logged and published as the default type.
#[must_use]
pub fn vehicle_descriptor(vehicle: &Vehicle) -> &'static VehicleDescriptor {
    if let Some(key) = vehicle.type_key() {
        key.descriptor()
    } else {
        warn!(
            "vehicle {} has unrecognised kind {:?}; publishing as {}",
            vehicle.uid,
            vehicle.kind,
            VehicleClass::DEFAULT.descriptor().vehicle_type_id
        );
        VehicleClass::DEFAULT.descriptor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbfs_core::StationExtra;
    use gbfs_core::test_support::{station, vehicle};
    use rstest::rstest;

    #[rstest]
    fn aliases_publish_once_in_taxonomy_order() {
        let presence = VehicleTypePresence::from_keys([
            TypeKey::Scooter,
            TypeKey::Bike,
            TypeKey::NormalBikes,
            TypeKey::Ebikes,
        ]);
        let ids: Vec<_> = published_vehicle_types(&presence)
            .into_iter()
            .map(|descriptor| descriptor.vehicle_type_id)
            .collect();
        assert_eq!(
            ids,
            vec!["cb:vehicle:ebike", "cb:vehicle:bike", "cb:vehicle:scooter"]
        );
    }

    #[rstest]
    fn empty_presence_publishes_the_default() {
        let ids: Vec<_> = published_vehicle_types(&VehicleTypePresence::default())
            .into_iter()
            .map(|descriptor| descriptor.vehicle_type_id)
            .collect();
        assert_eq!(ids, vec!["cb:vehicle:bike"]);
    }

    #[rstest]
    fn bare_station_reports_its_total_as_default() {
        let counts = station_type_counts(&station("s1", 5, "2024-05-01T08:00:00Z"))
            .expect("counts");
        assert_eq!(
            counts,
            vec![TypedCount {
                vehicle_type_id: "cb:vehicle:bike",
                count: 5
            }]
        );
    }

    #[rstest]
    fn empty_bare_station_still_reports_the_default() {
        let counts = station_type_counts(&station("s1", 0, "2024-05-01T08:00:00Z"))
            .expect("counts");
        assert_eq!(
            counts,
            vec![TypedCount {
                vehicle_type_id: "cb:vehicle:bike",
                count: 0
            }]
        );
    }

    #[rstest]
    fn negative_counters_are_clamped() {
        let mut sample = station("s1", 2, "2024-05-01T08:00:00Z");
        sample.stat.extra = StationExtra {
            kid_bikes: Some(-4),
            normal_bikes: Some(2),
            ..StationExtra::default()
        };
        let counts = station_type_counts(&sample).expect("counts");
        assert_eq!(
            counts,
            vec![
                TypedCount {
                    vehicle_type_id: "cb:vehicle:bike",
                    count: 2
                },
                TypedCount {
                    vehicle_type_id: "cb:vehicle:kid-bike",
                    count: 0
                },
            ]
        );
    }

    #[rstest]
    fn station_without_total_or_counters_fails() {
        let mut sample = station("s1", 0, "2024-05-01T08:00:00Z");
        sample.stat.bikes = None;
        let err = station_type_counts(&sample).expect_err("missing bikes");
        assert!(matches!(err, FeedError::MissingField { field: "bikes", .. }));
    }

    #[rstest]
    #[case("scooter", "cb:vehicle:scooter")]
    #[case("ebike", "cb:vehicle:ebike")]
    #[case("hoverboard", "cb:vehicle:bike")]
    fn vehicles_resolve_through_the_taxonomy(#[case] kind: &str, #[case] expected: &str) {
        assert_eq!(
            vehicle_descriptor(&vehicle("v1", kind)).vehicle_type_id,
            expected
        );
    }
}
