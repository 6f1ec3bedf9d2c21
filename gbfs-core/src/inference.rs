//! Per-type vehicle counts derived from loosely typed inventory data.
//!
//! Stations report an aggregate `bikes` total and, sometimes, per-type
//! counters in `extra`. Inference keeps the counters that are present in
//! taxonomy order and attributes any unexplained remainder of the total to
//! plain bikes. Free-floating vehicles are tallied by kind instead.

use std::collections::{BTreeMap, BTreeSet};

use crate::{Station, StationExtra, TypeKey, Vehicle};

/// A number of vehicles of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleCount {
    /// Key the count was reported under.
    pub key: TypeKey,
    /// Number of vehicles. Upstream data may be negative; adapters clamp it.
    pub count: i64,
}

/// Infer per-type counts for a station.
///
/// Present counters are emitted in [`TypeKey::STATION_KEYS`] order. When
/// `normal_bikes` is absent and the counters add up to less than `raw_total`,
/// the remainder is appended as `normal_bikes`. An empty result means the
/// station carries no type information at all; callers substitute the
/// default type carrying the raw total.
///
/// # Examples
/// ```
/// use gbfs_core::{StationExtra, TypeKey, VehicleCount, infer_station_counts};
///
/// let extra = StationExtra { ebikes: Some(3), ..StationExtra::default() };
/// let counts = infer_station_counts(&extra, Some(10));
/// assert_eq!(
///     counts,
///     vec![
///         VehicleCount { key: TypeKey::Ebikes, count: 3 },
///         VehicleCount { key: TypeKey::NormalBikes, count: 7 },
///     ]
/// );
/// ```
#[must_use]
pub fn infer_station_counts(extra: &StationExtra, raw_total: Option<i64>) -> Vec<VehicleCount> {
    let mut counts: Vec<VehicleCount> = TypeKey::STATION_KEYS
        .into_iter()
        .filter_map(|key| extra.count_for(key).map(|count| VehicleCount { key, count }))
        .collect();

    let has_normal = counts.iter().any(|entry| entry.key == TypeKey::NormalBikes);
    if !has_normal && let Some(total) = raw_total {
        let counted = counts
            .iter()
            .fold(0_i64, |sum, entry| sum.saturating_add(entry.count));
        if counted < total {
            counts.push(VehicleCount {
                key: TypeKey::NormalBikes,
                count: total.saturating_sub(counted),
            });
        }
    }

    counts
}

/// Result of tallying free-floating vehicles by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleTally {
    /// Counts for recognised kinds, in [`TypeKey::VEHICLE_KINDS`] order.
    pub counts: Vec<VehicleCount>,
    /// Kinds that matched no taxonomy entry and were dropped.
    pub unrecognised: BTreeSet<String>,
}

/// Group vehicles by kind.
///
/// Vehicles whose kind is outside the taxonomy are left out of the counts and
/// reported in [`VehicleTally::unrecognised`] so callers can log them.
#[must_use]
pub fn tally_vehicle_kinds<'a, I>(vehicles: I) -> VehicleTally
where
    I: IntoIterator<Item = &'a Vehicle>,
{
    let mut grouped: BTreeMap<TypeKey, i64> = BTreeMap::new();
    let mut unrecognised = BTreeSet::new();
    for vehicle in vehicles {
        match vehicle.type_key() {
            Some(key) => *grouped.entry(key).or_default() += 1,
            None => {
                unrecognised.insert(vehicle.kind.clone());
            }
        }
    }
    VehicleTally {
        counts: grouped
            .into_iter()
            .map(|(key, count)| VehicleCount { key, count })
            .collect(),
        unrecognised,
    }
}

/// Keys a station contributes to its network's vehicle-type list.
///
/// This is the key set of [`infer_station_counts`], or the default key when
/// inference yields nothing.
#[must_use]
pub fn station_type_keys(station: &Station) -> Vec<TypeKey> {
    let keys: Vec<TypeKey> = infer_station_counts(&station.stat.extra, station.stat.bikes)
        .into_iter()
        .map(|entry| entry.key)
        .collect();
    if keys.is_empty() {
        vec![TypeKey::DEFAULT]
    } else {
        keys
    }
}
