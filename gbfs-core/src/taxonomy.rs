//! Vehicle taxonomy shared by every GBFS version.
//!
//! Citybikes describes vehicles with a handful of loosely typed keys: station
//! counters such as `ebikes` or `kid_bikes`, and free-floating vehicle kinds
//! such as `bike` or `scooter`. Several keys are aliases of the same physical
//! vehicle, so every key resolves to a canonical [`VehicleClass`] and each
//! class owns exactly one static [`VehicleDescriptor`].
//!
//! # Examples
//! ```
//! use gbfs_core::{TypeKey, VehicleClass};
//!
//! let key: TypeKey = "ebikes".parse().expect("known key");
//! assert_eq!(key.class(), VehicleClass::ElectricBike);
//! assert_eq!(key.descriptor().vehicle_type_id, "cb:vehicle:ebike");
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Physical shape of a vehicle, as published in the GBFS `form_factor` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormFactor {
    /// A regular bicycle.
    Bicycle,
    /// A bicycle with a cargo area.
    CargoBicycle,
    /// A standing kick scooter.
    ScooterStanding,
}

impl FormFactor {
    /// Return the GBFS wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bicycle => "bicycle",
            Self::CargoBicycle => "cargo_bicycle",
            Self::ScooterStanding => "scooter_standing",
        }
    }
}

impl fmt::Display for FormFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a vehicle moves, as published in the GBFS `propulsion_type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Propulsion {
    /// Pedal powered.
    Human,
    /// Battery powered.
    Electric,
}

impl Propulsion {
    /// Return the GBFS wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Electric => "electric",
        }
    }
}

impl fmt::Display for Propulsion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of a vehicle type.
///
/// `max_range_meters` is present only for electric vehicles.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDescriptor {
    /// Stable GBFS identifier, for example `cb:vehicle:bike`.
    pub vehicle_type_id: &'static str,
    /// Physical shape of the vehicle.
    pub form_factor: FormFactor,
    /// Propulsion of the vehicle.
    pub propulsion: Propulsion,
    /// Human readable name, published in English.
    pub display_name: &'static str,
    /// Range on a full charge.
    pub max_range_meters: Option<f64>,
}

static BIKE: VehicleDescriptor = VehicleDescriptor {
    vehicle_type_id: "cb:vehicle:bike",
    form_factor: FormFactor::Bicycle,
    propulsion: Propulsion::Human,
    display_name: "Humble Bike",
    max_range_meters: None,
};

static KID_BIKE: VehicleDescriptor = VehicleDescriptor {
    vehicle_type_id: "cb:vehicle:kid-bike",
    form_factor: FormFactor::Bicycle,
    propulsion: Propulsion::Human,
    display_name: "Humble Kid Bike",
    max_range_meters: None,
};

static ELECTRIC_BIKE: VehicleDescriptor = VehicleDescriptor {
    vehicle_type_id: "cb:vehicle:ebike",
    form_factor: FormFactor::Bicycle,
    propulsion: Propulsion::Electric,
    display_name: "Electric Bike",
    max_range_meters: Some(9000.0),
};

static CARGO_BIKE: VehicleDescriptor = VehicleDescriptor {
    vehicle_type_id: "cb:vehicle:cargo",
    form_factor: FormFactor::CargoBicycle,
    propulsion: Propulsion::Human,
    display_name: "Humble Cargo Bike",
    max_range_meters: None,
};

static ELECTRIC_CARGO_BIKE: VehicleDescriptor = VehicleDescriptor {
    vehicle_type_id: "cb:vehicle:ecargo",
    form_factor: FormFactor::CargoBicycle,
    propulsion: Propulsion::Electric,
    display_name: "Electric Cargo Bike",
    max_range_meters: Some(9000.0),
};

static SCOOTER: VehicleDescriptor = VehicleDescriptor {
    vehicle_type_id: "cb:vehicle:scooter",
    form_factor: FormFactor::ScooterStanding,
    propulsion: Propulsion::Electric,
    display_name: "Electric Scooter",
    max_range_meters: Some(9000.0),
};

/// Canonical vehicle classes known to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VehicleClass {
    /// Plain pedal bicycle.
    Bike,
    /// Child sized pedal bicycle.
    KidBike,
    /// Pedal assisted bicycle.
    ElectricBike,
    /// Pedal cargo bicycle.
    CargoBike,
    /// Pedal assisted cargo bicycle.
    ElectricCargoBike,
    /// Standing electric scooter.
    Scooter,
}

impl VehicleClass {
    /// Class assumed when a station says nothing about what it holds.
    pub const DEFAULT: Self = Self::Bike;

    /// Return the static descriptor for this class.
    #[must_use]
    pub fn descriptor(self) -> &'static VehicleDescriptor {
        match self {
            Self::Bike => &BIKE,
            Self::KidBike => &KID_BIKE,
            Self::ElectricBike => &ELECTRIC_BIKE,
            Self::CargoBike => &CARGO_BIKE,
            Self::ElectricCargoBike => &ELECTRIC_CARGO_BIKE,
            Self::Scooter => &SCOOTER,
        }
    }
}

/// Raw vehicle-type keys as they appear in Citybikes payloads.
///
/// Variants are declared in taxonomy order; deriving `Ord` makes every
/// ordered collection of keys iterate in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKey {
    /// Station counter `ebikes`.
    Ebikes,
    /// Station counter `normal_bikes`.
    NormalBikes,
    /// Station counter `cargo`.
    Cargo,
    /// Station counter `ecargo`.
    Ecargo,
    /// Station counter `kid_bikes`.
    KidBikes,
    /// Vehicle kind `bike`.
    Bike,
    /// Vehicle kind `ebike`.
    Ebike,
    /// Vehicle kind `scooter`.
    Scooter,
}

impl TypeKey {
    /// Every key, in taxonomy order.
    pub const ALL: [Self; 8] = [
        Self::Ebikes,
        Self::NormalBikes,
        Self::Cargo,
        Self::Ecargo,
        Self::KidBikes,
        Self::Bike,
        Self::Ebike,
        Self::Scooter,
    ];

    /// Keys that may appear as per-type counters in a station's `extra`.
    pub const STATION_KEYS: [Self; 5] = [
        Self::Ebikes,
        Self::NormalBikes,
        Self::Cargo,
        Self::Ecargo,
        Self::KidBikes,
    ];

    /// Keys that may appear as a free-floating vehicle's `kind`.
    pub const VEHICLE_KINDS: [Self; 3] = [Self::Bike, Self::Ebike, Self::Scooter];

    /// Key reported for stations that carry no per-type information.
    pub const DEFAULT: Self = Self::NormalBikes;

    /// Return the key as it is spelled on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ebikes => "ebikes",
            Self::NormalBikes => "normal_bikes",
            Self::Cargo => "cargo",
            Self::Ecargo => "ecargo",
            Self::KidBikes => "kid_bikes",
            Self::Bike => "bike",
            Self::Ebike => "ebike",
            Self::Scooter => "scooter",
        }
    }

    /// Resolve aliases to the canonical class.
    #[must_use]
    pub const fn class(self) -> VehicleClass {
        match self {
            Self::NormalBikes | Self::Bike => VehicleClass::Bike,
            Self::Ebikes | Self::Ebike => VehicleClass::ElectricBike,
            Self::Cargo => VehicleClass::CargoBike,
            Self::Ecargo => VehicleClass::ElectricCargoBike,
            Self::KidBikes => VehicleClass::KidBike,
            Self::Scooter => VehicleClass::Scooter,
        }
    }

    /// Return the descriptor of the class this key resolves to.
    #[must_use]
    pub fn descriptor(self) -> &'static VehicleDescriptor {
        self.class().descriptor()
    }

    /// Parse a free-floating vehicle `kind`.
    ///
    /// Station counter names are rejected here because they never describe a
    /// single vehicle.
    ///
    /// # Examples
    /// ```
    /// use gbfs_core::TypeKey;
    ///
    /// assert_eq!(TypeKey::from_vehicle_kind("scooter"), Some(TypeKey::Scooter));
    /// assert_eq!(TypeKey::from_vehicle_kind("ebikes"), None);
    /// ```
    #[must_use]
    pub fn from_vehicle_kind(kind: &str) -> Option<Self> {
        Self::VEHICLE_KINDS
            .into_iter()
            .find(|key| key.as_str() == kind)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known vehicle-type key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown vehicle type key '{key}'")]
pub struct UnknownTypeKey {
    /// The rejected input.
    pub key: String,
}

impl FromStr for TypeKey {
    type Err = UnknownTypeKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownTypeKey { key: s.to_owned() })
    }
}

/// Look up the descriptor for a raw key.
///
/// Unknown keys yield `None`; callers decide whether to skip the entry or to
/// substitute [`VehicleClass::DEFAULT`].
#[must_use]
pub fn descriptor_for(key: &str) -> Option<&'static VehicleDescriptor> {
    key.parse::<TypeKey>().ok().map(TypeKey::descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case("normal_bikes", "cb:vehicle:bike")]
    #[case("bike", "cb:vehicle:bike")]
    #[case("ebikes", "cb:vehicle:ebike")]
    #[case("ebike", "cb:vehicle:ebike")]
    #[case("cargo", "cb:vehicle:cargo")]
    #[case("ecargo", "cb:vehicle:ecargo")]
    #[case("kid_bikes", "cb:vehicle:kid-bike")]
    #[case("scooter", "cb:vehicle:scooter")]
    fn keys_resolve_to_descriptors(#[case] key: &str, #[case] expected: &str) {
        let descriptor = descriptor_for(key).expect("known key");
        assert_eq!(descriptor.vehicle_type_id, expected);
    }

    #[rstest]
    fn aliases_share_one_descriptor() {
        assert!(std::ptr::eq(
            TypeKey::NormalBikes.descriptor(),
            TypeKey::Bike.descriptor()
        ));
        assert!(std::ptr::eq(
            TypeKey::Ebikes.descriptor(),
            TypeKey::Ebike.descriptor()
        ));
    }

    #[rstest]
    #[case("tandem")]
    #[case("")]
    #[case("Bike")]
    fn unknown_keys_are_rejected(#[case] key: &str) {
        assert!(descriptor_for(key).is_none());
        let err = key.parse::<TypeKey>().expect_err("unknown key");
        assert_eq!(err.key, key);
    }

    #[rstest]
    fn only_electric_vehicles_have_a_range() {
        for key in TypeKey::ALL {
            let descriptor = key.descriptor();
            assert_eq!(
                descriptor.max_range_meters.is_some(),
                descriptor.propulsion == Propulsion::Electric,
                "{key}"
            );
        }
    }

    #[rstest]
    fn vehicle_type_ids_are_unique_per_class() {
        let classes: HashSet<_> = TypeKey::ALL.into_iter().map(TypeKey::class).collect();
        let ids: HashSet<_> = classes
            .iter()
            .map(|class| class.descriptor().vehicle_type_id)
            .collect();
        assert_eq!(classes.len(), ids.len());
    }

    #[rstest]
    fn default_class_is_the_humble_bike() {
        assert_eq!(VehicleClass::DEFAULT.descriptor().vehicle_type_id, "cb:vehicle:bike");
        assert_eq!(TypeKey::DEFAULT.class(), VehicleClass::DEFAULT);
    }

    #[rstest]
    fn wire_values_match_gbfs() {
        assert_eq!(FormFactor::CargoBicycle.as_str(), "cargo_bicycle");
        assert_eq!(FormFactor::ScooterStanding.to_string(), "scooter_standing");
        assert_eq!(Propulsion::Electric.as_str(), "electric");
    }
}
