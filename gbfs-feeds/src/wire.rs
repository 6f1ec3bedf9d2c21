//! Value conversions shared by every GBFS version.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use gbfs_core::{StationExtra, Timestamp};

use crate::FeedError;

const COORDINATE_SCALE: f64 = 1_000_000.0;

/// Payment methods implied by a station's payment terminal.
pub const TERMINAL_METHODS: [&str; 2] = ["key", "creditcard"];

/// Round a coordinate to six decimal places.
///
/// # Examples
/// ```
/// use gbfs_feeds::wire::round_coordinate;
///
/// assert_eq!(round_coordinate(41.387_428_999), 41.387_429);
/// ```
#[must_use]
pub fn round_coordinate(value: f64) -> f64 {
    (value * COORDINATE_SCALE).round() / COORDINATE_SCALE
}

/// Clamp a count to zero from below.
#[must_use]
pub fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Normalise a battery reading to a fraction in `[0, 1]`.
///
/// Readings above one are taken to be percentages.
#[must_use]
pub fn fuel_fraction(battery: f64) -> f64 {
    let fraction = if battery > 1.0 { battery / 100.0 } else { battery };
    fraction.clamp(0.0, 1.0)
}

/// Rental methods advertised by a station.
///
/// Upstream payment methods keep their order. When the payment-terminal flag
/// is present at all, whatever its value, [`TERMINAL_METHODS`] are appended.
/// Duplicates are dropped on first occurrence. Returns `None` when the
/// station says nothing about payment.
#[must_use]
pub fn rental_methods(extra: &StationExtra) -> Option<Vec<String>> {
    let terminal = extra.payment_terminal.is_some();
    if extra.payment.is_none() && !terminal {
        return None;
    }
    let mut methods: Vec<String> = Vec::new();
    let mut push = |method: &str| {
        if !methods.iter().any(|known| known == method) {
            methods.push(method.to_owned());
        }
    };
    for method in extra.payment.iter().flatten() {
        push(method);
    }
    if terminal {
        for method in TERMINAL_METHODS {
            push(method);
        }
    }
    Some(methods)
}

/// Unwrap a required field or report which entity lacks it.
pub(crate) fn require<T>(
    value: Option<T>,
    entity: &'static str,
    uid: &str,
    field: &'static str,
) -> Result<T, FeedError> {
    value.ok_or_else(|| FeedError::MissingField {
        entity,
        uid: uid.to_owned(),
        field,
    })
}

/// Parse a required observation timestamp.
pub(crate) fn observed_at(
    timestamp: Option<&Timestamp>,
    entity: &'static str,
    uid: &str,
) -> Result<DateTime<FixedOffset>, FeedError> {
    let timestamp = require(timestamp, entity, uid, "timestamp")?;
    timestamp
        .parse()
        .map_err(|source| FeedError::InvalidTimestamp {
            entity,
            uid: uid.to_owned(),
            value: timestamp.as_str().to_owned(),
            source,
        })
}

/// Render a timestamp as epoch seconds (GBFS 2.x).
#[must_use]
pub fn epoch_seconds(instant: &DateTime<FixedOffset>) -> i64 {
    instant.timestamp()
}

/// Render a timestamp as RFC 3339 with whole seconds (GBFS 3.x).
///
/// The original offset is preserved; UTC renders as `+00:00`.
#[must_use]
pub fn rfc3339(instant: &DateTime<FixedOffset>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::BTreeSet;

    fn extra(payment: Option<&[&str]>, terminal: Option<bool>) -> StationExtra {
        StationExtra {
            payment: payment.map(|methods| methods.iter().map(|&m| m.to_owned()).collect()),
            payment_terminal: terminal,
            ..StationExtra::default()
        }
    }

    #[rstest]
    #[case(1.234_567_89, 1.234_568)]
    #[case(-0.000_000_4, 0.0)]
    #[case(2.0, 2.0)]
    fn rounds_to_six_places(#[case] raw: f64, #[case] expected: f64) {
        assert!((round_coordinate(raw) - expected).abs() < 1e-12);
    }

    #[rstest]
    #[case(-3, 0)]
    #[case(0, 0)]
    #[case(7, 7)]
    fn clamps_counts(#[case] raw: i64, #[case] expected: u64) {
        assert_eq!(non_negative(raw), expected);
    }

    #[rstest]
    #[case(0.5, 0.5)]
    #[case(80.0, 0.8)]
    #[case(150.0, 1.0)]
    #[case(-2.0, 0.0)]
    fn normalises_battery(#[case] raw: f64, #[case] expected: f64) {
        assert!((fuel_fraction(raw) - expected).abs() < 1e-12);
    }

    #[rstest]
    fn terminal_appends_key_and_card() {
        let methods = rental_methods(&extra(Some(&["key", "phone"]), Some(true)));
        assert_eq!(
            methods,
            Some(vec!["key".to_owned(), "phone".to_owned(), "creditcard".to_owned()])
        );
    }

    #[rstest]
    fn terminal_without_upstream_methods() {
        let methods = rental_methods(&extra(None, Some(true)));
        assert_eq!(methods, Some(vec!["key".to_owned(), "creditcard".to_owned()]));
    }

    #[rstest]
    fn terminal_flag_counts_even_when_false() {
        let methods = rental_methods(&extra(Some(&["visa"]), Some(false)));
        assert_eq!(
            methods,
            Some(vec!["visa".to_owned(), "key".to_owned(), "creditcard".to_owned()])
        );
    }

    #[rstest]
    fn upstream_methods_pass_through_without_terminal() {
        let methods = rental_methods(&extra(Some(&["visa", "visa"]), None));
        assert_eq!(methods, Some(vec!["visa".to_owned()]));
    }

    #[rstest]
    #[case(&["visa"], Some(true))]
    #[case(&["visa"], Some(false))]
    #[case(&["key", "visa"], Some(true))]
    #[case(&["visa", "key"], Some(true))]
    #[case(&["creditcard", "visa", "key"], Some(true))]
    #[case(&["visa", "creditcard"], Some(false))]
    #[case(&["key", "creditcard", "visa"], None)]
    #[case(&["visa", "key", "creditcard", "visa"], None)]
    fn terminal_methods_are_merged_once(
        #[case] payment: &[&str],
        #[case] terminal: Option<bool>,
    ) {
        let methods = rental_methods(&extra(Some(payment), terminal)).expect("methods");
        let unique: BTreeSet<&str> = methods.iter().map(String::as_str).collect();
        assert_eq!(unique.len(), methods.len());
        assert_eq!(unique, BTreeSet::from(["creditcard", "key", "visa"]));
    }

    #[rstest]
    fn silent_stations_have_no_methods() {
        assert_eq!(rental_methods(&extra(None, None)), None);
    }

    #[rstest]
    fn renders_both_timestamp_styles() {
        let instant = Timestamp::new("2024-05-01T10:00:00.750+02:00")
            .parse()
            .expect("timestamp");
        assert_eq!(epoch_seconds(&instant), 1_714_550_400);
        assert_eq!(rfc3339(&instant), "2024-05-01T10:00:00+02:00");
    }

    #[rstest]
    fn missing_timestamp_is_a_missing_field() {
        let err = observed_at(None, "station", "s1").expect_err("missing");
        assert_eq!(
            err,
            FeedError::MissingField {
                entity: "station",
                uid: "s1".into(),
                field: "timestamp",
            }
        );
    }

    #[rstest]
    fn garbage_timestamp_is_reported() {
        let ts = Timestamp::new("soon");
        let err = observed_at(Some(&ts), "vehicle", "v1").expect_err("invalid");
        assert!(matches!(err, FeedError::InvalidTimestamp { value, .. } if value == "soon"));
    }
}
