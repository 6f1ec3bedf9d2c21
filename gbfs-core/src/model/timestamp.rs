//! Observation timestamps as Citybikes stores them.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// An ISO-8601 timestamp string kept exactly as it was persisted.
///
/// Parsing is deferred to the feed adapters, which either reduce the value to
/// epoch seconds or re-serialise it as RFC 3339. Values without an offset are
/// read as UTC.
///
/// # Examples
/// ```
/// use gbfs_core::Timestamp;
///
/// let ts = Timestamp::new("2024-05-01T10:00:00+02:00");
/// assert_eq!(ts.parse().expect("valid").timestamp(), 1_714_550_400);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Wrap a raw timestamp string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The latest instant among `timestamps`.
    ///
    /// Values are compared after parsing, so offsets are honoured. Values
    /// that fail to parse rank below every parsable one; when nothing
    /// parses one of them is still returned so callers can report it.
    pub fn newest<I>(timestamps: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        timestamps
            .into_iter()
            .map(|timestamp| (timestamp.parse().ok(), timestamp))
            .max_by(|(left, _), (right, _)| left.cmp(right))
            .map(|(_, timestamp)| timestamp)
    }

    /// Parse the timestamp, keeping its offset.
    ///
    /// # Errors
    /// Returns the parser error when the string matches none of the accepted
    /// ISO-8601 layouts.
    pub fn parse(&self) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        let raw = self.0.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Ok(parsed);
        }
        for format in OFFSET_FORMATS {
            if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
                return Ok(parsed);
            }
        }
        let mut last_error = None;
        for format in NAIVE_FORMATS {
            match NaiveDateTime::parse_from_str(raw, format) {
                Ok(naive) => return Ok(naive.and_utc().fixed_offset()),
                Err(err) => last_error = Some(err),
            }
        }
        match last_error {
            Some(err) => Err(err),
            None => DateTime::parse_from_rfc3339(raw),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Timestamp {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Timestamp {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024-05-01T08:00:00Z", 1_714_550_400)]
    #[case("2024-05-01T08:00:00+00:00", 1_714_550_400)]
    #[case("2024-05-01T10:00:00+02:00", 1_714_550_400)]
    #[case("2024-05-01T08:00:00.123456", 1_714_550_400)]
    #[case("2024-05-01T08:00:00", 1_714_550_400)]
    #[case("2024-05-01 08:00:00", 1_714_550_400)]
    #[case("2024-05-01T08:00:00+0000", 1_714_550_400)]
    fn parses_iso_layouts(#[case] raw: &str, #[case] epoch: i64) {
        let parsed = Timestamp::new(raw).parse().expect("timestamp should parse");
        assert_eq!(parsed.timestamp(), epoch);
    }

    #[rstest]
    fn keeps_the_original_offset() {
        let parsed = Timestamp::new("2024-05-01T10:00:00+02:00")
            .parse()
            .expect("timestamp should parse");
        assert_eq!(parsed.offset().local_minus_utc(), 7200);
    }

    #[rstest]
    fn naive_values_are_utc() {
        let parsed = Timestamp::new("2024-05-01T08:00:00")
            .parse()
            .expect("timestamp should parse");
        assert_eq!(parsed.offset().local_minus_utc(), 0);
    }

    #[rstest]
    #[case("")]
    #[case("yesterday")]
    #[case("2024-13-01T00:00:00")]
    fn rejects_garbage(#[case] raw: &str) {
        assert!(Timestamp::new(raw).parse().is_err());
    }

    #[rstest]
    fn newest_compares_instants_across_offsets() {
        let newest = Timestamp::newest([
            Timestamp::new("2024-05-01T10:00:00+02:00"),
            Timestamp::new("2024-05-01T09:00:00Z"),
            Timestamp::new("2024-05-01 08:30:00"),
        ]);
        assert_eq!(newest, Some(Timestamp::new("2024-05-01T09:00:00Z")));
    }

    #[rstest]
    fn newest_prefers_parsable_values() {
        let newest = Timestamp::newest([
            Timestamp::new("not a time"),
            Timestamp::new("2024-05-01T08:00:00Z"),
        ]);
        assert_eq!(newest, Some(Timestamp::new("2024-05-01T08:00:00Z")));
        let only_garbage = Timestamp::newest([Timestamp::new("not a time")]);
        assert_eq!(only_garbage, Some(Timestamp::new("not a time")));
        assert_eq!(Timestamp::newest(Vec::new()), None);
    }

    #[rstest]
    fn serialises_as_a_plain_string() {
        let json = serde_json::to_string(&Timestamp::new("2024-05-01T08:00:00Z"))
            .expect("serialise timestamp");
        assert_eq!(json, "\"2024-05-01T08:00:00Z\"");
    }
}
