//! The `{last_updated, ttl, version, data}` wrapper around every feed.

use serde::Serialize;

use crate::GbfsVersion;

/// A versioned feed wrapped with its freshness metadata.
///
/// `T` is the version's timestamp representation: epoch seconds for 2.3 and
/// RFC 3339 text for 3.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<D, T> {
    /// Newest observation in scope.
    pub last_updated: T,
    /// Seconds clients may cache the document for.
    pub ttl: u32,
    /// Version string of the payload.
    pub version: &'static str,
    /// Version-specific payload.
    pub data: D,
}

/// Assemble an envelope.
///
/// # Examples
/// ```
/// use gbfs_feeds::{GbfsVersion, envelope};
///
/// let wrapped = envelope::build(GbfsVersion::V2, 0, "payload", 1_714_550_400_i64);
/// assert_eq!(wrapped.version, "2.3");
/// assert_eq!(wrapped.ttl, 0);
/// ```
pub fn build<D, T>(version: GbfsVersion, ttl: u32, data: D, last_updated: T) -> Envelope<D, T> {
    Envelope {
        last_updated,
        ttl,
        version: version.as_str(),
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn serialises_fields_in_wire_order() {
        let wrapped = build(GbfsVersion::V3, 0, json!({"feeds": []}), "2024-05-01T08:00:00+00:00");
        let text = serde_json::to_string(&wrapped).expect("serialise");
        assert_eq!(
            text,
            r#"{"last_updated":"2024-05-01T08:00:00+00:00","ttl":0,"version":"3.0","data":{"feeds":[]}}"#
        );
    }
}
