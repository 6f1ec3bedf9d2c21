//! Publisher-wide constants reported in every system information feed.

/// Details about who publishes the feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publisher {
    /// Contact address for feed consumers.
    pub feed_contact_email: String,
    /// IANA timezone reported for every system.
    pub timezone: String,
    /// Opening hours in OSM syntax (3.0 only).
    pub opening_hours: String,
    /// Organisation credited for the data (3.0 only).
    pub attribution_organization_name: String,
    /// Link to the credited organisation (3.0 only).
    pub attribution_url: String,
}

impl Default for Publisher {
    fn default() -> Self {
        Self {
            feed_contact_email: "info@citybik.es".to_owned(),
            timezone: "Etc/UTC".to_owned(),
            opening_hours: "off".to_owned(),
            attribution_organization_name: "CityBikes".to_owned(),
            attribution_url: "https://citybik.es".to_owned(),
        }
    }
}
