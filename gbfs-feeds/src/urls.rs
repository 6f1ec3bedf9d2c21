//! Absolute URL generation for discovery documents.

use crate::{FeedName, GbfsVersion};

/// Produces absolute feed URLs.
///
/// The HTTP layer decides the base (configured or derived from the request);
/// adapters only ask for the URL of a logical feed.
pub trait UrlResolver: Send + Sync {
    /// URL of `feed` for `version`, under `network` when the feed is scoped to
    /// one.
    fn feed_url(&self, version: GbfsVersion, network: Option<&str>, feed: FeedName) -> String;
}

/// Resolves URLs below a fixed base such as `https://gbfs.citybik.es`.
///
/// # Examples
/// ```
/// use gbfs_feeds::{BaseUrl, FeedName, GbfsVersion, UrlResolver};
///
/// let urls = BaseUrl::new("https://gbfs.example.org/");
/// assert_eq!(
///     urls.feed_url(GbfsVersion::V3, Some("bicing"), FeedName::Gbfs),
///     "https://gbfs.example.org/3/bicing/gbfs.json"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    base: String,
}

impl BaseUrl {
    /// Wrap a base URL, ignoring trailing slashes.
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    /// The normalised base, without a trailing slash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.base
    }
}

impl UrlResolver for BaseUrl {
    fn feed_url(&self, version: GbfsVersion, network: Option<&str>, feed: FeedName) -> String {
        match network {
            Some(uid) => format!(
                "{}/{}/{}/{}",
                self.base,
                version.mount(),
                uid,
                feed.file_name()
            ),
            None => format!("{}/{}/{}", self.base, version.mount(), feed.file_name()),
        }
    }
}
