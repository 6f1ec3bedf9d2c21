//! Localised text for GBFS 3.0.
//!
//! GBFS 3.0 publishes human readable strings as lists of `{text, language}`
//! pairs. Every string the service publishes is English.

use serde::Serialize;

/// Language of every published string.
pub const LANGUAGE: &str = "en";

/// One translation of a human readable string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedText {
    /// The translated text.
    pub text: String,
    /// BCP 47 language tag.
    pub language: &'static str,
}

/// Wrap a string as a single English translation.
///
/// # Examples
/// ```
/// use gbfs_feeds::i18n::localize;
///
/// let name = localize("Bicing");
/// assert_eq!(name.len(), 1);
/// assert_eq!(name[0].language, "en");
/// ```
pub fn localize(text: impl Into<String>) -> Vec<LocalizedText> {
    vec![LocalizedText {
        text: text.into(),
        language: LANGUAGE,
    }]
}
