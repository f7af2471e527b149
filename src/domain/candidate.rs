use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use url::Url;

/// One externally discovered lead reference, as returned by the search
/// results provider for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultCandidate {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub page_number: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub position: u32,
    /// Only ever flipped to `true`, and only by a successful enrichment.
    #[serde(default)]
    pub is_processed: bool,
}

impl SearchResultCandidate {
    pub fn domain(&self) -> Option<String> {
        let parsed_url = Url::parse(&self.link).ok()?;
        match parsed_url.host_str() {
            Some("") | None => None,
            Some(host) => match host.strip_prefix("www.") {
                Some(h) => Some(h.to_lowercase()),
                None => Some(host.to_lowercase()),
            },
        }
    }

    pub(crate) fn mark_processed(&mut self) {
        self.is_processed = true;
    }
}
