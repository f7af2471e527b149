use serde::{Deserialize, Serialize};

/// Tenant, actor and query identifiers attached to every enrichment request
/// of a batch. Read-only while the batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentSessionContext {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub company_id: String,
    #[serde(default)]
    pub company_banner_id: String,
    #[serde(default)]
    pub actor_id: String,
    #[serde(default)]
    pub source_query_id: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("enrichment session is missing `{field}`")]
pub struct MissingSessionError {
    pub field: &'static str,
}

impl EnrichmentSessionContext {
    /// Fails on the first empty or blank field, in declaration order.
    pub fn validate(&self) -> Result<(), MissingSessionError> {
        let fields = [
            ("account_id", &self.account_id),
            ("company_id", &self.company_id),
            ("company_banner_id", &self.company_banner_id),
            ("actor_id", &self.actor_id),
            ("source_query_id", &self.source_query_id),
        ];

        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(MissingSessionError { field: *field }),
            None => Ok(()),
        }
    }
}
