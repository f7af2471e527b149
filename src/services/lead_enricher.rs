use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::domain::EnrichmentSessionContext;

/// Body of `POST /api/leads/{google_result_id}/enrich`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichmentRequest {
    pub account_id: String,
    pub company_id: String,
    pub created_by: String,
    pub company_banner_id: String,
    pub source_query_id: String,
    pub google_result_id: String,
}

impl EnrichmentRequest {
    pub fn new(session: &EnrichmentSessionContext, candidate_id: &str) -> Self {
        EnrichmentRequest {
            account_id: session.account_id.clone(),
            company_id: session.company_id.clone(),
            created_by: session.actor_id.clone(),
            company_banner_id: session.company_banner_id.clone(),
            source_query_id: session.source_query_id.clone(),
            google_result_id: candidate_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnrichmentError {
    #[error("enrichment service answered with status {0}")]
    Status(u16),
    #[error("enrichment request failed: {0}")]
    Transport(String),
    #[error("cannot build enrichment url: {0}")]
    InvalidUrl(String),
}

#[async_trait]
pub trait EnrichmentService: Send + Sync {
    /// One attempt, no retries. `Ok` means the service accepted the lead.
    async fn enrich(&self, request: &EnrichmentRequest) -> Result<(), EnrichmentError>;
}

pub struct LeadEnricher {
    client: Client,
    api_token: Option<String>,
    base_url: Url,
}

impl LeadEnricher {
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, EnrichmentError> {
        let base_url =
            Url::parse(base_url).map_err(|e| EnrichmentError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(EnrichmentError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichmentError::Transport(e.to_string()))?;

        Ok(LeadEnricher {
            client,
            api_token,
            base_url,
        })
    }

    pub fn enrich_url(&self, candidate_id: &str) -> Result<Url, EnrichmentError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| EnrichmentError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "leads", candidate_id, "enrich"]);

        Ok(url)
    }
}

#[async_trait]
impl EnrichmentService for LeadEnricher {
    async fn enrich(&self, request: &EnrichmentRequest) -> Result<(), EnrichmentError> {
        let url = self.enrich_url(&request.google_result_id)?;

        let mut req = self.client.post(url).json(request);
        if let Some(ref token) = self.api_token {
            req = req.bearer_auth(token);
        }

        let res = req
            .send()
            .await
            .map_err(|e| EnrichmentError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(EnrichmentError::Status(status.as_u16()));
        }

        let body = res
            .text()
            .await
            .map_err(|e| EnrichmentError::Transport(e.to_string()))?;
        log::debug!(
            "Enriched lead {} | Response: {}",
            request.google_result_id,
            body
        );

        Ok(())
    }
}
