use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::domain::SearchResultCandidate;

#[async_trait]
pub trait SearchResultsProvider: Send + Sync {
    async fn fetch_results(&self, query_id: &str) -> anyhow::Result<Vec<SearchResultCandidate>>;
}

/// Reads the stored results of a lead-search query from the backend.
pub struct SearchResultsClient {
    client: Client,
    base_url: Url,
}

impl SearchResultsClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid search results base url: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("Search results base url cannot be a base: {}", base_url);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build search results http client")?;

        Ok(SearchResultsClient { client, base_url })
    }

    pub fn results_url(&self, query_id: &str) -> anyhow::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Search results base url cannot be a base"))?
            .pop_if_empty()
            .extend(["api", "search-queries", query_id, "results"]);

        Ok(url)
    }
}

#[async_trait]
impl SearchResultsProvider for SearchResultsClient {
    async fn fetch_results(&self, query_id: &str) -> anyhow::Result<Vec<SearchResultCandidate>> {
        let url = self.results_url(query_id)?;

        let res = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("No response from search results api for {}", query_id))?
            .error_for_status()
            .with_context(|| format!("Search results api rejected query {}", query_id))?;

        let candidates = res
            .json::<Vec<SearchResultCandidate>>()
            .await
            .with_context(|| format!("Malformed search results for query {}", query_id))?;

        log::info!(
            "Fetched {} search results for query {}",
            candidates.len(),
            query_id
        );

        Ok(candidates)
    }
}
