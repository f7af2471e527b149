use std::time::Duration;

use uuid::Uuid;

use crate::domain::{
    EnrichmentProgress, EnrichmentSessionContext, MissingSessionError, SearchResultCandidate,
};

use super::{EnrichmentRequest, EnrichmentService, ProgressBoard};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    MissingSession(#[from] MissingSessionError),
    #[error("an enrichment batch is already running for query {0}")]
    AlreadyRunning(String),
    #[error("no candidates to enrich for query {0}")]
    NoCandidates(String),
}

/// A batch that passed validation and owns the running flag of its query,
/// together with the candidates it will drive. Dropping it without running
/// it to the end marks the query as no longer running.
#[derive(Debug)]
pub struct BatchClaim {
    batch_id: Uuid,
    query_id: String,
    session: EnrichmentSessionContext,
    candidates: Vec<SearchResultCandidate>,
    board: ProgressBoard,
    released: bool,
}

impl BatchClaim {
    fn release(&mut self) -> Option<EnrichmentProgress> {
        if self.released {
            return None;
        }
        self.released = true;
        self.board.update(&self.query_id, |p| p.finish())
    }
}

impl Drop for BatchClaim {
    fn drop(&mut self) {
        if let Some(p) = self.release() {
            log::warn!(
                "Enrichment batch {} for query {} abandoned after {}/{} candidates",
                self.batch_id,
                self.query_id,
                p.completed,
                p.total
            );
        }
    }
}

/// Drives candidates through the enrichment service one at a time, in order,
/// with a fixed pause between calls.
pub struct EnrichmentDriver<S> {
    service: S,
    throttle: Duration,
    progress: ProgressBoard,
}

impl<S: EnrichmentService> EnrichmentDriver<S> {
    pub fn new(service: S, throttle: Duration) -> Self {
        Self::with_board(service, throttle, ProgressBoard::new())
    }

    pub fn with_board(service: S, throttle: Duration, progress: ProgressBoard) -> Self {
        EnrichmentDriver {
            service,
            throttle,
            progress,
        }
    }

    pub fn progress_board(&self) -> &ProgressBoard {
        &self.progress
    }

    pub fn progress(&self, query_id: &str) -> Option<EnrichmentProgress> {
        self.progress.get(query_id)
    }

    pub async fn enrich_all(
        &self,
        query_id: &str,
        candidates: &mut [SearchResultCandidate],
        session: &EnrichmentSessionContext,
    ) -> Result<(), BatchError> {
        let claim = self.claim(query_id, candidates.to_vec(), session)?;
        let enriched = self.run(claim).await;
        candidates.clone_from_slice(&enriched);
        Ok(())
    }

    /// Validates the batch and marks `query_id` as running. Nothing is sent
    /// and no progress is touched when this fails.
    pub fn claim(
        &self,
        query_id: &str,
        candidates: Vec<SearchResultCandidate>,
        session: &EnrichmentSessionContext,
    ) -> Result<BatchClaim, BatchError> {
        session.validate()?;

        if candidates.is_empty() {
            return Err(BatchError::NoCandidates(query_id.to_string()));
        }

        if !self.progress.try_start(query_id, candidates.len()) {
            log::warn!("Enrichment already running for query {}", query_id);
            return Err(BatchError::AlreadyRunning(query_id.to_string()));
        }

        let claim = BatchClaim {
            batch_id: Uuid::new_v4(),
            query_id: query_id.to_string(),
            session: session.clone(),
            candidates,
            board: self.progress.clone(),
            released: false,
        };
        log::info!(
            "Started enrichment batch {} for query {} with {} candidates",
            claim.batch_id,
            query_id,
            claim.candidates.len()
        );

        Ok(claim)
    }

    pub async fn run(&self, claim: BatchClaim) -> Vec<SearchResultCandidate> {
        self.run_observed(claim, |_| {}).await
    }

    /// Runs a claimed batch to the end and hands back its candidates.
    /// `on_item` sees each candidate right after its attempt, before the
    /// counters move. Per-candidate failures only show up in the counters.
    pub async fn run_observed<F>(
        &self,
        mut claim: BatchClaim,
        mut on_item: F,
    ) -> Vec<SearchResultCandidate>
    where
        F: FnMut(&SearchResultCandidate) + Send,
    {
        let mut candidates = std::mem::take(&mut claim.candidates);
        let last = candidates.len().saturating_sub(1);

        for (i, candidate) in candidates.iter_mut().enumerate() {
            let request = EnrichmentRequest::new(&claim.session, &candidate.id);

            let outcome = self.service.enrich(&request).await;
            let succeeded = match outcome {
                Ok(()) => {
                    candidate.mark_processed();
                    true
                }
                Err(e) => {
                    log::warn!(
                        "Failed to enrich candidate {} ({}) for query {}: {}",
                        candidate.id,
                        candidate.domain().unwrap_or_default(),
                        claim.query_id,
                        e
                    );
                    false
                }
            };
            on_item(candidate);

            let progress = self.progress.update(&claim.query_id, |p| match succeeded {
                true => p.record_success(),
                false => p.record_failure(),
            });
            if let Some(p) = progress {
                log::debug!(
                    "Query {} enrichment progress {}/{}",
                    claim.query_id,
                    p.completed,
                    p.total
                );
            }

            if i < last && !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }
        }

        match claim.release() {
            Some(p) => log::info!(
                "Finished enrichment batch {} for query {}: {} successful, {} failed",
                claim.batch_id,
                claim.query_id,
                p.successful,
                p.failed
            ),
            None => log::error!(
                "Progress record for query {} vanished during batch {}",
                claim.query_id,
                claim.batch_id
            ),
        }

        candidates
    }
}
