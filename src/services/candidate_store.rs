use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, PoisonError, RwLock},
};

use crate::domain::SearchResultCandidate;

/// Last known candidate list per query, as loaded from the search results
/// provider and flagged item by item while a batch runs.
#[derive(Debug, Clone, Default)]
pub struct CandidateStore {
    queries: Arc<RwLock<HashMap<String, Vec<SearchResultCandidate>>>>,
}

impl CandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, query_id: &str) -> Option<Vec<SearchResultCandidate>> {
        self.queries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(query_id)
            .cloned()
    }

    pub fn put(&self, query_id: &str, candidates: Vec<SearchResultCandidate>) {
        self.queries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(query_id.to_string(), candidates);
    }

    /// Copies `is_processed` from the stored list onto a freshly fetched one,
    /// matching by candidate id. Flags are never cleared.
    pub fn carry_over_processed(&self, query_id: &str, candidates: &mut [SearchResultCandidate]) {
        let queries = self.queries.read().unwrap_or_else(PoisonError::into_inner);
        let Some(previous) = queries.get(query_id) else {
            return;
        };

        let processed: HashSet<&str> = previous
            .iter()
            .filter(|c| c.is_processed)
            .map(|c| c.id.as_str())
            .collect();
        for candidate in candidates.iter_mut() {
            if processed.contains(candidate.id.as_str()) {
                candidate.mark_processed();
            }
        }
    }

    pub fn mark_processed(&self, query_id: &str, candidate_id: &str) {
        let mut queries = self.queries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(candidates) = queries.get_mut(query_id) {
            candidates
                .iter_mut()
                .filter(|c| c.id == candidate_id)
                .for_each(|c| c.mark_processed());
        }
    }
}
