use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use crate::domain::EnrichmentProgress;

/// Per-query enrichment progress, shared between the batch driver (writer)
/// and whoever renders it (readers get copies).
///
/// Locks are never held across an await, so a batch claim can release its
/// record from `Drop`.
#[derive(Debug, Clone, Default)]
pub struct ProgressBoard {
    queries: Arc<RwLock<HashMap<String, EnrichmentProgress>>>,
}

impl ProgressBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, query_id: &str) -> Option<EnrichmentProgress> {
        self.queries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(query_id)
            .copied()
    }

    pub fn snapshot(&self) -> HashMap<String, EnrichmentProgress> {
        self.queries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_running(&self, query_id: &str) -> bool {
        self.get(query_id).is_some_and(|p| p.is_running)
    }

    /// Check-and-set under one write lock. Returns `false`, leaving the
    /// record untouched, if a batch for `query_id` is still running.
    pub(crate) fn try_start(&self, query_id: &str, total: usize) -> bool {
        let mut queries = self.queries.write().unwrap_or_else(PoisonError::into_inner);
        if queries.get(query_id).is_some_and(|p| p.is_running) {
            return false;
        }
        queries.insert(query_id.to_string(), EnrichmentProgress::start(total));
        true
    }

    pub(crate) fn update<F>(&self, query_id: &str, f: F) -> Option<EnrichmentProgress>
    where
        F: FnOnce(&mut EnrichmentProgress),
    {
        let mut queries = self.queries.write().unwrap_or_else(PoisonError::into_inner);
        let progress = queries.get_mut(query_id)?;
        f(progress);
        Some(*progress)
    }
}
