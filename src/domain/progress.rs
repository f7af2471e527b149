use serde::Serialize;

/// Live counters for one query's enrichment batch.
///
/// `completed == successful + failed` and `completed <= total` hold after
/// every update; only the batch driver mutates it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentProgress {
    pub total: usize,
    pub completed: usize,
    pub successful: usize,
    pub failed: usize,
    pub is_running: bool,
}

impl EnrichmentProgress {
    pub fn start(total: usize) -> Self {
        EnrichmentProgress {
            total,
            completed: 0,
            successful: 0,
            failed: 0,
            is_running: true,
        }
    }

    pub(crate) fn record_success(&mut self) {
        self.successful += 1;
        self.completed = self.successful + self.failed;
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed += 1;
        self.completed = self.successful + self.failed;
    }

    pub(crate) fn finish(&mut self) {
        self.is_running = false;
    }
}
