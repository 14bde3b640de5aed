use std::sync::atomic::{AtomicU64, Ordering};

/// Contadores de concorrência do worker. O contador `active` é o pool:
/// o consumer só puxa trabalho enquanto `active < max_concurrent`.
#[derive(Default)]
pub struct WorkerMetrics {
    active: AtomicU64,
    completed: AtomicU64,
    total: AtomicU64,
    batches: AtomicU64,
}

impl WorkerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task_started(&self) {
        self.active.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    /// Toda task submetida termina por aqui, aceita ou não.
    pub fn task_finished(&self, accepted: bool) {
        if accepted {
            self.completed.fetch_add(1, Ordering::Relaxed);
        }
        self.active.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn batch_tick(&self) {
        self.batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn active(&self) -> u64 {
        self.active.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_finish_pairing() {
        let metrics = WorkerMetrics::new();
        metrics.task_started();
        metrics.task_started();
        assert_eq!(metrics.active(), 2);
        assert_eq!(metrics.total(), 2);

        metrics.task_finished(true);
        metrics.task_finished(false);
        assert_eq!(metrics.active(), 0);
        assert_eq!(metrics.completed(), 1);
        assert_eq!(metrics.total(), 2);
    }

    #[test]
    fn test_batch_tick() {
        let metrics = WorkerMetrics::new();
        metrics.batch_tick();
        metrics.batch_tick();
        assert_eq!(metrics.batches(), 2);
    }
}
