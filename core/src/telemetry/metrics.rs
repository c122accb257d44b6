use std::sync::Mutex;

/// Counters for the task-list poll cycle.
pub struct PollMetrics {
    inner: Mutex<Counters>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub reconciled: usize,
    pub skipped_entries: usize,
    pub failed_polls: usize,
}

impl PollMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counters::default()),
        }
    }

    pub fn record_reconciled(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.reconciled += 1;
        }
    }

    pub fn record_skipped(&self, count: usize) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.skipped_entries += count;
        }
    }

    pub fn record_failed_poll(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.failed_polls += 1;
        }
    }

    pub fn snapshot(&self) -> Counters {
        self.inner
            .lock()
            .map(|counters| *counters)
            .unwrap_or_default()
    }
}

impl Default for PollMetrics {
    fn default() -> Self {
        Self::new()
    }
}
