use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use regforge_core::BatchResult;

pub const DEFAULT_HISTORY_WINDOW: usize = 50;

/// Outcome of one finished batch, as kept by the aggregator.
#[derive(Debug, Clone)]
pub struct BatchRecord {
    pub result: BatchResult,
    pub requested: usize,
    pub cancelled: bool,
    pub finished_at: DateTime<Utc>,
}

/// Accumulates counts across batches and retains a bounded history window,
/// oldest entries evicted first.
#[derive(Debug)]
pub struct BatchHistory {
    window: usize,
    entries: VecDeque<BatchRecord>,
    totals: BatchResult,
}

impl Default for BatchHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

impl BatchHistory {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            entries: VecDeque::new(),
            totals: BatchResult::default(),
        }
    }

    pub fn record(&mut self, record: BatchRecord) {
        self.totals.success += record.result.success;
        self.totals.failed += record.result.failed;
        self.totals.retried += record.result.retried;

        self.entries.push_back(record);
        while self.entries.len() > self.window {
            self.entries.pop_front();
        }
    }

    /// Running totals across every recorded batch, including evicted ones.
    pub fn totals(&self) -> &BatchResult {
        &self.totals
    }

    pub fn entries(&self) -> impl Iterator<Item = &BatchRecord> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(success: u64) -> BatchRecord {
        BatchRecord {
            result: BatchResult { success, failed: 1, retried: 0 },
            requested: (success + 1) as usize,
            cancelled: false,
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn totals_accumulate_across_batches() {
        let mut history = BatchHistory::new(10);
        history.record(record(2));
        history.record(record(3));
        assert_eq!(history.totals().success, 5);
        assert_eq!(history.totals().failed, 2);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn window_evicts_oldest_first() {
        let mut history = BatchHistory::new(3);
        for i in 0..5 {
            history.record(record(i));
        }
        assert_eq!(history.len(), 3);
        let kept: Vec<u64> = history.entries().map(|r| r.result.success).collect();
        assert_eq!(kept, vec![2, 3, 4]);
        // evicted batches still count toward totals
        assert_eq!(history.totals().success, 0 + 1 + 2 + 3 + 4);
    }
}
