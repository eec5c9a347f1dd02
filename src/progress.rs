//! Record-count progress accounting for streaming extractions.

use std::time::Instant;

/// Running count of records written by an extraction, with periodic rate
/// logging.
///
/// The counter is task-local; the final count feeds the task's
/// [`crate::types::Summary`].
pub struct RecordCounter {
    name: String,
    count: u64,
    log_every: u64,
    started: Instant,
}

impl RecordCounter {
    /// Create a counter for the artifact named `name`, logging every
    /// `log_every` records.
    pub fn new(name: impl Into<String>, log_every: u64) -> Self {
        Self {
            name: name.into(),
            count: 0,
            log_every: log_every.max(1),
            started: Instant::now(),
        }
    }

    /// Count one record.
    pub fn count(&mut self) {
        self.count += 1;
        if self.count % self.log_every == 0 {
            tracing::debug!(
                target_path = %self.name,
                records = self.count,
                records_per_sec = self.rate() as u64,
                "Extraction progress"
            );
        }
    }

    /// Records counted so far.
    pub fn total(&self) -> u64 {
        self.count
    }

    fn rate(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.count as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Log the final tally and return the total record count.
    pub fn finish(self) -> u64 {
        tracing::info!(
            target_path = %self.name,
            records = self.count,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Extraction complete"
        );
        self.count
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn counts_records() {
        let mut counter = RecordCounter::new("t.csv", 10);
        for _ in 0..25 {
            counter.count();
        }
        assert_eq!(counter.total(), 25);
        assert_eq!(counter.finish(), 25);
    }

    #[test]
    fn zero_log_interval_is_clamped() {
        let mut counter = RecordCounter::new("t.csv", 0);
        counter.count();
        assert_eq!(counter.total(), 1);
    }
}
