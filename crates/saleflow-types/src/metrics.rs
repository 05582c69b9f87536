//! Per-run ingestion counters.

/// Counters accumulated while walking a date range.
///
/// Only ever grows within a run; a fresh value is created for each run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyMetrics {
    /// Records that passed validation.
    pub processed: u64,
    /// Records actually persisted.
    pub stored: u64,
    /// Records rejected by validation.
    pub errors: u64,
}

impl DailyMetrics {
    /// Creates zeroed metrics.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            processed: 0,
            stored: 0,
            errors: 0,
        }
    }

    /// Adds validation results for one day.
    pub const fn record_validation(&mut self, accepted: usize, rejected: usize) {
        self.processed += accepted as u64;
        self.errors += rejected as u64;
    }

    /// Adds the number of rows persisted for one day.
    pub const fn record_stored(&mut self, stored: usize) {
        self.stored += stored as u64;
    }

    /// Returns true if nothing was processed, stored or rejected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.processed == 0 && self.stored == 0 && self.errors == 0
    }

    /// Percentage of processed records that were stored.
    ///
    /// Returns `None` when nothing was processed.
    #[must_use]
    pub fn quality_rate(&self) -> Option<f64> {
        (self.processed > 0).then(|| self.stored as f64 / self.processed as f64 * 100.0)
    }
}

impl std::ops::Add for DailyMetrics {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            processed: self.processed + rhs.processed,
            stored: self.stored + rhs.stored,
            errors: self.errors + rhs.errors,
        }
    }
}

impl std::fmt::Display for DailyMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "processed {}, stored {}, errors {}",
            self.processed, self.stored, self.errors
        )
    }
}
