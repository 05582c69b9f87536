//! Post-run summaries.

use chrono::NaiveDate;
use saleflow_types::DailyMetrics;
use std::fmt;
use tracing::info;

use crate::RangeOutcome;

/// Number of days in `[start, end]`, or 0 when `start > end`.
#[must_use]
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> usize {
    usize::try_from((end - start).num_days() + 1).unwrap_or(0)
}

/// Derived figures for a historical import.
///
/// Purely informational; nothing here feeds back into the run.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryReport {
    /// First day of the range.
    pub start: NaiveDate,
    /// Last day of the range.
    pub end: NaiveDate,
    /// Counters for the whole run.
    pub metrics: DailyMetrics,
    /// Days in the range.
    pub days: usize,
    /// Days that failed.
    pub failed_days: usize,
}

impl HistoryReport {
    /// Builds a report for a walked range.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate, outcome: &RangeOutcome) -> Self {
        Self {
            start,
            end,
            metrics: outcome.metrics,
            days: inclusive_days(start, end),
            failed_days: outcome.failed_days.len(),
        }
    }

    /// Accepted records per day.
    #[must_use]
    pub fn avg_daily_sales(&self) -> f64 {
        per_day(self.metrics.processed, self.days)
    }

    /// Stored records per day.
    #[must_use]
    pub fn avg_daily_stored(&self) -> f64 {
        per_day(self.metrics.stored, self.days)
    }

    /// Percentage of accepted records that were stored.
    #[must_use]
    pub fn quality_rate(&self) -> Option<f64> {
        self.metrics.quality_rate()
    }

    /// Writes the report to the log.
    pub fn log(&self) {
        info!(
            start = %self.start,
            end = %self.end,
            days = self.days,
            processed = self.metrics.processed,
            stored = self.metrics.stored,
            errors = self.metrics.errors,
            failed_days = self.failed_days,
            avg_daily_sales = self.avg_daily_sales(),
            avg_daily_stored = self.avg_daily_stored(),
            quality_rate = ?self.quality_rate(),
            "history import report"
        );
    }
}

fn per_day(count: u64, days: usize) -> f64 {
    if days == 0 {
        0.0
    } else {
        count as f64 / days as f64
    }
}

impl fmt::Display for HistoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {} ({} days): {}, {:.1} sales/day, {:.1} stored/day",
            self.start,
            self.end,
            self.days,
            self.metrics,
            self.avg_daily_sales(),
            self.avg_daily_stored()
        )?;
        if let Some(rate) = self.quality_rate() {
            write!(f, ", quality {rate:.1}%")?;
        }
        Ok(())
    }
}

/// The range a historical import would cover, without running it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DryRunPlan {
    /// First day to import.
    pub start: NaiveDate,
    /// Last day to import.
    pub end: NaiveDate,
    /// Days in the range; 0 if `start > end`.
    pub days: usize,
}

impl DryRunPlan {
    /// Creates a plan for `[start, end]`.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            days: inclusive_days(start, end),
        }
    }
}

impl fmt::Display for DryRunPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {} ({} days)", self.start, self.end, self.days)
    }
}
