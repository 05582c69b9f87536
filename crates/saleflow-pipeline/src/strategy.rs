//! Range resolvers: which days a run covers.
//!
//! The coordinator is shared; a resolver only decides `(start, end)` and
//! how to report on the finished run.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use saleflow_types::Result;
use tracing::info;

use crate::collaborators::AvailabilityProbe;
use crate::discovery::discover_first_available_date;
use crate::report::{DryRunPlan, HistoryReport};
use crate::RangeOutcome;

/// Decides the date range for a run.
#[async_trait]
pub trait RangeResolver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the inclusive `(start, end)` range to process.
    ///
    /// `start > end` is allowed and means there is nothing to do.
    async fn resolve_range(&self) -> Result<(NaiveDate, NaiveDate)>;

    /// Reports on a finished run. Never affects stored data.
    fn summarize(&self, start: NaiveDate, end: NaiveDate, outcome: &RangeOutcome) {
        info!(
            resolver = self.name(),
            %start,
            %end,
            processed = outcome.metrics.processed,
            stored = outcome.metrics.stored,
            errors = outcome.metrics.errors,
            "run summary"
        );
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn day_before(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

/// Loads yesterday's sales.
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyStrategy {
    today: Option<NaiveDate>,
}

impl DailyStrategy {
    /// Resolves relative to the local date at run time.
    #[must_use]
    pub const fn new() -> Self {
        Self { today: None }
    }

    /// Resolves relative to a fixed `today`.
    #[must_use]
    pub const fn with_today(today: NaiveDate) -> Self {
        Self { today: Some(today) }
    }

    /// The day this strategy loads.
    #[must_use]
    pub fn target_date(&self) -> NaiveDate {
        day_before(self.today.unwrap_or_else(local_today))
    }
}

#[async_trait]
impl RangeResolver for DailyStrategy {
    fn name(&self) -> &'static str {
        "daily"
    }

    async fn resolve_range(&self) -> Result<(NaiveDate, NaiveDate)> {
        let date = self.target_date();
        info!(%date, "daily load");
        Ok((date, date))
    }

    fn summarize(&self, start: NaiveDate, _end: NaiveDate, outcome: &RangeOutcome) {
        info!(
            date = %start,
            processed = outcome.metrics.processed,
            stored = outcome.metrics.stored,
            rejected = outcome.metrics.errors,
            "daily load summary"
        );
    }
}

/// Loads every day from the first available (or a given) date through yesterday.
#[derive(Debug)]
pub struct HistoricalStrategy<'a, P: ?Sized> {
    probe: &'a P,
    min_possible_date: NaiveDate,
    custom_start: Option<NaiveDate>,
    custom_end: Option<NaiveDate>,
    today: Option<NaiveDate>,
}

impl<'a, P> HistoricalStrategy<'a, P>
where
    P: AvailabilityProbe + ?Sized,
{
    /// Creates a strategy that discovers its start no earlier than `min_possible_date`.
    #[must_use]
    pub const fn new(probe: &'a P, min_possible_date: NaiveDate) -> Self {
        Self {
            probe,
            min_possible_date,
            custom_start: None,
            custom_end: None,
            today: None,
        }
    }

    /// Default discovery floor, 2020-01-01.
    #[must_use]
    pub fn default_min_possible_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
    }

    /// Uses `start` instead of discovering it.
    #[must_use]
    pub const fn with_start(mut self, start: Option<NaiveDate>) -> Self {
        self.custom_start = start;
        self
    }

    /// Uses `end` instead of yesterday.
    #[must_use]
    pub const fn with_end(mut self, end: Option<NaiveDate>) -> Self {
        self.custom_end = end;
        self
    }

    /// Resolves relative to a fixed `today`.
    #[must_use]
    pub const fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// The configured discovery floor.
    #[must_use]
    pub const fn min_possible_date(&self) -> NaiveDate {
        self.min_possible_date
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(local_today)
    }

    /// Searches for the earliest date with data between the floor and today.
    ///
    /// # Errors
    ///
    /// See [`discover_first_available_date`].
    pub async fn discover_first_available_date(&self) -> Result<NaiveDate> {
        discover_first_available_date(self.probe, self.min_possible_date, self.today()).await
    }

    /// Resolves the range without loading anything.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails.
    pub async fn dry_run(&self) -> Result<DryRunPlan> {
        let (start, end) = self.resolve_range().await?;
        let plan = DryRunPlan::new(start, end);
        info!(%plan, "dry run");
        Ok(plan)
    }
}

#[async_trait]
impl<'a, P> RangeResolver for HistoricalStrategy<'a, P>
where
    P: AvailabilityProbe + ?Sized,
{
    fn name(&self) -> &'static str {
        "history"
    }

    async fn resolve_range(&self) -> Result<(NaiveDate, NaiveDate)> {
        let start = match self.custom_start {
            Some(start) => start,
            None => self.discover_first_available_date().await?,
        };
        let end = self
            .custom_end
            .unwrap_or_else(|| day_before(self.today()));

        info!(%start, %end, "history range resolved");
        Ok((start, end))
    }

    fn summarize(&self, start: NaiveDate, end: NaiveDate, outcome: &RangeOutcome) {
        HistoryReport::new(start, end, outcome).log();
    }
}

/// Which resolver a run should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Load yesterday only.
    Daily,
    /// Load the full history.
    History,
}

impl RunMode {
    /// Picks history while the store holds fewer than `threshold` rows.
    #[must_use]
    pub const fn select(total_records: u64, threshold: u64) -> Self {
        if total_records < threshold {
            Self::History
        } else {
            Self::Daily
        }
    }

    /// Lowercase name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::History => "history",
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
