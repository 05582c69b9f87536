//! Day-by-day ingestion over a date range.

use chrono::NaiveDate;
use saleflow_types::{DailyMetrics, DateRange, Result};
use tracing::{error, info, warn};

use crate::collaborators::{RecordValidator, SalesSink, SalesSource};
use crate::strategy::RangeResolver;

/// What happened to one day that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOutcome {
    /// The upstream had no sales for the day.
    Empty,
    /// Every record was rejected; nothing was handed to storage.
    AllRejected {
        /// Records rejected by validation.
        rejected: usize,
    },
    /// Valid records were handed to storage.
    Loaded {
        /// Records that passed validation.
        processed: usize,
        /// Records rejected by validation.
        rejected: usize,
        /// Rows actually written.
        stored: usize,
    },
}

/// Result of walking one date range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeOutcome {
    /// Counters summed over every day in the range.
    pub metrics: DailyMetrics,
    /// Days whose processing failed, in date order.
    pub failed_days: Vec<NaiveDate>,
    /// Number of days walked.
    pub days: usize,
}

impl RangeOutcome {
    /// Returns true if every walked day completed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed_days.is_empty()
    }
}

/// Receives per-day progress from the coordinator.
pub trait DayObserver: Send + Sync {
    /// Called once before the first day with the number of days to walk.
    fn on_start(&self, _total_days: usize) {}

    /// Called after each day, successful or not.
    fn on_day(&self, date: NaiveDate, result: &Result<DayOutcome>);

    /// Called once after the last day.
    fn on_finish(&self, _outcome: &RangeOutcome) {}
}

/// Drives each date through fetch, validate and store, one day at a time.
///
/// A failure on one day is recorded and the walk moves on to the next day.
pub struct PipelineCoordinator<'a, S: ?Sized, V: ?Sized, K: ?Sized> {
    source: &'a S,
    validator: &'a V,
    sink: &'a K,
    observer: Option<&'a dyn DayObserver>,
}

impl<S: ?Sized, V: ?Sized, K: ?Sized> std::fmt::Debug for PipelineCoordinator<'_, S, V, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineCoordinator")
            .field("observed", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a, S, V, K> PipelineCoordinator<'a, S, V, K>
where
    S: SalesSource + ?Sized,
    V: RecordValidator + ?Sized,
    K: SalesSink + ?Sized,
{
    /// Creates a coordinator over the given collaborators.
    #[must_use]
    pub const fn new(source: &'a S, validator: &'a V, sink: &'a K) -> Self {
        Self {
            source,
            validator,
            sink,
            observer: None,
        }
    }

    /// Attaches a progress observer.
    #[must_use]
    pub const fn with_observer(mut self, observer: &'a dyn DayObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Resolves a range with `resolver`, walks it, and lets the resolver report.
    ///
    /// # Errors
    ///
    /// Returns an error only if the range cannot be resolved. Day failures
    /// are reported in [`RangeOutcome::failed_days`].
    pub async fn run<R: RangeResolver + ?Sized>(&self, resolver: &R) -> Result<RangeOutcome> {
        let (start, end) = resolver.resolve_range().await?;
        let outcome = self.process_date_range(start, end).await;
        resolver.summarize(start, end, &outcome);
        Ok(outcome)
    }

    /// Processes every day from `start` through `end` inclusive, in ascending order.
    ///
    /// A reversed range is empty: zero metrics and no collaborator calls.
    pub async fn process_date_range(&self, start: NaiveDate, end: NaiveDate) -> RangeOutcome {
        info!(%start, %end, "starting pipeline");

        let mut outcome = RangeOutcome::default();
        let Ok(range) = DateRange::new(start, end) else {
            info!(%start, %end, "empty range, nothing to process");
            return outcome;
        };

        if let Some(observer) = self.observer {
            observer.on_start(range.total_days());
        }

        for date in range.days() {
            outcome.days += 1;
            let result = self.process_single_day(date, &mut outcome.metrics).await;
            if let Err(e) = &result {
                error!(%date, error = %e, "day failed");
                outcome.failed_days.push(date);
            }
            if let Some(observer) = self.observer {
                observer.on_day(date, &result);
            }
        }

        info!(
            processed = outcome.metrics.processed,
            stored = outcome.metrics.stored,
            errors = outcome.metrics.errors,
            "pipeline finished"
        );
        if !outcome.failed_days.is_empty() {
            warn!(
                count = outcome.failed_days.len(),
                days = ?outcome.failed_days,
                "some days failed"
            );
        }

        if let Some(observer) = self.observer {
            observer.on_finish(&outcome);
        }
        outcome
    }

    /// Runs fetch, validate and store for one day.
    ///
    /// Counters are updated as each step completes, so a failure in storage
    /// still leaves that day's validation counts in `metrics`.
    async fn process_single_day(
        &self,
        date: NaiveDate,
        metrics: &mut DailyMetrics,
    ) -> Result<DayOutcome> {
        info!(%date, "processing day");

        let raw_sales = self.source.fetch(date).await?;
        if raw_sales.is_empty() {
            info!(%date, "no sales");
            return Ok(DayOutcome::Empty);
        }

        let validation = self.validator.validate(&raw_sales)?;
        let processed = validation.accepted.len();
        let rejected = validation.rejected.len();
        metrics.record_validation(processed, rejected);

        if validation.accepted.is_empty() {
            warn!(%date, count = raw_sales.len(), "all records rejected by validation");
            return Ok(DayOutcome::AllRejected { rejected });
        }

        let stored = self.sink.store(&validation.accepted)?;
        metrics.record_stored(stored);
        info!(%date, processed, stored, "day complete");

        Ok(DayOutcome::Loaded {
            processed,
            rejected,
            stored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use saleflow_store::SalesStore;
    use saleflow_types::{RawSale, SaleRecord, SaleflowError};
    use saleflow_validate::SalesValidator;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::DailyStrategy;

    static VALIDATOR: SalesValidator = SalesValidator::new();

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sale(client_id: i64, total_price: f64) -> Value {
        json!({
            "client_id": client_id,
            "gender": "M",
            "purchase_datetime": "2024-01-05",
            "purchase_time_as_seconds_from_midnight": 3600,
            "product_id": 10,
            "quantity": 2,
            "price_per_item": 10.0,
            "discount_per_item": 1.0,
            "total_price": total_price
        })
    }

    #[derive(Default)]
    struct FakeSource {
        days: HashMap<NaiveDate, Vec<RawSale>>,
        broken: Option<NaiveDate>,
        calls: Mutex<Vec<NaiveDate>>,
    }

    impl FakeSource {
        fn with_day(mut self, date: NaiveDate, sales: Vec<RawSale>) -> Self {
            self.days.insert(date, sales);
            self
        }

        fn calls(&self) -> Vec<NaiveDate> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SalesSource for FakeSource {
        async fn fetch(&self, date: NaiveDate) -> Result<Vec<RawSale>> {
            self.calls.lock().unwrap().push(date);
            if self.broken == Some(date) {
                return Err(SaleflowError::Http("connection reset".to_string()));
            }
            Ok(self.days.get(&date).cloned().unwrap_or_default())
        }
    }

    /// Stores everything except batches containing a poisoned client id.
    #[derive(Default)]
    struct FakeSink {
        poisoned_client: Option<i64>,
        batches: Mutex<Vec<usize>>,
    }

    impl SalesSink for FakeSink {
        fn store(&self, records: &[SaleRecord]) -> Result<usize> {
            if records
                .iter()
                .any(|r| Some(r.client_id) == self.poisoned_client)
            {
                return Err(SaleflowError::Storage("disk full".to_string()));
            }
            self.batches.lock().unwrap().push(records.len());
            Ok(records.len())
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        total: Mutex<Option<usize>>,
        seen: Mutex<Vec<(NaiveDate, bool)>>,
        finished: Mutex<bool>,
    }

    impl DayObserver for RecordingObserver {
        fn on_start(&self, total_days: usize) {
            *self.total.lock().unwrap() = Some(total_days);
        }

        fn on_day(&self, date: NaiveDate, result: &Result<DayOutcome>) {
            self.seen.lock().unwrap().push((date, result.is_ok()));
        }

        fn on_finish(&self, _outcome: &RangeOutcome) {
            *self.finished.lock().unwrap() = true;
        }
    }

    #[tokio::test]
    async fn test_reversed_range_is_empty_and_silent() {
        let source = FakeSource::default();
        let sink = FakeSink::default();
        let coordinator = PipelineCoordinator::new(&source, &VALIDATOR, &sink);

        let outcome = coordinator
            .process_date_range(date(2024, 1, 5), date(2024, 1, 4))
            .await;

        assert_eq!(outcome, RangeOutcome::default());
        assert!(outcome.metrics.is_empty());
        assert!(source.calls().is_empty());
        assert!(sink.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_day_with_real_store() {
        let day = date(2024, 1, 5);
        let source =
            FakeSource::default().with_day(day, vec![sale(1, 18.0), sale(2, 19.0), sale(3, 18.0)]);
        let store = SalesStore::in_memory().unwrap();
        let coordinator = PipelineCoordinator::new(&source, &VALIDATOR, &store);

        let outcome = coordinator.process_date_range(day, day).await;

        assert_eq!(
            outcome.metrics,
            DailyMetrics {
                processed: 2,
                stored: 2,
                errors: 1,
            }
        );
        assert!(outcome.is_clean());
        assert_eq!(outcome.days, 1);
        assert_eq!(store.total_records().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_days_walked_once_in_ascending_order() {
        let source = FakeSource::default();
        let sink = FakeSink::default();
        let coordinator = PipelineCoordinator::new(&source, &VALIDATOR, &sink);

        let outcome = coordinator
            .process_date_range(date(2024, 2, 27), date(2024, 3, 1))
            .await;

        assert_eq!(
            source.calls(),
            vec![
                date(2024, 2, 27),
                date(2024, 2, 28),
                date(2024, 2, 29),
                date(2024, 3, 1),
            ]
        );
        assert_eq!(outcome.days, 4);
    }

    #[tokio::test]
    async fn test_empty_day_is_not_a_failure() {
        let source = FakeSource::default();
        let sink = FakeSink::default();
        let coordinator = PipelineCoordinator::new(&source, &VALIDATOR, &sink);

        let day = date(2024, 1, 1);
        let outcome = coordinator.process_date_range(day, day).await;

        assert!(outcome.metrics.is_empty());
        assert!(outcome.is_clean());
        assert!(sink.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_rejected_skips_storage() {
        let day = date(2024, 1, 1);
        let source = FakeSource::default().with_day(day, vec![sale(1, 50.0), json!("junk")]);
        let sink = FakeSink::default();
        let coordinator = PipelineCoordinator::new(&source, &VALIDATOR, &sink);

        let outcome = coordinator.process_date_range(day, day).await;

        assert_eq!(
            outcome.metrics,
            DailyMetrics {
                processed: 0,
                stored: 0,
                errors: 2,
            }
        );
        assert!(outcome.is_clean());
        assert!(sink.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_isolated_to_its_day() {
        let (d1, d2, d3) = (date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3));
        let source = FakeSource::default()
            .with_day(d1, vec![sale(1, 18.0)])
            .with_day(d2, vec![sale(666, 18.0), sale(2, 19.0)])
            .with_day(d3, vec![sale(3, 18.0), sale(4, 18.0)]);
        let sink = FakeSink {
            poisoned_client: Some(666),
            ..Default::default()
        };
        let coordinator = PipelineCoordinator::new(&source, &VALIDATOR, &sink);

        let outcome = coordinator.process_date_range(d1, d3).await;

        assert_eq!(outcome.failed_days, vec![d2]);
        assert_eq!(source.calls(), vec![d1, d2, d3]);
        // The failed day's validation counts survive; its stores do not.
        assert_eq!(
            outcome.metrics,
            DailyMetrics {
                processed: 4,
                stored: 3,
                errors: 1,
            }
        );
        assert_eq!(*sink.batches.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_fetch_failure_marks_day_failed() {
        let (d1, d2) = (date(2024, 1, 1), date(2024, 1, 2));
        let source = FakeSource {
            broken: Some(d1),
            ..Default::default()
        }
        .with_day(d2, vec![sale(1, 18.0)]);
        let sink = FakeSink::default();
        let coordinator = PipelineCoordinator::new(&source, &VALIDATOR, &sink);

        let outcome = coordinator.process_date_range(d1, d2).await;

        assert_eq!(outcome.failed_days, vec![d1]);
        assert_eq!(outcome.metrics.stored, 1);
    }

    #[tokio::test]
    async fn test_metrics_are_sum_of_days_and_fresh_per_call() {
        let (d1, d2) = (date(2024, 1, 1), date(2024, 1, 2));
        let source = FakeSource::default()
            .with_day(d1, vec![sale(1, 18.0), sale(2, 1.0)])
            .with_day(d2, vec![sale(3, 18.0), sale(4, 18.0), sale(5, 18.0)]);
        let sink = FakeSink::default();
        let coordinator = PipelineCoordinator::new(&source, &VALIDATOR, &sink);

        let day1 = coordinator.process_date_range(d1, d1).await;
        let day2 = coordinator.process_date_range(d2, d2).await;
        let both = coordinator.process_date_range(d1, d2).await;

        assert_eq!(both.metrics, day1.metrics + day2.metrics);
        assert_eq!(
            day2.metrics,
            DailyMetrics {
                processed: 3,
                stored: 3,
                errors: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_observer_sees_every_day() {
        let (d1, d2, d3) = (date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3));
        let source = FakeSource {
            broken: Some(d2),
            ..Default::default()
        };
        let sink = FakeSink::default();
        let observer = RecordingObserver::default();
        let coordinator = PipelineCoordinator::new(&source, &VALIDATOR, &sink)
            .with_observer(&observer);

        coordinator.process_date_range(d1, d3).await;

        assert_eq!(*observer.total.lock().unwrap(), Some(3));
        assert_eq!(
            *observer.seen.lock().unwrap(),
            vec![(d1, true), (d2, false), (d3, true)]
        );
        assert!(*observer.finished.lock().unwrap());
    }

    #[tokio::test]
    async fn test_run_with_daily_strategy_loads_yesterday() {
        let today = date(2024, 3, 1);
        let yesterday = date(2024, 2, 29);
        let source = FakeSource::default().with_day(yesterday, vec![sale(1, 18.0)]);
        let sink = FakeSink::default();
        let coordinator = PipelineCoordinator::new(&source, &VALIDATOR, &sink);

        let outcome = coordinator
            .run(&DailyStrategy::with_today(today))
            .await
            .unwrap();

        assert_eq!(source.calls(), vec![yesterday]);
        assert_eq!(outcome.metrics.stored, 1);
    }

    struct BrokenValidator;

    impl RecordValidator for BrokenValidator {
        fn validate(&self, _raw: &[RawSale]) -> Result<saleflow_validate::Validation> {
            Err(SaleflowError::Validation("schema unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_validator_failure_isolated_per_day() {
        let (d1, d2, d3) = (date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3));
        let source = FakeSource::default()
            .with_day(d1, vec![sale(1, 18.0)])
            .with_day(d2, vec![sale(2, 18.0), sale(3, 18.0)]);
        let sink = FakeSink::default();
        let coordinator = PipelineCoordinator::new(&source, &BrokenValidator, &sink);

        let outcome = coordinator.process_date_range(d1, d3).await;

        assert_eq!(outcome.failed_days, vec![d1, d2]);
        assert_eq!(source.calls(), vec![d1, d2, d3]);
        assert!(outcome.metrics.is_empty());
        assert!(sink.batches.lock().unwrap().is_empty());
    }
}
