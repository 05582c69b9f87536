//! Day-by-day sales ingestion for saleflow.
//!
//! [`PipelineCoordinator`] walks an inclusive date range one day at a time,
//! running fetch, validate and store for each day and isolating failures to
//! the day they happen on. Which range to walk is decided by a
//! [`RangeResolver`]: [`DailyStrategy`] for yesterday, or
//! [`HistoricalStrategy`] for everything since the first date the upstream
//! has data for.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod collaborators;
mod coordinator;
mod discovery;
mod report;
mod strategy;

pub use collaborators::{AvailabilityProbe, RecordValidator, SalesSink, SalesSource};
pub use coordinator::{DayObserver, DayOutcome, PipelineCoordinator, RangeOutcome};
pub use discovery::{STEP_BACK_DAYS, discover_first_available_date};
pub use report::{DryRunPlan, HistoryReport, inclusive_days};
pub use strategy::{DailyStrategy, HistoricalStrategy, RangeResolver, RunMode};
