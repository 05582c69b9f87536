//! Core types for the saleflow marketplace sales loader.
//!
//! This crate provides the fundamental data structures used throughout saleflow:
//!
//! - [`DateRange`] - Inclusive calendar range, walked one day at a time
//! - [`RawSale`] - A sale as returned by the marketplace API
//! - [`SaleRecord`] - A validated sale ready for persistence
//! - [`Gender`] - Normalized buyer gender
//! - [`DailyMetrics`] - Processed/stored/error counters for a run

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod date_range;
mod error;
mod metrics;
mod record;

pub use date_range::{DateRange, DayIterator};
pub use error::{DateRangeError, Result, SaleflowError};
pub use metrics::DailyMetrics;
pub use record::{Gender, GenderParseError, RawSale, SaleRecord};
