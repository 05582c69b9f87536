//! Error types for saleflow.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for saleflow operations.
pub type Result<T> = std::result::Result<T, SaleflowError>;

/// Errors that can occur while loading sales.
#[derive(Error, Debug)]
pub enum SaleflowError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Validation could not run over a batch.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Persistence layer fault.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid date range.
    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    /// No date at or after the discovery floor reported any data.
    #[error("No sales data available on or after {floor}")]
    NoDataAvailable {
        /// The configured lower bound of the search.
        floor: NaiveDate,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error for invalid date ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },
}
