//! Reasons a raw sale is rejected.

use saleflow_types::RawSale;
use thiserror::Error;

/// Why a single record failed validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// The record is not a JSON object.
    #[error("Record is not an object")]
    NotAnObject,

    /// One or more required fields are absent.
    #[error("Missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A field could not be coerced to the expected type.
    #[error("Invalid value for {field}: {value}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// The offending value, as JSON text.
        value: String,
    },

    /// Gender is not one of the accepted spellings.
    #[error("Unknown gender: {0}")]
    UnknownGender(String),

    /// Quantity or total must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Field name.
        field: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Price or discount must not be negative.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Field name.
        field: &'static str,
        /// The offending value.
        value: f64,
    },

    /// `total_price` disagrees with `quantity * (price - discount)`.
    #[error("total_price {actual} does not match expected {expected}")]
    TotalMismatch {
        /// Total implied by quantity, price and discount.
        expected: f64,
        /// Total reported by the record.
        actual: f64,
    },

    /// Purchase date and seconds offset do not form a timestamp.
    #[error("Invalid purchase timestamp: {0}")]
    InvalidTimestamp(String),
}

/// A record that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Position of the record within the day's batch.
    pub index: usize,
    /// Why the record was rejected.
    pub reason: RejectReason,
    /// The record as received.
    pub raw: RawSale,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "record {}: {}", self.index, self.reason)
    }
}
