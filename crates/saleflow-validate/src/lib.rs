//! Sale record validation and normalization for saleflow.
//!
//! - [`SalesValidator`] - Splits a day's raw sales into accepted and rejected records
//! - [`Validation`] - The accepted/rejected split for one batch
//! - [`Rejection`] / [`RejectReason`] - Why a record was turned away

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod coerce;
mod reject;
mod validator;

pub use reject::{RejectReason, Rejection};
pub use validator::{REQUIRED_FIELDS, SalesValidator, TOTAL_TOLERANCE, Validation};
