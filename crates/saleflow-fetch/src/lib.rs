//! HTTP client and availability probe for saleflow.
//!
//! This crate provides the marketplace side of the pipeline:
//!
//! - [`url::sales_url`] - Builds the per-day sales URL
//! - [`SalesClient`] - Pulls a day's sales and probes dates for data
//! - [`parse_sales`] - Interprets a response body as raw sale records
//! - [`is_no_data_body`] - Recognizes the literal "no data" answers

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod parse;
pub mod url;

pub use client::{ClientConfig, DownloadError, SalesClient};
pub use parse::{NO_DATA_SENTINELS, ParseError, is_no_data_body, parse_sales};
