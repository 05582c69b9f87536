//! Seams between the coordinator and the outside world.
//!
//! The coordinator only sees these traits. The concrete HTTP client,
//! validator and SQLite store implement them below; tests substitute fakes.

use async_trait::async_trait;
use chrono::NaiveDate;
use saleflow_fetch::SalesClient;
use saleflow_store::SalesStore;
use saleflow_types::{RawSale, Result, SaleRecord};
use saleflow_validate::{SalesValidator, Validation};

/// Supplies the raw sales for a calendar day.
#[async_trait]
pub trait SalesSource: Send + Sync {
    /// Returns the day's raw sales; an empty vector means no sales.
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<RawSale>>;
}

/// Answers whether the upstream has any data for a date.
#[async_trait]
pub trait AvailabilityProbe: Send + Sync {
    /// Returns true if `date` has data. Inconclusive checks return false.
    async fn has_data(&self, date: NaiveDate) -> bool;
}

/// Splits raw sales into normalized records and rejections.
pub trait RecordValidator: Send + Sync {
    /// Validates one day's batch.
    fn validate(&self, raw: &[RawSale]) -> Result<Validation>;
}

/// Persists normalized records.
pub trait SalesSink: Send + Sync {
    /// Stores a batch and returns the number of rows actually written.
    fn store(&self, records: &[SaleRecord]) -> Result<usize>;
}

#[async_trait]
impl SalesSource for SalesClient {
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<RawSale>> {
        Ok(self.fetch_sales(date).await)
    }
}

#[async_trait]
impl AvailabilityProbe for SalesClient {
    async fn has_data(&self, date: NaiveDate) -> bool {
        SalesClient::has_data(self, date).await
    }
}

impl RecordValidator for SalesValidator {
    fn validate(&self, raw: &[RawSale]) -> Result<Validation> {
        Ok(SalesValidator::validate(self, raw))
    }
}

impl SalesSink for SalesStore {
    fn store(&self, records: &[SaleRecord]) -> Result<usize> {
        Ok(self.store_batch(records))
    }
}
