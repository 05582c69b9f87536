//! Record validation and normalization.

use saleflow_types::{Gender, RawSale, SaleRecord};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::coerce::{integer, number, purchase_timestamp, text};
use crate::{RejectReason, Rejection};

/// Fields every raw sale must carry.
pub const REQUIRED_FIELDS: &[&str] = &[
    "client_id",
    "gender",
    "purchase_datetime",
    "purchase_time_as_seconds_from_midnight",
    "product_id",
    "quantity",
    "price_per_item",
    "discount_per_item",
    "total_price",
];

/// Allowed gap between `total_price` and the computed total.
pub const TOTAL_TOLERANCE: f64 = 0.01;

/// Outcome of validating one day's batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    /// Records that passed every check, in input order.
    pub accepted: Vec<SaleRecord>,
    /// Records that failed, in input order.
    pub rejected: Vec<Rejection>,
}

impl Validation {
    /// Returns the number of records that were examined.
    #[must_use]
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    /// Percentage of examined records that were accepted.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.accepted.len() as f64 / total as f64 * 100.0
        }
    }
}

/// Coerces raw marketplace sales into [`SaleRecord`]s and enforces business rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct SalesValidator;

impl SalesValidator {
    /// Creates a validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a batch, splitting it into accepted and rejected records.
    ///
    /// Never fails as a whole: every problem is attached to its record.
    pub fn validate(&self, raw_sales: &[RawSale]) -> Validation {
        info!(count = raw_sales.len(), "validating sales");

        let mut validation = Validation::default();
        for (index, raw) in raw_sales.iter().enumerate() {
            match self.validate_record(raw) {
                Ok(record) => validation.accepted.push(record),
                Err(reason) => {
                    warn!(index, %reason, "rejected sale");
                    validation.rejected.push(Rejection {
                        index,
                        reason,
                        raw: raw.clone(),
                    });
                }
            }
        }

        info!(
            accepted = validation.accepted.len(),
            total = validation.total(),
            success_rate = validation.success_rate(),
            "validation finished"
        );
        if !validation.rejected.is_empty() {
            warn!(rejected = validation.rejected.len(), "batch had problem records");
        }

        validation
    }

    /// Validates a single raw sale.
    ///
    /// # Errors
    ///
    /// Returns the first rule the record breaks.
    pub fn validate_record(&self, raw: &RawSale) -> Result<SaleRecord, RejectReason> {
        let fields = raw.as_object().ok_or(RejectReason::NotAnObject)?;
        check_required(fields)?;

        let client_id = integer("client_id", &fields["client_id"])?;
        let gender_raw = text(&fields["gender"]);
        let product_id = integer("product_id", &fields["product_id"])?;
        let quantity = number("quantity", &fields["quantity"])?;
        let price_per_item = number("price_per_item", &fields["price_per_item"])?;
        let discount_per_item = number("discount_per_item", &fields["discount_per_item"])?;
        let total_price = number("total_price", &fields["total_price"])?;
        let seconds = integer(
            "purchase_time_as_seconds_from_midnight",
            &fields["purchase_time_as_seconds_from_midnight"],
        )?;
        let purchase_date = text(&fields["purchase_datetime"]);

        let gender = gender_raw
            .parse::<Gender>()
            .map_err(|_| RejectReason::UnknownGender(gender_raw.clone()))?;

        for (field, value) in [("quantity", quantity), ("total_price", total_price)] {
            if value <= 0.0 {
                return Err(RejectReason::NonPositive { field, value });
            }
        }

        for (field, value) in [
            ("price_per_item", price_per_item),
            ("discount_per_item", discount_per_item),
        ] {
            if value < 0.0 {
                return Err(RejectReason::Negative { field, value });
            }
        }

        let expected = quantity * (price_per_item - discount_per_item);
        if (total_price - expected).abs() > TOTAL_TOLERANCE {
            return Err(RejectReason::TotalMismatch {
                expected,
                actual: total_price,
            });
        }

        let purchased_at = purchase_timestamp(&purchase_date, seconds)?;

        Ok(SaleRecord {
            client_id,
            gender,
            product_id,
            quantity,
            price_per_item,
            discount_per_item,
            total_price,
            purchased_at,
        })
    }
}

fn check_required(fields: &Map<String, Value>) -> Result<(), RejectReason> {
    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !fields.contains_key(*field))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(RejectReason::MissingFields(missing))
    }
}
