//! Marketplace endpoint construction.

use chrono::NaiveDate;

/// Default marketplace sales endpoint.
pub const DEFAULT_API_URL: &str = "http://final-project.simulative.ru/data";

/// Builds the URL for one day's sales.
///
/// URL format: `{base}?date={YYYY-MM-DD}`, appending with `&` when the base
/// already carries a query string.
///
/// # Example
///
/// ```
/// use saleflow_fetch::url::sales_url;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// let url = sales_url("http://example.com/data", date);
/// assert_eq!(url, "http://example.com/data?date=2024-01-05");
/// ```
#[must_use]
pub fn sales_url(base: &str, date: NaiveDate) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}date={}", date.format("%Y-%m-%d"))
}
