//! Field coercion from loosely typed JSON.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde_json::Value;

use crate::RejectReason;

/// Seconds in a day; offsets must stay below this.
const SECONDS_PER_DAY: i64 = 86_400;

/// Layouts accepted for `purchase_datetime` when it carries a time of day.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

fn invalid(field: &'static str, value: &Value) -> RejectReason {
    RejectReason::InvalidField {
        field,
        value: value.to_string(),
    }
}

/// Reads an integral number, accepting numeric strings and whole floats.
pub(crate) fn integer(field: &'static str, value: &Value) -> Result<i64, RejectReason> {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(field, value))
}

/// Reads a finite float, accepting numeric strings.
pub(crate) fn number(field: &'static str, value: &Value) -> Result<f64, RejectReason> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|f| f.is_finite())
        .ok_or_else(|| invalid(field, value))
}

/// Reads a string, or the JSON text of a non-string scalar.
pub(crate) fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Folds a seconds-since-midnight offset into the purchase date.
///
/// The date may be a bare `YYYY-MM-DD` or carry a time of day, in which case
/// the offset is added on top of it.
pub(crate) fn purchase_timestamp(
    date: &str,
    seconds_from_midnight: i64,
) -> Result<NaiveDateTime, RejectReason> {
    if !(0..SECONDS_PER_DAY).contains(&seconds_from_midnight) {
        return Err(RejectReason::InvalidTimestamp(format!(
            "offset {seconds_from_midnight}s is outside a day"
        )));
    }

    let date = date.trim();
    let base = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(date, fmt).ok())
        })
        .ok_or_else(|| RejectReason::InvalidTimestamp(format!("unparseable date {date:?}")))?;

    base.checked_add_signed(TimeDelta::seconds(seconds_from_midnight))
        .ok_or_else(|| RejectReason::InvalidTimestamp(format!("{date} + {seconds_from_midnight}s")))
}
