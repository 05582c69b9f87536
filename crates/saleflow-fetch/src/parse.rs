//! Response body interpretation.

use saleflow_types::RawSale;
use serde_json::Value;
use thiserror::Error;

/// Response bodies the marketplace uses to say a date has no sales.
///
/// Compared against the trimmed body text.
pub const NO_DATA_SENTINELS: &[&str] = &[
    "Информация за более ранние периоды отсутствует",
    "No data available",
    "[]",
    "",
];

/// Errors that can occur while parsing a sales response.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The body was not valid JSON.
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parses a sales response body into raw records.
///
/// A JSON array yields its elements. Any other JSON value (an error object,
/// a message string) means the day has no sales.
///
/// # Errors
///
/// Returns an error if the body is not valid JSON.
pub fn parse_sales(body: &[u8]) -> Result<Vec<RawSale>, ParseError> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Array(records) => Ok(records),
        _ => Ok(Vec::new()),
    }
}

/// Returns true if the body is one of the literal "no data" answers.
#[must_use]
pub fn is_no_data_body(body: &str) -> bool {
    NO_DATA_SENTINELS.contains(&body.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_array() {
        let body = br#"[{"client_id": 1}, {"client_id": 2}]"#;
        let records = parse_sales(body).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1], json!({"client_id": 2}));
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_sales(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_non_array_is_empty() {
        assert!(parse_sales(br#"{"detail": "oops"}"#).unwrap().is_empty());
        assert!(parse_sales(br#""No data available""#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed() {
        let result = parse_sales(b"<html>bad gateway</html>");
        assert!(matches!(result, Err(ParseError::Json(_))));
    }

    #[test]
    fn test_no_data_sentinels() {
        assert!(is_no_data_body(""));
        assert!(is_no_data_body("  []\n"));
        assert!(is_no_data_body("No data available"));
        assert!(is_no_data_body(
            "Информация за более ранние периоды отсутствует"
        ));
        assert!(!is_no_data_body(r#"[{"client_id": 1}]"#));
        assert!(!is_no_data_body("No data"));
    }
}
