//! Sale record representation.

use chrono::NaiveDateTime;

/// A sale record exactly as returned by the marketplace API.
///
/// Kept as untyped JSON until validation, since the upstream feed mixes
/// numbers and numeric strings and occasionally omits fields.
pub type RawSale = serde_json::Value;

/// Customer gender as accepted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    /// Stored as `M`.
    Male,
    /// Stored as `F`.
    Female,
}

impl Gender {
    /// Returns the single-letter code used in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a gender value is not one of the accepted spellings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown gender: {0}")]
pub struct GenderParseError(pub String);

impl std::str::FromStr for Gender {
    type Err = GenderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Ok(Self::Male),
            "f" | "female" => Ok(Self::Female),
            _ => Err(GenderParseError(s.to_string())),
        }
    }
}

/// A validated, normalized sale ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    /// Buyer identifier.
    pub client_id: i64,
    /// Buyer gender.
    pub gender: Gender,
    /// Product identifier.
    pub product_id: i64,
    /// Number of items purchased.
    pub quantity: f64,
    /// Unit price before discount.
    pub price_per_item: f64,
    /// Discount applied to each unit.
    pub discount_per_item: f64,
    /// Amount paid for the whole line.
    pub total_price: f64,
    /// Purchase date with the seconds-since-midnight offset folded in.
    pub purchased_at: NaiveDateTime,
}

impl SaleRecord {
    /// Returns true if the record has something worth persisting.
    #[must_use]
    pub fn is_billable(&self) -> bool {
        self.quantity > 0.0 && self.total_price > 0.0
    }
}
