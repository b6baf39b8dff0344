//! Boundary validation for user-supplied catalog input
//!
//! Everything entered through a form or the command line passes through here
//! before it reaches the database. The price engine trusts these invariants
//! and does not re-check them.

use thiserror::Error;

/// Layout of SQLite's `CURRENT_TIMESTAMP`, used for every stored date
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Rejected input. No side effect has happened when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required text field is empty (or only whitespace)
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    /// An amount is NaN or infinite
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    /// An amount is below zero
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    /// Discount outside of 0..=100
    #[error("discount percent must be between 0 and 100, got {0}")]
    DiscountOutOfRange(f64),
    /// Payment status text that is not Paid, Unpaid or Half Paid
    #[error("unknown payment status: {0}")]
    UnknownPaymentStatus(String),
    /// Date that is not `YYYY-MM-DD HH:MM:SS`
    #[error("invalid timestamp {0:?}, expected YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp(String),
}

/// Trim `value` and reject it if nothing is left
pub fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        log::debug!("Rejected empty {}", field);
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

/// Reject NaN, infinities and negative amounts
pub fn require_amount(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field, value });
    }
    if value < 0.0 {
        log::debug!("Rejected negative {}: {}", field, value);
        return Err(ValidationError::Negative { field, value });
    }
    Ok(value)
}

/// Discount must be a finite percentage in `[0, 100]`
pub fn require_discount(value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "discount percent",
            value,
        });
    }
    if !(0.0..=100.0).contains(&value) {
        log::debug!("Rejected discount percent: {}", value);
        return Err(ValidationError::DiscountOutOfRange(value));
    }
    Ok(value)
}

/// Accept only `YYYY-MM-DD HH:MM:SS`, so stored dates sort as text and work with SQLite's `date()`
pub fn require_timestamp(value: &str) -> Result<String, ValidationError> {
    if chrono::NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).is_err() {
        log::debug!("Rejected timestamp: {:?}", value);
        return Err(ValidationError::InvalidTimestamp(value.to_string()));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_trims() {
        assert_eq!(require_text("name", "  Dolo 650  ").unwrap(), "Dolo 650");
    }

    #[test]
    fn require_text_rejects_blank() {
        assert_eq!(
            require_text("medicine name", "   "),
            Err(ValidationError::EmptyField("medicine name"))
        );
        assert!(require_text("medicine name", "").is_err());
    }

    #[test]
    fn require_amount_accepts_zero() {
        assert_eq!(require_amount("mrp", 0.0).unwrap(), 0.0);
    }

    #[test]
    fn require_amount_rejects_negative_and_nan() {
        assert!(matches!(
            require_amount("mrp", -1.0),
            Err(ValidationError::Negative { field: "mrp", .. })
        ));
        assert!(matches!(
            require_amount("mrp", f64::NAN),
            Err(ValidationError::NotFinite { .. })
        ));
        assert!(require_amount("mrp", f64::INFINITY).is_err());
    }

    #[test]
    fn require_discount_bounds_are_inclusive() {
        assert_eq!(require_discount(0.0).unwrap(), 0.0);
        assert_eq!(require_discount(100.0).unwrap(), 100.0);
        assert_eq!(
            require_discount(100.5),
            Err(ValidationError::DiscountOutOfRange(100.5))
        );
        assert!(require_discount(-0.1).is_err());
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = require_text("manufacturer name", "").unwrap_err();
        assert_eq!(err.to_string(), "manufacturer name must not be empty");
    }

    #[test]
    fn require_timestamp_wants_sqlite_layout() {
        assert_eq!(
            require_timestamp("2026-03-10 08:15:00").unwrap(),
            "2026-03-10 08:15:00"
        );
        assert_eq!(
            require_timestamp("10/03/2026"),
            Err(ValidationError::InvalidTimestamp("10/03/2026".to_string()))
        );
        assert!(require_timestamp("").is_err());
        assert!(require_timestamp("2026-03-10").is_err());
        assert!(require_timestamp("2026-02-30 10:00:00").is_err());
    }
}
