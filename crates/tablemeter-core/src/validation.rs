//! # Validation Module
//!
//! Checks applied to configuration values before they reach the ledger.
//!
//! ```rust
//! use tablemeter_core::validation::{validate_price_per_minute, validate_table_count};
//!
//! assert!(validate_price_per_minute(500).is_ok());
//! assert!(validate_table_count(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_PRICE_PER_MINUTE_CENTS, MAX_TABLES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A free-of-charge rate (0) is allowed; a negative one is not.
///
/// - Must not exceed MAX_PRICE_PER_MINUTE_CENTS (10,000.00)
pub fn validate_price_per_minute(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price_per_minute".to_string(),
        });
    }

    if cents > MAX_PRICE_PER_MINUTE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price_per_minute".to_string(),
            min: 0,
            max: MAX_PRICE_PER_MINUTE_CENTS,
        });
    }

    Ok(())
}

/// Number of tables to seed the floor with: 1..=MAX_TABLES.
pub fn validate_table_count(count: u32) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::MustBePositive {
            field: "table_count".to_string(),
        });
    }

    if count > MAX_TABLES {
        return Err(ValidationError::OutOfRange {
            field: "table_count".to_string(),
            min: 1,
            max: MAX_TABLES as i64,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_per_minute() {
        assert!(validate_price_per_minute(0).is_ok());
        assert!(validate_price_per_minute(500).is_ok());
        assert_eq!(
            validate_price_per_minute(-5),
            Err(ValidationError::MustNotBeNegative {
                field: "price_per_minute".to_string()
            })
        );
    }

    #[test]
    fn test_price_per_minute_upper_bound() {
        assert!(validate_price_per_minute(MAX_PRICE_PER_MINUTE_CENTS).is_ok());
        assert_eq!(
            validate_price_per_minute(i64::MAX / 10),
            Err(ValidationError::OutOfRange {
                field: "price_per_minute".to_string(),
                min: 0,
                max: MAX_PRICE_PER_MINUTE_CENTS,
            })
        );
    }

    #[test]
    fn test_table_count_bounds() {
        assert!(validate_table_count(1).is_ok());
        assert!(validate_table_count(MAX_TABLES).is_ok());
        assert!(matches!(
            validate_table_count(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_table_count(MAX_TABLES + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }
}
