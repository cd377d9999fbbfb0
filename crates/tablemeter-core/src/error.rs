//! # Error Types
//!
//! Domain-specific error types for tablemeter-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tablemeter-core errors (this file)                                    │
//! │  ├── CoreError        - Visit lifecycle / query failures               │
//! │  └── ValidationError  - Bad configuration input                        │
//! │                                                                         │
//! │  tablemeter-service errors (separate crate)                            │
//! │  └── ServiceError     - Core + config file + lock failures             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → caller             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure in the ledger is a precondition violation. None of them are
//! retried and none are papered over with a default value.

use thiserror::Error;

use crate::types::TableId;

// =============================================================================
// Core Error
// =============================================================================

/// Visit lifecycle and query errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The table id does not exist in the registry.
    #[error("Table not found: {0}")]
    TableNotFound(TableId),

    /// `create_visit` on a table that already has an active visit.
    ///
    /// ## User Workflow
    /// ```text
    /// Seat client at table 3
    ///      │
    ///      ▼
    /// Table 3 already has an active visit
    ///      │
    ///      ▼
    /// TableOccupied(3)   (ledger untouched)
    /// ```
    #[error("Table {0} is already occupied")]
    TableOccupied(TableId),

    /// No active visit exists for the table.
    #[error("No active visit for table {0}")]
    NoActiveVisit(TableId),

    /// Average requested for a table with zero finished visits.
    #[error("Table {0} has no finished visits")]
    NoHistory(TableId),

    /// More than one active visit references the same table.
    ///
    /// Should be unreachable. Seeing it means the ledger was corrupted.
    #[error("Invariant violated for table {table_id}: {active} active visits")]
    InvariantViolation { table_id: TableId, active: usize },

    /// `rate × minutes` does not fit in `i64` cents.
    #[error("Cost of {minutes} minutes overflows")]
    CostOverflow { minutes: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoreError::TableOccupied(TableId::new(3)).to_string(),
            "Table 3 is already occupied"
        );
        assert_eq!(
            CoreError::InvariantViolation {
                table_id: TableId::new(2),
                active: 2
            }
            .to_string(),
            "Invariant violated for table 2: 2 active visits"
        );
    }

    #[test]
    fn test_cost_overflow_message() {
        assert_eq!(
            CoreError::CostOverflow { minutes: 60 }.to_string(),
            "Cost of 60 minutes overflows"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let err: CoreError = ValidationError::MustNotBeNegative {
            field: "price_per_minute".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Validation error: price_per_minute must not be negative"
        );
    }
}
