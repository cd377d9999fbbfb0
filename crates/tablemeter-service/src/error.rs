//! # Service Error Type
//!
//! Unified error type for [`crate::VisitService`] callers.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CoreError ─────────────┐                                               │
//! │  io::Error / toml ──────┼──► ServiceError ──► code() ──► ErrorCode      │
//! │  poisoned lock ─────────┘                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `ErrorCode` is the stable, machine-readable part; the `Display` text is
//! meant for people.

use serde::Serialize;
use tablemeter_core::CoreError;
use thiserror::Error;

/// Errors returned by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A ledger precondition failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Configuration file could not be read or parsed.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Configuration file could not be written.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Configuration values are invalid.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A thread panicked while holding the floor lock.
    #[error("Floor state poisoned: {0}")]
    StatePoisoned(&'static str),
}

/// Machine-readable error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown table
    NotFound,

    /// Table already has an active visit
    TableOccupied,

    /// Nothing to finish or measure at the table
    NoActiveVisit,

    /// No finished visits to average
    NoHistory,

    /// Bad input or bad configuration
    ValidationError,

    /// Ledger corruption or poisoned state
    Internal,
}

impl ServiceError {
    /// Category of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::Core(core) => match core {
                CoreError::TableNotFound(_) => ErrorCode::NotFound,
                CoreError::TableOccupied(_) => ErrorCode::TableOccupied,
                CoreError::NoActiveVisit(_) => ErrorCode::NoActiveVisit,
                CoreError::NoHistory(_) => ErrorCode::NoHistory,
                CoreError::Validation(_) => ErrorCode::ValidationError,
                CoreError::InvariantViolation { .. } | CoreError::CostOverflow { .. } => {
                    ErrorCode::Internal
                }
            },
            ServiceError::ConfigLoadFailed(_)
            | ServiceError::ConfigSaveFailed(_)
            | ServiceError::InvalidConfig(_) => ErrorCode::ValidationError,
            ServiceError::StatePoisoned(_) => ErrorCode::Internal,
        }
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ServiceError {
    fn from(err: toml::de::Error) -> Self {
        ServiceError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ServiceError {
    fn from(err: toml::ser::Error) -> Self {
        ServiceError::ConfigSaveFailed(err.to_string())
    }
}

/// Convenience type alias for Results with ServiceError.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tablemeter_core::TableId;

    #[test]
    fn test_core_errors_map_to_codes() {
        let cases = [
            (CoreError::TableNotFound(TableId::new(1)), ErrorCode::NotFound),
            (CoreError::TableOccupied(TableId::new(1)), ErrorCode::TableOccupied),
            (CoreError::NoActiveVisit(TableId::new(1)), ErrorCode::NoActiveVisit),
            (CoreError::NoHistory(TableId::new(1)), ErrorCode::NoHistory),
            (
                CoreError::InvariantViolation {
                    table_id: TableId::new(1),
                    active: 2,
                },
                ErrorCode::Internal,
            ),
            (CoreError::CostOverflow { minutes: 60 }, ErrorCode::Internal),
        ];

        for (core, code) in cases {
            assert_eq!(ServiceError::from(core).code(), code);
        }
    }

    #[test]
    fn test_core_message_is_passed_through() {
        let err = ServiceError::from(CoreError::NoHistory(TableId::new(4)));
        assert_eq!(err.to_string(), "Table 4 has no finished visits");
    }

    #[test]
    fn test_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::NoActiveVisit).unwrap();
        assert_eq!(json, "\"NO_ACTIVE_VISIT\"");
    }
}
