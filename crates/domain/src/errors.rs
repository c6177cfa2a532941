//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Station timestamp is not a valid `YYYYMMDDHHMMSS` value
    #[error("Invalid station timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// A field required for enrichment is missing
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A field is present but has the wrong type
    #[error("Field '{field}' has invalid type: expected {expected}")]
    InvalidFieldType {
        field: String,
        expected: &'static str,
    },

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create an invalid timestamp error
    pub fn invalid_timestamp(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
            reason: reason.into(),
        }
    }
}
