//! # Error Types
//!
//! Structured error types for recon_core. These errors are designed to be
//! informative for both humans and LLMs: lookup misses carry the list of
//! valid keys so a caller can re-prompt without consulting the tables.
//!
//! ## Example
//!
//! ```rust
//! use recon_core::errors::{CalcError, CalcResult};
//!
//! fn validate_distance(distance_m: f64) -> CalcResult<()> {
//!     if distance_m <= 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "distance_m".to_string(),
//!             value: distance_m.to_string(),
//!             reason: "Distance must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for recon_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
///
/// Non-fatal conditions (diverging evidence, missing dispatch parameters)
/// are not errors; they travel inside results and dispatch outcomes.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (non-positive, out of range, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Surface not present in the friction table
    #[error("Unknown surface '{surface}'. Valid surfaces: {}", .valid.join(", "))]
    UnknownSurface { surface: String, valid: Vec<String> },

    /// Condition tag not present in the table being consulted
    #[error("Unknown condition '{condition}' for {table}. Valid conditions: {}", .valid.join(", "))]
    UnknownCondition {
        table: String,
        condition: String,
        valid: Vec<String>,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownSurface error listing the valid surfaces
    pub fn unknown_surface<S: Into<String>>(surface: impl Into<String>, valid: impl IntoIterator<Item = S>) -> Self {
        CalcError::UnknownSurface {
            surface: surface.into(),
            valid: valid.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an UnknownCondition error listing the valid conditions
    pub fn unknown_condition<S: Into<String>>(
        table: impl Into<String>,
        condition: impl Into<String>,
        valid: impl IntoIterator<Item = S>,
    ) -> Self {
        CalcError::UnknownCondition {
            table: table.into(),
            condition: condition.into(),
            valid: valid.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::UnknownSurface { .. } => "UNKNOWN_SURFACE",
            CalcError::UnknownCondition { .. } => "UNKNOWN_CONDITION",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::serialization(e.to_string())
    }
}

/// Reject non-finite or non-positive values.
pub(crate) fn require_positive(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must be positive"));
    }
    Ok(())
}

/// Reject non-finite or negative values.
pub(crate) fn require_non_negative(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("distance_m", "-5", "Distance must be positive");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
        assert!(json.contains("\"type\":\"InvalidInput\""));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("test").error_code(), "MISSING_FIELD");
        assert_eq!(
            CalcError::unknown_surface("lava", ["asphalt"]).error_code(),
            "UNKNOWN_SURFACE"
        );
    }

    #[test]
    fn test_unknown_surface_lists_valid_keys() {
        let error = CalcError::unknown_surface("lava", ["asphalt", "concrete"]);
        let message = error.to_string();
        assert!(message.contains("lava"));
        assert!(message.contains("asphalt, concrete"));
    }

    #[test]
    fn test_validation_helpers() {
        assert!(require_positive("d", 1.0).is_ok());
        assert!(require_positive("d", 0.0).is_err());
        assert!(require_positive("d", f64::NAN).is_err());
        assert!(require_non_negative("v", 0.0).is_ok());
        assert!(require_non_negative("v", -0.1).is_err());
    }
}
