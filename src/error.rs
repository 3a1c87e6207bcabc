// ⚠️ Error Model - value-level failures returned to the caller
// The core never logs, prints or aborts; every failure is one of these.

use crate::catalog::VehicleId;
use thiserror::Error;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// A field that failed validation, with a human-readable reason.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// CATALOG ERROR
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("No vehicle found for {make} {model}")]
    NotFound { make: String, model: String },
    #[error("No vehicle with handle {0}")]
    UnknownHandle(VehicleId),
    #[error("A vehicle named {make} {model} is already cataloged")]
    Duplicate { make: String, model: String },
    #[error("Catalog is full ({capacity} vehicles)")]
    CapacityExceeded { capacity: usize },
}

impl CatalogError {
    pub fn not_found(make: &str, model: &str) -> Self {
        CatalogError::NotFound {
            make: make.to_string(),
            model: model.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::NotFound { .. } | CatalogError::UnknownHandle(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("price", "must be non-negative, got -1");
        assert_eq!(err.to_string(), "price: must be non-negative, got -1");
    }

    #[test]
    fn test_catalog_error_from_validation() {
        let err: CatalogError = ValidationError::new("year", "out of range").into();
        assert_eq!(err.to_string(), "Validation error: year: out of range");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_message() {
        let err = CatalogError::not_found("Honda", "CR-V");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No vehicle found for Honda CR-V");
    }
}
