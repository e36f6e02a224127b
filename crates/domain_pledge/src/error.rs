//! Pledge domain errors
//!
//! The validation variants are all caller-correctable and are raised before
//! any persistence call; `Persistence` is the only system fault.

use chrono::NaiveDate;
use core_kernel::{MoneyError, PlanId, PortError};
use thiserror::Error;

/// Errors that can occur while resolving or committing a payment plan
#[derive(Debug, Error)]
pub enum PlanError {
    /// Malformed or missing required fields for the chosen policy
    #[error("Invalid field {field}: {message}")]
    InputShape { field: String, message: String },

    /// Schedule sum and declared total disagree beyond tolerance
    #[error("Schedule total {actual} does not match planned total {expected} (in minor units)")]
    TotalMismatch { expected: i64, actual: i64 },

    /// Two schedule entries share a date
    #[error("Duplicate installment date: {0}")]
    DuplicateDate(NaiveDate),

    /// A user-supplied custom entry is dated before today
    #[error("Installment date {0} is in the past")]
    PastDate(NaiveDate),

    /// Referenced plan does not exist
    #[error("Payment plan not found: {0}")]
    NotFound(PlanId),

    /// The plan was modified by a concurrent writer
    #[error("Plan version is stale: expected {expected}, found {actual}")]
    VersionConflict { expected: i64, actual: i64 },

    /// Invalid plan status transition
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    /// Money arithmetic failure (currency mismatch, overflow)
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// The persistence adapter failed after validation succeeded
    #[error("Persistence failure: {0}")]
    Persistence(#[from] PortError),
}

impl PlanError {
    pub fn input(field: impl Into<String>, message: impl Into<String>) -> Self {
        PlanError::InputShape {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true for caller-correctable validation failures
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PlanError::InputShape { .. }
                | PlanError::TotalMismatch { .. }
                | PlanError::DuplicateDate(_)
                | PlanError::PastDate(_)
                | PlanError::InvalidTransition(_)
                | PlanError::Money(_)
        )
    }

    /// Request field this error is attributed to, when one applies
    pub fn field(&self) -> Option<&str> {
        match self {
            PlanError::InputShape { field, .. } => Some(field),
            PlanError::TotalMismatch { .. } => Some("total_planned_amount"),
            PlanError::DuplicateDate(_) | PlanError::PastDate(_) => Some("custom_installments"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(PlanError::input("cadence", "unknown").is_validation());
        assert!(PlanError::TotalMismatch {
            expected: 5000,
            actual: 4995
        }
        .is_validation());
        assert!(!PlanError::NotFound(PlanId::new()).is_validation());
        assert!(!PlanError::Persistence(PortError::connection("down")).is_validation());
    }

    #[test]
    fn test_field_attribution() {
        let err = PlanError::input("number_of_installments", "must be positive");
        assert_eq!(err.field(), Some("number_of_installments"));

        let err = PlanError::DuplicateDate(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(err.field(), Some("custom_installments"));
    }
}
