//! Input validation for scheduling records.
//!
//! Checks structural integrity of phases and assignments handed to the
//! engine, typically right after deserialization. Detects:
//! - Duplicate IDs
//! - Assignments referencing unknown phases
//! - Working percentages above 100
//!
//! Overlapping phases and over-allocated members are not validation
//! errors; the conflict detector reports them.

use std::collections::HashSet;

use crate::models::{Assignment, Phase, MAX_WORKING_PERCENTAGE};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two records share the same ID.
    DuplicateId,
    /// An assignment references a phase that doesn't exist.
    InvalidPhaseReference,
    /// An assignment's working percentage is above 100.
    InvalidPercentage,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates phases and assignments.
///
/// Checks:
/// 1. No duplicate phase IDs
/// 2. No duplicate assignment IDs
/// 3. Every assignment references a known phase
/// 4. Every working percentage is within `0..=100`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_schedule(phases: &[Phase], assignments: &[Assignment]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut phase_ids = HashSet::new();
    for p in phases {
        if !phase_ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate phase ID: {}", p.id),
            ));
        }
    }

    let mut assignment_ids = HashSet::new();
    for a in assignments {
        if !assignment_ids.insert(a.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate assignment ID: {}", a.id),
            ));
        }

        if !phase_ids.contains(a.phase_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidPhaseReference,
                format!(
                    "Assignment '{}' references unknown phase '{}'",
                    a.id, a.phase_id
                ),
            ));
        }

        if a.working_percentage > MAX_WORKING_PERCENTAGE {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidPercentage,
                format!(
                    "Assignment '{}' has working percentage {}",
                    a.id, a.working_percentage
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(errors = errors.len(), "schedule validation failed");
        Err(errors)
    }
}
