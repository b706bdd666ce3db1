//! Input validation for allocation runs.
//!
//! Checks candidate and demand rows before allocation. Detects:
//! - Missing required fields (name, category, headcount, municipality, weekday)
//! - Duplicate candidate names (reported by [`Roster::build`](crate::roster::Roster::build))
//! - Blackout ranges that end before they start
//!
//! None of these abort a run: offending rows are skipped and the errors
//! are surfaced in [`Allocation::issues`](crate::models::Allocation).

use serde::{Deserialize, Serialize};

use crate::models::{Candidate, DemandRow};

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// A candidate or demand row lacks a mandatory attribute.
    MissingRequiredField,
    /// Two candidates share the same name.
    DuplicateName,
    /// A blackout date range ends before it starts.
    InvertedBlackoutRange,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn missing(entity: &str, field: &str) -> Self {
        Self::new(
            ValidationErrorKind::MissingRequiredField,
            format!("{entity} is missing required field '{field}'"),
        )
    }
}

/// Checks a single candidate. `position` is its index in the input.
pub fn check_candidate(position: usize, candidate: &Candidate) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let label = if candidate.name.trim().is_empty() {
        format!("Candidate #{position}")
    } else {
        format!("Candidate '{}'", candidate.name)
    };

    if candidate.name.trim().is_empty() {
        errors.push(ValidationError::missing(&label, "name"));
    }
    if candidate.categories.is_empty() {
        errors.push(ValidationError::missing(&label, "category"));
    }
    if let Some(range) = candidate.availability.blocked_range {
        if range.is_inverted() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvertedBlackoutRange,
                format!(
                    "{label} has blackout range ending {} before its start {}",
                    range.end, range.start
                ),
            ));
        }
    }

    errors
}

/// Checks a single demand row. `position` is its index in the input.
pub fn check_demand(position: usize, row: &DemandRow) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let label = format!("Demand row #{position} ({} {})", row.municipality, row.date);

    if row.weekday.trim().is_empty() {
        errors.push(ValidationError::missing(&label, "weekday"));
    }
    if row.municipality.trim().is_empty() {
        errors.push(ValidationError::missing(&label, "municipality"));
    }
    if row.categories.is_empty() || row.categories.iter().any(|c| c.trim().is_empty()) {
        errors.push(ValidationError::missing(&label, "category"));
    }
    if row.headcount.is_none() {
        errors.push(ValidationError::missing(&label, "headcount"));
    }

    errors
}
