//! Allocation (solution) model.
//!
//! An allocation is the output of one full run: who was assigned where,
//! who was eligible but left out, and how each operation ended.
//! [`Allocation::verify`] re-checks the hard invariants and reports any
//! breach as a [`Violation`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::roster::Roster;
use crate::validation::ValidationError;

/// A candidate placed on an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Index of the operation in processing order.
    pub operation: usize,
    /// Weekday label of the operation.
    pub weekday: String,
    /// Operation date.
    pub date: NaiveDate,
    /// Operation municipality.
    pub municipality: String,
    /// Assigned candidate.
    pub name: String,
    /// Category under which the candidate was assigned.
    pub category: String,
    /// Whether the candidate holds the lead role.
    pub lead: bool,
}

/// Why an eligible candidate ended up without an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NonAssignmentReason {
    /// Eligible and matched, but not chosen.
    NotSelected,
    /// The operation requested zero people.
    ZeroHeadcount,
}

/// An eligible candidate that was not placed on an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonAssignment {
    /// Candidate name.
    pub name: String,
    /// Weekday label of the operation.
    pub weekday: String,
    /// Operation date.
    pub date: NaiveDate,
    /// Operation municipality.
    pub municipality: String,
    /// Operation category label.
    pub category: String,
    /// Candidate's home municipality.
    pub home_municipality: String,
    /// Whether the candidate is lead-eligible.
    pub lead_eligible: bool,
    /// Reason code.
    pub reason: NonAssignmentReason,
}

/// Why an operation received no assignment at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbandonReason {
    /// Nobody survived eligibility filtering and category matching.
    EmptyEligiblePool,
    /// The operation requested zero people.
    ZeroHeadcount,
}

/// Final state of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    /// Exactly `headcount` people placed.
    Committed,
    /// The eligible pool ran out before reaching headcount.
    Underfilled {
        /// People placed.
        placed: usize,
        /// People requested.
        headcount: u32,
    },
    /// Nobody placed.
    Abandoned(AbandonReason),
}

/// Per-operation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationReport {
    /// Index of the operation in processing order.
    pub operation: usize,
    /// Weekday label.
    pub weekday: String,
    /// Operation date.
    pub date: NaiveDate,
    /// Municipality.
    pub municipality: String,
    /// Category label.
    pub category: String,
    /// Requested headcount.
    pub headcount: u32,
    /// Size of the eligible, matched pool.
    pub pool_size: usize,
    /// Number of people placed.
    pub placed: usize,
    /// Name of an override strategy that handled the operation, if any.
    pub strategy: Option<String>,
    /// Final state.
    pub status: OperationStatus,
}

impl OperationReport {
    /// Whether the operation reached its headcount.
    pub fn is_filled(&self) -> bool {
        matches!(self.status, OperationStatus::Committed)
    }
}

/// A breach of a hard allocation invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (candidate name or operation index).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Classification of invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Same candidate assigned twice on one date.
    DoubleBooking,
    /// Candidate assigned in their own home municipality.
    HomeMunicipality,
    /// Operation with a non-empty pool does not have exactly one lead.
    LeadCount,
    /// Placed count differs from min(headcount, pool size).
    Headcount,
    /// Assignment names a candidate missing from the roster.
    UnknownCandidate,
}

impl Violation {
    fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

/// Output of a full allocation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Allocation {
    /// Committed assignments, in commit order.
    pub assignments: Vec<Assignment>,
    /// Eligible candidates left out, deduplicated by (name, weekday, category).
    pub non_assignments: Vec<NonAssignment>,
    /// One report per operation, in processing order.
    pub reports: Vec<OperationReport>,
    /// Input rows skipped by validation.
    pub issues: Vec<ValidationError>,
}

impl Allocation {
    /// Creates an empty allocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Assignments of one operation.
    pub fn assignments_for_operation(&self, operation: usize) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.operation == operation)
            .collect()
    }

    /// Assignments of one candidate.
    pub fn assignments_for_candidate(&self, name: &str) -> Vec<&Assignment> {
        self.assignments.iter().filter(|a| a.name == name).collect()
    }

    /// Lead assignment of an operation, if any.
    pub fn lead_for_operation(&self, operation: usize) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.operation == operation && a.lead)
    }

    /// Reports of operations that did not reach headcount.
    pub fn shortfalls(&self) -> Vec<&OperationReport> {
        self.reports.iter().filter(|r| !r.is_filled()).collect()
    }

    /// Re-checks the hard invariants.
    ///
    /// Returns an empty list for a correct allocation.
    pub fn verify(&self, roster: &Roster) -> Vec<Violation> {
        let mut violations = Vec::new();

        let mut seen: HashSet<(&str, NaiveDate)> = HashSet::new();
        for a in &self.assignments {
            if !seen.insert((a.name.as_str(), a.date)) {
                violations.push(Violation::new(
                    ViolationType::DoubleBooking,
                    &a.name,
                    format!("'{}' assigned more than once on {}", a.name, a.date),
                ));
            }

            match roster.get(&a.name) {
                Some(c) if c.is_from(&a.municipality) => {
                    violations.push(Violation::new(
                        ViolationType::HomeMunicipality,
                        &a.name,
                        format!("'{}' assigned in home municipality {}", a.name, a.municipality),
                    ));
                }
                Some(_) => {}
                None => violations.push(Violation::new(
                    ViolationType::UnknownCandidate,
                    &a.name,
                    format!("'{}' is not in the roster", a.name),
                )),
            }
        }

        let mut placed: HashMap<usize, (usize, usize)> = HashMap::new();
        for a in &self.assignments {
            let entry = placed.entry(a.operation).or_insert((0, 0));
            entry.0 += 1;
            if a.lead {
                entry.1 += 1;
            }
        }

        for report in &self.reports {
            let (count, leads) = placed.get(&report.operation).copied().unwrap_or((0, 0));
            let expected = (report.headcount as usize).min(report.pool_size);

            if count != expected {
                violations.push(Violation::new(
                    ViolationType::Headcount,
                    report.operation.to_string(),
                    format!(
                        "operation {} placed {} of expected {}",
                        report.operation, count, expected
                    ),
                ));
            }
            if expected > 0 && leads != 1 {
                violations.push(Violation::new(
                    ViolationType::LeadCount,
                    report.operation.to_string(),
                    format!("operation {} has {} leads", report.operation, leads),
                ));
            }
        }

        violations
    }
}
