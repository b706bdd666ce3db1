//! Hard eligibility rules.
//!
//! Shrinks the roster to the candidates that may legally work an
//! operation. Rules, applied in order:
//! 1. not already assigned on the operation date;
//! 2. not blacked out on the operation date;
//! 3. home municipality differs from the operation municipality.
//!
//! The filter only reads the ledger. An empty result is not an error;
//! the allocator abandons the operation.

use crate::ledger::Ledger;
use crate::models::{Candidate, Operation};
use crate::roster::Roster;

/// Why a candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Already assigned on the operation date.
    AlreadyAssignedToday,
    /// Blacked out on the operation date.
    Unavailable,
    /// Lives in the operation municipality.
    SameMunicipality,
}

/// Checks one candidate against one operation.
///
/// Returns the first failing rule, or `None` when eligible.
pub fn check(candidate: &Candidate, operation: &Operation, ledger: &Ledger) -> Option<Rejection> {
    if ledger.is_assigned_on(&candidate.name, operation.date) {
        return Some(Rejection::AlreadyAssignedToday);
    }
    if candidate.availability.is_blocked_on(operation.date) {
        return Some(Rejection::Unavailable);
    }
    if candidate.is_from(&operation.municipality) {
        return Some(Rejection::SameMunicipality);
    }
    None
}

/// Whether a candidate passes every rule.
#[inline]
pub fn is_eligible(candidate: &Candidate, operation: &Operation, ledger: &Ledger) -> bool {
    check(candidate, operation, ledger).is_none()
}

/// Eligible candidates for an operation, in roster order.
pub fn filter<'a>(roster: &'a Roster, operation: &Operation, ledger: &Ledger) -> Vec<&'a Candidate> {
    roster
        .iter()
        .filter(|c| is_eligible(c, operation, ledger))
        .collect()
}
