//! Ranking context.

use chrono::IsoWeek;

use crate::ledger::Ledger;
use crate::models::Operation;

/// Read-only state passed to ranking rules.
///
/// Borrows the ledger; rules can never mutate load counters.
#[derive(Debug, Clone, Copy)]
pub struct RankingContext<'a> {
    /// Shared load counters.
    pub ledger: &'a Ledger,
    /// ISO week of the operation being filled.
    pub week: IsoWeek,
    /// Municipality of the operation being filled.
    pub municipality: &'a str,
    /// Per-operation salt for seeded random tie-breaks.
    pub salt: u64,
}

impl<'a> RankingContext<'a> {
    /// Creates a context for an operation.
    pub fn for_operation(ledger: &'a Ledger, operation: &'a Operation) -> Self {
        Self {
            ledger,
            week: operation.iso_week(),
            municipality: &operation.municipality,
            salt: operation.index as u64,
        }
    }
}
