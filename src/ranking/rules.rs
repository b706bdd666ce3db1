//! Built-in ranking rules.
//!
//! # Categories
//!
//! - **Fit**: MATCH
//! - **Load**: WEEK, TOTAL, LEAD
//! - **Rotation**: MUNI
//!
//! # Score Convention
//! All rules return lower scores for candidates to pick first.

use super::{RankingContext, RankingRule, RuleScore};
use crate::matching::PoolEntry;

// ======================== Fit rules ========================

/// Category match strength.
///
/// Prefers candidates holding more of the requested categories.
/// Provisional (escort fallback) matches score lower by construction.
#[derive(Debug, Clone, Copy)]
pub struct MatchStrength;

impl RankingRule for MatchStrength {
    fn name(&self) -> &'static str {
        "MATCH"
    }

    fn evaluate(&self, entry: &PoolEntry<'_>, _context: &RankingContext<'_>) -> RuleScore {
        -(entry.quality.score as f64)
    }

    fn description(&self) -> &'static str {
        "Category Match Strength"
    }
}

// ======================== Load rules ========================

/// Assignments in the operation's ISO week.
///
/// Spreads work within a week: fewer assignments this week ranks first.
#[derive(Debug, Clone, Copy)]
pub struct WeeklyLoad;

impl RankingRule for WeeklyLoad {
    fn name(&self) -> &'static str {
        "WEEK"
    }

    fn evaluate(&self, entry: &PoolEntry<'_>, context: &RankingContext<'_>) -> RuleScore {
        context.ledger.week_count(entry.name(), context.week) as f64
    }

    fn description(&self) -> &'static str {
        "Current-Week Load"
    }
}

/// Assignments over the whole run.
#[derive(Debug, Clone, Copy)]
pub struct TotalLoad;

impl RankingRule for TotalLoad {
    fn name(&self) -> &'static str {
        "TOTAL"
    }

    fn evaluate(&self, entry: &PoolEntry<'_>, context: &RankingContext<'_>) -> RuleScore {
        context.ledger.total(entry.name()) as f64
    }

    fn description(&self) -> &'static str {
        "Cumulative Load"
    }
}

/// Lead assignments over the whole run.
#[derive(Debug, Clone, Copy)]
pub struct LeadLoad;

impl RankingRule for LeadLoad {
    fn name(&self) -> &'static str {
        "LEAD"
    }

    fn evaluate(&self, entry: &PoolEntry<'_>, context: &RankingContext<'_>) -> RuleScore {
        context.ledger.leads(entry.name()) as f64
    }

    fn description(&self) -> &'static str {
        "Lead Rotation Load"
    }
}

// ======================== Rotation rules ========================

/// Already sent to the operation's municipality this ISO week.
///
/// Soft counterpart of the allocator's municipality rotation skip,
/// for custom rule engines.
#[derive(Debug, Clone, Copy)]
pub struct MunicipalityRepeat;

impl RankingRule for MunicipalityRepeat {
    fn name(&self) -> &'static str {
        "MUNI"
    }

    fn evaluate(&self, entry: &PoolEntry<'_>, context: &RankingContext<'_>) -> RuleScore {
        if context
            .ledger
            .is_assigned_in(entry.name(), context.municipality, context.week)
        {
            1.0
        } else {
            0.0
        }
    }

    fn description(&self) -> &'static str {
        "Municipality Repeat"
    }
}
