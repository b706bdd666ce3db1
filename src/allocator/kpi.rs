//! Allocation quality metrics (KPIs).
//!
//! Computes coverage and fairness indicators from a finished allocation
//! and the roster it was drawn from.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Fill Rate | placed / requested over all operations |
//! | Committed / Underfilled / Abandoned | Operation counts per final state |
//! | Load Spread | max - min assignments per candidate |
//! | Avg Load | Mean assignments per candidate |
//! | Lead Spread | max - min lead assignments among lead-eligible candidates |
//!
//! Candidates with no assignment count as zero load.

use std::collections::HashMap;

use crate::models::{Allocation, OperationStatus};
use crate::roster::Roster;

/// Allocation performance indicators.
#[derive(Debug, Clone)]
pub struct AllocationKpi {
    /// Total people requested across all operations.
    pub requested: u32,
    /// Total assignments made.
    pub placed: usize,
    /// Fraction of requested people placed (0.0..1.0).
    pub fill_rate: f64,
    /// Operations that reached headcount.
    pub committed: usize,
    /// Operations that ran out of eligible candidates.
    pub underfilled: usize,
    /// Operations with no assignment at all.
    pub abandoned: usize,
    /// Most assignments held by one candidate.
    pub max_load: u32,
    /// Fewest assignments held by one candidate.
    pub min_load: u32,
    /// Average assignments per candidate.
    pub avg_load: f64,
    /// Difference between the most and fewest lead assignments
    /// among lead-eligible candidates.
    pub lead_spread: u32,
    /// Per-candidate assignment counts.
    pub load_by_candidate: HashMap<String, u32>,
}

impl AllocationKpi {
    /// Computes KPIs from an allocation and its roster.
    pub fn calculate(allocation: &Allocation, roster: &Roster) -> Self {
        let mut load_by_candidate: HashMap<String, u32> =
            roster.iter().map(|c| (c.name.clone(), 0)).collect();
        let mut leads: HashMap<&str, u32> = roster
            .iter()
            .filter(|c| c.lead_eligible)
            .map(|c| (c.name.as_str(), 0))
            .collect();

        for a in &allocation.assignments {
            *load_by_candidate.entry(a.name.clone()).or_insert(0) += 1;
            if a.lead {
                if let Some(count) = leads.get_mut(a.name.as_str()) {
                    *count += 1;
                }
            }
        }

        let mut requested = 0;
        let (mut committed, mut underfilled, mut abandoned) = (0, 0, 0);
        for report in &allocation.reports {
            requested += report.headcount;
            match report.status {
                OperationStatus::Committed => committed += 1,
                OperationStatus::Underfilled { .. } => underfilled += 1,
                OperationStatus::Abandoned(_) => abandoned += 1,
            }
        }

        let placed = allocation.assignments.len();
        let fill_rate = if requested == 0 {
            1.0
        } else {
            placed as f64 / requested as f64
        };

        let max_load = load_by_candidate.values().copied().max().unwrap_or(0);
        let min_load = load_by_candidate.values().copied().min().unwrap_or(0);
        let avg_load = if load_by_candidate.is_empty() {
            0.0
        } else {
            placed as f64 / load_by_candidate.len() as f64
        };

        let lead_spread = match (leads.values().max(), leads.values().min()) {
            (Some(max), Some(min)) => max - min,
            _ => 0,
        };

        Self {
            requested,
            placed,
            fill_rate,
            committed,
            underfilled,
            abandoned,
            max_load,
            min_load,
            avg_load,
            lead_spread,
            load_by_candidate,
        }
    }

    /// Difference between the busiest and the least busy candidate.
    pub fn load_spread(&self) -> u32 {
        self.max_load - self.min_load
    }

    /// Whether the allocation meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_fill_rate: f64, max_load_spread: u32) -> bool {
        self.fill_rate >= min_fill_rate && self.load_spread() <= max_load_spread
    }
}
