//! Lead selection.
//!
//! Picks the one pool member that holds the lead role of an operation:
//! 1. among lead-eligible members, the fewest lead assignments so far;
//! 2. otherwise, the member with the fewest assignments overall.
//!
//! Ties go to the member encountered first in pool order. An empty pool
//! yields no lead.

use crate::ledger::Ledger;
use crate::matching::PoolEntry;

/// A chosen lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadChoice {
    /// Index into the pool.
    pub index: usize,
    /// Chosen through the least-assigned fallback (not lead-eligible).
    pub fallback: bool,
}

/// Selects the lead of an operation from its matched pool.
pub fn select(pool: &[PoolEntry<'_>], ledger: &Ledger) -> Option<LeadChoice> {
    let eligible = pool
        .iter()
        .enumerate()
        .filter(|(_, e)| e.candidate.lead_eligible)
        .min_by_key(|(_, e)| ledger.leads(e.name()));

    if let Some((index, _)) = eligible {
        return Some(LeadChoice {
            index,
            fallback: false,
        });
    }

    pool.iter()
        .enumerate()
        .min_by_key(|(_, e)| ledger.total(e.name()))
        .map(|(index, _)| LeadChoice {
            index,
            fallback: true,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::MatchQuality;
    use crate::models::{Candidate, Operation};
    use chrono::NaiveDate;

    fn op(day: u32) -> Operation {
        Operation::new(
            0,
            "SEXTA",
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            "POA",
            vec!["1".into()],
            2,
        )
    }

    fn pool(candidates: &[Candidate]) -> Vec<PoolEntry<'_>> {
        candidates
            .iter()
            .map(|c| {
                PoolEntry::new(
                    c,
                    MatchQuality {
                        score: 1,
                        provisional: false,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_lead_eligible_preferred() {
        let cs = vec![
            Candidate::new("ANA", "X"),
            Candidate::new("BIA", "X").with_lead(true),
        ];
        let choice = select(&pool(&cs), &Ledger::new()).unwrap();
        assert_eq!(choice, LeadChoice { index: 1, fallback: false });
    }

    #[test]
    fn test_fewest_leads_wins() {
        let cs = vec![
            Candidate::new("ANA", "X").with_lead(true),
            Candidate::new("BIA", "X").with_lead(true),
        ];
        let mut ledger = Ledger::new();
        ledger.record("ANA", &op(1), true);

        assert_eq!(select(&pool(&cs), &ledger).unwrap().index, 1);
    }

    #[test]
    fn test_lead_count_independent_of_total() {
        let cs = vec![
            Candidate::new("ANA", "X").with_lead(true),
            Candidate::new("BIA", "X").with_lead(true),
        ];
        let mut ledger = Ledger::new();
        // ANA works a lot but never led; BIA led once
        ledger.record("ANA", &op(1), false);
        ledger.record("ANA", &op(4), false);
        ledger.record("BIA", &op(5), true);

        assert_eq!(select(&pool(&cs), &ledger).unwrap().index, 0);
    }

    #[test]
    fn test_tie_first_encountered() {
        let cs = vec![
            Candidate::new("ZECA", "X").with_lead(true),
            Candidate::new("ANA", "X").with_lead(true),
        ];
        assert_eq!(select(&pool(&cs), &Ledger::new()).unwrap().index, 0);
    }

    #[test]
    fn test_fallback_least_assigned() {
        let cs = vec![Candidate::new("ANA", "X"), Candidate::new("BIA", "X")];
        let mut ledger = Ledger::new();
        ledger.record("ANA", &op(1), false);

        let choice = select(&pool(&cs), &ledger).unwrap();
        assert_eq!(choice, LeadChoice { index: 1, fallback: true });
    }

    #[test]
    fn test_empty_pool() {
        assert!(select(&[], &Ledger::new()).is_none());
    }
}
