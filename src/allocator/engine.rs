//! Greedy sequential allocator.
//!
//! # Algorithm
//!
//! Operations are processed one at a time in grouping-key order. For each:
//!
//! 1. Filter the roster through the hard eligibility rules.
//! 2. Match categories, then apply the named-priority override.
//! 3. Choose the lead, rank the remainder, fill `headcount - 1` slots
//!    (or run the matched override strategy instead).
//! 4. Reconcile to exactly `headcount` (or the pool size, if smaller).
//! 5. Commit and record who was left out.
//!
//! Every placement is written to the [`Ledger`] immediately, so later
//! operations, and later slots of the same operation, see it.
//!
//! # Complexity
//! O(o * n log n) where o=operations, n=roster size.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::overrides::OverrideStrategy;
use crate::config::AllocationConfig;
use crate::eligibility;
use crate::error::{AllocationError, Result};
use crate::lead;
use crate::ledger::Ledger;
use crate::matching::{self, CategoryMatcher, PoolEntry};
use crate::models::{
    AbandonReason, Allocation, Assignment, Candidate, DemandRow, NonAssignment,
    NonAssignmentReason, Operation, OperationReport, OperationStatus,
};
use crate::ranking::{RankingContext, RuleEngine};
use crate::roster::Roster;
use crate::validation::{self, ValidationError};

/// Validated input of an allocation run.
#[derive(Debug, Clone)]
pub struct AllocationRequest {
    /// Usable candidates.
    pub roster: Roster,
    /// Operations in processing order.
    pub operations: Vec<Operation>,
    /// Input rows skipped by validation.
    pub issues: Vec<ValidationError>,
}

impl AllocationRequest {
    /// Validates raw input and groups demand rows into operations.
    ///
    /// Invalid rows are skipped and kept in `issues`. Fails only when no
    /// candidate or no operation survives.
    pub fn new(candidates: Vec<Candidate>, demand: &[DemandRow]) -> Result<Self> {
        let submitted = candidates.len();
        let (roster, mut issues) = Roster::build(candidates);
        if roster.is_empty() {
            return Err(AllocationError::NoCandidates { skipped: submitted });
        }

        let mut usable = Vec::with_capacity(demand.len());
        let mut skipped = 0;
        for (i, row) in demand.iter().enumerate() {
            let errors = validation::check_demand(i, row);
            if errors.is_empty() {
                usable.push(row.clone());
            } else {
                skipped += 1;
                issues.extend(errors);
            }
        }

        for issue in &issues {
            warn!(kind = ?issue.kind, "skipped input: {}", issue.message);
        }

        let operations = Operation::group(&usable);
        if operations.is_empty() {
            return Err(AllocationError::NoOperations { skipped });
        }

        Ok(Self {
            roster,
            operations,
            issues,
        })
    }
}

/// Per-operation processing stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Filtered,
    LeadChosen,
    Filling,
    Reconcile,
    Committed,
    Abandoned,
}

fn enter(operation: &Operation, stage: Stage) {
    debug!(operation = operation.index, stage = ?stage, "stage");
}

#[derive(Debug, Clone)]
struct Placement<'a> {
    entry: PoolEntry<'a>,
    category: String,
    lead: bool,
}

fn is_placed(placements: &[Placement<'_>], name: &str) -> bool {
    placements.iter().any(|p| p.entry.name() == name)
}

fn place<'a>(
    placements: &mut Vec<Placement<'a>>,
    ledger: &mut Ledger,
    operation: &Operation,
    entry: PoolEntry<'a>,
    category: String,
    lead: bool,
) {
    ledger.record(entry.name(), operation, lead);
    placements.push(Placement {
        entry,
        category,
        lead,
    });
}

fn category_for(entry: &PoolEntry<'_>, operation: &Operation, code: Option<&str>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => matching::assigned_category(entry.candidate, operation),
    }
}

/// Non-assignment records, deduplicated across the run.
#[derive(Debug, Default)]
struct LeftOut {
    seen: HashSet<(String, String, String)>,
}

impl LeftOut {
    fn record(
        &mut self,
        out: &mut Allocation,
        entry: &PoolEntry<'_>,
        operation: &Operation,
        reason: NonAssignmentReason,
    ) {
        let category = operation.category_label();
        let key = (
            entry.name().to_string(),
            operation.weekday.clone(),
            category.clone(),
        );
        if !self.seen.insert(key) {
            return;
        }
        out.non_assignments.push(NonAssignment {
            name: entry.name().to_string(),
            weekday: operation.weekday.clone(),
            date: operation.date,
            municipality: operation.municipality.clone(),
            category,
            home_municipality: entry.candidate.home_municipality.clone(),
            lead_eligible: entry.candidate.lead_eligible,
            reason,
        });
    }
}

/// Fair sequential allocator.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_roster::allocator::{AllocationRequest, Allocator};
/// use u_roster::config::AllocationConfig;
/// use u_roster::models::{Candidate, DemandRow};
///
/// let candidates = vec![
///     Candidate::new("ANA", "SANTOS").with_category("1").with_lead(true),
///     Candidate::new("BIA", "SANTOS").with_category("1"),
///     Candidate::new("CAIO", "POA").with_category("1"),
/// ];
/// let demand = vec![DemandRow::new(
///     "SEXTA",
///     NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
///     "POA",
///     vec!["1".into()],
///     Some(2),
/// )];
///
/// let request = AllocationRequest::new(candidates, &demand).unwrap();
/// let allocation = Allocator::new(AllocationConfig::default()).allocate(&request);
///
/// assert_eq!(allocation.assignment_count(), 2);
/// assert_eq!(allocation.lead_for_operation(0).unwrap().name, "ANA");
/// assert!(allocation.verify(&request.roster).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Allocator {
    config: AllocationConfig,
    matcher: CategoryMatcher,
    ranking: RuleEngine,
}

impl Allocator {
    /// Creates an allocator with the default fairness ranking.
    pub fn new(config: AllocationConfig) -> Self {
        Self {
            matcher: CategoryMatcher::from_config(&config),
            ranking: RuleEngine::fairness(&config),
            config,
        }
    }

    /// Replaces the ranking rule engine.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.ranking = engine;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Validates raw input and allocates it with a fresh ledger.
    pub fn run(&self, candidates: Vec<Candidate>, demand: &[DemandRow]) -> Result<Allocation> {
        let request = AllocationRequest::new(candidates, demand)?;
        Ok(self.allocate(&request))
    }

    /// Allocates a validated request with a fresh ledger.
    pub fn allocate(&self, request: &AllocationRequest) -> Allocation {
        let mut ledger = Ledger::with_candidates(request.roster.iter().map(|c| c.name.as_str()));
        self.allocate_with_ledger(request, &mut ledger)
    }

    /// Allocates a validated request against an existing ledger.
    ///
    /// The ledger keeps the cumulative counters afterwards.
    pub fn allocate_with_ledger(
        &self,
        request: &AllocationRequest,
        ledger: &mut Ledger,
    ) -> Allocation {
        if !self.config.is_deterministic() {
            warn!("unseeded random tie-break: results will differ between runs");
        }

        let mut out = Allocation::new();
        out.issues = request.issues.clone();
        let mut left_out = LeftOut::default();

        for operation in &request.operations {
            self.process(&request.roster, operation, ledger, &mut out, &mut left_out);
        }

        info!(
            operations = request.operations.len(),
            candidates = request.roster.len(),
            assignments = out.assignments.len(),
            shortfalls = out.shortfalls().len(),
            skipped_rows = out.issues.len(),
            "allocation finished"
        );
        out
    }

    fn process(
        &self,
        roster: &Roster,
        operation: &Operation,
        ledger: &mut Ledger,
        out: &mut Allocation,
        left_out: &mut LeftOut,
    ) {
        let eligible = eligibility::filter(roster, operation, ledger);
        let mut pool = self.matcher.filter(&eligible, operation);
        if let Some(priority) = &self.config.priority {
            if priority.apply(&mut pool, &eligible, operation) {
                debug!(
                    operation = operation.index,
                    candidate = %priority.name,
                    "priority candidate pinned"
                );
            }
        }

        if operation.headcount == 0 {
            for entry in &pool {
                left_out.record(out, entry, operation, NonAssignmentReason::ZeroHeadcount);
            }
            self.abandon(operation, pool.len(), AbandonReason::ZeroHeadcount, out);
            return;
        }
        if pool.is_empty() {
            self.abandon(operation, 0, AbandonReason::EmptyEligiblePool, out);
            return;
        }
        enter(operation, Stage::Filtered);

        let strategy = self.config.overrides.resolve(operation);
        let mut placements = match strategy {
            Some(OverrideStrategy::PerCategory) => {
                debug!(operation = operation.index, strategy = "PER_CATEGORY", "override applied");
                self.staff_per_category(&pool, operation, ledger)
            }
            None => {
                let mut placements = Vec::with_capacity(operation.headcount as usize);
                self.staff_group(&pool, operation, ledger, &mut placements, None);
                placements
            }
        };

        enter(operation, Stage::Reconcile);
        self.reconcile(&pool, &mut placements, operation, ledger);

        let headcount = operation.headcount;
        let placed = placements.len();
        for p in &placements {
            out.assignments.push(Assignment {
                operation: operation.index,
                weekday: operation.weekday.clone(),
                date: operation.date,
                municipality: operation.municipality.clone(),
                name: p.entry.name().to_string(),
                category: p.category.clone(),
                lead: p.lead,
            });
        }
        for entry in pool.iter().filter(|e| !is_placed(&placements, e.name())) {
            left_out.record(out, entry, operation, NonAssignmentReason::NotSelected);
        }

        let status = if placed == headcount as usize {
            OperationStatus::Committed
        } else {
            warn!(
                operation = operation.index,
                municipality = %operation.municipality,
                date = %operation.date,
                placed,
                headcount,
                "operation underfilled"
            );
            OperationStatus::Underfilled { placed, headcount }
        };
        enter(operation, Stage::Committed);

        out.reports.push(report(
            operation,
            pool.len(),
            placed,
            strategy.map(|s| s.name().to_string()),
            status,
        ));
    }

    fn abandon(
        &self,
        operation: &Operation,
        pool_size: usize,
        reason: AbandonReason,
        out: &mut Allocation,
    ) {
        warn!(
            operation = operation.index,
            municipality = %operation.municipality,
            date = %operation.date,
            reason = ?reason,
            "operation abandoned"
        );
        enter(operation, Stage::Abandoned);
        out.reports.push(report(
            operation,
            pool_size,
            0,
            None,
            OperationStatus::Abandoned(reason),
        ));
    }

    /// Lead plus ranked auxiliary fill from one group of the pool.
    ///
    /// `code` pins the assigned category (per-category staffing).
    fn staff_group<'a>(
        &self,
        group: &[PoolEntry<'a>],
        operation: &Operation,
        ledger: &mut Ledger,
        placements: &mut Vec<Placement<'a>>,
        code: Option<&str>,
    ) {
        let Some(choice) = lead::select(group, ledger) else {
            return;
        };
        let chosen = group[choice.index];
        debug!(
            operation = operation.index,
            lead = chosen.name(),
            fallback = choice.fallback,
            "lead chosen"
        );
        place(
            placements,
            ledger,
            operation,
            chosen,
            category_for(&chosen, operation, code),
            true,
        );
        enter(operation, Stage::LeadChosen);

        let remainder: Vec<PoolEntry<'a>> = group
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != choice.index)
            .map(|(_, e)| *e)
            .collect();
        let ranked = {
            let context = RankingContext::for_operation(ledger, operation);
            self.ranking.rank(&remainder, &context)
        };

        enter(operation, Stage::Filling);
        self.fill(&ranked, operation.auxiliary_slots(), operation, ledger, placements, code);
    }

    /// Accepts ranked candidates into auxiliary slots.
    ///
    /// Skips anyone already in the municipality this week (when rotation is
    /// on) and holds back anyone at the weekly soft cap; capped candidates
    /// are used, best-ranked first, only if slots would otherwise stay open.
    /// Pinned candidates bypass both checks.
    fn fill<'a>(
        &self,
        ranked: &[PoolEntry<'a>],
        slots: usize,
        operation: &Operation,
        ledger: &mut Ledger,
        placements: &mut Vec<Placement<'a>>,
        code: Option<&str>,
    ) {
        let week = operation.iso_week();
        let mut filled = 0;
        let mut capped = Vec::new();

        for &entry in ranked {
            if filled >= slots {
                break;
            }
            if is_placed(placements, entry.name()) {
                continue;
            }
            if !entry.pinned {
                if self.config.rotate_municipalities
                    && ledger.is_assigned_in(entry.name(), &operation.municipality, week)
                {
                    debug!(
                        operation = operation.index,
                        candidate = entry.name(),
                        "skipped by municipality rotation"
                    );
                    continue;
                }
                if ledger.week_count(entry.name(), week) >= self.config.weekly_soft_cap {
                    capped.push(entry);
                    continue;
                }
            }
            let category = category_for(&entry, operation, code);
            place(placements, ledger, operation, entry, category, false);
            filled += 1;
        }

        for entry in capped {
            if filled >= slots {
                break;
            }
            debug!(operation = operation.index, candidate = entry.name(), "weekly soft cap waived");
            let category = category_for(&entry, operation, code);
            place(placements, ledger, operation, entry, category, false);
            filled += 1;
        }
    }

    /// Each requested category is staffed from its own sub-group.
    fn staff_per_category<'a>(
        &self,
        pool: &[PoolEntry<'a>],
        operation: &Operation,
        ledger: &mut Ledger,
    ) -> Vec<Placement<'a>> {
        let mut placements = Vec::new();
        let mut done: HashSet<&str> = HashSet::new();

        for code in &operation.categories {
            if !done.insert(code.as_str()) {
                continue;
            }
            let group: Vec<PoolEntry<'a>> = pool
                .iter()
                .copied()
                .filter(|e| e.candidate.has_category(code) && !is_placed(&placements, e.name()))
                .collect();
            debug!(
                operation = operation.index,
                category = %code,
                members = group.len(),
                "category group"
            );
            self.staff_group(&group, operation, ledger, &mut placements, Some(code));
        }

        placements
    }

    /// Forces the placement count to `min(headcount, pool size)` with one lead.
    fn reconcile<'a>(
        &self,
        pool: &[PoolEntry<'a>],
        placements: &mut Vec<Placement<'a>>,
        operation: &Operation,
        ledger: &mut Ledger,
    ) {
        let headcount = operation.headcount as usize;

        while placements.len() > headcount {
            let Some(evicted) = placements.pop() else {
                break;
            };
            ledger.rollback(evicted.entry.name(), operation, evicted.lead);
            debug!(operation = operation.index, candidate = evicted.entry.name(), "evicted");
        }

        // First lead-eligible lead survives; any lead only if none is eligible
        let keep = placements
            .iter()
            .position(|p| p.lead && p.entry.candidate.lead_eligible)
            .or_else(|| placements.iter().position(|p| p.lead));
        for (i, p) in placements.iter_mut().enumerate() {
            if p.lead && Some(i) != keep {
                p.lead = false;
                ledger.demote(p.entry.name());
                debug!(
                    operation = operation.index,
                    candidate = p.entry.name(),
                    "extra lead demoted"
                );
            }
        }
        let mut has_lead = keep.is_some();

        if placements.len() < headcount {
            let remaining: Vec<PoolEntry<'a>> = pool
                .iter()
                .copied()
                .filter(|e| !is_placed(placements, e.name()))
                .collect();
            let mut ordered = {
                let context = RankingContext::for_operation(ledger, operation);
                self.ranking.rank(&remaining, &context)
            };
            // Stable: equal totals keep rank order
            ordered.sort_by_key(|e| ledger.total(e.name()));

            if !has_lead {
                if let Some(choice) = lead::select(&ordered, ledger) {
                    let chosen = ordered.remove(choice.index);
                    let category = matching::assigned_category(chosen.candidate, operation);
                    place(placements, ledger, operation, chosen, category, true);
                    has_lead = true;
                }
            }

            for entry in ordered {
                if placements.len() >= headcount {
                    break;
                }
                debug!(operation = operation.index, candidate = entry.name(), "topped up");
                let category = matching::assigned_category(entry.candidate, operation);
                place(placements, ledger, operation, entry, category, false);
            }
        }

        if !has_lead {
            if let Some(first) = placements.first_mut() {
                first.lead = true;
                ledger.promote(first.entry.name());
            }
        }
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new(AllocationConfig::default())
    }
}

fn report(
    operation: &Operation,
    pool_size: usize,
    placed: usize,
    strategy: Option<String>,
    status: OperationStatus,
) -> OperationReport {
    OperationReport {
        operation: operation.index,
        weekday: operation.weekday.clone(),
        date: operation.date,
        municipality: operation.municipality.clone(),
        category: operation.category_label(),
        headcount: operation.headcount,
        pool_size,
        placed,
        strategy,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{OperationPattern, OverrideEntry, PriorityOverride};
    use crate::models::{Availability, NonAssignmentReason};
    use chrono::{NaiveDate, Weekday};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn row(
        weekday: &str,
        day: u32,
        municipality: &str,
        codes: &[&str],
        headcount: u32,
    ) -> DemandRow {
        DemandRow::new(
            weekday,
            date(day),
            municipality,
            codes.iter().map(|c| c.to_string()).collect(),
            Some(headcount),
        )
    }

    fn cand(name: &str, home: &str, codes: &[&str]) -> Candidate {
        Candidate::new(name, home).with_categories(codes.iter().copied())
    }

    fn names(allocation: &Allocation, operation: usize) -> Vec<String> {
        allocation
            .assignments_for_operation(operation)
            .iter()
            .map(|a| a.name.clone())
            .collect()
    }

    fn allocate(
        config: AllocationConfig,
        candidates: Vec<Candidate>,
        demand: &[DemandRow],
    ) -> (AllocationRequest, Allocation) {
        let request = AllocationRequest::new(candidates, demand).unwrap();
        let allocation = Allocator::new(config).allocate(&request);
        assert!(allocation.verify(&request.roster).is_empty());
        (request, allocation)
    }

    #[test]
    fn test_basic_allocation() {
        let candidates = vec![
            cand("ANA", "SANTOS", &["1"]).with_lead(true),
            cand("BIA", "SANTOS", &["1"]),
            cand("CAIO", "SANTOS", &["1"]),
            cand("DUDA", "SANTOS", &["1"]),
        ];
        let (_, allocation) = allocate(
            AllocationConfig::default(),
            candidates,
            &[row("SEXTA", 8, "POA", &["1"], 3)],
        );

        assert_eq!(allocation.assignment_count(), 3);
        assert_eq!(allocation.lead_for_operation(0).unwrap().name, "ANA");
        assert_eq!(names(&allocation, 0), vec!["ANA", "BIA", "CAIO"]);
        assert_eq!(allocation.reports[0].status, OperationStatus::Committed);
        assert_eq!(allocation.non_assignments.len(), 1);
        assert_eq!(allocation.non_assignments[0].name, "DUDA");
        assert_eq!(allocation.non_assignments[0].reason, NonAssignmentReason::NotSelected);
    }

    #[test]
    fn test_home_municipality_shortfall() {
        let candidates = vec![
            cand("ANA", "POA", &["1"]).with_lead(true),
            cand("BIA", "POA", &["1"]),
            cand("CAIO", "SANTOS", &["1"]),
            cand("DUDA", "SUZANO", &["1"]),
        ];
        let (_, allocation) = allocate(
            AllocationConfig::default(),
            candidates,
            &[row("SEXTA", 8, "POA", &["1"], 3)],
        );

        assert_eq!(names(&allocation, 0), vec!["CAIO", "DUDA"]);
        assert_eq!(
            allocation.reports[0].status,
            OperationStatus::Underfilled {
                placed: 2,
                headcount: 3
            }
        );
        // Nobody from POA works in POA, even as a fallback lead
        assert!(allocation.lead_for_operation(0).is_some());
        assert!(allocation.assignments.iter().all(|a| a.name != "ANA" && a.name != "BIA"));
    }

    #[test]
    fn test_same_date_two_operations() {
        let candidates = vec![
            cand("ANA", "SANTOS", &["1"]),
            cand("BIA", "SANTOS", &["1"]),
            cand("CAIO", "SANTOS", &["1"]),
        ];
        let (_, allocation) = allocate(
            AllocationConfig::default(),
            candidates,
            &[
                row("SEXTA", 8, "POA", &["1"], 2),
                row("SEXTA", 8, "SUZANO", &["1"], 2),
            ],
        );

        assert_eq!(names(&allocation, 0), vec!["ANA", "BIA"]);
        assert_eq!(names(&allocation, 1), vec!["CAIO"]);
        assert!(allocation.lead_for_operation(1).is_some());
        assert_eq!(allocation.shortfalls().len(), 1);
    }

    #[test]
    fn test_friday_blackout() {
        let candidates = vec![
            cand("ANA", "SANTOS", &["1"])
                .with_lead(true)
                .with_availability(Availability::always().with_blocked_weekday(Weekday::Fri)),
            cand("BIA", "SANTOS", &["1"]),
        ];
        let (_, allocation) = allocate(
            AllocationConfig::default(),
            candidates,
            &[
                row("SEGUNDA", 4, "POA", &["1"], 2),
                row("SEXTA", 8, "POA", &["1"], 2),
            ],
        );

        assert_eq!(names(&allocation, 0), vec!["ANA", "BIA"]);
        assert_eq!(names(&allocation, 1), vec!["BIA"]);
        assert!(allocation
            .assignments_for_candidate("ANA")
            .iter()
            .all(|a| a.date != date(8)));
    }

    #[test]
    fn test_idempotent_runs() {
        let candidates = vec![
            cand("ZECA", "SANTOS", &["1", "2"]).with_lead(true),
            cand("ANA", "SUZANO", &["1", "2", "3"]),
            cand("BIA", "POA", &["2", "3"]).with_lead(true),
            cand("CAIO", "SANTOS", &["1", "3"]),
            cand("DUDA", "MAUA", &["1", "2"]),
        ];
        let demand = vec![
            row("SEGUNDA", 4, "POA", &["1", "2"], 2),
            row("TERCA", 5, "SUZANO", &["2", "3"], 2),
            row("SEXTA", 8, "SANTOS", &["1", "2", "3"], 3),
            row("SEXTA", 15, "POA", &["1", "2"], 2),
        ];
        let allocator = Allocator::default();

        let first = allocator.run(candidates.clone(), &demand).unwrap();
        let second = allocator.run(candidates, &demand).unwrap();

        assert_eq!(first.assignments, second.assignments);
        assert_eq!(first.non_assignments, second.non_assignments);
    }

    #[test]
    fn test_lead_rotation() {
        let candidates = vec![
            cand("ANA", "SANTOS", &["1"]).with_lead(true),
            cand("BIA", "SANTOS", &["1"]).with_lead(true),
            cand("CAIO", "SANTOS", &["1"]),
        ];
        let (_, allocation) = allocate(
            AllocationConfig::default(),
            candidates,
            &[
                row("SEGUNDA", 4, "POA", &["1"], 1),
                row("SEXTA", 8, "POA", &["1"], 1),
            ],
        );

        assert_eq!(allocation.lead_for_operation(0).unwrap().name, "ANA");
        assert_eq!(allocation.lead_for_operation(1).unwrap().name, "BIA");
    }

    #[test]
    fn test_fallback_lead_without_eligible() {
        let candidates = vec![cand("ANA", "SANTOS", &["1"]), cand("BIA", "SANTOS", &["1"])];
        let (_, allocation) = allocate(
            AllocationConfig::default(),
            candidates,
            &[row("SEXTA", 8, "POA", &["1"], 2)],
        );

        let leads: Vec<_> = allocation.assignments.iter().filter(|a| a.lead).collect();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "ANA");
    }

    #[test]
    fn test_zero_headcount_abandoned() {
        let candidates = vec![cand("ANA", "SANTOS", &["1"]), cand("BIA", "SANTOS", &["1"])];
        let (_, allocation) = allocate(
            AllocationConfig::default(),
            candidates,
            &[row("SEXTA", 8, "POA", &["1"], 0)],
        );

        assert_eq!(allocation.assignment_count(), 0);
        assert_eq!(
            allocation.reports[0].status,
            OperationStatus::Abandoned(AbandonReason::ZeroHeadcount)
        );
        assert_eq!(allocation.non_assignments.len(), 2);
        assert!(allocation
            .non_assignments
            .iter()
            .all(|n| n.reason == NonAssignmentReason::ZeroHeadcount));
    }

    #[test]
    fn test_empty_pool_abandoned() {
        let candidates = vec![cand("ANA", "SANTOS", &["7"])];
        let (_, allocation) = allocate(
            AllocationConfig::default(),
            candidates,
            &[row("SEXTA", 8, "POA", &["1"], 2)],
        );

        assert_eq!(
            allocation.reports[0].status,
            OperationStatus::Abandoned(AbandonReason::EmptyEligiblePool)
        );
        assert_eq!(allocation.reports[0].pool_size, 0);
    }

    fn cap_fixture() -> (Vec<Candidate>, Vec<DemandRow>) {
        let candidates = vec![
            cand("ANA", "SANTOS", &["1", "2", "3"]),
            cand("BIA", "SANTOS", &["1", "2", "3"]),
            cand("CAIO", "SANTOS", &["1", "2", "3"]),
            cand("DUDA", "SANTOS", &["1", "2"]),
        ];
        let demand = vec![
            row("SEGUNDA", 4, "POA", &["1"], 2),
            row("TERCA", 5, "SUZANO", &["1", "2", "3"], 2),
        ];
        (candidates, demand)
    }

    #[test]
    fn test_weekly_cap_holds_back_strong_match() {
        let (candidates, demand) = cap_fixture();

        let tight = AllocationConfig::new().with_weekly_soft_cap(1);
        let (_, capped) = allocate(tight, candidates.clone(), &demand);
        assert_eq!(names(&capped, 0), vec!["ANA", "BIA"]);
        assert_eq!(names(&capped, 1), vec!["CAIO", "DUDA"]);

        let (_, loose) = allocate(AllocationConfig::new(), candidates, &demand);
        assert_eq!(names(&loose, 1), vec!["CAIO", "ANA"]);
    }

    #[test]
    fn test_weekly_cap_waived_when_needed() {
        let candidates = vec![cand("ANA", "SANTOS", &["1"]), cand("BIA", "SANTOS", &["1"])];
        let (_, allocation) = allocate(
            AllocationConfig::new().with_weekly_soft_cap(1),
            candidates,
            &[
                row("SEGUNDA", 4, "POA", &["1"], 2),
                row("TERCA", 5, "SUZANO", &["1"], 2),
            ],
        );

        assert!(allocation.reports.iter().all(|r| r.is_filled()));
        assert_eq!(allocation.assignment_count(), 4);
    }

    #[test]
    fn test_municipality_rotation() {
        let candidates = vec![
            cand("ANA", "SANTOS", &["1", "2", "3"]),
            cand("BIA", "SANTOS", &["1", "2", "3"]),
            cand("CAIO", "SANTOS", &["1", "2", "3"]),
            cand("DUDA", "SANTOS", &["1", "2"]),
        ];
        let demand = vec![
            row("SEGUNDA", 4, "POA", &["1"], 2),
            row("TERCA", 5, "POA", &["1", "2", "3"], 2),
        ];
        let base = AllocationConfig::new().with_weekly_soft_cap(10);

        let (_, rotated) = allocate(base.clone(), candidates.clone(), &demand);
        assert_eq!(names(&rotated, 1), vec!["CAIO", "DUDA"]);

        let (_, unrotated) = allocate(base.with_municipality_rotation(false), candidates, &demand);
        assert_eq!(names(&unrotated, 1), vec!["CAIO", "ANA"]);
    }

    #[test]
    fn test_rotation_yields_to_headcount() {
        let candidates = vec![cand("ANA", "SANTOS", &["1"]), cand("BIA", "SANTOS", &["1"])];
        let (_, allocation) = allocate(
            AllocationConfig::default(),
            candidates,
            &[
                row("SEGUNDA", 4, "POA", &["1"], 2),
                row("TERCA", 5, "POA", &["1"], 2),
            ],
        );

        // Reconciliation tops up regardless of rotation
        assert_eq!(allocation.assignments_for_operation(1).len(), 2);
    }

    #[test]
    fn test_per_category_override() {
        let candidates = vec![
            cand("ANA", "SANTOS", &["1", "2"]).with_lead(true),
            cand("BIA", "SANTOS", &["1", "2"]),
            cand("CAIO", "SANTOS", &["2", "3"]).with_lead(true),
            cand("DUDA", "SANTOS", &["2", "3"]),
        ];
        let config = AllocationConfig::new().with_override(OverrideEntry::new(
            OperationPattern::any()
                .municipality("POA")
                .weekday("SEXTA")
                .headcount(3),
            OverrideStrategy::PerCategory,
        ));
        let demand = [row("SEXTA", 8, "POA", &["1", "2", "3"], 3)];
        let request = AllocationRequest::new(candidates, &demand).unwrap();
        let mut ledger = Ledger::new();
        let allocation = Allocator::new(config).allocate_with_ledger(&request, &mut ledger);

        assert!(allocation.verify(&request.roster).is_empty());
        assert_eq!(names(&allocation, 0), vec!["ANA", "BIA", "CAIO"]);
        assert_eq!(allocation.lead_for_operation(0).unwrap().name, "ANA");
        assert_eq!(allocation.assignments[2].category, "2");
        assert!(!allocation.assignments[2].lead);
        assert_eq!(allocation.reports[0].strategy.as_deref(), Some("PER_CATEGORY"));

        // Eviction and demotion are rolled back in the ledger
        assert_eq!(ledger.total("DUDA"), 0);
        assert_eq!(ledger.leads("CAIO"), 0);
        assert_eq!(ledger.leads("ANA"), 1);
        assert_eq!(ledger.total_assignments(), 3);
    }

    #[test]
    fn test_per_category_keeps_eligible_lead() {
        // The first group has no lead-eligible member and gets a fallback lead
        let candidates = vec![
            cand("ANA", "SANTOS", &["1", "2"]),
            cand("BIA", "SANTOS", &["2", "3"]).with_lead(true),
            cand("CAIO", "SANTOS", &["2", "3"]),
        ];
        let config = AllocationConfig::new().with_override(OverrideEntry::new(
            OperationPattern::any().municipality("POA"),
            OverrideStrategy::PerCategory,
        ));
        let demand = [row("SEXTA", 8, "POA", &["1", "2", "3"], 3)];
        let request = AllocationRequest::new(candidates, &demand).unwrap();
        let mut ledger = Ledger::new();
        let allocation = Allocator::new(config).allocate_with_ledger(&request, &mut ledger);

        assert!(allocation.verify(&request.roster).is_empty());
        assert_eq!(names(&allocation, 0), vec!["ANA", "BIA", "CAIO"]);
        assert_eq!(allocation.lead_for_operation(0).unwrap().name, "BIA");
        assert_eq!(allocation.assignments.iter().filter(|a| a.lead).count(), 1);
        assert_eq!(ledger.leads("ANA"), 0);
        assert_eq!(ledger.leads("BIA"), 1);
    }

    #[test]
    fn test_override_not_matching_uses_default_path() {
        let candidates = vec![
            cand("ANA", "SANTOS", &["1", "2"]).with_lead(true),
            cand("BIA", "SANTOS", &["1", "2"]),
        ];
        let config = AllocationConfig::new().with_override(OverrideEntry::new(
            OperationPattern::any().municipality("POA").headcount(3),
            OverrideStrategy::PerCategory,
        ));
        let demand = [row("SEXTA", 8, "POA", &["1", "2"], 2)];
        let (_, allocation) = allocate(config, candidates, &demand);

        assert!(allocation.reports[0].strategy.is_none());
        assert_eq!(allocation.assignments[1].category, "1,2");
    }

    #[test]
    fn test_priority_override_pins_candidate() {
        let candidates = vec![
            cand("ANA", "SANTOS", &["1", "9"]).with_lead(true),
            cand("BIA", "SANTOS", &["1", "9"]),
            cand("ZECA", "SANTOS", &["9"]),
        ];
        let demand = [row("SEXTA", 8, "POA", &["1", "9"], 2)];

        let (_, plain) = allocate(AllocationConfig::default(), candidates.clone(), &demand);
        assert_eq!(names(&plain, 0), vec!["ANA", "BIA"]);

        let config = AllocationConfig::new().with_priority(PriorityOverride::new("ZECA", "9"));
        let (_, pinned) = allocate(config, candidates, &demand);
        assert_eq!(names(&pinned, 0), vec!["ANA", "ZECA"]);
        assert_eq!(pinned.reports[0].pool_size, 3);
    }

    #[test]
    fn test_priority_respects_eligibility() {
        let candidates = vec![
            cand("ANA", "SANTOS", &["1", "9"]).with_lead(true),
            cand("BIA", "SANTOS", &["1", "9"]),
            cand("ZECA", "POA", &["1", "9"]),
        ];
        let config = AllocationConfig::new().with_priority(PriorityOverride::new("ZECA", "9"));
        let demand = [row("SEXTA", 8, "POA", &["1", "9"], 2)];
        let (_, allocation) = allocate(config, candidates, &demand);

        assert!(allocation.assignments_for_candidate("ZECA").is_empty());
    }

    #[test]
    fn test_non_assignments_deduplicated() {
        let candidates = vec![
            cand("ANA", "SANTOS", &["1"]),
            cand("BIA", "SANTOS", &["1"]),
            cand("CAIO", "SANTOS", &["1"]),
        ];
        let (_, allocation) = allocate(
            AllocationConfig::default(),
            candidates,
            &[
                row("SEXTA", 8, "POA", &["1"], 1),
                row("SEXTA", 15, "POA", &["1"], 1),
            ],
        );

        assert_eq!(names(&allocation, 0), vec!["ANA"]);
        assert_eq!(names(&allocation, 1), vec!["BIA"]);
        let left_out: Vec<&str> = allocation
            .non_assignments
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(left_out, vec!["BIA", "CAIO", "ANA"]);
    }

    #[test]
    fn test_duplicate_rows_collapse() {
        let candidates = vec![cand("ANA", "SANTOS", &["1"]), cand("BIA", "SANTOS", &["1"])];
        let demand = vec![
            row("SEXTA", 8, "POA", &["1"], 1),
            row("SEXTA", 8, "POA", &["1"], 1),
        ];
        let (request, allocation) = allocate(AllocationConfig::default(), candidates, &demand);

        assert_eq!(request.operations.len(), 1);
        assert_eq!(allocation.assignment_count(), 1);
    }

    #[test]
    fn test_request_skips_invalid_rows() {
        let candidates = vec![
            cand("ANA", "SANTOS", &["1"]),
            Candidate::new("", "SANTOS").with_category("1"),
        ];
        let mut missing = row("SEXTA", 8, "SUZANO", &["1"], 1);
        missing.headcount = None;
        let demand = [row("SEXTA", 8, "POA", &["1"], 1), missing];
        let request = AllocationRequest::new(candidates, &demand).unwrap();

        assert_eq!(request.roster.len(), 1);
        assert_eq!(request.operations.len(), 1);
        assert_eq!(request.issues.len(), 2);

        let allocation = Allocator::default().allocate(&request);
        assert_eq!(allocation.issues.len(), 2);
    }

    #[test]
    fn test_request_fatal_errors() {
        let demand = [row("SEXTA", 8, "POA", &["1"], 1)];
        assert!(matches!(
            AllocationRequest::new(Vec::new(), &demand),
            Err(AllocationError::NoCandidates { skipped: 0 })
        ));

        let mut missing = row("SEXTA", 8, "POA", &["1"], 1);
        missing.headcount = None;
        assert!(matches!(
            AllocationRequest::new(vec![cand("ANA", "SANTOS", &["1"])], &[missing]),
            Err(AllocationError::NoOperations { skipped: 1 })
        ));
    }

    #[test]
    fn test_existing_ledger_is_respected() {
        let candidates = vec![
            cand("ANA", "SANTOS", &["1"]).with_lead(true),
            cand("BIA", "SANTOS", &["1"]).with_lead(true),
        ];
        let request = AllocationRequest::new(candidates, &[row("SEXTA", 8, "POA", &["1"], 1)]).unwrap();
        let earlier = Operation::new(0, "SEGUNDA", date(4), "SUZANO", vec!["1".into()], 1);
        let mut ledger = Ledger::new();
        ledger.record("ANA", &earlier, true);

        let allocation = Allocator::default().allocate_with_ledger(&request, &mut ledger);
        assert_eq!(allocation.lead_for_operation(0).unwrap().name, "BIA");
        assert_eq!(ledger.leads("BIA"), 1);
    }
}
