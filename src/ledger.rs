//! Load ledger.
//!
//! Per-candidate counters shared by every operation of a run:
//!
//! | Counter | Key | Used by |
//! |---------|-----|---------|
//! | total | name | lead fallback, reconciliation order |
//! | leads | name | lead rotation |
//! | weekly | name × ISO week | fairness ranking, soft cap |
//! | daily | name × date | same-day exclusion |
//! | municipal | name × municipality × ISO week | municipality rotation |
//!
//! Only the allocator mutates the ledger. Every [`Ledger::record`] has an
//! exact inverse in [`Ledger::rollback`].

use chrono::{IsoWeek, NaiveDate};
use std::collections::HashMap;

use crate::models::Operation;

/// Counters for one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Total assignments in this run.
    pub total: u32,
    /// Assignments holding the lead role.
    pub leads: u32,
    weekly: HashMap<IsoWeek, u32>,
    daily: HashMap<NaiveDate, u32>,
    municipal: HashMap<(String, IsoWeek), u32>,
}

impl LedgerEntry {
    /// Assignments in an ISO week.
    pub fn week_count(&self, week: IsoWeek) -> u32 {
        self.weekly.get(&week).copied().unwrap_or(0)
    }

    /// Whether the candidate is assigned on a date.
    pub fn is_assigned_on(&self, date: NaiveDate) -> bool {
        self.daily.get(&date).copied().unwrap_or(0) > 0
    }

    /// Whether the candidate is assigned to a municipality in an ISO week.
    pub fn is_assigned_in(&self, municipality: &str, week: IsoWeek) -> bool {
        self.municipal
            .get(&(municipality.to_string(), week))
            .copied()
            .unwrap_or(0)
            > 0
    }
}

fn decrement<K: std::hash::Hash + Eq>(map: &mut HashMap<K, u32>, key: K) {
    if let Some(count) = map.get_mut(&key) {
        *count = count.saturating_sub(1);
        if *count == 0 {
            map.remove(&key);
        }
    }
}

/// Shared load counters for a run.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: HashMap<String, LedgerEntry>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger with zeroed entries for the given names.
    pub fn with_candidates<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut ledger = Self::new();
        for name in names {
            ledger.register(name);
        }
        ledger
    }

    /// Ensures a zeroed entry exists for a name.
    pub fn register(&mut self, name: &str) {
        self.entries.entry(name.to_string()).or_default();
    }

    /// Counters for a name, if registered.
    pub fn entry(&self, name: &str) -> Option<&LedgerEntry> {
        self.entries.get(name)
    }

    /// Total assignments of a candidate.
    pub fn total(&self, name: &str) -> u32 {
        self.entries.get(name).map(|e| e.total).unwrap_or(0)
    }

    /// Lead assignments of a candidate.
    pub fn leads(&self, name: &str) -> u32 {
        self.entries.get(name).map(|e| e.leads).unwrap_or(0)
    }

    /// Assignments of a candidate in an ISO week.
    pub fn week_count(&self, name: &str, week: IsoWeek) -> u32 {
        self.entries
            .get(name)
            .map(|e| e.week_count(week))
            .unwrap_or(0)
    }

    /// Whether a candidate is already assigned on a date.
    pub fn is_assigned_on(&self, name: &str, date: NaiveDate) -> bool {
        self.entries
            .get(name)
            .map(|e| e.is_assigned_on(date))
            .unwrap_or(false)
    }

    /// Whether a candidate is already assigned to a municipality in an ISO week.
    pub fn is_assigned_in(&self, name: &str, municipality: &str, week: IsoWeek) -> bool {
        self.entries
            .get(name)
            .map(|e| e.is_assigned_in(municipality, week))
            .unwrap_or(false)
    }

    /// Records a placement on an operation.
    pub fn record(&mut self, name: &str, operation: &Operation, lead: bool) {
        let week = operation.iso_week();
        let entry = self.entries.entry(name.to_string()).or_default();
        entry.total += 1;
        if lead {
            entry.leads += 1;
        }
        *entry.weekly.entry(week).or_insert(0) += 1;
        *entry.daily.entry(operation.date).or_insert(0) += 1;
        *entry
            .municipal
            .entry((operation.municipality.clone(), week))
            .or_insert(0) += 1;
    }

    /// Undoes a previous [`Ledger::record`] with the same arguments.
    pub fn rollback(&mut self, name: &str, operation: &Operation, lead: bool) {
        let Some(entry) = self.entries.get_mut(name) else {
            return;
        };
        let week = operation.iso_week();
        entry.total = entry.total.saturating_sub(1);
        if lead {
            entry.leads = entry.leads.saturating_sub(1);
        }
        decrement(&mut entry.weekly, week);
        decrement(&mut entry.daily, operation.date);
        decrement(&mut entry.municipal, (operation.municipality.clone(), week));
    }

    /// Moves one lead count off a candidate, keeping the placement.
    pub fn demote(&mut self, name: &str) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.leads = entry.leads.saturating_sub(1);
        }
    }

    /// Adds one lead count to an existing placement.
    pub fn promote(&mut self, name: &str) {
        self.entries.entry(name.to_string()).or_default().leads += 1;
    }

    /// Number of registered candidates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no candidate is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all total counters.
    pub fn total_assignments(&self) -> u32 {
        self.entries.values().map(|e| e.total).sum()
    }

    /// (name, total) pairs sorted by name.
    pub fn totals(&self) -> Vec<(&str, u32)> {
        let mut totals: Vec<(&str, u32)> = self
            .entries
            .iter()
            .map(|(name, e)| (name.as_str(), e.total))
            .collect();
        totals.sort_by(|a, b| a.0.cmp(b.0));
        totals
    }
}
