//! Operation overrides.
//!
//! Two kinds of exceptions to the default allocation path:
//!
//! - an [`OverrideTable`] maps operation patterns (municipality, weekday,
//!   headcount) to an [`OverrideStrategy`]. The first matching entry wins
//!   and replaces lead selection, ranking and filling for that operation.
//! - a [`PriorityOverride`] pins one named candidate to the front of the
//!   pool whenever an operation requests a given category code.

use serde::{Deserialize, Serialize};

use crate::matching::{MatchQuality, PoolEntry};
use crate::models::{Candidate, Operation};

/// Predicate over operations. `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationPattern {
    /// Municipality (case-insensitive).
    pub municipality: Option<String>,
    /// Weekday label (case-insensitive).
    pub weekday: Option<String>,
    /// Exact headcount.
    pub headcount: Option<u32>,
}

impl OperationPattern {
    /// A pattern matching every operation.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts to a municipality.
    pub fn municipality(mut self, municipality: impl Into<String>) -> Self {
        self.municipality = Some(municipality.into());
        self
    }

    /// Restricts to a weekday label.
    pub fn weekday(mut self, weekday: impl Into<String>) -> Self {
        self.weekday = Some(weekday.into());
        self
    }

    /// Restricts to a headcount.
    pub fn headcount(mut self, headcount: u32) -> Self {
        self.headcount = Some(headcount);
        self
    }

    /// Whether an operation matches.
    pub fn matches(&self, operation: &Operation) -> bool {
        let text_matches = |wanted: &Option<String>, actual: &str| {
            wanted
                .as_deref()
                .map(|w| w.trim().eq_ignore_ascii_case(actual.trim()))
                .unwrap_or(true)
        };

        text_matches(&self.municipality, &operation.municipality)
            && text_matches(&self.weekday, &operation.weekday)
            && self.headcount.map(|h| h == operation.headcount).unwrap_or(true)
    }
}

/// Replacement allocation strategy for matched operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverrideStrategy {
    /// Each requested category is staffed from its own sub-group of the
    /// pool, with its own lead. Reconciliation then trims to headcount.
    PerCategory,
}

impl OverrideStrategy {
    /// Strategy name, as shown in operation reports.
    pub fn name(&self) -> &'static str {
        match self {
            OverrideStrategy::PerCategory => "PER_CATEGORY",
        }
    }
}

/// One pattern → strategy entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    /// Which operations the entry applies to.
    pub pattern: OperationPattern,
    /// What to do with them.
    pub strategy: OverrideStrategy,
}

impl OverrideEntry {
    /// Creates an entry.
    pub fn new(pattern: OperationPattern, strategy: OverrideStrategy) -> Self {
        Self { pattern, strategy }
    }
}

/// Ordered override entries. The first matching entry wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideTable {
    entries: Vec<OverrideEntry>,
}

impl OverrideTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: OverrideEntry) {
        self.entries.push(entry);
    }

    /// Appends an entry (builder form).
    pub fn with_entry(mut self, entry: OverrideEntry) -> Self {
        self.push(entry);
        self
    }

    /// Strategy for an operation, if any entry matches.
    pub fn resolve(&self, operation: &Operation) -> Option<OverrideStrategy> {
        self.entries
            .iter()
            .find(|e| e.pattern.matches(operation))
            .map(|e| e.strategy)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pins a named candidate first in the pool of operations requesting a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityOverride {
    /// Candidate name.
    pub name: String,
    /// Category code that triggers the override.
    pub category: String,
}

impl PriorityOverride {
    /// Creates a priority override.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }

    /// Whether an operation triggers this override.
    pub fn applies_to(&self, operation: &Operation) -> bool {
        operation.requests(&self.category)
    }

    /// Moves (or inserts) the named candidate to the front of the pool.
    ///
    /// `eligible` is the pool before category matching: the candidate must
    /// have passed the hard eligibility rules, but need not match the
    /// requested categories. Returns whether the candidate was pinned.
    pub fn apply<'a>(
        &self,
        pool: &mut Vec<PoolEntry<'a>>,
        eligible: &[&'a Candidate],
        operation: &Operation,
    ) -> bool {
        if !self.applies_to(operation) {
            return false;
        }

        let mut entry = if let Some(pos) = pool.iter().position(|e| e.name() == self.name) {
            pool.remove(pos)
        } else if let Some(candidate) = eligible.iter().copied().find(|c| c.name == self.name) {
            PoolEntry::new(
                candidate,
                MatchQuality {
                    score: candidate.count_matching(&operation.categories) as u32,
                    provisional: true,
                },
            )
        } else {
            return false;
        };

        entry.pinned = true;
        pool.insert(0, entry);
        true
    }
}
