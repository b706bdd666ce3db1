//! Category matching.
//!
//! Decides whether a candidate's skill categories fit an operation and
//! scores the fit (higher is better).
//!
//! # Modes
//!
//! | Mode | Qualifies when | Score |
//! |------|----------------|-------|
//! | `StrictCount` | holds ≥ 2 requested codes (≥ 1 if only one is requested) | codes held |
//! | `BoundaryPair` | holds the first and last requested codes | boundary codes held |
//!
//! In boundary-pair mode, a boundary code equal to the escort marker may
//! be missing under [`EscortPolicy::SoftFallback`]. Such candidates are
//! accepted as *provisional* and score lower than full matches.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::AllocationConfig;
use crate::models::{Candidate, Operation};

/// Category matching semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    /// Count requested codes held by the candidate.
    #[default]
    StrictCount,
    /// Require the first and last requested codes.
    BoundaryPair,
}

/// Treatment of a missing escort marker in boundary-pair mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscortPolicy {
    /// Accept provisionally.
    #[default]
    SoftFallback,
    /// Reject like any other missing boundary code.
    Strict,
}

/// Result of matching one candidate against one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchQuality {
    /// Match score (higher is better).
    pub score: u32,
    /// Accepted only through the escort fallback.
    pub provisional: bool,
}

/// A matched candidate, annotated for ranking.
#[derive(Debug, Clone, Copy)]
pub struct PoolEntry<'a> {
    /// The candidate.
    pub candidate: &'a Candidate,
    /// Match quality.
    pub quality: MatchQuality,
    /// Placed first by the named-priority override.
    pub pinned: bool,
}

impl<'a> PoolEntry<'a> {
    /// Creates an unpinned entry.
    pub fn new(candidate: &'a Candidate, quality: MatchQuality) -> Self {
        Self {
            candidate,
            quality,
            pinned: false,
        }
    }

    /// Candidate name.
    #[inline]
    pub fn name(&self) -> &'a str {
        &self.candidate.name
    }
}

/// Matches candidates against operation category requirements.
#[derive(Debug, Clone, Default)]
pub struct CategoryMatcher {
    mode: MatchMode,
    escort_marker: Option<String>,
    escort_policy: EscortPolicy,
}

impl CategoryMatcher {
    /// Creates a matcher with the given mode and no escort marker.
    pub fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            escort_marker: None,
            escort_policy: EscortPolicy::SoftFallback,
        }
    }

    /// Creates a matcher from the run configuration.
    pub fn from_config(config: &AllocationConfig) -> Self {
        Self {
            mode: config.match_mode,
            escort_marker: config.escort_marker.clone(),
            escort_policy: config.escort_policy,
        }
    }

    /// Sets the escort marker and policy.
    pub fn with_escort(mut self, marker: impl Into<String>, policy: EscortPolicy) -> Self {
        self.escort_marker = Some(marker.into());
        self.escort_policy = policy;
        self
    }

    /// Active mode.
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Matches one candidate. `None` = does not qualify.
    pub fn evaluate(&self, candidate: &Candidate, operation: &Operation) -> Option<MatchQuality> {
        match self.mode {
            MatchMode::StrictCount => strict_count(candidate, operation),
            MatchMode::BoundaryPair => self.boundary_pair(candidate, operation),
        }
    }

    /// Keeps qualifying candidates, in input order, annotated with their quality.
    pub fn filter<'a>(&self, pool: &[&'a Candidate], operation: &Operation) -> Vec<PoolEntry<'a>> {
        pool.iter()
            .filter_map(|&c| self.evaluate(c, operation).map(|q| PoolEntry::new(c, q)))
            .collect()
    }

    fn boundary_pair(&self, candidate: &Candidate, operation: &Operation) -> Option<MatchQuality> {
        let first = operation.first_category()?;
        let last = operation.last_category()?;
        let mut boundaries = vec![first];
        if last != first {
            boundaries.push(last);
        }

        let mut quality = MatchQuality {
            score: 0,
            provisional: false,
        };
        for code in boundaries {
            if candidate.has_category(code) {
                quality.score += 1;
            } else if self.is_waived_escort(code) {
                quality.provisional = true;
            } else {
                return None;
            }
        }
        Some(quality)
    }

    fn is_waived_escort(&self, code: &str) -> bool {
        self.escort_policy == EscortPolicy::SoftFallback
            && self.escort_marker.as_deref() == Some(code)
    }
}

fn strict_count(candidate: &Candidate, operation: &Operation) -> Option<MatchQuality> {
    let requested: BTreeSet<&String> = operation.categories.iter().collect();
    if requested.is_empty() {
        return None;
    }

    let held = candidate.count_matching(requested.iter().copied());
    let needed = if requested.len() > 1 { 2 } else { 1 };
    (held >= needed).then_some(MatchQuality {
        score: held as u32,
        provisional: false,
    })
}

/// Requested codes held by the candidate, in operation order, comma-joined.
///
/// Falls back to the full operation label when the candidate holds none
/// of them (escort-only or pinned placements).
pub fn assigned_category(candidate: &Candidate, operation: &Operation) -> String {
    let held: Vec<&str> = operation
        .categories
        .iter()
        .filter(|c| candidate.has_category(c))
        .map(String::as_str)
        .collect();
    if held.is_empty() {
        operation.category_label()
    } else {
        held.join(",")
    }
}
