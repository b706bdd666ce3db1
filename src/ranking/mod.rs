//! Fairness ranking rules and rule engine.
//!
//! Orders a matched pool so that strong category matches come first and,
//! at equal match quality, candidates with less work this ISO week
//! outrank heavily used ones.
//!
//! # Usage
//!
//! ```
//! use u_roster::ranking::{RuleEngine, TieBreaker};
//! use u_roster::ranking::rules;
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::MatchStrength)
//!     .with_tie_breaker(rules::WeeklyLoad)
//!     .with_final_tie_breaker(TieBreaker::ByName);
//! assert_eq!(engine.rule_names(), vec!["MATCH", "WEEK"]);
//! ```

mod context;
mod engine;
pub mod rules;

pub use context::RankingContext;
pub use engine::{EvaluationMode, RuleEngine, TieBreaker};

use crate::matching::PoolEntry;
use std::fmt::Debug;

/// Score returned by a ranking rule.
///
/// Lower scores = higher priority (ranked first).
pub type RuleScore = f64;

/// A rule that evaluates how strongly a pool member should be preferred.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules should return smaller values
/// for candidates that should be picked first.
pub trait RankingRule: Send + Sync + Debug {
    /// Rule name (e.g., "MATCH", "WEEK").
    fn name(&self) -> &'static str;

    /// Evaluates a pool member given the current ledger state.
    fn evaluate(&self, entry: &PoolEntry<'_>, context: &RankingContext<'_>) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
