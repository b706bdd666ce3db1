//! Rule engine for multi-criteria fairness ranking.
//!
//! Composes ranking rules with configurable evaluation modes and an
//! explicit final tie-break policy. Pinned pool members always rank
//! ahead of everyone else.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

use super::rules::{MatchStrength, WeeklyLoad};
use super::{RankingContext, RankingRule, RuleScore};
use crate::config::AllocationConfig;
use crate::matching::PoolEntry;

/// How multiple rules are combined.
#[derive(Debug, Clone, Default)]
pub enum EvaluationMode {
    /// Apply rules in sequence; use next rule only on ties.
    Sequential,
    /// Compute weighted sum of all rule scores.
    #[default]
    Weighted,
}

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreaker {
    /// Deterministic by candidate name (lexicographic).
    #[default]
    ByName,
    /// Keep pool order (first encountered wins).
    InputOrder,
    /// Shuffle ties. Reproducible only when seeded.
    Random {
        /// Seed; `None` draws from the thread RNG.
        seed: Option<u64>,
    },
}

impl TieBreaker {
    /// Whether two runs on the same input rank identically.
    pub fn is_deterministic(&self) -> bool {
        !matches!(self, TieBreaker::Random { seed: None })
    }
}

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn RankingRule>,
    weight: f64,
}

/// A composable rule engine for pool ordering.
///
/// Supports sequential multi-layer evaluation (primary rule → tie-breaker)
/// and weighted combination modes.
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<WeightedRule>,
    mode: EvaluationMode,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine in sequential mode.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::Sequential,
            tie_breaker: TieBreaker::ByName,
            epsilon: 1e-9,
        }
    }

    /// The default fairness ranking: weighted match strength plus
    /// current-week load, with the configured tie-break policy.
    pub fn fairness(config: &AllocationConfig) -> Self {
        Self::new()
            .with_mode(EvaluationMode::Weighted)
            .with_weighted_rule(MatchStrength, config.match_weight)
            .with_weighted_rule(WeeklyLoad, config.weekly_load_weight)
            .with_final_tie_breaker(config.tie_breaker)
    }

    /// Adds a primary rule (weight 1.0).
    pub fn with_rule<R: RankingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 1.0,
        });
        self
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: RankingRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Adds a tie-breaking rule (weight 0.0, used only in Sequential mode).
    pub fn with_tie_breaker<R: RankingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 0.0,
        });
        self
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the final tie-breaking policy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Names of the configured rules, in order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|wr| wr.rule.name()).collect()
    }

    /// Sorts a pool by priority (highest priority first).
    ///
    /// Returns indices into the pool slice.
    pub fn sort_indices(&self, pool: &[PoolEntry<'_>], context: &RankingContext<'_>) -> Vec<usize> {
        if pool.is_empty() {
            return Vec::new();
        }

        let mut indices: Vec<usize> = (0..pool.len()).collect();

        // Ties keep their pre-sort order (stable sort), so shuffling first
        // turns every remaining tie into a random draw.
        if let TieBreaker::Random { seed } = self.tie_breaker {
            match seed {
                Some(seed) => {
                    let mut rng = StdRng::seed_from_u64(seed ^ context.salt);
                    indices.shuffle(&mut rng);
                }
                None => indices.shuffle(&mut rand::rng()),
            }
        }

        match &self.mode {
            EvaluationMode::Sequential => {
                indices.sort_by(|&a, &b| {
                    pinned_first(&pool[a], &pool[b])
                        .then_with(|| self.compare_sequential(&pool[a], &pool[b], context))
                        .then_with(|| self.final_tie_break(&pool[a], &pool[b]))
                });
            }
            EvaluationMode::Weighted => {
                let scores: Vec<f64> = pool
                    .iter()
                    .map(|e| self.weighted_score(e, context))
                    .collect();
                indices.sort_by(|&a, &b| {
                    pinned_first(&pool[a], &pool[b])
                        .then_with(|| self.compare_scores(scores[a], scores[b]))
                        .then_with(|| self.final_tie_break(&pool[a], &pool[b]))
                });
            }
        }

        indices
    }

    /// Returns the pool reordered by priority.
    pub fn rank<'a>(&self, pool: &[PoolEntry<'a>], context: &RankingContext<'_>) -> Vec<PoolEntry<'a>> {
        self.sort_indices(pool, context)
            .into_iter()
            .map(|i| pool[i])
            .collect()
    }

    /// Evaluates a single pool member and returns weighted scores from each rule.
    pub fn evaluate(&self, entry: &PoolEntry<'_>, context: &RankingContext<'_>) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(entry, context) * wr.weight)
            .collect()
    }

    fn compare_sequential(
        &self,
        a: &PoolEntry<'_>,
        b: &PoolEntry<'_>,
        context: &RankingContext<'_>,
    ) -> Ordering {
        for wr in &self.rules {
            let score_a = wr.rule.evaluate(a, context);
            let score_b = wr.rule.evaluate(b, context);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }
        Ordering::Equal
    }

    fn compare_scores(&self, a: f64, b: f64) -> Ordering {
        if (a - b).abs() > self.epsilon {
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        } else {
            Ordering::Equal
        }
    }

    fn final_tie_break(&self, a: &PoolEntry<'_>, b: &PoolEntry<'_>) -> Ordering {
        match self.tie_breaker {
            TieBreaker::ByName => a.name().cmp(b.name()),
            TieBreaker::InputOrder | TieBreaker::Random { .. } => Ordering::Equal,
        }
    }

    fn weighted_score(&self, entry: &PoolEntry<'_>, context: &RankingContext<'_>) -> f64 {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(entry, context) * wr.weight)
            .sum()
    }
}

fn pinned_first(a: &PoolEntry<'_>, b: &PoolEntry<'_>) -> Ordering {
    b.pinned.cmp(&a.pinned)
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .field("mode", &self.mode)
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
