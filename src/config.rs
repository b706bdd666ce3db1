//! Allocation settings.
//!
//! Every knob of the allocator lives here. Defaults reproduce the
//! deterministic strict-count behavior; JSON input may override any
//! subset of fields.
//!
//! ```
//! use u_roster::config::AllocationConfig;
//!
//! let config = AllocationConfig::from_json(r#"{ "weekly_soft_cap": 2 }"#).unwrap();
//! assert_eq!(config.weekly_soft_cap, 2);
//! assert!(config.rotate_municipalities);
//! ```

use serde::{Deserialize, Serialize};

use crate::allocator::{OverrideEntry, OverrideTable, PriorityOverride};
use crate::error::{AllocationError, Result};
use crate::matching::{EscortPolicy, MatchMode};
use crate::ranking::TieBreaker;

/// Default weekly soft cap.
pub const DEFAULT_WEEKLY_SOFT_CAP: u32 = 3;

/// Settings for an allocation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Weekly assignments at which a candidate stops being preferred
    /// for auxiliary slots. Waived when needed to reach headcount.
    pub weekly_soft_cap: u32,
    /// Category matching semantics.
    pub match_mode: MatchMode,
    /// Category code tolerated as missing in boundary-pair mode.
    pub escort_marker: Option<String>,
    /// How a missing escort marker is treated.
    pub escort_policy: EscortPolicy,
    /// Skip candidates already sent to the same municipality this ISO week
    /// while filling auxiliary slots.
    pub rotate_municipalities: bool,
    /// Weight of match quality in the fairness ranking.
    pub match_weight: f64,
    /// Weight of current-week load in the fairness ranking.
    pub weekly_load_weight: f64,
    /// Final tie-break policy of the fairness ranking.
    pub tie_breaker: TieBreaker,
    /// Special-case strategies evaluated before the default path.
    pub overrides: OverrideTable,
    /// Named candidate pinned to the front of matching pools.
    pub priority: Option<PriorityOverride>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            weekly_soft_cap: DEFAULT_WEEKLY_SOFT_CAP,
            match_mode: MatchMode::StrictCount,
            escort_marker: None,
            escort_policy: EscortPolicy::SoftFallback,
            rotate_municipalities: true,
            match_weight: 100.0,
            weekly_load_weight: 1.0,
            tie_breaker: TieBreaker::ByName,
            overrides: OverrideTable::new(),
            priority: None,
        }
    }
}

impl AllocationConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("match_weight", self.match_weight),
            ("weekly_load_weight", self.weekly_load_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AllocationError::InvalidConfigValue {
                    field,
                    reason: format!("must be a finite non-negative number, got {value}"),
                });
            }
        }
        if matches!(self.escort_marker.as_deref(), Some(m) if m.trim().is_empty()) {
            return Err(AllocationError::InvalidConfigValue {
                field: "escort_marker",
                reason: "must not be blank".into(),
            });
        }
        Ok(())
    }

    /// Sets the weekly soft cap.
    pub fn with_weekly_soft_cap(mut self, cap: u32) -> Self {
        self.weekly_soft_cap = cap;
        self
    }

    /// Sets the matching mode.
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Sets the escort marker and its policy.
    pub fn with_escort(mut self, marker: impl Into<String>, policy: EscortPolicy) -> Self {
        self.escort_marker = Some(marker.into());
        self.escort_policy = policy;
        self
    }

    /// Enables or disables municipality rotation.
    pub fn with_municipality_rotation(mut self, enabled: bool) -> Self {
        self.rotate_municipalities = enabled;
        self
    }

    /// Sets the ranking weights.
    pub fn with_weights(mut self, match_weight: f64, weekly_load_weight: f64) -> Self {
        self.match_weight = match_weight;
        self.weekly_load_weight = weekly_load_weight;
        self
    }

    /// Sets the tie-break policy.
    pub fn with_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Adds a special-case override entry.
    pub fn with_override(mut self, entry: OverrideEntry) -> Self {
        self.overrides.push(entry);
        self
    }

    /// Sets the named-priority override.
    pub fn with_priority(mut self, priority: PriorityOverride) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Whether the ranking is reproducible run to run.
    pub fn is_deterministic(&self) -> bool {
        self.tie_breaker.is_deterministic()
    }
}
