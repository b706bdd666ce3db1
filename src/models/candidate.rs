//! Candidate model.
//!
//! Candidates are the people assigned to operations. Each has a home
//! municipality, a set of skill category codes, a lead-eligibility flag
//! and an availability rule. Attributes are fixed for a whole run; load
//! counters live in the [`Ledger`](crate::ledger::Ledger).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Availability;

/// A person that can be assigned to operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique name (already normalized by ingestion).
    pub name: String,
    /// Municipality the candidate comes from.
    pub home_municipality: String,
    /// Skill category codes held by the candidate.
    pub categories: BTreeSet<String>,
    /// Whether the candidate may hold the lead role.
    pub lead_eligible: bool,
    /// Blackout rules.
    pub availability: Availability,
}

impl Candidate {
    /// Creates a candidate with no categories and no blackout.
    pub fn new(name: impl Into<String>, home_municipality: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            home_municipality: home_municipality.into(),
            categories: BTreeSet::new(),
            lead_eligible: false,
            availability: Availability::default(),
        }
    }

    /// Adds a category code.
    pub fn with_category(mut self, code: impl Into<String>) -> Self {
        self.categories.insert(code.into());
        self
    }

    /// Adds several category codes.
    pub fn with_categories<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(codes.into_iter().map(Into::into));
        self
    }

    /// Marks the candidate as lead-eligible.
    pub fn with_lead(mut self, lead_eligible: bool) -> Self {
        self.lead_eligible = lead_eligible;
        self
    }

    /// Sets the availability rule.
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Whether this candidate holds a category code.
    pub fn has_category(&self, code: &str) -> bool {
        self.categories.contains(code)
    }

    /// Number of the given codes held by this candidate.
    pub fn count_matching<'a, I>(&self, codes: I) -> usize
    where
        I: IntoIterator<Item = &'a String>,
    {
        codes.into_iter().filter(|c| self.has_category(c)).count()
    }

    /// Whether this candidate lives in the given municipality.
    #[inline]
    pub fn is_from(&self, municipality: &str) -> bool {
        self.home_municipality == municipality
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_candidate_builder() {
        let c = Candidate::new("ANA", "SANTOS")
            .with_categories(["1", "2"])
            .with_category("3")
            .with_lead(true)
            .with_availability(Availability::always().with_blocked_weekday(Weekday::Fri));

        assert_eq!(c.name, "ANA");
        assert!(c.is_from("SANTOS"));
        assert!(!c.is_from("POA"));
        assert!(c.has_category("2"));
        assert!(!c.has_category("4"));
        assert!(c.lead_eligible);
        assert!(c.availability.has_weekday_rule());
    }

    #[test]
    fn test_count_matching() {
        let c = Candidate::new("ANA", "SANTOS").with_categories(["1", "3"]);
        let wanted = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        assert_eq!(c.count_matching(&wanted), 2);
        assert_eq!(c.count_matching(&Vec::new()), 0);
    }

    #[test]
    fn test_candidate_serde() {
        let c = Candidate::new("ANA", "SANTOS").with_category("1");
        let json = serde_json::to_string(&c).unwrap();
        let back: Candidate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "ANA");
        assert!(back.has_category("1"));
    }
}
