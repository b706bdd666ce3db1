//! Candidate roster.
//!
//! Holds the candidates of a run in input order, indexed by name.
//! Input order matters: it is the "first encountered" order used for
//! lead tie-breaks.

use std::collections::HashMap;

use crate::models::Candidate;
use crate::validation::{self, ValidationError, ValidationErrorKind};

/// Ordered, name-indexed set of candidates.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    candidates: Vec<Candidate>,
    index: HashMap<String, usize>,
}

impl Roster {
    /// Creates a roster, keeping the first of any duplicate names.
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self::build(candidates).0
    }

    /// Creates a roster and reports the candidates that were skipped.
    ///
    /// Candidates missing a required field are skipped. For duplicate
    /// names, the first occurrence wins.
    pub fn build(candidates: Vec<Candidate>) -> (Self, Vec<ValidationError>) {
        let mut roster = Self::default();
        let mut issues = Vec::new();

        for (position, candidate) in candidates.into_iter().enumerate() {
            let problems = validation::check_candidate(position, &candidate);
            let skip = problems
                .iter()
                .any(|e| e.kind == ValidationErrorKind::MissingRequiredField);
            issues.extend(problems);
            if skip {
                continue;
            }

            if roster.index.contains_key(&candidate.name) {
                issues.push(ValidationError::new(
                    ValidationErrorKind::DuplicateName,
                    format!("Duplicate candidate name: {}", candidate.name),
                ));
                continue;
            }

            roster
                .index
                .insert(candidate.name.clone(), roster.candidates.len());
            roster.candidates.push(candidate);
        }

        (roster, issues)
    }

    /// Looks up a candidate by name.
    pub fn get(&self, name: &str) -> Option<&Candidate> {
        self.index.get(name).map(|&i| &self.candidates[i])
    }

    /// Whether the roster contains a name.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterates candidates in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    /// All candidates in input order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_lookup() {
        let roster = Roster::new(vec![
            Candidate::new("ANA", "SANTOS").with_category("1"),
            Candidate::new("BIA", "POA").with_category("1").with_lead(true),
        ]);

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get("BIA").unwrap().home_municipality, "POA");
        assert!(roster.get("ZECA").is_none());
        assert!(roster.get("BIA").unwrap().lead_eligible);
    }

    #[test]
    fn test_roster_duplicate_first_wins() {
        let (roster, issues) = Roster::build(vec![
            Candidate::new("ANA", "SANTOS").with_category("1"),
            Candidate::new("ANA", "POA").with_category("2"),
        ]);

        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get("ANA").unwrap().home_municipality, "SANTOS");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, ValidationErrorKind::DuplicateName);
    }

    #[test]
    fn test_roster_skips_missing_fields() {
        let (roster, issues) = Roster::build(vec![
            Candidate::new("", "SANTOS").with_category("1"),
            Candidate::new("BIA", "POA"), // no categories
            Candidate::new("CAIO", "POA").with_category("1"),
        ]);

        assert_eq!(roster.len(), 1);
        assert!(roster.contains("CAIO"));
        assert_eq!(issues.len(), 2);
        assert!(issues
            .iter()
            .all(|e| e.kind == ValidationErrorKind::MissingRequiredField));
    }

    #[test]
    fn test_roster_iteration_order() {
        let roster = Roster::new(vec![
            Candidate::new("ZECA", "A").with_category("1"),
            Candidate::new("ANA", "B").with_category("1"),
        ]);
        let names: Vec<&str> = roster.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["ZECA", "ANA"]);
    }
}
