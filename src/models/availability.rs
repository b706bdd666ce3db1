//! Candidate availability model.
//!
//! A candidate may be blacked out either on fixed weekdays (every week)
//! or over a calendar date range.
//!
//! # Precedence
//! The weekday rule overrides the date range. When at least one weekday
//! is blocked, the date range is not consulted at all:
//! - weekdays non-empty → blocked iff the date's weekday is in the set;
//! - weekdays empty → blocked iff the date falls within the range (inclusive).

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// An inclusive calendar date range [start, end].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    /// First blocked date (inclusive).
    pub start: NaiveDate,
    /// Last blocked date (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether a date falls within this range (both ends inclusive).
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Whether the range ends before it starts.
    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }
}

/// Blackout rules for a candidate.
///
/// An empty `Availability` never blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Availability {
    /// Weekdays on which the candidate is never available.
    pub blocked_weekdays: Vec<Weekday>,
    /// Date range during which the candidate is unavailable.
    pub blocked_range: Option<DateRange>,
}

impl Availability {
    /// Creates an availability with no blackout.
    pub fn always() -> Self {
        Self::default()
    }

    /// Blocks a weekday.
    pub fn with_blocked_weekday(mut self, weekday: Weekday) -> Self {
        if !self.blocked_weekdays.contains(&weekday) {
            self.blocked_weekdays.push(weekday);
        }
        self
    }

    /// Blocks an inclusive date range.
    pub fn with_blocked_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.blocked_range = Some(DateRange::new(start, end));
        self
    }

    /// Whether the weekday rule is in force.
    #[inline]
    pub fn has_weekday_rule(&self) -> bool {
        !self.blocked_weekdays.is_empty()
    }

    /// Whether the candidate is blacked out on the given date.
    pub fn is_blocked_on(&self, date: NaiveDate) -> bool {
        if self.has_weekday_rule() {
            return self.blocked_weekdays.contains(&date.weekday());
        }

        self.blocked_range
            .map(|range| range.contains(date))
            .unwrap_or(false)
    }

    /// Whether the candidate can be scheduled on the given date.
    #[inline]
    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        !self.is_blocked_on(date)
    }
}
