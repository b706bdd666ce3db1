//! Operation (demand) model.
//!
//! Demand arrives as raw rows. Rows sharing the same composite key
//! (weekday label, date, municipality, category list, headcount) collapse
//! into a single [`Operation`]. Operations are processed in key order.

use chrono::{IsoWeek, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A raw demand row, as handed over by ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DemandRow {
    /// Weekday label as written in the source (e.g. "SEXTA").
    pub weekday: String,
    /// Calendar date.
    pub date: NaiveDate,
    /// Municipality where the operation takes place.
    pub municipality: String,
    /// Required category codes, in source order.
    pub categories: Vec<String>,
    /// Number of people required. `None` = missing in source.
    pub headcount: Option<u32>,
}

impl DemandRow {
    /// Creates a demand row.
    pub fn new(
        weekday: impl Into<String>,
        date: NaiveDate,
        municipality: impl Into<String>,
        categories: Vec<String>,
        headcount: Option<u32>,
    ) -> Self {
        Self {
            weekday: weekday.into(),
            date,
            municipality: municipality.into(),
            categories,
            headcount,
        }
    }

    /// Grouping key, or `None` if the headcount is missing.
    pub fn key(&self) -> Option<OperationKey> {
        self.headcount.map(|headcount| OperationKey {
            weekday: self.weekday.clone(),
            date: self.date,
            municipality: self.municipality.clone(),
            categories: self.categories.clone(),
            headcount,
        })
    }
}

/// Composite grouping key. Field order defines processing order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationKey {
    /// Weekday label.
    pub weekday: String,
    /// Calendar date.
    pub date: NaiveDate,
    /// Municipality.
    pub municipality: String,
    /// Required category codes.
    pub categories: Vec<String>,
    /// Headcount.
    pub headcount: u32,
}

/// A demand for `headcount` people on a date in a municipality.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Operation {
    /// Position in processing order (0-based).
    pub index: usize,
    /// Weekday label.
    pub weekday: String,
    /// Calendar date.
    pub date: NaiveDate,
    /// Municipality.
    pub municipality: String,
    /// Required category codes, in source order.
    pub categories: Vec<String>,
    /// Number of people required.
    pub headcount: u32,
    /// Number of raw rows collapsed into this operation.
    pub source_rows: usize,
}

impl Operation {
    /// Creates an operation directly (bypassing row grouping).
    pub fn new(
        index: usize,
        weekday: impl Into<String>,
        date: NaiveDate,
        municipality: impl Into<String>,
        categories: Vec<String>,
        headcount: u32,
    ) -> Self {
        Self {
            index,
            weekday: weekday.into(),
            date,
            municipality: municipality.into(),
            categories,
            headcount,
            source_rows: 1,
        }
    }

    fn from_key(index: usize, key: OperationKey, source_rows: usize) -> Self {
        Self {
            index,
            weekday: key.weekday,
            date: key.date,
            municipality: key.municipality,
            categories: key.categories,
            headcount: key.headcount,
            source_rows,
        }
    }

    /// Groups demand rows into operations, sorted by key.
    ///
    /// Rows without a headcount have no key and are dropped here;
    /// [`crate::validation`] reports them.
    pub fn group(rows: &[DemandRow]) -> Vec<Operation> {
        let mut groups: BTreeMap<OperationKey, usize> = BTreeMap::new();
        for row in rows {
            if let Some(key) = row.key() {
                *groups.entry(key).or_insert(0) += 1;
            }
        }

        groups
            .into_iter()
            .enumerate()
            .map(|(index, (key, count))| Operation::from_key(index, key, count))
            .collect()
    }

    /// ISO week of the operation date.
    #[inline]
    pub fn iso_week(&self) -> IsoWeek {
        chrono::Datelike::iso_week(&self.date)
    }

    /// Category list joined with commas (e.g. "1,2,3").
    pub fn category_label(&self) -> String {
        self.categories.join(",")
    }

    /// First required category code.
    pub fn first_category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }

    /// Last required category code.
    pub fn last_category(&self) -> Option<&str> {
        self.categories.last().map(String::as_str)
    }

    /// Whether this operation requests a category code.
    pub fn requests(&self, code: &str) -> bool {
        self.categories.iter().any(|c| c == code)
    }

    /// Number of auxiliary (non-lead) slots.
    #[inline]
    pub fn auxiliary_slots(&self) -> usize {
        (self.headcount as usize).saturating_sub(1)
    }
}
