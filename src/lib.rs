//! Fair duty-rostering allocation.
//!
//! Assigns people to recurring field operations (a municipality, a date,
//! a list of required skill categories, a headcount) so that every
//! operation gets exactly its headcount whenever enough eligible people
//! exist, each operation gets exactly one lead, and work is spread evenly
//! across people, ISO weeks and municipalities.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Candidate`, `Availability`, `DemandRow`,
//!   `Operation`, `Assignment`, `NonAssignment`, `Allocation`
//! - **`roster`**: Ordered, name-indexed candidate set
//! - **`eligibility`**: Hard constraints (same day, blackout, home municipality)
//! - **`matching`**: Category matching (strict-count, boundary-pair)
//! - **`ranking`**: Composable fairness rule engine with explicit tie-breaks
//! - **`lead`**: Lead selection with rotation
//! - **`ledger`**: Shared per-candidate load counters
//! - **`allocator`**: The sequential allocation loop, overrides, KPIs
//! - **`config`**: Run settings (serde)
//! - **`validation`**: Input integrity checks
//! - **`error`**: Run-level errors
//!
//! # Architecture
//!
//! Data flows Roster → Eligibility → Matching → Ranking → Lead → Allocation
//! loop → Ledger, one operation at a time. The ledger is the only mutable
//! state and is owned by the allocator; every other stage reads it.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_roster::allocator::Allocator;
//! use u_roster::models::{Candidate, DemandRow};
//!
//! let candidates = vec![
//!     Candidate::new("ANA", "SANTOS").with_categories(["1", "2"]).with_lead(true),
//!     Candidate::new("BIA", "SUZANO").with_categories(["1", "2"]),
//! ];
//! let demand = vec![DemandRow::new(
//!     "SEXTA",
//!     NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
//!     "POA",
//!     vec!["1".into(), "2".into()],
//!     Some(2),
//! )];
//!
//! let allocation = Allocator::default().run(candidates, &demand).unwrap();
//! assert_eq!(allocation.assignment_count(), 2);
//! assert!(allocation.shortfalls().is_empty());
//! ```

pub mod allocator;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod lead;
pub mod ledger;
pub mod matching;
pub mod models;
pub mod ranking;
pub mod roster;
pub mod validation;

pub use error::{AllocationError, Result};
