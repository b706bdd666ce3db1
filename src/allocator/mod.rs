//! Allocation loop, overrides and KPI evaluation.
//!
//! # Algorithm
//!
//! [`Allocator`] is a greedy, strictly sequential fold over operations.
//! Each operation moves through the stages
//! `Filtered → LeadChosen → Filling → Reconcile → Committed`, or ends
//! `Abandoned` when its eligible pool is empty or it requests nobody.
//! A shared [`Ledger`](crate::ledger::Ledger) carries load counters from
//! one operation to the next, which is what makes the rotation fair.
//!
//! # Overrides
//!
//! [`OverrideTable`] swaps the default staffing path for an
//! [`OverrideStrategy`] on matching operations. [`PriorityOverride`] pins
//! one named candidate first in the pool.
//!
//! # KPI
//!
//! [`AllocationKpi`] computes fill rate and load/lead spread.

mod engine;
mod kpi;
mod overrides;

pub use engine::{AllocationRequest, Allocator};
pub use kpi::AllocationKpi;
pub use overrides::{
    OperationPattern, OverrideEntry, OverrideStrategy, OverrideTable, PriorityOverride,
};
