//! Rostering domain models.
//!
//! Provides the core data types for describing an allocation problem
//! (who is available, what is demanded) and its solution.
//!
//! # Domain Mappings
//!
//! | u-roster | Field inspection | Healthcare | Field service |
//! |----------|------------------|------------|---------------|
//! | Candidate | Inspector | Nurse | Technician |
//! | Operation | Inspection round | Shift | Site visit |
//! | Lead | Team lead | Charge nurse | Crew chief |
//! | Allocation | Duty roster | Rota | Dispatch plan |

mod allocation;
mod availability;
mod candidate;
mod operation;

pub use allocation::{
    AbandonReason, Allocation, Assignment, NonAssignment, NonAssignmentReason, OperationReport,
    OperationStatus, Violation, ViolationType,
};
pub use availability::{Availability, DateRange};
pub use candidate::Candidate;
pub use operation::{DemandRow, Operation, OperationKey};
