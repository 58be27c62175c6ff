//! Tenants, rooms, and rental agreements.
//!
//! Everything here is plain domain data; the ledger side of a tenancy
//! (seeded rent schedules, payment credits) lives in the collections crate.

pub mod agreement;
pub mod period;
pub mod room;
pub mod tenant;

pub use agreement::{Agreement, AgreementState, AgreementTerms};
pub use period::{days_late, month_bounds, rent_due_date};
pub use room::Room;
pub use tenant::{ContactInfo, Tenant};
