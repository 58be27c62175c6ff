//! Tenant ledger: append-only entry sequences with derived running balances.
//!
//! Pure domain logic plus an in-memory store for tests/dev; no IO, no HTTP,
//! no persistence concerns beyond the [`store::EntryStore`] port.

pub mod engine;
pub mod entry;
pub mod memory;
pub mod report;
pub mod store;

pub use engine::{AppendEntry, LedgerEngine};
pub use entry::{EntryKind, LedgerEntry, SourceLink};
pub use memory::{InMemoryDirectory, InMemoryLedgerStore};
pub use report::{
    AccountSummary, BalanceDrift, EntryFilter, EntryTotals, RecomputeOutcome, StatementReport,
    StatementRequest,
};
pub use store::{AccountDirectory, AccountSnapshot, EntryStore, StaleRevision};
