//! Persistence and account-resolution ports.
//!
//! The engine sees storage through `EntryStore` and account existence through
//! `AccountDirectory`; implementations decide where entries actually live.

use std::sync::Arc;

use rentbook_core::AccountId;

use crate::entry::LedgerEntry;

/// Ordered view of one account, captured atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Ascending by `(transaction_date, sequence_id)`.
    pub entries: Vec<LedgerEntry>,
    /// Bumped on every mutation of the account; the token `replace_all`
    /// checks before swapping.
    pub revision: u64,
}

impl AccountSnapshot {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            revision: 0,
        }
    }
}

/// The account changed between `snapshot` and `replace_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleRevision {
    pub expected: u64,
    pub actual: u64,
}

/// Ordered store for per-account entry sequences.
///
/// Implementations must:
/// - keep each account's entries sorted by `(transaction_date, sequence_id)`
/// - hand out sequence ids monotonically per account, starting at 1, and
///   never reuse one (deletions leave gaps)
/// - make `replace_all` atomic: on a revision mismatch nothing changes
pub trait EntryStore: Send + Sync {
    /// Claim the next sequence id for the account.
    fn next_sequence(&self, account_id: AccountId) -> u64;

    /// Persist one entry at its ordered position. Bumps the revision.
    fn insert(&self, entry: LedgerEntry);

    /// Entries plus revision; empty snapshot for accounts never written.
    fn snapshot(&self, account_id: AccountId) -> AccountSnapshot;

    /// Swap the account's whole sequence iff the revision still matches.
    fn replace_all(
        &self,
        account_id: AccountId,
        entries: Vec<LedgerEntry>,
        expected_revision: u64,
    ) -> Result<(), StaleRevision>;
}

impl<S> EntryStore for Arc<S>
where
    S: EntryStore + ?Sized,
{
    fn next_sequence(&self, account_id: AccountId) -> u64 {
        (**self).next_sequence(account_id)
    }

    fn insert(&self, entry: LedgerEntry) {
        (**self).insert(entry)
    }

    fn snapshot(&self, account_id: AccountId) -> AccountSnapshot {
        (**self).snapshot(account_id)
    }

    fn replace_all(
        &self,
        account_id: AccountId,
        entries: Vec<LedgerEntry>,
        expected_revision: u64,
    ) -> Result<(), StaleRevision> {
        (**self).replace_all(account_id, entries, expected_revision)
    }
}

/// Resolves which accounts accept new entries.
pub trait AccountDirectory: Send + Sync {
    fn contains(&self, account_id: AccountId) -> bool;
}

impl<D> AccountDirectory for Arc<D>
where
    D: AccountDirectory + ?Sized,
{
    fn contains(&self, account_id: AccountId) -> bool {
        (**self).contains(account_id)
    }
}
