use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use rentbook_core::AccountId;

use crate::entry::LedgerEntry;
use crate::store::{AccountDirectory, AccountSnapshot, EntryStore, StaleRevision};

#[derive(Debug, Default)]
struct AccountBook {
    /// Kept sorted by `(transaction_date, sequence_id)`.
    entries: Vec<LedgerEntry>,
    next_sequence: u64,
    revision: u64,
}

/// In-memory entry store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    books: RwLock<HashMap<AccountId, AccountBook>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntryStore for InMemoryLedgerStore {
    fn next_sequence(&self, account_id: AccountId) -> u64 {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        let book = books.entry(account_id).or_default();
        book.next_sequence += 1;
        book.next_sequence
    }

    fn insert(&self, entry: LedgerEntry) {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        let book = books.entry(entry.account_id).or_default();
        let at = book
            .entries
            .partition_point(|e| e.ordering_key() <= entry.ordering_key());
        book.entries.insert(at, entry);
        book.revision += 1;
    }

    fn snapshot(&self, account_id: AccountId) -> AccountSnapshot {
        let books = self.books.read().unwrap_or_else(PoisonError::into_inner);
        books
            .get(&account_id)
            .map(|book| AccountSnapshot {
                entries: book.entries.clone(),
                revision: book.revision,
            })
            .unwrap_or_else(AccountSnapshot::empty)
    }

    fn replace_all(
        &self,
        account_id: AccountId,
        entries: Vec<LedgerEntry>,
        expected_revision: u64,
    ) -> Result<(), StaleRevision> {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        let book = books.entry(account_id).or_default();
        if book.revision != expected_revision {
            return Err(StaleRevision {
                expected: expected_revision,
                actual: book.revision,
            });
        }
        book.entries = entries;
        book.revision += 1;
        Ok(())
    }
}

/// In-memory account directory. Accounts must be registered before the engine
/// accepts entries for them.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    accounts: RwLock<HashSet<AccountId>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, account_id: AccountId) {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        accounts.insert(account_id);
    }

    pub fn remove(&self, account_id: AccountId) {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        accounts.remove(&account_id);
    }
}

impl AccountDirectory for InMemoryDirectory {
    fn contains(&self, account_id: AccountId) -> bool {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        accounts.contains(&account_id)
    }
}
