//! The ledger engine: every read and write of a tenant's entry sequence goes
//! through here.
//!
//! Writes (`append_entry`, `delete_entry`, `recompute_account`) serialize per
//! account; different accounts never contend. Reads work on store snapshots
//! and take no account lock. A backdated append deliberately leaves the
//! stored balances of later entries stale; `recompute_account` is the one
//! repair path, and `audit_account` tells you whether it is needed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use rentbook_core::{AccountId, AgreementId, LedgerError, LedgerResult};

use crate::entry::{EntryKind, LedgerEntry, SourceLink};
use crate::report::{
    AccountSummary, BalanceDrift, EntryFilter, EntryTotals, RecomputeOutcome, StatementReport,
    StatementRequest,
};
use crate::store::{AccountDirectory, EntryStore};

/// Draft of a new entry. The engine assigns the sequence id and the running
/// balance; everything else is the caller's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendEntry {
    pub account_id: AccountId,
    pub transaction_date: NaiveDate,
    pub kind: EntryKind,
    pub debit: Decimal,
    pub credit: Decimal,
    pub reference: String,
    pub description: Option<String>,
    pub source: SourceLink,
}

/// Append-only ledger over an [`EntryStore`], scoped to the accounts an
/// [`AccountDirectory`] resolves.
pub struct LedgerEngine<S, D> {
    store: S,
    directory: D,
    /// One mutex per account; covers the read-modify-write span of every
    /// mutating operation. Grows with the accounts written to;
    /// `recompute_account` evicts entries no writer currently holds.
    account_locks: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl<S, D> LedgerEngine<S, D>
where
    S: EntryStore,
    D: AccountDirectory,
{
    pub fn new(store: S, directory: D) -> Self {
        Self {
            store,
            directory,
            account_locks: Mutex::new(HashMap::new()),
        }
    }

    fn account_lock(&self, account_id: AccountId) -> Arc<Mutex<()>> {
        let mut locks = self
            .account_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(account_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop registry entries whose mutex no writer holds a clone of.
    ///
    /// While the registry map is locked no new clone can be handed out, so a
    /// strong count of one means only the map itself; the account's next
    /// writer gets a fresh mutex.
    fn prune_idle_locks(&self) {
        let mut locks = self
            .account_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Append one entry to the tenant's ledger.
    ///
    /// Validates the amounts, resolves the account, claims the next sequence
    /// id and derives the entry's running balance from everything at or
    /// before its `(transaction_date, sequence_id)` key. Later-dated entries
    /// are never touched: a backdated append leaves their stored balances
    /// stale until `recompute_account` runs.
    #[instrument(skip_all, fields(account = %draft.account_id, date = %draft.transaction_date))]
    pub fn append_entry(&self, draft: AppendEntry) -> LedgerResult<LedgerEntry> {
        if draft.debit < Decimal::ZERO || draft.credit < Decimal::ZERO {
            return Err(LedgerError::invalid_amount(draft.debit, draft.credit));
        }
        if !self.directory.contains(draft.account_id) {
            return Err(LedgerError::UnknownAccount(draft.account_id));
        }

        let lock = self.account_lock(draft.account_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let sequence_id = self.store.next_sequence(draft.account_id);
        let key = (draft.transaction_date, sequence_id);

        let snapshot = self.store.snapshot(draft.account_id);
        let prior: Decimal = snapshot
            .entries
            .iter()
            .filter(|e| e.ordering_key() <= key)
            .map(LedgerEntry::signed_amount)
            .sum();
        let backdated = snapshot
            .entries
            .last()
            .is_some_and(|last| key < last.ordering_key());

        let entry = LedgerEntry {
            account_id: draft.account_id,
            transaction_date: draft.transaction_date,
            sequence_id,
            kind: draft.kind,
            debit: draft.debit,
            credit: draft.credit,
            running_balance: prior + draft.debit - draft.credit,
            reference: draft.reference,
            description: draft.description,
            source: draft.source,
        };
        self.store.insert(entry.clone());

        if backdated {
            warn!(
                sequence = entry.sequence_id,
                "backdated entry stored; later balances stale until recompute_account"
            );
        }
        debug!(sequence = entry.sequence_id, balance = %entry.running_balance, "entry appended");
        Ok(entry)
    }

    /// Balance at the end of `as_of`, inclusive. Pass [`NaiveDate::MAX`] for
    /// the current balance.
    ///
    /// Pure read; an account with no entries reads as zero.
    pub fn balance_as_of(&self, account_id: AccountId, as_of: NaiveDate) -> LedgerResult<Decimal> {
        let snapshot = self.store.snapshot(account_id);
        Ok(snapshot
            .entries
            .iter()
            .filter(|e| e.transaction_date <= as_of)
            .map(LedgerEntry::signed_amount)
            .sum())
    }

    /// Entries dated within `[date_from, date_to]`, ascending by
    /// `(transaction_date, sequence_id)`.
    ///
    /// Entries with zero debit and zero credit are dropped unless the request
    /// sets `include_zero`. Read-only: stored balances come back exactly as
    /// stored, stale or not.
    pub fn statement(&self, request: &StatementRequest) -> LedgerResult<Vec<LedgerEntry>> {
        if request.date_from > request.date_to {
            return Err(LedgerError::InvalidRange {
                from: request.date_from,
                to: request.date_to,
            });
        }

        let snapshot = self.store.snapshot(request.account_id);
        Ok(snapshot
            .entries
            .into_iter()
            .filter(|e| {
                e.transaction_date >= request.date_from && e.transaction_date <= request.date_to
            })
            .filter(|e| request.include_zero || !(e.debit.is_zero() && e.credit.is_zero()))
            .collect())
    }

    /// Statement plus the balance brought forward and window totals.
    pub fn statement_report(&self, request: &StatementRequest) -> LedgerResult<StatementReport> {
        let lines = self.statement(request)?;
        let opening_balance = match request.date_from.pred_opt() {
            Some(day_before) => self.balance_as_of(request.account_id, day_before)?,
            None => Decimal::ZERO,
        };
        let total_debit: Decimal = lines.iter().map(|e| e.debit).sum();
        let total_credit: Decimal = lines.iter().map(|e| e.credit).sum();

        Ok(StatementReport {
            account_id: request.account_id,
            date_from: request.date_from,
            date_to: request.date_to,
            opening_balance,
            closing_balance: opening_balance + total_debit - total_credit,
            total_debit,
            total_credit,
            lines,
        })
    }

    /// Re-derive every running balance of the account from scratch.
    ///
    /// The corrected sequence is committed in a single `replace_all` against
    /// the snapshot revision; an out-of-band mutation in between fails the
    /// swap and surfaces as `RecomputeConflict` with nothing written. When
    /// every stored balance is already correct the store is not touched, so a
    /// second run is always a no-op.
    #[instrument(skip_all, fields(account = %account_id))]
    pub fn recompute_account(&self, account_id: AccountId) -> LedgerResult<RecomputeOutcome> {
        if !self.directory.contains(account_id) {
            return Err(LedgerError::UnknownAccount(account_id));
        }

        let lock = self.account_lock(account_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Recompute doubles as the registry's maintenance pass; this
        // account's lock is held above and survives the sweep.
        self.prune_idle_locks();

        let snapshot = self.store.snapshot(account_id);
        let revision = snapshot.revision;
        let mut entries = snapshot.entries;
        let corrected = rebalance(&mut entries);

        let outcome = RecomputeOutcome {
            entries: entries.len(),
            corrected,
        };
        if corrected == 0 {
            debug!("recompute found nothing to correct");
            return Ok(outcome);
        }

        self.store
            .replace_all(account_id, entries, revision)
            .map_err(|stale| {
                warn!(
                    expected = stale.expected,
                    actual = stale.actual,
                    "recompute lost the race to a concurrent write"
                );
                LedgerError::RecomputeConflict(account_id)
            })?;
        info!(corrected, "running balances recomputed");
        Ok(outcome)
    }

    /// Lifetime totals: total debit, total credit, current balance.
    pub fn account_summary(&self, account_id: AccountId) -> LedgerResult<AccountSummary> {
        let snapshot = self.store.snapshot(account_id);
        let total_debit: Decimal = snapshot.entries.iter().map(|e| e.debit).sum();
        let total_credit: Decimal = snapshot.entries.iter().map(|e| e.credit).sum();

        Ok(AccountSummary {
            account_id,
            total_debit,
            total_credit,
            current_balance: total_debit - total_credit,
            entry_count: snapshot.entries.len(),
        })
    }

    /// Debit and credit totals over the entries matching `filter`.
    pub fn totals_matching(
        &self,
        account_id: AccountId,
        filter: EntryFilter,
    ) -> LedgerResult<EntryTotals> {
        let snapshot = self.store.snapshot(account_id);
        let mut totals = EntryTotals::default();
        for e in snapshot.entries.iter().filter(|e| filter.matches(e)) {
            totals.debit += e.debit;
            totals.credit += e.credit;
        }
        Ok(totals)
    }

    /// Totals restricted to one entry kind.
    pub fn kind_totals(&self, account_id: AccountId, kind: EntryKind) -> LedgerResult<EntryTotals> {
        self.totals_matching(account_id, EntryFilter::kind(kind))
    }

    /// Totals restricted to entries linked to one agreement.
    pub fn agreement_totals(
        &self,
        account_id: AccountId,
        agreement_id: AgreementId,
    ) -> LedgerResult<EntryTotals> {
        self.totals_matching(account_id, EntryFilter::agreement(agreement_id))
    }

    /// Compare every stored running balance against a fresh fold.
    ///
    /// Pure read. An empty result means the account is consistent; anything
    /// else names the drifted entries so the caller can decide whether to run
    /// `recompute_account`.
    pub fn audit_account(&self, account_id: AccountId) -> LedgerResult<Vec<BalanceDrift>> {
        let snapshot = self.store.snapshot(account_id);
        let mut running = Decimal::ZERO;
        let mut drifts = Vec::new();
        for entry in &snapshot.entries {
            running += entry.signed_amount();
            if entry.running_balance != running {
                drifts.push(BalanceDrift {
                    sequence_id: entry.sequence_id,
                    transaction_date: entry.transaction_date,
                    stored: entry.running_balance,
                    expected: running,
                });
            }
        }
        Ok(drifts)
    }

    /// Remove one entry and rebalance the survivors in the same exclusive
    /// step, committed through a single `replace_all`.
    #[instrument(skip_all, fields(account = %account_id, sequence = sequence_id))]
    pub fn delete_entry(
        &self,
        account_id: AccountId,
        sequence_id: u64,
    ) -> LedgerResult<RecomputeOutcome> {
        if !self.directory.contains(account_id) {
            return Err(LedgerError::UnknownAccount(account_id));
        }

        let lock = self.account_lock(account_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let snapshot = self.store.snapshot(account_id);
        let revision = snapshot.revision;
        let mut entries = snapshot.entries;
        let before = entries.len();
        entries.retain(|e| e.sequence_id != sequence_id);
        if entries.len() == before {
            return Err(LedgerError::EntryNotFound {
                account_id,
                sequence_id,
            });
        }

        let corrected = rebalance(&mut entries);
        let outcome = RecomputeOutcome {
            entries: entries.len(),
            corrected,
        };

        self.store
            .replace_all(account_id, entries, revision)
            .map_err(|stale| {
                warn!(
                    expected = stale.expected,
                    actual = stale.actual,
                    "delete lost the race to a concurrent write"
                );
                LedgerError::RecomputeConflict(account_id)
            })?;
        info!(rebalanced = outcome.corrected, "entry deleted");
        Ok(outcome)
    }
}

/// Fold running balances over entries already sorted by ordering key.
/// Returns how many stored balances changed.
fn rebalance(entries: &mut [LedgerEntry]) -> usize {
    let mut running = Decimal::ZERO;
    let mut corrected = 0;
    for entry in entries {
        running += entry.signed_amount();
        if entry.running_balance != running {
            entry.running_balance = running;
            corrected += 1;
        }
    }
    corrected
}
