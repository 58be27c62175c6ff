//! Derived views over the ledger.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use rust_decimal::Decimal;
use tracing::debug;

use rentbook_core::{AccountId, LedgerResult};
use rentbook_ledger::{AccountDirectory, AccountSummary, EntryStore, LedgerEngine};

/// Per-account totals cached for display.
///
/// The board never watches the ledger. Whoever mutates an account refreshes
/// it here afterwards; until then the board serves the last refreshed totals,
/// stale or not. `refresh_all` is the maintenance sweep over every known
/// account.
#[derive(Debug, Default)]
pub struct SummaryBoard {
    summaries: RwLock<HashMap<AccountId, AccountSummary>>,
}

impl SummaryBoard {
    pub fn new() -> Self {
        Self {
            summaries: RwLock::new(HashMap::new()),
        }
    }

    /// Recompute one account's totals from the ledger and cache them.
    pub fn refresh_account<S, D>(
        &self,
        engine: &LedgerEngine<S, D>,
        account_id: AccountId,
    ) -> LedgerResult<AccountSummary>
    where
        S: EntryStore,
        D: AccountDirectory,
    {
        let summary = engine.account_summary(account_id)?;
        let mut summaries = self
            .summaries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        summaries.insert(account_id, summary);
        debug!(account = %account_id, balance = %summary.current_balance, "summary refreshed");
        Ok(summary)
    }

    /// Refresh every given account; returns how many were refreshed.
    pub fn refresh_all<S, D>(
        &self,
        engine: &LedgerEngine<S, D>,
        accounts: impl IntoIterator<Item = AccountId>,
    ) -> LedgerResult<usize>
    where
        S: EntryStore,
        D: AccountDirectory,
    {
        let mut refreshed = 0;
        for account_id in accounts {
            self.refresh_account(engine, account_id)?;
            refreshed += 1;
        }
        Ok(refreshed)
    }

    /// Last refreshed totals, if the account was ever refreshed.
    pub fn get(&self, account_id: AccountId) -> Option<AccountSummary> {
        let summaries = self
            .summaries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        summaries.get(&account_id).copied()
    }

    /// Accounts whose cached balance says the tenant still owes money.
    pub fn accounts_with_outstanding(&self) -> Vec<AccountSummary> {
        let summaries = self
            .summaries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        summaries
            .values()
            .filter(|s| s.current_balance > Decimal::ZERO)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use rentbook_ledger::{
        AppendEntry, EntryKind, InMemoryDirectory, InMemoryLedgerStore, SourceLink,
    };

    type TestEngine = LedgerEngine<InMemoryLedgerStore, Arc<InMemoryDirectory>>;

    fn setup() -> (TestEngine, Arc<InMemoryDirectory>) {
        let directory = Arc::new(InMemoryDirectory::new());
        let engine = LedgerEngine::new(InMemoryLedgerStore::new(), directory.clone());
        (engine, directory)
    }

    fn charge(engine: &TestEngine, account: AccountId, debit: Decimal, credit: Decimal) {
        engine
            .append_entry(AppendEntry {
                account_id: account,
                transaction_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                kind: EntryKind::Rent,
                debit,
                credit,
                reference: "TEST".to_string(),
                description: None,
                source: SourceLink::none(),
            })
            .unwrap();
    }

    #[test]
    fn board_serves_refreshed_totals() {
        let (engine, directory) = setup();
        let account = AccountId::new();
        directory.register(account);
        let board = SummaryBoard::new();

        assert_eq!(board.get(account), None);

        charge(&engine, account, dec!(10000), Decimal::ZERO);
        let summary = board.refresh_account(&engine, account).unwrap();
        assert_eq!(summary.current_balance, dec!(10000));
        assert_eq!(board.get(account), Some(summary));
    }

    #[test]
    fn board_is_stale_until_the_next_refresh() {
        let (engine, directory) = setup();
        let account = AccountId::new();
        directory.register(account);
        let board = SummaryBoard::new();

        charge(&engine, account, dec!(10000), Decimal::ZERO);
        board.refresh_account(&engine, account).unwrap();

        charge(&engine, account, Decimal::ZERO, dec!(4000));
        assert_eq!(board.get(account).unwrap().current_balance, dec!(10000));

        board.refresh_account(&engine, account).unwrap();
        assert_eq!(board.get(account).unwrap().current_balance, dec!(6000));
    }

    #[test]
    fn outstanding_filter_keeps_debtors_only() {
        let (engine, directory) = setup();
        let board = SummaryBoard::new();

        let owing = AccountId::new();
        directory.register(owing);
        charge(&engine, owing, dec!(5000), Decimal::ZERO);

        let settled = AccountId::new();
        directory.register(settled);
        charge(&engine, settled, dec!(2000), Decimal::ZERO);
        charge(&engine, settled, Decimal::ZERO, dec!(2000));

        let in_credit = AccountId::new();
        directory.register(in_credit);
        charge(&engine, in_credit, Decimal::ZERO, dec!(100));

        let refreshed = board
            .refresh_all(&engine, [owing, settled, in_credit])
            .unwrap();
        assert_eq!(refreshed, 3);

        let debtors = board.accounts_with_outstanding();
        assert_eq!(debtors.len(), 1);
        assert_eq!(debtors[0].account_id, owing);
        assert_eq!(debtors[0].current_balance, dec!(5000));
    }
}
