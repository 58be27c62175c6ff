//! Query parameters and read-side result types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rentbook_core::{AccountId, AgreementId, CollectionId};

use crate::entry::{EntryKind, LedgerEntry};

/// Parameters of a statement query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRequest {
    pub account_id: AccountId,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    /// Keep entries whose debit and credit are both zero.
    pub include_zero: bool,
}

impl StatementRequest {
    pub fn new(account_id: AccountId, date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            account_id,
            date_from,
            date_to,
            include_zero: false,
        }
    }
}

/// Rendered statement: balance brought forward, window lines and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementReport {
    pub account_id: AccountId,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    /// Balance over everything dated strictly before `date_from`.
    pub opening_balance: Decimal,
    pub lines: Vec<LedgerEntry>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    /// `opening_balance + total_debit - total_credit`.
    pub closing_balance: Decimal,
}

/// Lifetime totals of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub account_id: AccountId,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    /// Always `total_debit - total_credit`.
    pub current_balance: Decimal,
    pub entry_count: usize,
}

/// Debit and credit totals over a filtered slice of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryTotals {
    pub debit: Decimal,
    pub credit: Decimal,
}

impl EntryTotals {
    pub fn net(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// Filter for totals queries. `None` fields match everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryFilter {
    pub kind: Option<EntryKind>,
    pub collection_id: Option<CollectionId>,
    pub agreement_id: Option<AgreementId>,
}

impl EntryFilter {
    pub fn kind(kind: EntryKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn agreement(agreement_id: AgreementId) -> Self {
        Self {
            agreement_id: Some(agreement_id),
            ..Self::default()
        }
    }

    pub fn collection(collection_id: CollectionId) -> Self {
        Self {
            collection_id: Some(collection_id),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        self.kind.is_none_or(|k| entry.kind == k)
            && self
                .collection_id
                .is_none_or(|c| entry.source.collection_id == Some(c))
            && self
                .agreement_id
                .is_none_or(|a| entry.source.agreement_id == Some(a))
    }
}

/// Result of a full account recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecomputeOutcome {
    /// Entries examined.
    pub entries: usize,
    /// Entries whose stored running balance changed.
    pub corrected: usize,
}

/// One stored running balance that disagrees with the recomputed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceDrift {
    pub sequence_id: u64,
    pub transaction_date: NaiveDate,
    pub stored: Decimal,
    pub expected: Decimal,
}
