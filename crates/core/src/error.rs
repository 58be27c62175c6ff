//! Ledger error model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::id::AccountId;

/// Result type used across the ledger and its collaborators.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Every failure here is deterministic and synchronous (validation, missing
/// accounts, concurrency conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A debit or credit amount was negative. Nothing is persisted.
    #[error("invalid amount: debit {debit} / credit {credit} must be non-negative")]
    InvalidAmount { debit: Decimal, credit: Decimal },

    /// The account id does not resolve to a known account.
    #[error("unknown account: {0}")]
    UnknownAccount(AccountId),

    /// A date-range query had `from` after `to`.
    #[error("invalid range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    /// A concurrent mutation landed while the account was being recomputed.
    /// Surfaced to the caller; never retried internally.
    #[error("recompute conflict on account {0}")]
    RecomputeConflict(AccountId),

    /// The referenced entry does not exist on the account.
    #[error("entry not found: account {account_id}, sequence {sequence_id}")]
    EntryNotFound {
        account_id: AccountId,
        sequence_id: u64,
    },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_amount(debit: Decimal, credit: Decimal) -> Self {
        Self::InvalidAmount { debit, credit }
    }
}
