use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rentbook_core::{AccountId, AgreementId, CollectionId};

/// What an entry charges to or settles against the tenant's account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Rent,
    Deposit,
    Parking,
    OtherCharge,
    Refund,
    Penalty,
    Adjustment,
}

/// Back-references to the records that originated an entry.
///
/// A rent payment carries both links: the collection that was cashed and the
/// agreement it pays down. Lookup only; the ledger never dereferences them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLink {
    pub collection_id: Option<CollectionId>,
    pub agreement_id: Option<AgreementId>,
}

impl SourceLink {
    /// No originating record (a manually keyed entry).
    pub fn none() -> Self {
        Self::default()
    }

    pub fn collection(id: CollectionId) -> Self {
        Self {
            collection_id: Some(id),
            agreement_id: None,
        }
    }

    pub fn agreement(id: AgreementId) -> Self {
        Self {
            collection_id: None,
            agreement_id: Some(id),
        }
    }

    pub fn with_agreement(mut self, id: AgreementId) -> Self {
        self.agreement_id = Some(id);
        self
    }
}

/// One line in a tenant's ledger.
///
/// Immutable once stored; removal goes through the engine so that later
/// balances get repaired in the same step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub account_id: AccountId,
    /// Calendar date of the economic event, not the insertion instant.
    pub transaction_date: NaiveDate,
    /// Per-account monotonic sequence assigned by the store. Never reused,
    /// even after deletions; breaks ties between same-date entries.
    pub sequence_id: u64,
    pub kind: EntryKind,
    /// Non-negative; increases what the tenant owes.
    pub debit: Decimal,
    /// Non-negative; decreases what the tenant owes.
    pub credit: Decimal,
    /// Cumulative debit minus credit over all entries at or before this one's
    /// ordering key. Derived; stale after a backdated insert until the account
    /// is recomputed.
    pub running_balance: Decimal,
    /// External reference (receipt number, agreement code).
    pub reference: String,
    pub description: Option<String>,
    pub source: SourceLink,
}

impl LedgerEntry {
    /// Total order of entries within one account.
    pub fn ordering_key(&self) -> (NaiveDate, u64) {
        (self.transaction_date, self.sequence_id)
    }

    /// Net effect on the balance.
    pub fn signed_amount(&self) -> Decimal {
        self.debit - self.credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(date: (i32, u32, u32), sequence_id: u64) -> LedgerEntry {
        LedgerEntry {
            account_id: AccountId::new(),
            transaction_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            sequence_id,
            kind: EntryKind::Rent,
            debit: dec!(100),
            credit: Decimal::ZERO,
            running_balance: dec!(100),
            reference: "REF".to_string(),
            description: None,
            source: SourceLink::none(),
        }
    }

    #[test]
    fn same_date_entries_order_by_sequence() {
        let first = entry((2024, 1, 1), 1);
        let second = entry((2024, 1, 1), 2);
        assert!(first.ordering_key() < second.ordering_key());
    }

    #[test]
    fn earlier_date_precedes_larger_sequence() {
        let backdated = entry((2024, 1, 1), 9);
        let newer = entry((2024, 2, 1), 2);
        assert!(backdated.ordering_key() < newer.ordering_key());
    }

    #[test]
    fn entry_kinds_use_snake_case_wire_names() {
        let value = serde_json::to_value(EntryKind::OtherCharge).unwrap();
        assert_eq!(value, serde_json::json!("other_charge"));

        let parsed: EntryKind = serde_json::from_value(serde_json::json!("rent")).unwrap();
        assert_eq!(parsed, EntryKind::Rent);
    }

    #[test]
    fn signed_amount_is_debit_minus_credit() {
        let mut e = entry((2024, 3, 1), 1);
        e.debit = dec!(250.50);
        e.credit = dec!(100.25);
        assert_eq!(e.signed_amount(), dec!(150.25));
    }
}
