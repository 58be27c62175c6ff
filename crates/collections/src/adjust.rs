//! Settling outstanding rent from the security deposit.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use rentbook_core::{LedgerError, LedgerResult};
use rentbook_ledger::{
    AccountDirectory, AppendEntry, EntryFilter, EntryKind, EntryStore, LedgerEngine, LedgerEntry,
    SourceLink,
};
use rentbook_tenancy::Agreement;

/// Rent still owed under the agreement: rent debits minus rent credits.
pub fn rent_outstanding<S, D>(
    engine: &LedgerEngine<S, D>,
    agreement: &Agreement,
) -> LedgerResult<Decimal>
where
    S: EntryStore,
    D: AccountDirectory,
{
    let totals = engine.totals_matching(
        agreement.account_id(),
        EntryFilter::agreement(agreement.id()).with_kind(EntryKind::Rent),
    )?;
    Ok(totals.net())
}

/// The entry pair one deposit adjustment posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositAdjustment {
    pub rent_credit: LedgerEntry,
    pub deposit_charge: LedgerEntry,
}

/// Settle `amount` of outstanding rent from the security deposit.
///
/// Posts a rent credit and an adjustment debit under one shared
/// `ADJ/{agreement}/{date}` reference. The pair nets to zero on the running
/// balance: the rent is paid, and the consumed deposit is owed back.
///
/// The amount must not exceed the rent outstanding nor the deposit the
/// agreement holds.
#[instrument(skip_all, fields(agreement = %agreement.code(), amount = %amount))]
pub fn adjust_deposit<S, D>(
    engine: &LedgerEngine<S, D>,
    agreement: &Agreement,
    amount: Decimal,
    date: NaiveDate,
    note: &str,
) -> LedgerResult<DepositAdjustment>
where
    S: EntryStore,
    D: AccountDirectory,
{
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation(
            "adjustment amount must be positive",
        ));
    }
    let outstanding = rent_outstanding(engine, agreement)?;
    if amount > outstanding {
        return Err(LedgerError::validation(
            "adjustment exceeds the outstanding rent",
        ));
    }
    if amount > agreement.deposit_amount() {
        return Err(LedgerError::validation(
            "adjustment exceeds the deposit held",
        ));
    }

    let reference = format!("ADJ/{}/{}", agreement.code(), date.format("%Y%m%d"));
    let source = SourceLink::agreement(agreement.id());

    let rent_credit = engine.append_entry(AppendEntry {
        account_id: agreement.account_id(),
        transaction_date: date,
        kind: EntryKind::Rent,
        debit: Decimal::ZERO,
        credit: amount,
        reference: reference.clone(),
        description: Some(note.to_string()),
        source,
    })?;
    let deposit_charge = engine.append_entry(AppendEntry {
        account_id: agreement.account_id(),
        transaction_date: date,
        kind: EntryKind::Adjustment,
        debit: amount,
        credit: Decimal::ZERO,
        reference: reference.clone(),
        description: Some(note.to_string()),
        source,
    })?;

    info!(%reference, "deposit adjusted against rent");
    Ok(DepositAdjustment {
        rent_credit,
        deposit_charge,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rust_decimal_macros::dec;

    use rentbook_core::AccountId;
    use rentbook_ledger::{InMemoryDirectory, InMemoryLedgerStore};
    use rentbook_tenancy::AgreementTerms;

    use crate::originator::seed_agreement_entries;

    type TestEngine = LedgerEngine<InMemoryLedgerStore, Arc<InMemoryDirectory>>;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (TestEngine, Arc<InMemoryDirectory>) {
        let directory = Arc::new(InMemoryDirectory::new());
        let engine = LedgerEngine::new(InMemoryLedgerStore::new(), directory.clone());
        (engine, directory)
    }

    fn seeded_agreement(
        engine: &TestEngine,
        directory: &InMemoryDirectory,
        deposit: Decimal,
    ) -> Agreement {
        let account = AccountId::new();
        directory.register(account);

        let mut agreement = Agreement::new(AgreementTerms {
            code: "AGR-2024-011".to_string(),
            account_id: account,
            room_id: rentbook_core::RoomId::new(),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 3, 31),
            rent_amount: dec!(10000),
            deposit_amount: deposit,
            parking_rent: dec!(0),
        })
        .unwrap();
        agreement.activate().unwrap();
        seed_agreement_entries(engine, &agreement).unwrap();
        agreement
    }

    #[test]
    fn adjustment_settles_rent_without_moving_the_balance() {
        let (engine, directory) = setup();
        let agreement = seeded_agreement(&engine, &directory, dec!(30000));
        let account = agreement.account_id();

        assert_eq!(rent_outstanding(&engine, &agreement).unwrap(), dec!(30000));
        let before = engine.balance_as_of(account, NaiveDate::MAX).unwrap();

        let pair = adjust_deposit(
            &engine,
            &agreement,
            dec!(10000),
            date(2024, 4, 5),
            "Adjusting deposit against rent due",
        )
        .unwrap();

        assert_eq!(pair.rent_credit.kind, EntryKind::Rent);
        assert_eq!(pair.rent_credit.credit, dec!(10000));
        assert_eq!(pair.deposit_charge.kind, EntryKind::Adjustment);
        assert_eq!(pair.deposit_charge.debit, dec!(10000));
        assert_eq!(pair.rent_credit.reference, "ADJ/AGR-2024-011/20240405");
        assert_eq!(pair.deposit_charge.reference, pair.rent_credit.reference);
        assert_eq!(
            pair.rent_credit.description.as_deref(),
            Some("Adjusting deposit against rent due")
        );

        let after = engine.balance_as_of(account, NaiveDate::MAX).unwrap();
        assert_eq!(after, before);
        assert_eq!(rent_outstanding(&engine, &agreement).unwrap(), dec!(20000));

        let consumed = engine
            .kind_totals(account, EntryKind::Adjustment)
            .unwrap();
        assert_eq!(consumed.debit, dec!(10000));
    }

    #[test]
    fn adjustment_amount_must_be_positive() {
        let (engine, directory) = setup();
        let agreement = seeded_agreement(&engine, &directory, dec!(30000));

        let err =
            adjust_deposit(&engine, &agreement, dec!(0), date(2024, 4, 5), "note").unwrap_err();
        match err {
            LedgerError::Validation(msg) if msg.contains("positive") => {}
            other => panic!("Expected positive-amount validation, got {other:?}"),
        }
    }

    #[test]
    fn adjustment_cannot_exceed_outstanding_rent() {
        let (engine, directory) = setup();
        let agreement = seeded_agreement(&engine, &directory, dec!(50000));
        let entries_before = engine
            .account_summary(agreement.account_id())
            .unwrap()
            .entry_count;

        let err = adjust_deposit(&engine, &agreement, dec!(40000), date(2024, 4, 5), "note")
            .unwrap_err();
        match err {
            LedgerError::Validation(msg) if msg.contains("outstanding") => {}
            other => panic!("Expected outstanding validation, got {other:?}"),
        }

        let entries_after = engine
            .account_summary(agreement.account_id())
            .unwrap()
            .entry_count;
        assert_eq!(entries_after, entries_before);
    }

    #[test]
    fn adjustment_cannot_exceed_the_deposit_held() {
        let (engine, directory) = setup();
        let agreement = seeded_agreement(&engine, &directory, dec!(5000));

        let err = adjust_deposit(&engine, &agreement, dec!(10000), date(2024, 4, 5), "note")
            .unwrap_err();
        match err {
            LedgerError::Validation(msg) if msg.contains("deposit") => {}
            other => panic!("Expected deposit validation, got {other:?}"),
        }
    }

    #[test]
    fn repeated_adjustments_keep_settling_until_rent_is_clear() {
        let (engine, directory) = setup();
        let agreement = seeded_agreement(&engine, &directory, dec!(30000));

        adjust_deposit(&engine, &agreement, dec!(15000), date(2024, 4, 1), "first").unwrap();
        adjust_deposit(&engine, &agreement, dec!(15000), date(2024, 4, 2), "second").unwrap();

        assert_eq!(rent_outstanding(&engine, &agreement).unwrap(), dec!(0));
        let err = adjust_deposit(&engine, &agreement, dec!(1), date(2024, 4, 3), "third")
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }
}
