//! Charging an agreement's schedule onto the tenant ledger.

use rust_decimal::Decimal;
use tracing::{info, instrument};

use rentbook_core::{LedgerError, LedgerResult};
use rentbook_ledger::{
    AccountDirectory, AppendEntry, EntryKind, EntryStore, LedgerEngine, LedgerEntry, SourceLink,
};
use rentbook_tenancy::{Agreement, AgreementState};

/// Post the debits an active agreement owes: the security deposit (when
/// there is one) followed by one rent charge per calendar month of the term.
///
/// Dates come out ascending, so the posted running balances are final and no
/// recompute is needed afterwards.
#[instrument(skip_all, fields(agreement = %agreement.code(), account = %agreement.account_id()))]
pub fn seed_agreement_entries<S, D>(
    engine: &LedgerEngine<S, D>,
    agreement: &Agreement,
) -> LedgerResult<Vec<LedgerEntry>>
where
    S: EntryStore,
    D: AccountDirectory,
{
    if agreement.state() != AgreementState::Active {
        return Err(LedgerError::validation(
            "only an active agreement can be charged",
        ));
    }

    let source = SourceLink::agreement(agreement.id());
    let mut posted = Vec::new();

    if agreement.deposit_amount() > Decimal::ZERO {
        posted.push(engine.append_entry(AppendEntry {
            account_id: agreement.account_id(),
            transaction_date: agreement.start_date(),
            kind: EntryKind::Deposit,
            debit: agreement.deposit_amount(),
            credit: Decimal::ZERO,
            reference: format!("AGR/{}/DEPOSIT", agreement.code()),
            description: Some(format!(
                "Security deposit for agreement {}",
                agreement.code()
            )),
            source,
        })?);
    }

    for month in agreement.months() {
        posted.push(engine.append_entry(AppendEntry {
            account_id: agreement.account_id(),
            transaction_date: month,
            kind: EntryKind::Rent,
            debit: agreement.rent_amount(),
            credit: Decimal::ZERO,
            reference: format!("AGR/{}/RENT/{}", agreement.code(), month.format("%Y%m")),
            description: Some(format!("Monthly rent for {}", month.format("%B %Y"))),
            source,
        })?);
    }

    info!(entries = posted.len(), "agreement charges seeded");
    Ok(posted)
}
