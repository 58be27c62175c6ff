//! Posting collected payments to the tenant ledger.

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use rentbook_core::{LedgerError, LedgerResult};
use rentbook_ledger::{
    AccountDirectory, AppendEntry, EntryKind, EntryStore, LedgerEngine, LedgerEntry, SourceLink,
};

use crate::collection::{Collection, CollectionType};

/// Ledger kind a collection posts under.
pub fn entry_kind_for(collection_type: CollectionType) -> EntryKind {
    match collection_type {
        CollectionType::Rent => EntryKind::Rent,
        CollectionType::Deposit | CollectionType::ParkingDeposit => EntryKind::Deposit,
        CollectionType::ParkingCharges => EntryKind::Parking,
        CollectionType::Penalty => EntryKind::Penalty,
        CollectionType::OtherCharges
        | CollectionType::Maintenance
        | CollectionType::Utility
        | CollectionType::Other => EntryKind::OtherCharge,
    }
}

/// Post one collection as a credit on the tenant's ledger.
///
/// Only `Collected` and `Verified` collections post; drafts, cancelled and
/// already-deposited ones are refused. The entry references the receipt
/// number (falling back to `COL/{collection id}`) and links back to the
/// collection and, when there is one, the agreement it pays.
#[instrument(skip_all, fields(collection = %collection.id(), account = %collection.account_id()))]
pub fn record_collection<S, D>(
    engine: &LedgerEngine<S, D>,
    collection: &Collection,
) -> LedgerResult<LedgerEntry>
where
    S: EntryStore,
    D: AccountDirectory,
{
    if !collection.posts_to_ledger() {
        return Err(LedgerError::validation(
            "only collected or verified payments post to the ledger",
        ));
    }

    let reference = match collection.receipt_number() {
        Some(receipt) => receipt.to_string(),
        None => format!("COL/{}", collection.id()),
    };
    let description = format!(
        "Payment for {} - Room {}",
        collection.collection_type().key(),
        collection.room_number()
    );
    let mut source = SourceLink::collection(collection.id());
    if let Some(agreement_id) = collection.agreement_id() {
        source = source.with_agreement(agreement_id);
    }

    let entry = engine.append_entry(AppendEntry {
        account_id: collection.account_id(),
        transaction_date: collection.date(),
        kind: entry_kind_for(collection.collection_type()),
        debit: Decimal::ZERO,
        credit: collection.amount(),
        reference,
        description: Some(description),
        source,
    })?;
    debug!(sequence = entry.sequence_id, "collection posted");
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use rentbook_core::AccountId;
    use rentbook_ledger::{InMemoryDirectory, InMemoryLedgerStore};
    use rentbook_tenancy::{Agreement, AgreementTerms, Room};

    use crate::collection::CollectionDraft;
    use crate::sequence::ReceiptSequence;

    type TestEngine = LedgerEngine<InMemoryLedgerStore, std::sync::Arc<InMemoryDirectory>>;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (TestEngine, std::sync::Arc<InMemoryDirectory>) {
        let directory = std::sync::Arc::new(InMemoryDirectory::new());
        let engine = LedgerEngine::new(InMemoryLedgerStore::new(), directory.clone());
        (engine, directory)
    }

    fn test_room() -> Room {
        Room::new("204", dec!(12000)).unwrap()
    }

    fn active_agreement(account_id: AccountId, room: &Room) -> Agreement {
        let mut agreement = Agreement::new(AgreementTerms {
            code: "AGR-2024-007".to_string(),
            account_id,
            room_id: room.id(),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 6, 30),
            rent_amount: dec!(12000),
            deposit_amount: dec!(24000),
            parking_rent: dec!(1000),
        })
        .unwrap();
        agreement.activate().unwrap();
        agreement
    }

    #[test]
    fn collected_payment_posts_a_credit() {
        let (engine, directory) = setup();
        let account = AccountId::new();
        directory.register(account);
        let room = test_room();
        let agreement = active_agreement(account, &room);
        let receipts = ReceiptSequence::new();

        let mut collection =
            CollectionDraft::for_agreement(&agreement, &room, CollectionType::Rent, date(2024, 3, 5))
                .build()
                .unwrap();
        collection.collect(&receipts).unwrap();

        let entry = record_collection(&engine, &collection).unwrap();
        assert_eq!(entry.kind, EntryKind::Rent);
        assert_eq!(entry.debit, Decimal::ZERO);
        assert_eq!(entry.credit, dec!(12000));
        assert_eq!(entry.reference, "COL/20240305/00001");
        assert_eq!(
            entry.description.as_deref(),
            Some("Payment for rent - Room 204")
        );
        assert_eq!(entry.source.collection_id, Some(collection.id()));
        assert_eq!(entry.source.agreement_id, Some(agreement.id()));

        let summary = engine.account_summary(account).unwrap();
        assert_eq!(summary.total_credit, dec!(12000));
        assert_eq!(summary.current_balance, dec!(-12000));
    }

    #[test]
    fn draft_and_cancelled_collections_do_not_post() {
        let (engine, directory) = setup();
        let account = AccountId::new();
        directory.register(account);
        let room = test_room();
        let agreement = active_agreement(account, &room);
        let receipts = ReceiptSequence::new();

        let draft =
            CollectionDraft::for_agreement(&agreement, &room, CollectionType::Rent, date(2024, 3, 5))
                .build()
                .unwrap();
        let err = record_collection(&engine, &draft).unwrap_err();
        match err {
            LedgerError::Validation(msg) if msg.contains("collected or verified") => {}
            other => panic!("Expected posting-gate validation, got {other:?}"),
        }

        let mut cancelled = draft.clone();
        cancelled.collect(&receipts).unwrap();
        cancelled.cancel().unwrap();
        assert!(record_collection(&engine, &cancelled).is_err());

        let summary = engine.account_summary(account).unwrap();
        assert_eq!(summary.entry_count, 0);
    }

    #[test]
    fn collection_without_receipt_falls_back_to_its_id() {
        let (engine, directory) = setup();
        let account = AccountId::new();
        directory.register(account);
        let room = test_room();

        let draft = CollectionDraft::new(account, &room, CollectionType::Penalty, date(2024, 4, 2))
            .amount(dec!(500))
            .build()
            .unwrap();

        // An imported record may arrive already verified but without a receipt.
        let mut wire = serde_json::to_value(&draft).unwrap();
        wire["status"] = serde_json::json!("verified");
        let collection: Collection = serde_json::from_value(wire).unwrap();

        let entry = record_collection(&engine, &collection).unwrap();
        assert_eq!(entry.kind, EntryKind::Penalty);
        assert_eq!(entry.reference, format!("COL/{}", collection.id()));
        assert_eq!(entry.source.agreement_id, None);
        assert_eq!(entry.source.collection_id, Some(collection.id()));
    }

    #[test]
    fn every_collection_type_maps_to_a_kind() {
        assert_eq!(entry_kind_for(CollectionType::Rent), EntryKind::Rent);
        assert_eq!(entry_kind_for(CollectionType::Deposit), EntryKind::Deposit);
        assert_eq!(
            entry_kind_for(CollectionType::ParkingDeposit),
            EntryKind::Deposit
        );
        assert_eq!(
            entry_kind_for(CollectionType::ParkingCharges),
            EntryKind::Parking
        );
        assert_eq!(entry_kind_for(CollectionType::Penalty), EntryKind::Penalty);
        assert_eq!(
            entry_kind_for(CollectionType::Maintenance),
            EntryKind::OtherCharge
        );
        assert_eq!(
            entry_kind_for(CollectionType::Utility),
            EntryKind::OtherCharge
        );
    }
}
