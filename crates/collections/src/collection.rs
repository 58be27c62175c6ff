use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rentbook_core::{AccountId, AgreementId, CollectionId, LedgerError, LedgerResult, RoomId};
use rentbook_tenancy::{days_late, month_bounds, rent_due_date, Agreement, Room};

use crate::sequence::ReceiptSequence;

/// What a payment was collected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionType {
    Rent,
    Deposit,
    ParkingCharges,
    ParkingDeposit,
    OtherCharges,
    Penalty,
    Maintenance,
    Utility,
    Other,
}

impl CollectionType {
    /// Stable key used in posted descriptions.
    pub fn key(self) -> &'static str {
        match self {
            CollectionType::Rent => "rent",
            CollectionType::Deposit => "deposit",
            CollectionType::ParkingCharges => "parking_charges",
            CollectionType::ParkingDeposit => "parking_deposit",
            CollectionType::OtherCharges => "other_charges",
            CollectionType::Penalty => "penalty",
            CollectionType::Maintenance => "maintenance",
            CollectionType::Utility => "utility",
            CollectionType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Cheque,
    Online,
    Card,
    DepositAdjustment,
}

/// Collection status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    Draft,
    Collected,
    Verified,
    Deposited,
    Cancelled,
}

/// Calendar month a rent payment covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// One collected payment on its way from the tenant's hand to the bank.
///
/// A collection is not a ledger entry. It becomes one when the recorder posts
/// it, and only `Collected` or `Verified` collections post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    id: CollectionId,
    account_id: AccountId,
    room_id: RoomId,
    room_number: String,
    agreement_id: Option<AgreementId>,
    date: NaiveDate,
    amount: Decimal,
    collection_type: CollectionType,
    payment_method: PaymentMethod,
    status: CollectionStatus,
    receipt_number: Option<String>,
    period: Option<RentPeriod>,
    due_date: Option<NaiveDate>,
    notes: Option<String>,
}

impl Collection {
    pub fn id(&self) -> CollectionId {
        self.id
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn room_number(&self) -> &str {
        &self.room_number
    }

    pub fn agreement_id(&self) -> Option<AgreementId> {
        self.agreement_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn collection_type(&self) -> CollectionType {
        self.collection_type
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn status(&self) -> CollectionStatus {
        self.status
    }

    pub fn receipt_number(&self) -> Option<&str> {
        self.receipt_number.as_deref()
    }

    pub fn period(&self) -> Option<RentPeriod> {
        self.period
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Days the payment arrived after its due date; zero when on time or
    /// when the collection has no due date.
    pub fn days_late(&self) -> i64 {
        match self.due_date {
            Some(due) => days_late(due, self.date),
            None => 0,
        }
    }

    /// Invariant: only money that was actually collected posts to the ledger.
    pub fn posts_to_ledger(&self) -> bool {
        matches!(
            self.status,
            CollectionStatus::Collected | CollectionStatus::Verified
        )
    }

    /// Mark the money as collected and hand out a receipt.
    pub fn collect(&mut self, receipts: &ReceiptSequence) -> LedgerResult<()> {
        if self.status != CollectionStatus::Draft {
            return Err(LedgerError::validation(
                "only a draft collection can be collected",
            ));
        }
        self.status = CollectionStatus::Collected;
        if self.receipt_number.is_none() {
            self.receipt_number = Some(receipts.next(self.date));
        }
        Ok(())
    }

    pub fn verify(&mut self) -> LedgerResult<()> {
        if self.status != CollectionStatus::Collected {
            return Err(LedgerError::validation(
                "only a collected payment can be verified",
            ));
        }
        self.status = CollectionStatus::Verified;
        Ok(())
    }

    pub fn deposit(&mut self) -> LedgerResult<()> {
        if self.status != CollectionStatus::Verified {
            return Err(LedgerError::validation(
                "only a verified payment can be deposited",
            ));
        }
        self.status = CollectionStatus::Deposited;
        Ok(())
    }

    pub fn cancel(&mut self) -> LedgerResult<()> {
        match self.status {
            CollectionStatus::Deposited => Err(LedgerError::validation(
                "a deposited collection cannot be cancelled",
            )),
            CollectionStatus::Cancelled => {
                Err(LedgerError::validation("collection is already cancelled"))
            }
            _ => {
                self.status = CollectionStatus::Cancelled;
                Ok(())
            }
        }
    }
}

/// Builder for a new [`Collection`].
///
/// `for_agreement` pre-fills the amount from the agreement's terms; rent and
/// parking drafts also get the billing period and due date derived from the
/// collection date. Every default can be overridden before `build`.
#[derive(Debug, Clone)]
pub struct CollectionDraft {
    account_id: AccountId,
    room_id: RoomId,
    room_number: String,
    agreement_id: Option<AgreementId>,
    date: NaiveDate,
    amount: Option<Decimal>,
    collection_type: CollectionType,
    payment_method: PaymentMethod,
    period: Option<RentPeriod>,
    due_date: Option<NaiveDate>,
    notes: Option<String>,
}

impl CollectionDraft {
    /// Draft with no agreement behind it; the amount must be set explicitly.
    pub fn new(
        account_id: AccountId,
        room: &Room,
        collection_type: CollectionType,
        date: NaiveDate,
    ) -> Self {
        let (period, due_date) = match collection_type {
            CollectionType::Rent | CollectionType::ParkingCharges => {
                let (from, to) = month_bounds(date);
                (Some(RentPeriod { from, to }), Some(rent_due_date(date)))
            }
            _ => (None, None),
        };
        Self {
            account_id,
            room_id: room.id(),
            room_number: room.number().to_string(),
            agreement_id: None,
            date,
            amount: None,
            collection_type,
            payment_method: PaymentMethod::Cash,
            period,
            due_date,
            notes: None,
        }
    }

    /// Draft against an agreement, with the amount defaulted by type.
    pub fn for_agreement(
        agreement: &Agreement,
        room: &Room,
        collection_type: CollectionType,
        date: NaiveDate,
    ) -> Self {
        let mut draft = Self::new(agreement.account_id(), room, collection_type, date);
        draft.agreement_id = Some(agreement.id());
        draft.amount = match collection_type {
            CollectionType::Rent => Some(agreement.rent_amount()),
            CollectionType::Deposit => Some(agreement.deposit_amount()),
            CollectionType::ParkingCharges | CollectionType::ParkingDeposit => {
                Some(agreement.parking_rent())
            }
            _ => None,
        };
        draft
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }

    pub fn period(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.period = Some(RentPeriod { from, to });
        self
    }

    pub fn due_on(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> LedgerResult<Collection> {
        let amount = self
            .amount
            .ok_or_else(|| LedgerError::validation("collection amount is required"))?;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::validation(
                "collection amount must be positive",
            ));
        }
        if let Some(period) = self.period {
            if period.from > period.to {
                return Err(LedgerError::InvalidRange {
                    from: period.from,
                    to: period.to,
                });
            }
        }

        Ok(Collection {
            id: CollectionId::new(),
            account_id: self.account_id,
            room_id: self.room_id,
            room_number: self.room_number,
            agreement_id: self.agreement_id,
            date: self.date,
            amount,
            collection_type: self.collection_type,
            payment_method: self.payment_method,
            status: CollectionStatus::Draft,
            receipt_number: None,
            period: self.period,
            due_date: self.due_date,
            notes: self.notes,
        })
    }
}
