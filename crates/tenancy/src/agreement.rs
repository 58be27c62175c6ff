use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rentbook_core::{AccountId, AgreementId, LedgerError, LedgerResult, RoomId};

/// Lifecycle of a rental agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementState {
    Draft,
    Active,
    Ended,
}

/// Everything needed to draw up an agreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementTerms {
    /// Short code used in entry references, e.g. "AGR/2024/007".
    pub code: String,
    pub account_id: AccountId,
    pub room_id: RoomId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_amount: Decimal,
    pub deposit_amount: Decimal,
    pub parking_rent: Decimal,
}

/// A rental agreement: one tenant, one room, a term and the agreed amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    id: AgreementId,
    code: String,
    account_id: AccountId,
    room_id: RoomId,
    start_date: NaiveDate,
    end_date: NaiveDate,
    rent_amount: Decimal,
    deposit_amount: Decimal,
    parking_rent: Decimal,
    state: AgreementState,
}

impl Agreement {
    pub fn new(terms: AgreementTerms) -> LedgerResult<Self> {
        Self::with_id(AgreementId::new(), terms)
    }

    pub fn with_id(id: AgreementId, terms: AgreementTerms) -> LedgerResult<Self> {
        if terms.code.trim().is_empty() {
            return Err(LedgerError::validation("agreement code cannot be empty"));
        }
        if terms.start_date > terms.end_date {
            return Err(LedgerError::validation(format!(
                "agreement term is inverted: {} to {}",
                terms.start_date, terms.end_date
            )));
        }
        if terms.rent_amount <= Decimal::ZERO {
            return Err(LedgerError::validation("rent amount must be positive"));
        }
        if terms.deposit_amount < Decimal::ZERO {
            return Err(LedgerError::validation("deposit cannot be negative"));
        }
        if terms.parking_rent < Decimal::ZERO {
            return Err(LedgerError::validation("parking rent cannot be negative"));
        }

        Ok(Self {
            id,
            code: terms.code,
            account_id: terms.account_id,
            room_id: terms.room_id,
            start_date: terms.start_date,
            end_date: terms.end_date,
            rent_amount: terms.rent_amount,
            deposit_amount: terms.deposit_amount,
            parking_rent: terms.parking_rent,
            state: AgreementState::Draft,
        })
    }

    pub fn id(&self) -> AgreementId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn rent_amount(&self) -> Decimal {
        self.rent_amount
    }

    pub fn deposit_amount(&self) -> Decimal {
        self.deposit_amount
    }

    pub fn parking_rent(&self) -> Decimal {
        self.parking_rent
    }

    pub fn state(&self) -> AgreementState {
        self.state
    }

    pub fn activate(&mut self) -> LedgerResult<()> {
        if self.state != AgreementState::Draft {
            return Err(LedgerError::validation("only draft agreements activate"));
        }
        self.state = AgreementState::Active;
        Ok(())
    }

    pub fn end(&mut self) -> LedgerResult<()> {
        if self.state != AgreementState::Active {
            return Err(LedgerError::validation("only active agreements end"));
        }
        self.state = AgreementState::Ended;
        Ok(())
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Rent date of each calendar month of the term, starting at
    /// `start_date`. End-of-month dates clamp when stepping, so a term
    /// starting Jan 31 bills Feb 28 (or 29) next.
    pub fn months(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end_date;
        std::iter::successors(Some(self.start_date), move |prev| {
            prev.checked_add_months(Months::new(1))
                .filter(|next| *next <= end)
        })
    }
}
