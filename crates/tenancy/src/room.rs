use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rentbook_core::{LedgerError, LedgerResult, RoomId};

/// A rentable room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    id: RoomId,
    /// Display number, e.g. "101" or "B-204".
    number: String,
    monthly_rent: Decimal,
}

impl Room {
    pub fn new(number: impl Into<String>, monthly_rent: Decimal) -> LedgerResult<Self> {
        Self::with_id(RoomId::new(), number, monthly_rent)
    }

    pub fn with_id(
        id: RoomId,
        number: impl Into<String>,
        monthly_rent: Decimal,
    ) -> LedgerResult<Self> {
        let number = number.into();
        if number.trim().is_empty() {
            return Err(LedgerError::validation("room number cannot be empty"));
        }
        if monthly_rent <= Decimal::ZERO {
            return Err(LedgerError::validation("monthly rent must be positive"));
        }
        Ok(Self {
            id,
            number,
            monthly_rent,
        })
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn monthly_rent(&self) -> Decimal {
        self.monthly_rent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn room_requires_positive_rent() {
        assert!(Room::new("101", dec!(8500)).is_ok());
        assert!(Room::new("101", Decimal::ZERO).is_err());
        assert!(Room::new("", dec!(8500)).is_err());
    }
}
