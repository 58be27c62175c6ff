//! Rent collection: drafting payments, walking them through their lifecycle,
//! and posting them to the tenant ledger.
//!
//! The ledger side of an agreement also lives here: seeding its charge
//! schedule and settling rent from the deposit.

pub mod adjust;
pub mod collection;
pub mod originator;
pub mod recorder;
pub mod sequence;

pub use adjust::{adjust_deposit, rent_outstanding, DepositAdjustment};
pub use collection::{
    Collection, CollectionDraft, CollectionStatus, CollectionType, PaymentMethod, RentPeriod,
};
pub use originator::seed_agreement_entries;
pub use recorder::{entry_kind_for, record_collection};
pub use sequence::ReceiptSequence;
