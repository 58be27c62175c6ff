//! `rentbook-core` — foundation building blocks for the tenant ledger.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{LedgerError, LedgerResult};
pub use id::{AccountId, AgreementId, CollectionId, RoomId};
