//! Wiring around the ledger: the tenant registry that scopes it and the
//! summary board derived from it.

pub mod tenant_directory;
pub mod views;

pub use tenant_directory::TenantRegistry;
pub use views::SummaryBoard;
