use serde::{Deserialize, Serialize};

use rentbook_core::{AccountId, LedgerError, LedgerResult};

/// Contact information for a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// An account holder. The tenant's id doubles as the key of their ledger
/// account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    id: AccountId,
    name: String,
    contact: ContactInfo,
    active: bool,
}

impl Tenant {
    pub fn new(name: impl Into<String>) -> LedgerResult<Self> {
        Self::with_id(AccountId::new(), name)
    }

    /// Construct with a caller-chosen id. Prefer this in tests for
    /// determinism.
    pub fn with_id(id: AccountId, name: impl Into<String>) -> LedgerResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LedgerError::validation("tenant name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            contact: ContactInfo::default(),
            active: true,
        })
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn set_contact(&mut self, contact: ContactInfo) {
        self.contact = contact;
    }

    /// Whether the tenant may take new ledger entries. Archived tenants stay
    /// readable; only appends are refused.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn archive(&mut self) {
        self.active = false;
    }

    pub fn reinstate(&mut self) {
        self.active = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tenant_is_active() {
        let tenant = Tenant::new("Asha Rao").unwrap();
        assert!(tenant.is_active());
        assert_eq!(tenant.name(), "Asha Rao");
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Tenant::new("   ").unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn archive_and_reinstate_toggle_activity() {
        let mut tenant = Tenant::new("Jo Meyer").unwrap();
        tenant.archive();
        assert!(!tenant.is_active());
        tenant.reinstate();
        assert!(tenant.is_active());
    }
}
