//! Tenant records and account resolution.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use rentbook_core::AccountId;
use rentbook_ledger::AccountDirectory;
use rentbook_tenancy::Tenant;

/// Registry of tenant records, doubling as the ledger's account directory.
///
/// Only active tenants resolve, so archiving a tenant closes their account
/// to new entries while the entry history stays readable through the engine's
/// lock-free read paths.
#[derive(Debug, Default)]
pub struct TenantRegistry {
    tenants: RwLock<HashMap<AccountId, Tenant>>,
}

impl TenantRegistry {
    pub fn new() -> Self {
        Self {
            tenants: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a tenant record, keyed by its account id.
    pub fn put(&self, tenant: Tenant) {
        let mut tenants = self
            .tenants
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        tenants.insert(tenant.id(), tenant);
    }

    pub fn get(&self, account_id: AccountId) -> Option<Tenant> {
        let tenants = self.tenants.read().unwrap_or_else(PoisonError::into_inner);
        tenants.get(&account_id).cloned()
    }

    /// Mark the tenant inactive; returns false when the account is unknown.
    pub fn archive(&self, account_id: AccountId) -> bool {
        let mut tenants = self
            .tenants
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match tenants.get_mut(&account_id) {
            Some(tenant) => {
                tenant.archive();
                true
            }
            None => false,
        }
    }

    pub fn reinstate(&self, account_id: AccountId) -> bool {
        let mut tenants = self
            .tenants
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match tenants.get_mut(&account_id) {
            Some(tenant) => {
                tenant.reinstate();
                true
            }
            None => false,
        }
    }

    /// Every registered account id, archived tenants included.
    pub fn accounts(&self) -> Vec<AccountId> {
        let tenants = self.tenants.read().unwrap_or_else(PoisonError::into_inner);
        tenants.keys().copied().collect()
    }

    pub fn list(&self) -> Vec<Tenant> {
        let tenants = self.tenants.read().unwrap_or_else(PoisonError::into_inner);
        tenants.values().cloned().collect()
    }
}

impl AccountDirectory for TenantRegistry {
    fn contains(&self, account_id: AccountId) -> bool {
        let tenants = self.tenants.read().unwrap_or_else(PoisonError::into_inner);
        tenants.get(&account_id).is_some_and(Tenant::is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered_tenant(registry: &TenantRegistry, name: &str) -> AccountId {
        let tenant = Tenant::new(name).unwrap();
        let account = tenant.id();
        registry.put(tenant);
        account
    }

    #[test]
    fn active_tenants_resolve() {
        let registry = TenantRegistry::new();
        let account = registered_tenant(&registry, "Asha Verma");

        assert!(registry.contains(account));
        assert_eq!(registry.get(account).unwrap().name(), "Asha Verma");
        assert!(!registry.contains(AccountId::new()));
    }

    #[test]
    fn archived_tenants_stop_resolving_but_stay_listed() {
        let registry = TenantRegistry::new();
        let account = registered_tenant(&registry, "Ravi Patel");

        assert!(registry.archive(account));
        assert!(!registry.contains(account));
        assert!(registry.get(account).is_some());
        assert_eq!(registry.accounts(), vec![account]);

        assert!(registry.reinstate(account));
        assert!(registry.contains(account));
    }

    #[test]
    fn archiving_an_unknown_account_reports_false() {
        let registry = TenantRegistry::new();
        assert!(!registry.archive(AccountId::new()));
        assert!(!registry.reinstate(AccountId::new()));
    }

    #[test]
    fn list_returns_every_record() {
        let registry = TenantRegistry::new();
        registered_tenant(&registry, "Asha Verma");
        let archived = registered_tenant(&registry, "Ravi Patel");
        registry.archive(archived);

        assert_eq!(registry.list().len(), 2);
        assert_eq!(registry.accounts().len(), 2);
    }
}
