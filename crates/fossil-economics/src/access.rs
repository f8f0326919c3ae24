// crates/fossil-economics/src/access.rs
//
// Flat role registry: a set of (role, address) grants administered by
// holders of `Role::DefaultAdmin`. There is no role hierarchy.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use fossil_core::{AccessControl, Address, FossilError, Role};

/// Capability set keyed by (role, address).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleRegistry {
    grants: BTreeSet<(Role, Address)>,
}

impl RoleRegistry {
    /// Create a registry whose only grant is `DefaultAdmin` for `admin`.
    pub fn new(admin: Address) -> Self {
        let mut grants = BTreeSet::new();
        grants.insert((Role::DefaultAdmin, admin));
        Self { grants }
    }

    /// Fail with `Unauthorized` unless `account` holds `role`.
    pub fn require(&self, role: Role, account: &Address) -> Result<(), FossilError> {
        ensure_role(self, role, account)
    }

    /// Record a grant without an admin check. For owners whose authority was
    /// already verified by the calling component.
    pub(crate) fn insert_grant(&mut self, role: Role, account: Address) -> bool {
        self.grants.insert((role, account))
    }

    /// All holders of `role`, in address order.
    pub fn members(&self, role: Role) -> Vec<Address> {
        self.grants
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, a)| *a)
            .collect()
    }
}

/// Fail with `Unauthorized` unless `account` holds `role` in `acl`.
pub fn ensure_role(acl: &dyn AccessControl, role: Role, account: &Address) -> Result<(), FossilError> {
    if acl.has_role(role, account) {
        Ok(())
    } else {
        Err(FossilError::Unauthorized(format!(
            "{} does not hold {}",
            account, role
        )))
    }
}

impl AccessControl for RoleRegistry {
    fn has_role(&self, role: Role, account: &Address) -> bool {
        self.grants.contains(&(role, *account))
    }

    fn grant_role(
        &mut self,
        caller: &Address,
        role: Role,
        account: &Address,
    ) -> Result<(), FossilError> {
        self.require(Role::DefaultAdmin, caller)?;
        if self.grants.insert((role, *account)) {
            tracing::info!("Granted {} to {}", role, account);
        }
        Ok(())
    }

    fn revoke_role(
        &mut self,
        caller: &Address,
        role: Role,
        account: &Address,
    ) -> Result<(), FossilError> {
        self.require(Role::DefaultAdmin, caller)?;
        if self.grants.remove(&(role, *account)) {
            tracing::info!("Revoked {} from {}", role, account);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Address {
        Address::derive("admin")
    }

    fn user() -> Address {
        Address::derive("user")
    }

    #[test]
    fn test_new_grants_admin() {
        let registry = RoleRegistry::new(admin());
        assert!(registry.has_role(Role::DefaultAdmin, &admin()));
        assert!(!registry.has_role(Role::Governance, &admin()));
    }

    #[test]
    fn test_admin_grants_and_revokes() {
        let mut registry = RoleRegistry::new(admin());
        registry.grant_role(&admin(), Role::Governance, &user()).unwrap();
        assert!(registry.has_role(Role::Governance, &user()));
        assert_eq!(registry.members(Role::Governance), vec![user()]);

        registry.revoke_role(&admin(), Role::Governance, &user()).unwrap();
        assert!(!registry.has_role(Role::Governance, &user()));
    }

    #[test]
    fn test_non_admin_cannot_grant() {
        let mut registry = RoleRegistry::new(admin());
        let result = registry.grant_role(&user(), Role::Distributor, &user());
        assert!(matches!(result, Err(FossilError::Unauthorized(_))));
        assert!(!registry.has_role(Role::Distributor, &user()));
    }

    #[test]
    fn test_grant_is_idempotent() {
        let mut registry = RoleRegistry::new(admin());
        registry.grant_role(&admin(), Role::Minter, &user()).unwrap();
        registry.grant_role(&admin(), Role::Minter, &user()).unwrap();
        assert_eq!(registry.members(Role::Minter).len(), 1);
    }

    #[test]
    fn test_require() {
        let registry = RoleRegistry::new(admin());
        assert!(registry.require(Role::DefaultAdmin, &admin()).is_ok());
        assert!(registry.require(Role::DefaultAdmin, &user()).is_err());
    }
}
