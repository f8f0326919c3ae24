// crates/fossil-economics/src/fossil_token.rs
//
// The Fossil (FOS) reward token: an ERC-20 style balance ledger with
// allowances, role-gated minting, burning, an optional supply cap, and an
// administrative owner that can be handed over.
//
// Roles live in the token's own registry:
//   - DefaultAdmin: grants/revokes roles. Held by every owner so far.
//   - Minter: may call `mint`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use fossil_core::{AccessControl, Address, Amount, FossilError, RewardToken, Role};

use crate::access::RoleRegistry;
use crate::token::DECIMALS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FossilToken {
    address: Address,
    name: String,
    symbol: String,
    total_supply: Amount,
    /// Upper bound on `total_supply`, if any.
    max_supply: Option<Amount>,
    balances: BTreeMap<Address, Amount>,
    /// allowances[owner][spender]
    allowances: BTreeMap<Address, BTreeMap<Address, Amount>>,
    roles: RoleRegistry,
    contract_owner: Address,
}

impl FossilToken {
    /// Deploy the token, minting `initial_supply` to `owner`.
    ///
    /// `owner` becomes the contract owner and receives `DefaultAdmin`.
    ///
    /// # Errors
    /// Returns `FossilError::SupplyCapExceeded` if `initial_supply` exceeds `max_supply`.
    pub fn new(
        address: Address,
        name: &str,
        symbol: &str,
        initial_supply: Amount,
        owner: Address,
        max_supply: Option<Amount>,
    ) -> Result<Self, FossilError> {
        if let Some(cap) = max_supply {
            if initial_supply > cap {
                return Err(FossilError::SupplyCapExceeded {
                    cap,
                    attempted: initial_supply,
                });
            }
        }

        let mut balances = BTreeMap::new();
        if initial_supply > 0 {
            balances.insert(owner, initial_supply);
        }

        Ok(Self {
            address,
            name: name.to_string(),
            symbol: symbol.to_string(),
            total_supply: initial_supply,
            max_supply,
            balances,
            allowances: BTreeMap::new(),
            roles: RoleRegistry::new(owner),
            contract_owner: owner,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    pub fn max_supply(&self) -> Option<Amount> {
        self.max_supply
    }

    pub fn contract_owner(&self) -> Address {
        self.contract_owner
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Set `spender`'s allowance over `owner`'s balance (overwrites).
    pub fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<(), FossilError> {
        if spender.is_zero() {
            return Err(FossilError::TransferRejected(
                "Cannot approve the zero address".to_string(),
            ));
        }
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
        Ok(())
    }

    /// Destroy `amount` of the caller's own balance.
    pub fn burn(&mut self, caller: &Address, amount: Amount) -> Result<(), FossilError> {
        let balance = self.balance_of(caller);
        if amount > balance {
            return Err(FossilError::InsufficientBalance {
                requested: amount,
                available: balance,
            });
        }
        self.set_balance(caller, balance - amount);
        self.total_supply -= amount;
        tracing::info!("Burned {} atto from {}", amount, caller);
        Ok(())
    }

    /// Hand administrative ownership to `new_owner`.
    ///
    /// Only the current owner may call this. The new owner is recorded and
    /// granted `DefaultAdmin`; grants held by the previous owner are kept.
    pub fn change_contract_owner(
        &mut self,
        caller: &Address,
        new_owner: &Address,
    ) -> Result<(), FossilError> {
        if *caller != self.contract_owner {
            return Err(FossilError::Unauthorized(format!(
                "{} is not the contract owner",
                caller
            )));
        }
        if new_owner.is_zero() {
            return Err(FossilError::InvalidConfig(
                "New contract owner cannot be the zero address".to_string(),
            ));
        }

        self.roles.insert_grant(Role::DefaultAdmin, *new_owner);
        self.contract_owner = *new_owner;
        tracing::info!("Fossil contract owner changed to {}", new_owner);
        Ok(())
    }

    fn set_balance(&mut self, account: &Address, amount: Amount) {
        if amount == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, amount);
        }
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), FossilError> {
        if to.is_zero() {
            return Err(FossilError::TransferRejected(
                "Cannot transfer to the zero address".to_string(),
            ));
        }
        let from_balance = self.balance_of(from);
        if amount > from_balance {
            return Err(FossilError::InsufficientBalance {
                requested: amount,
                available: from_balance,
            });
        }
        if from == to {
            return Ok(());
        }
        // Cannot overflow: every balance is bounded by total_supply.
        let to_balance = self.balance_of(to) + amount;
        self.set_balance(from, from_balance - amount);
        self.set_balance(to, to_balance);
        Ok(())
    }
}

impl AccessControl for FossilToken {
    fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles.has_role(role, account)
    }

    fn grant_role(
        &mut self,
        caller: &Address,
        role: Role,
        account: &Address,
    ) -> Result<(), FossilError> {
        self.roles.grant_role(caller, role, account)
    }

    fn revoke_role(
        &mut self,
        caller: &Address,
        role: Role,
        account: &Address,
    ) -> Result<(), FossilError> {
        self.roles.revoke_role(caller, role, account)
    }
}

impl RewardToken for FossilToken {
    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn mint(&mut self, caller: &Address, to: &Address, amount: Amount) -> Result<(), FossilError> {
        self.roles.require(Role::Minter, caller)?;
        if to.is_zero() {
            return Err(FossilError::TransferRejected(
                "Cannot mint to the zero address".to_string(),
            ));
        }

        let new_supply = self.total_supply.checked_add(amount).ok_or_else(|| {
            FossilError::ArithmeticOverflow("Fossil total supply overflow".to_string())
        })?;
        if let Some(cap) = self.max_supply {
            if new_supply > cap {
                return Err(FossilError::SupplyCapExceeded {
                    cap,
                    attempted: new_supply,
                });
            }
        }

        let balance = self.balance_of(to) + amount;
        self.set_balance(to, balance);
        self.total_supply = new_supply;
        tracing::debug!("Minted {} atto to {}", amount, to);
        Ok(())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), FossilError> {
        self.move_balance(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), FossilError> {
        let allowed = self.allowance(from, spender);
        if amount > allowed {
            return Err(FossilError::InsufficientAllowance {
                requested: amount,
                allowed,
            });
        }
        self.move_balance(from, to, amount)?;
        if let Some(spenders) = self.allowances.get_mut(from) {
            spenders.insert(*spender, allowed - amount);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::INITIAL_SUPPLY_ATTO;

    fn user(n: u8) -> Address {
        Address::derive(&format!("user_{}", n))
    }

    fn deploy() -> FossilToken {
        FossilToken::new(
            Address::derive("fossil-token"),
            "Fossil",
            "FOS",
            INITIAL_SUPPLY_ATTO,
            user(1),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_metadata() {
        let token = deploy();
        assert_eq!(token.name(), "Fossil");
        assert_eq!(token.symbol(), "FOS");
        assert_eq!(token.decimals(), 18);
        assert_eq!(token.total_supply(), INITIAL_SUPPLY_ATTO);
        assert_eq!(token.balance_of(&user(1)), INITIAL_SUPPLY_ATTO);
    }

    #[test]
    fn test_initial_supply_above_cap() {
        let result = FossilToken::new(Address::derive("t"), "Fossil", "FOS", 100, user(1), Some(99));
        assert!(matches!(result, Err(FossilError::SupplyCapExceeded { .. })));
    }

    #[test]
    fn test_transfer() {
        let mut token = deploy();
        token.transfer(&user(1), &user(2), 500).unwrap();
        assert_eq!(token.balance_of(&user(2)), 500);
        assert_eq!(token.balance_of(&user(1)), INITIAL_SUPPLY_ATTO - 500);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut token = deploy();
        let result = token.transfer(&user(2), &user(1), 1);
        assert!(matches!(result, Err(FossilError::InsufficientBalance { .. })));
    }

    #[test]
    fn test_transfer_to_zero_rejected() {
        let mut token = deploy();
        assert!(token.transfer(&user(1), &Address::ZERO, 1).is_err());
    }

    #[test]
    fn test_transfer_from_uses_allowance() {
        let mut token = deploy();
        token.approve(&user(1), &user(2), 100).unwrap();
        token.transfer_from(&user(2), &user(1), &user(3), 60).unwrap();
        assert_eq!(token.balance_of(&user(3)), 60);
        assert_eq!(token.allowance(&user(1), &user(2)), 40);

        let result = token.transfer_from(&user(2), &user(1), &user(3), 41);
        assert!(matches!(result, Err(FossilError::InsufficientAllowance { .. })));
        assert_eq!(token.balance_of(&user(3)), 60);
    }

    #[test]
    fn test_mint_requires_minter() {
        let mut token = deploy();
        let result = token.mint(&user(1), &user(1), 10);
        assert!(matches!(result, Err(FossilError::Unauthorized(_))));

        token.grant_role(&user(1), Role::Minter, &user(1)).unwrap();
        token.mint(&user(1), &user(1), INITIAL_SUPPLY_ATTO).unwrap();
        assert_eq!(token.total_supply(), INITIAL_SUPPLY_ATTO * 2);
    }

    #[test]
    fn test_mint_respects_cap() {
        let mut token =
            FossilToken::new(Address::derive("t"), "Fossil", "FOS", 90, user(1), Some(100)).unwrap();
        token.grant_role(&user(1), Role::Minter, &user(1)).unwrap();
        token.mint(&user(1), &user(2), 10).unwrap();
        let result = token.mint(&user(1), &user(2), 1);
        assert!(matches!(
            result,
            Err(FossilError::SupplyCapExceeded { cap: 100, attempted: 101 })
        ));
        assert_eq!(token.total_supply(), 100);
    }

    #[test]
    fn test_burn() {
        let mut token = deploy();
        token.burn(&user(1), 1_000).unwrap();
        assert_eq!(token.total_supply(), INITIAL_SUPPLY_ATTO - 1_000);
        assert!(token.burn(&user(2), 1).is_err());
    }

    #[test]
    fn test_change_contract_owner_grants_admin() {
        let mut token = deploy();
        let old_owner = token.contract_owner();
        token.change_contract_owner(&user(1), &user(3)).unwrap();

        assert_ne!(old_owner, token.contract_owner());
        assert_eq!(token.contract_owner(), user(3));
        assert!(token.has_role(Role::DefaultAdmin, &user(3)));
        // The previous owner can still administer roles.
        assert!(token.grant_role(&user(1), Role::Minter, &user(1)).is_ok());
    }

    #[test]
    fn test_change_contract_owner_only_owner() {
        let mut token = deploy();
        let result = token.change_contract_owner(&user(2), &user(2));
        assert!(matches!(result, Err(FossilError::Unauthorized(_))));
        assert_eq!(token.contract_owner(), user(1));
    }
}
