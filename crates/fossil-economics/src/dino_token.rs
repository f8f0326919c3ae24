// crates/fossil-economics/src/dino_token.rs
//
// The Dino collectible: an ERC-721 style ownership ledger with sequential
// ids, per-token approvals (cleared on every transfer), operator approvals,
// and owner-only minting.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use fossil_core::{Address, AssetId, FossilError, StakeAsset};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DinoToken {
    address: Address,
    base_uri: String,
    /// Deployer; the only account allowed to mint.
    owner: Address,
    next_id: AssetId,
    owners: BTreeMap<AssetId, Address>,
    token_approvals: BTreeMap<AssetId, Address>,
    /// operator_approvals[owner] = operators approved for all of owner's assets
    operator_approvals: BTreeMap<Address, BTreeSet<Address>>,
}

impl DinoToken {
    pub fn new(address: Address, base_uri: &str, owner: Address) -> Self {
        Self {
            address,
            base_uri: base_uri.to_string(),
            owner,
            next_id: 0,
            owners: BTreeMap::new(),
            token_approvals: BTreeMap::new(),
            operator_approvals: BTreeMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Mint the next sequential asset id to `to`.
    pub fn mint(&mut self, caller: &Address, to: &Address) -> Result<AssetId, FossilError> {
        if *caller != self.owner {
            return Err(FossilError::Unauthorized(format!(
                "{} may not mint Dino assets",
                caller
            )));
        }
        if to.is_zero() {
            return Err(FossilError::TransferRejected(
                "Cannot mint to the zero address".to_string(),
            ));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.owners.insert(id, *to);
        Ok(id)
    }

    /// Mint `count` assets to `to`, returning their ids in order.
    pub fn mint_batch(
        &mut self,
        caller: &Address,
        to: &Address,
        count: u64,
    ) -> Result<Vec<AssetId>, FossilError> {
        (0..count).map(|_| self.mint(caller, to)).collect()
    }

    /// Number of assets held by `owner`.
    pub fn balance_of(&self, owner: &Address) -> u64 {
        self.owners.values().filter(|o| *o == owner).count() as u64
    }

    pub fn total_minted(&self) -> u64 {
        self.next_id
    }

    pub fn token_uri(&self, asset_id: AssetId) -> Result<String, FossilError> {
        self.owner_of(asset_id)?;
        Ok(format!("{}{}", self.base_uri, asset_id))
    }

    pub fn get_approved(&self, asset_id: AssetId) -> Option<Address> {
        self.token_approvals.get(&asset_id).copied()
    }

    pub fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        self.operator_approvals
            .get(owner)
            .map(|ops| ops.contains(operator))
            .unwrap_or(false)
    }

    pub fn set_approval_for_all(&mut self, caller: &Address, operator: &Address, approved: bool) {
        let ops = self.operator_approvals.entry(*caller).or_default();
        if approved {
            ops.insert(*operator);
        } else {
            ops.remove(operator);
        }
    }
}

impl StakeAsset for DinoToken {
    fn owner_of(&self, asset_id: AssetId) -> Result<Address, FossilError> {
        self.owners
            .get(&asset_id)
            .copied()
            .ok_or_else(|| FossilError::NotFound(format!("Dino asset {} does not exist", asset_id)))
    }

    fn is_approved_or_owner(&self, operator: &Address, asset_id: AssetId) -> bool {
        match self.owners.get(&asset_id) {
            Some(owner) => {
                owner == operator
                    || self.get_approved(asset_id).as_ref() == Some(operator)
                    || self.is_approved_for_all(owner, operator)
            }
            None => false,
        }
    }

    fn approve(
        &mut self,
        caller: &Address,
        operator: &Address,
        asset_id: AssetId,
    ) -> Result<(), FossilError> {
        let owner = self.owner_of(asset_id)?;
        if owner != *caller && !self.is_approved_for_all(&owner, caller) {
            return Err(FossilError::Unauthorized(format!(
                "{} may not approve Dino asset {}",
                caller, asset_id
            )));
        }
        self.token_approvals.insert(asset_id, *operator);
        Ok(())
    }

    fn safe_transfer_from(
        &mut self,
        operator: &Address,
        from: &Address,
        to: &Address,
        asset_id: AssetId,
    ) -> Result<(), FossilError> {
        let owner = self.owner_of(asset_id)?;
        if owner != *from {
            return Err(FossilError::TransferRejected(format!(
                "Dino asset {} is not owned by {}",
                asset_id, from
            )));
        }
        if !self.is_approved_or_owner(operator, asset_id) {
            return Err(FossilError::TransferRejected(format!(
                "{} is not approved for Dino asset {}",
                operator, asset_id
            )));
        }
        if to.is_zero() {
            return Err(FossilError::TransferRejected(
                "Cannot transfer to the zero address".to_string(),
            ));
        }

        self.token_approvals.remove(&asset_id);
        self.owners.insert(asset_id, *to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(n: u8) -> Address {
        Address::derive(&format!("user_{}", n))
    }

    fn deploy_with(count: u64) -> DinoToken {
        let mut dino = DinoToken::new(Address::derive("dino-token"), "https://dinotoken/", user(1));
        dino.mint_batch(&user(1), &user(1), count).unwrap();
        dino
    }

    #[test]
    fn test_mint_sequential_ids() {
        let mut dino = DinoToken::new(Address::derive("dino-token"), "uri/", user(1));
        assert_eq!(dino.mint(&user(1), &user(2)).unwrap(), 0);
        assert_eq!(dino.mint(&user(1), &user(2)).unwrap(), 1);
        assert_eq!(dino.balance_of(&user(2)), 2);
        assert_eq!(dino.total_minted(), 2);
    }

    #[test]
    fn test_only_owner_mints() {
        let mut dino = deploy_with(0);
        assert!(matches!(
            dino.mint(&user(2), &user(2)),
            Err(FossilError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_token_uri() {
        let dino = deploy_with(1);
        assert_eq!(dino.token_uri(0).unwrap(), "https://dinotoken/0");
        assert!(dino.token_uri(5).is_err());
    }

    #[test]
    fn test_owner_transfers_two_assets() {
        let mut dino = deploy_with(3);
        dino.safe_transfer_from(&user(1), &user(1), &user(2), 0).unwrap();
        dino.safe_transfer_from(&user(1), &user(1), &user(2), 1).unwrap();
        assert_eq!(dino.balance_of(&user(2)), 2);
        assert_eq!(dino.owner_of(2).unwrap(), user(1));
    }

    #[test]
    fn test_approved_operator_transfers_and_approval_clears() {
        let mut dino = deploy_with(1);
        let pool = Address::derive("pool");
        dino.approve(&user(1), &pool, 0).unwrap();
        assert!(dino.is_approved_or_owner(&pool, 0));

        dino.safe_transfer_from(&pool, &user(1), &pool, 0).unwrap();
        assert_eq!(dino.owner_of(0).unwrap(), pool);
        assert_eq!(dino.get_approved(0), None);
    }

    #[test]
    fn test_unapproved_operator_rejected() {
        let mut dino = deploy_with(1);
        let result = dino.safe_transfer_from(&user(2), &user(1), &user(2), 0);
        assert!(matches!(result, Err(FossilError::TransferRejected(_))));
        assert_eq!(dino.owner_of(0).unwrap(), user(1));
    }

    #[test]
    fn test_operator_approval_for_all() {
        let mut dino = deploy_with(2);
        dino.set_approval_for_all(&user(1), &user(3), true);
        assert!(dino.is_approved_or_owner(&user(3), 1));
        dino.set_approval_for_all(&user(1), &user(3), false);
        assert!(!dino.is_approved_or_owner(&user(3), 1));
    }

    #[test]
    fn test_transfer_to_zero_rejected() {
        let mut dino = deploy_with(1);
        assert!(dino
            .safe_transfer_from(&user(1), &user(1), &Address::ZERO, 0)
            .is_err());
    }

    #[test]
    fn test_approve_requires_owner() {
        let mut dino = deploy_with(1);
        assert!(dino.approve(&user(2), &user(2), 0).is_err());
    }
}
