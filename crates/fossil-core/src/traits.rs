// crates/fossil-core/src/traits.rs
//
// Collaborator contracts consumed by the staking pool and the liquidity
// mining manager. Components receive collaborators as `&mut dyn Trait`
// arguments for the duration of a single call and never store them.

use crate::address::{Address, Amount, AssetId};
use crate::error::FossilError;
use crate::role::Role;

/// Flat (role, address) capability set.
///
/// Implemented by the governance role registry and by the reward token for
/// its own roles.
pub trait AccessControl {
    /// Whether `account` currently holds `role`.
    fn has_role(&self, role: Role, account: &Address) -> bool;

    /// Grant `role` to `account`. `caller` must hold `Role::DefaultAdmin`.
    fn grant_role(&mut self, caller: &Address, role: Role, account: &Address)
        -> Result<(), FossilError>;

    /// Revoke `role` from `account`. `caller` must hold `Role::DefaultAdmin`.
    fn revoke_role(&mut self, caller: &Address, role: Role, account: &Address)
        -> Result<(), FossilError>;
}

/// Fungible reward token ledger (Fossil).
pub trait RewardToken {
    fn balance_of(&self, account: &Address) -> Amount;

    fn total_supply(&self) -> Amount;

    /// Mint new tokens. `caller` must hold `Role::Minter` on the token.
    fn mint(&mut self, caller: &Address, to: &Address, amount: Amount) -> Result<(), FossilError>;

    /// Move tokens owned by `from`.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount)
        -> Result<(), FossilError>;

    /// Move tokens owned by `from` using the allowance granted to `spender`.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), FossilError>;
}

/// Non-fungible ownership ledger for the staked assets (Dino).
pub trait StakeAsset {
    /// Current owner of `asset_id`. `NotFound` if it was never minted.
    fn owner_of(&self, asset_id: AssetId) -> Result<Address, FossilError>;

    /// Whether `operator` may move `asset_id` on behalf of its owner.
    fn is_approved_or_owner(&self, operator: &Address, asset_id: AssetId) -> bool;

    /// Approve `operator` for a single asset. `caller` must own it.
    fn approve(&mut self, caller: &Address, operator: &Address, asset_id: AssetId)
        -> Result<(), FossilError>;

    /// Transfer with safe-transfer checks (no zero-address target).
    fn safe_transfer_from(
        &mut self,
        operator: &Address,
        from: &Address,
        to: &Address,
        asset_id: AssetId,
    ) -> Result<(), FossilError>;
}

/// Custodian of the reward-token balance used to pay out claims.
pub trait FundingReservoir {
    /// Address under which the reservoir holds its token balance.
    fn address(&self) -> Address;

    /// Token balance currently available for release.
    fn available(&self, token: &dyn RewardToken) -> Amount;

    /// Pay `amount` to `to`. Only the authorized staking pool may call this.
    ///
    /// # Errors
    /// `FossilError::InsufficientFunds` when the balance cannot cover `amount`.
    fn release(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: Amount,
        token: &mut dyn RewardToken,
    ) -> Result<(), FossilError>;
}

/// Pending-reward bookkeeping. Purely observational: never fails the caller.
pub trait SupplyLedger {
    fn record_pending(&mut self, caller: &Address, amount: Amount);
}

/// A staking pool as seen by the liquidity mining manager.
pub trait RewardSink {
    /// Address allowed to push rewards into this pool.
    fn reward_distributor(&self) -> Address;

    /// Check that `on_reward_received(caller, amount)` would succeed, without
    /// changing anything.
    fn can_accept(&self, caller: &Address, amount: Amount) -> Result<(), FossilError>;

    /// Credit `amount` to the pool's active deposits. Must succeed whenever
    /// `can_accept` did and the pool has not changed since.
    fn on_reward_received(&mut self, caller: &Address, amount: Amount) -> Result<(), FossilError>;
}

/// Resolves registered pool addresses to reward sinks during distribution.
pub trait PoolDirectory {
    fn sink(&self, pool: &Address) -> Option<&dyn RewardSink>;

    fn sink_mut(&mut self, pool: &Address) -> Option<&mut dyn RewardSink>;

    /// Address of the reservoir that pays out `pool`'s claims.
    fn reservoir_of(&self, pool: &Address) -> Option<Address>;
}
