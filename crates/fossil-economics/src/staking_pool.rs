// crates/fossil-economics/src/staking_pool.rs
//
// Dino staking pool: custody of staked Dino assets and the time-locked
// deposit ledger that accrues Fossil rewards.
//
// Lifecycle of a deposit:
//   Active   (created by `deposit`, accrues on every `on_reward_received`)
//   Withdrawn (terminal; record removed by `withdraw` once the lock expires)
//
// Each deposit carries a share weight derived from its lock duration:
//   share_weight = BONUS_BASE + max_bonus_bps * min(lock, max_lock) / max_lock
// With `max_bonus_bps = 0` every deposit weighs the same.
//
// Rewards that arrive while the pool has no active deposits are carried
// forward in `unassigned_reward` and handed out with the next distribution
// that finds deposits.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use fossil_core::{
    Address, Amount, AssetId, FossilError, FundingReservoir, RewardSink, RewardToken, StakeAsset,
    Timestamp,
};

use crate::rewards::split_by_weight;

/// Share weight of a deposit with no lock bonus.
pub const BONUS_BASE: u64 = 10_000;

/// Largest accepted bonus: +1000% (an 11x share weight).
pub const MAX_BONUS_BPS: u64 = 100_000;

/// Lock-duration bonus parameters for a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockBonus {
    /// Extra share weight, in basis points of `BONUS_BASE`, at the maximum lock.
    pub max_bonus_bps: u64,
    /// Lock duration (seconds) at which the full bonus applies.
    pub max_lock_duration: Timestamp,
}

impl LockBonus {
    /// Equal weight for every deposit regardless of lock.
    pub fn none() -> Self {
        Self {
            max_bonus_bps: 0,
            max_lock_duration: 0,
        }
    }

    /// Share weight for a deposit locked for `lock_duration` seconds.
    pub fn share_weight(&self, lock_duration: Timestamp) -> u64 {
        if self.max_bonus_bps == 0 || self.max_lock_duration == 0 {
            return BONUS_BASE;
        }
        let capped = lock_duration.min(self.max_lock_duration) as u128;
        let bonus = self.max_bonus_bps as u128 * capped / self.max_lock_duration as u128;
        // bonus <= MAX_BONUS_BPS, enforced by StakingPool::new
        BONUS_BASE + bonus as u64
    }
}

/// One staked asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub asset_id: AssetId,
    /// Address entitled to withdraw.
    pub depositor: Address,
    pub deposited_at: Timestamp,
    pub lock_duration: Timestamp,
    /// Relative weight used when splitting incoming rewards.
    pub share_weight: u64,
    /// Reward credited but not yet paid out (in atto).
    pub accrued_reward: Amount,
}

impl Deposit {
    /// First timestamp at which the deposit may be withdrawn.
    pub fn unlocks_at(&self) -> Timestamp {
        self.deposited_at.saturating_add(self.lock_duration)
    }

    pub fn is_unlocked(&self, now: Timestamp) -> bool {
        now >= self.unlocks_at()
    }
}

/// Outcome of a successful withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawReceipt {
    pub asset_id: AssetId,
    pub depositor: Address,
    /// Reward paid out from the reservoir (in atto).
    pub reward: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingPool {
    address: Address,
    name: String,
    symbol: String,
    /// The only caller allowed to push rewards (the liquidity mining manager).
    distributor: Address,
    /// Reservoir that pays out accrued rewards.
    reservoir: Address,
    bonus: LockBonus,
    /// Active deposits in creation order.
    deposits: Vec<Deposit>,
    /// Rewards received while no deposit was active.
    unassigned_reward: Amount,
    /// Rounding remainders lost while splitting rewards.
    dust_lost: Amount,
    total_received: Amount,
    total_paid_out: Amount,
}

impl StakingPool {
    /// Create a pool that accepts rewards from `distributor` and pays them
    /// out through `reservoir`.
    ///
    /// # Errors
    /// Returns `FossilError::InvalidConfig` if the bonus exceeds `MAX_BONUS_BPS`.
    pub fn new(
        address: Address,
        name: &str,
        symbol: &str,
        distributor: Address,
        reservoir: Address,
        bonus: LockBonus,
    ) -> Result<Self, FossilError> {
        if bonus.max_bonus_bps > MAX_BONUS_BPS {
            return Err(FossilError::InvalidConfig(format!(
                "Lock bonus {} bps exceeds the maximum of {} bps",
                bonus.max_bonus_bps, MAX_BONUS_BPS
            )));
        }

        Ok(Self {
            address,
            name: name.to_string(),
            symbol: symbol.to_string(),
            distributor,
            reservoir,
            bonus,
            deposits: Vec::new(),
            unassigned_reward: 0,
            dust_lost: 0,
            total_received: 0,
            total_paid_out: 0,
        })
    }

    /// Stake `asset_ids` on behalf of `recipient`.
    ///
    /// Every asset must be owned by `caller` and approved for the pool. All
    /// assets are checked before any is moved, so a rejected batch leaves
    /// ownership untouched. A `lock_duration` of 0 is withdrawable at once.
    ///
    /// # Errors
    /// Returns `FossilError::TransferRejected` if an asset is not owned by the
    /// caller, is not approved for the pool, or appears twice.
    pub fn deposit(
        &mut self,
        caller: &Address,
        asset_ids: &[AssetId],
        lock_duration: Timestamp,
        recipient: &Address,
        now: Timestamp,
        assets: &mut dyn StakeAsset,
    ) -> Result<Vec<Deposit>, FossilError> {
        if recipient.is_zero() {
            return Err(FossilError::TransferRejected(
                "Deposit recipient cannot be the zero address".to_string(),
            ));
        }
        if now.checked_add(lock_duration).is_none() {
            return Err(FossilError::ArithmeticOverflow(format!(
                "Lock of {} seconds from {} overflows",
                lock_duration, now
            )));
        }

        let mut seen = BTreeSet::new();
        for &asset_id in asset_ids {
            if !seen.insert(asset_id) {
                return Err(FossilError::TransferRejected(format!(
                    "Dino asset {} listed more than once",
                    asset_id
                )));
            }
            let owner = assets.owner_of(asset_id).map_err(|e| {
                FossilError::TransferRejected(format!("Dino asset {}: {}", asset_id, e))
            })?;
            if owner != *caller {
                return Err(FossilError::TransferRejected(format!(
                    "Dino asset {} is not owned by {}",
                    asset_id, caller
                )));
            }
            if !assets.is_approved_or_owner(&self.address, asset_id) {
                return Err(FossilError::TransferRejected(format!(
                    "Pool {} is not approved for Dino asset {}",
                    self.address, asset_id
                )));
            }
        }

        let share_weight = self.bonus.share_weight(lock_duration);
        let mut created = Vec::with_capacity(asset_ids.len());
        for &asset_id in asset_ids {
            assets.safe_transfer_from(&self.address, caller, &self.address, asset_id)?;
            let deposit = Deposit {
                asset_id,
                depositor: *recipient,
                deposited_at: now,
                lock_duration,
                share_weight,
                accrued_reward: 0,
            };
            self.deposits.push(deposit.clone());
            created.push(deposit);
        }

        tracing::info!(
            "Pool {}: {} deposited {} assets (lock {}s, share weight {})",
            self.name,
            recipient,
            created.len(),
            lock_duration,
            share_weight
        );
        Ok(created)
    }

    /// Withdraw a staked asset and pay out its accrued reward.
    ///
    /// The deposit leaves the ledger before the reservoir is asked to pay,
    /// and goes back in at the same position if the payout fails, so the
    /// reward can never be claimed twice.
    ///
    /// # Errors
    /// - `FossilError::NotFound` if `asset_id` is not an active deposit of `caller`.
    /// - `FossilError::LockNotExpired` if `now < deposited_at + lock_duration`.
    /// - `FossilError::InsufficientFunds` if the reservoir cannot cover the
    ///   reward. The deposit is kept and the withdrawal may be retried.
    pub fn withdraw(
        &mut self,
        caller: &Address,
        asset_id: AssetId,
        now: Timestamp,
        assets: &mut dyn StakeAsset,
        reservoir: &mut dyn FundingReservoir,
        token: &mut dyn RewardToken,
    ) -> Result<WithdrawReceipt, FossilError> {
        let index = self
            .deposits
            .iter()
            .position(|d| d.asset_id == asset_id && d.depositor == *caller)
            .ok_or_else(|| {
                FossilError::NotFound(format!(
                    "No active deposit of Dino asset {} for {}",
                    asset_id, caller
                ))
            })?;

        let unlocks_at = self.deposits[index].unlocks_at();
        if now < unlocks_at {
            return Err(FossilError::LockNotExpired {
                asset_id,
                unlocks_at,
            });
        }
        if reservoir.address() != self.reservoir {
            return Err(FossilError::InvalidConfig(format!(
                "Reservoir {} does not fund pool {}",
                reservoir.address(),
                self.name
            )));
        }
        // Custody check makes the asset return below infallible.
        if assets.owner_of(asset_id)? != self.address {
            return Err(FossilError::TransferRejected(format!(
                "Dino asset {} is not in pool custody",
                asset_id
            )));
        }

        let deposit = self.deposits.remove(index);
        let reward = deposit.accrued_reward;
        if reward > 0 {
            if let Err(e) = reservoir.release(&self.address, &deposit.depositor, reward, token) {
                tracing::warn!(
                    "Pool {}: payout of {} atto for asset {} failed, deposit kept: {}",
                    self.name,
                    reward,
                    asset_id,
                    e
                );
                self.deposits.insert(index, deposit);
                return Err(e);
            }
        }
        self.total_paid_out = self.total_paid_out.saturating_add(reward);

        assets.safe_transfer_from(&self.address, &self.address, &deposit.depositor, asset_id)?;

        tracing::info!(
            "Pool {}: {} withdrew asset {} with {} atto reward",
            self.name,
            deposit.depositor,
            asset_id,
            reward
        );
        Ok(WithdrawReceipt {
            asset_id,
            depositor: deposit.depositor,
            reward,
        })
    }

    /// Active deposits of `owner`, in deposit order.
    pub fn get_deposits_of(&self, owner: &Address) -> Vec<Deposit> {
        self.deposits
            .iter()
            .filter(|d| d.depositor == *owner)
            .cloned()
            .collect()
    }

    /// Total reward accrued but not yet paid to `owner`.
    pub fn pending_reward_of(&self, owner: &Address) -> Amount {
        self.deposits
            .iter()
            .filter(|d| d.depositor == *owner)
            .map(|d| d.accrued_reward)
            .sum()
    }

    pub fn deposits(&self) -> &[Deposit] {
        &self.deposits
    }

    pub fn total_share_weight(&self) -> u128 {
        self.deposits.iter().map(|d| d.share_weight as u128).sum()
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

    pub fn bonus(&self) -> LockBonus {
        self.bonus
    }

    pub fn reservoir(&self) -> Address {
        self.reservoir
    }

    pub fn unassigned_reward(&self) -> Amount {
        self.unassigned_reward
    }

    pub fn dust_lost(&self) -> Amount {
        self.dust_lost
    }

    pub fn total_received(&self) -> Amount {
        self.total_received
    }

    pub fn total_paid_out(&self) -> Amount {
        self.total_paid_out
    }
}

/// Post-credit values computed by `StakingPool::plan_credit`.
struct RewardCredit {
    total_received: Amount,
    /// Per-deposit accrued totals, or `None` when the reward is carried forward.
    accrued: Option<Vec<Amount>>,
    unassigned_reward: Amount,
    dust_lost: Amount,
    dust: Amount,
}

impl StakingPool {
    fn require_distributor(&self, caller: &Address) -> Result<(), FossilError> {
        if *caller != self.distributor {
            return Err(FossilError::Unauthorized(format!(
                "{} may not distribute rewards to pool {}",
                caller, self.name
            )));
        }
        Ok(())
    }

    /// Compute the effect of crediting `amount` without touching the ledger.
    fn plan_credit(&self, amount: Amount) -> Result<RewardCredit, FossilError> {
        let overflow = || FossilError::ArithmeticOverflow("Pool reward total overflow".to_string());
        let total_received = self.total_received.checked_add(amount).ok_or_else(overflow)?;
        let pot = self.unassigned_reward.checked_add(amount).ok_or_else(overflow)?;

        if self.deposits.is_empty() {
            return Ok(RewardCredit {
                total_received,
                accrued: None,
                unassigned_reward: pot,
                dust_lost: self.dust_lost,
                dust: 0,
            });
        }

        let weights: Vec<u64> = self.deposits.iter().map(|d| d.share_weight).collect();
        let split = split_by_weight(pot, &weights)?;

        let mut accrued = Vec::with_capacity(self.deposits.len());
        for (deposit, share) in self.deposits.iter().zip(&split.shares) {
            accrued.push(deposit.accrued_reward.checked_add(*share).ok_or_else(overflow)?);
        }
        let dust_lost = self.dust_lost.checked_add(split.dust).ok_or_else(overflow)?;

        Ok(RewardCredit {
            total_received,
            accrued: Some(accrued),
            unassigned_reward: 0,
            dust_lost,
            dust: split.dust,
        })
    }
}

impl RewardSink for StakingPool {
    fn reward_distributor(&self) -> Address {
        self.distributor
    }

    fn can_accept(&self, caller: &Address, amount: Amount) -> Result<(), FossilError> {
        self.require_distributor(caller)?;
        self.plan_credit(amount).map(|_| ())
    }

    /// Spread `amount` (plus any carried-forward reward) over active deposits.
    fn on_reward_received(&mut self, caller: &Address, amount: Amount) -> Result<(), FossilError> {
        self.require_distributor(caller)?;
        let credit = self.plan_credit(amount)?;

        self.total_received = credit.total_received;
        self.unassigned_reward = credit.unassigned_reward;
        self.dust_lost = credit.dust_lost;
        match credit.accrued {
            None => {
                tracing::debug!(
                    "Pool {}: no active deposits, {} atto carried forward",
                    self.name,
                    credit.unassigned_reward
                );
            }
            Some(accrued) => {
                for (deposit, value) in self.deposits.iter_mut().zip(accrued) {
                    deposit.accrued_reward = value;
                }
                tracing::debug!(
                    "Pool {}: credited {} atto to {} deposits (dust {})",
                    self.name,
                    amount,
                    self.deposits.len(),
                    credit.dust
                );
            }
        }
        Ok(())
    }
}
