// crates/fossil-economics/src/manager.rs
//
// Liquidity mining manager: the single source of truth for the Fossil
// reward rate and the weighting of staking pools.
//
// Each `distribute_rewards` call pays for the interval since the previous
// call:
//   1. elapsed      = now - last_distribution
//   2. total_reward = elapsed * reward_per_second
//   3. share_i      = total_reward * weight_i / total_weight   (floored)
//   4. the summed shares are funded (mint or transferFrom) and moved into
//      each pool's reservoir, then each pool is notified of its share
//   5. last_distribution = now
//   6. the supply ledger records total_reward as pending
//
// Pools live in an arena: a `PoolId` is the slot index, assigned once and
// never reused. Removing a pool tombstones its slot so iteration order and
// ids stay stable.
//
// Roles are held by an external `AccessControl` provider; the manager only
// asks it.

use serde::{Deserialize, Serialize};

use fossil_core::{
    AccessControl, Address, Amount, FossilError, PoolDirectory, RewardToken, Role, SupplyLedger,
    Timestamp,
};

use crate::access::ensure_role;
use crate::rewards::split_by_weight;

/// Longest interval a reward rate must be able to pay for without overflow.
pub const MAX_RATE_HORIZON_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Stable handle of a registered pool (its arena slot index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolId(pub usize);

/// One slot of the pool registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSlot {
    pub id: PoolId,
    pub address: Address,
    pub weight: u64,
    /// False once the pool has been removed.
    pub active: bool,
}

/// Where the Fossil paid out on each distribution comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RewardFunding {
    /// Mint new Fossil. The manager must hold `Role::Minter` on the token.
    Mint,
    /// Pull existing Fossil from `source`, which must have approved the manager.
    TransferFrom { source: Address },
}

/// A single pool's cut of a distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolAllocation {
    pub pool_id: PoolId,
    pub pool: Address,
    pub reservoir: Address,
    pub amount: Amount,
}

/// What a `distribute_rewards` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionReport {
    pub elapsed: Timestamp,
    pub total_reward: Amount,
    pub allocations: Vec<PoolAllocation>,
    /// Rounding remainder not allocated to any pool.
    pub dust: Amount,
}

impl DistributionReport {
    fn noop(elapsed: Timestamp) -> Self {
        Self {
            elapsed,
            total_reward: 0,
            allocations: Vec::new(),
            dust: 0,
        }
    }

    pub fn distributed(&self) -> Amount {
        self.allocations.iter().map(|a| a.amount).sum()
    }

    pub fn is_noop(&self) -> bool {
        self.total_reward == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityMiningManager {
    address: Address,
    funding: RewardFunding,
    pools: Vec<PoolSlot>,
    total_weight: u64,
    reward_per_second: Amount,
    last_distribution: Timestamp,
}

impl LiquidityMiningManager {
    /// Create a manager whose first distribution interval starts at `now`.
    pub fn new(address: Address, funding: RewardFunding, now: Timestamp) -> Self {
        Self {
            address,
            funding,
            pools: Vec::new(),
            total_weight: 0,
            reward_per_second: 0,
            last_distribution: now,
        }
    }

    /// Register a staking pool with the given weight.
    ///
    /// # Errors
    /// - `FossilError::Unauthorized` if `caller` lacks `Role::Governance`.
    /// - `FossilError::InvalidWeight` if the pool is already registered or the
    ///   total weight would overflow.
    pub fn add_pool(
        &mut self,
        caller: &Address,
        acl: &dyn AccessControl,
        pool: Address,
        weight: u64,
    ) -> Result<PoolId, FossilError> {
        ensure_role(acl, Role::Governance, caller)?;
        if self.pools.iter().any(|p| p.active && p.address == pool) {
            return Err(FossilError::InvalidWeight(format!(
                "Pool {} is already registered",
                pool
            )));
        }
        let total_weight = self.total_weight.checked_add(weight).ok_or_else(|| {
            FossilError::InvalidWeight(format!("Weight {} overflows the total weight", weight))
        })?;

        let id = PoolId(self.pools.len());
        self.pools.push(PoolSlot {
            id,
            address: pool,
            weight,
            active: true,
        });
        self.total_weight = total_weight;
        tracing::info!(
            "Added pool {} as #{} with weight {} (total weight {})",
            pool,
            id.0,
            weight,
            total_weight
        );
        Ok(id)
    }

    /// Change the weight of a registered pool.
    ///
    /// The new weight applies to the whole interval paid by the next
    /// distribution; distribute first to settle the old weights.
    pub fn adjust_weight(
        &mut self,
        caller: &Address,
        acl: &dyn AccessControl,
        pool_id: PoolId,
        weight: u64,
    ) -> Result<(), FossilError> {
        ensure_role(acl, Role::Governance, caller)?;
        let old = self.active_slot(pool_id)?.weight;
        let total_weight = (self.total_weight - old).checked_add(weight).ok_or_else(|| {
            FossilError::InvalidWeight(format!("Weight {} overflows the total weight", weight))
        })?;

        self.pools[pool_id.0].weight = weight;
        self.total_weight = total_weight;
        tracing::info!(
            "Pool #{} weight {} -> {} (total weight {})",
            pool_id.0,
            old,
            weight,
            total_weight
        );
        Ok(())
    }

    /// Deregister a pool. Its slot is kept as a tombstone.
    pub fn remove_pool(
        &mut self,
        caller: &Address,
        acl: &dyn AccessControl,
        pool_id: PoolId,
    ) -> Result<(), FossilError> {
        ensure_role(acl, Role::Governance, caller)?;
        let weight = self.active_slot(pool_id)?.weight;

        let slot = &mut self.pools[pool_id.0];
        slot.active = false;
        slot.weight = 0;
        self.total_weight -= weight;
        tracing::info!(
            "Removed pool #{} (total weight {})",
            pool_id.0,
            self.total_weight
        );
        Ok(())
    }

    /// Set the per-second reward rate used from the next distribution on.
    ///
    /// # Errors
    /// - `FossilError::Unauthorized` if `caller` lacks `Role::Governance`.
    /// - `FossilError::InvalidRate` if `MAX_RATE_HORIZON_SECS` at this rate
    ///   would overflow.
    pub fn set_reward_per_second(
        &mut self,
        caller: &Address,
        acl: &dyn AccessControl,
        rate: Amount,
    ) -> Result<(), FossilError> {
        ensure_role(acl, Role::Governance, caller)?;
        if rate.checked_mul(MAX_RATE_HORIZON_SECS as u128).is_none() {
            return Err(FossilError::InvalidRate(format!(
                "Reward rate {} per second is too large",
                rate
            )));
        }
        self.reward_per_second = rate;
        tracing::info!("Reward rate set to {} atto/s", rate);
        Ok(())
    }

    /// Change the funding source for future distributions.
    pub fn set_funding(
        &mut self,
        caller: &Address,
        acl: &dyn AccessControl,
        funding: RewardFunding,
    ) -> Result<(), FossilError> {
        ensure_role(acl, Role::Governance, caller)?;
        tracing::info!("Reward funding set to {:?}", funding);
        self.funding = funding;
        Ok(())
    }

    /// Pay out the rewards accrued since the previous distribution.
    ///
    /// Zero elapsed time, a zero rate, or a zero total weight make this a
    /// no-op that still moves the checkpoint to `now`. A `now` earlier than
    /// the checkpoint counts as zero elapsed and leaves the checkpoint alone.
    ///
    /// Every registered pool is resolved, and must accept its share through
    /// `RewardSink::can_accept`, before any Fossil moves. After funding
    /// succeeds nothing else can fail, so a failing call changes nothing.
    ///
    /// # Errors
    /// - `FossilError::Unauthorized` if `caller` lacks `Role::Distributor`, or a
    ///   pool does not accept rewards from this manager.
    /// - `FossilError::NotFound` if a registered pool is missing from `pools`.
    /// - Any error a pool reports from `can_accept`, such as
    ///   `ArithmeticOverflow` when its share cannot be split.
    /// - Funding errors from the token (`InsufficientBalance`,
    ///   `InsufficientAllowance`, `SupplyCapExceeded`, `Unauthorized`).
    pub fn distribute_rewards(
        &mut self,
        caller: &Address,
        now: Timestamp,
        acl: &dyn AccessControl,
        token: &mut dyn RewardToken,
        pools: &mut dyn PoolDirectory,
        supply: &mut dyn SupplyLedger,
    ) -> Result<DistributionReport, FossilError> {
        ensure_role(acl, Role::Distributor, caller)?;

        let elapsed = now.saturating_sub(self.last_distribution);
        if elapsed == 0 || self.reward_per_second == 0 || self.total_weight == 0 {
            self.last_distribution = self.last_distribution.max(now);
            tracing::debug!(
                "Nothing to distribute ({}s elapsed, {} atto/s, total weight {})",
                elapsed,
                self.reward_per_second,
                self.total_weight
            );
            return Ok(DistributionReport::noop(elapsed));
        }

        let total_reward = (elapsed as u128)
            .checked_mul(self.reward_per_second)
            .ok_or_else(|| {
                FossilError::ArithmeticOverflow(format!(
                    "{} seconds at {} per second overflows",
                    elapsed, self.reward_per_second
                ))
            })?;

        let active: Vec<&PoolSlot> = self.pools.iter().filter(|p| p.active).collect();
        let weights: Vec<u64> = active.iter().map(|p| p.weight).collect();
        let split = split_by_weight(total_reward, &weights)?;

        let mut allocations = Vec::with_capacity(active.len());
        for (slot, &amount) in active.iter().zip(&split.shares) {
            let sink = pools.sink(&slot.address).ok_or_else(|| {
                FossilError::NotFound(format!("Registered pool {} is not deployed", slot.address))
            })?;
            if sink.reward_distributor() != self.address {
                return Err(FossilError::Unauthorized(format!(
                    "Pool {} does not accept rewards from manager {}",
                    slot.address, self.address
                )));
            }
            let reservoir = pools
                .reservoir_of(&slot.address)
                .filter(|r| !r.is_zero())
                .ok_or_else(|| {
                    FossilError::NotFound(format!("Pool {} has no rewards pool", slot.address))
                })?;
            if amount > 0 {
                sink.can_accept(&self.address, amount)?;
            }
            allocations.push(PoolAllocation {
                pool_id: slot.id,
                pool: slot.address,
                reservoir,
                amount,
            });
        }

        // Last fallible step; the manager then holds the whole sum.
        let distributed = split.distributed();
        if distributed > 0 {
            match &self.funding {
                RewardFunding::Mint => token.mint(&self.address, &self.address, distributed)?,
                RewardFunding::TransferFrom { source } => {
                    token.transfer_from(&self.address, source, &self.address, distributed)?
                }
            }
        }

        for allocation in &allocations {
            if allocation.amount == 0 {
                continue;
            }
            token.transfer(&self.address, &allocation.reservoir, allocation.amount)?;
            if let Some(sink) = pools.sink_mut(&allocation.pool) {
                sink.on_reward_received(&self.address, allocation.amount)?;
            }
        }

        self.last_distribution = now;
        supply.record_pending(&self.address, total_reward);

        tracing::info!(
            "Distributed {} of {} atto over {}s to {} pools (dust {})",
            distributed,
            total_reward,
            elapsed,
            allocations.len(),
            split.dust
        );
        Ok(DistributionReport {
            elapsed,
            total_reward,
            allocations,
            dust: split.dust,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn funding(&self) -> &RewardFunding {
        &self.funding
    }

    /// All registry slots, including removed ones, in id order.
    pub fn pools(&self) -> &[PoolSlot] {
        &self.pools
    }

    pub fn pool(&self, pool_id: PoolId) -> Option<&PoolSlot> {
        self.pools.get(pool_id.0)
    }

    pub fn pool_id_of(&self, pool: &Address) -> Option<PoolId> {
        self.pools
            .iter()
            .find(|p| p.active && p.address == *pool)
            .map(|p| p.id)
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn reward_per_second(&self) -> Amount {
        self.reward_per_second
    }

    pub fn last_distribution(&self) -> Timestamp {
        self.last_distribution
    }

    fn active_slot(&self, pool_id: PoolId) -> Result<&PoolSlot, FossilError> {
        self.pools
            .get(pool_id.0)
            .filter(|p| p.active)
            .ok_or_else(|| FossilError::NotFound(format!("No active pool with id {}", pool_id.0)))
    }
}
