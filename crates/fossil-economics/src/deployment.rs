// crates/fossil-economics/src/deployment.rs
//
// Deployment: one fully wired Fossil liquidity mining system.
//
// Owns every component and hands each operation the collaborators it needs,
// so callers (the keeper daemon, integration tests) see a single ledger:
//
//   governance  RoleRegistry            Governance / Distributor roles
//   fossil      FossilToken             reward token
//   dino        DinoToken               staked asset
//   utility     UtilityManager          supply ledger
//   manager     LiquidityMiningManager  rate, weights, distribution
//   pools       StakingPools            staking pool + rewards pool per entry
//
// Component addresses are derived from fixed labels, so the same config
// always produces the same addresses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use fossil_core::{
    AccessControl, Address, Amount, AssetId, FossilError, PoolDirectory, RewardSink,
    RewardToken, Role, StakeAsset, Timestamp,
};

use crate::access::RoleRegistry;
use crate::dino_token::DinoToken;
use crate::fossil_token::FossilToken;
use crate::manager::{DistributionReport, LiquidityMiningManager, PoolId, RewardFunding};
use crate::reservoir::RewardsPool;
use crate::staking_pool::{Deposit, LockBonus, StakingPool, WithdrawReceipt};
use crate::supply::UtilityManager;
use crate::token::INITIAL_SUPPLY_ATTO;

/// How the manager funds distributions in a fresh deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingSource {
    /// The manager is granted `Minter` on the Fossil token.
    Mint,
    /// The deployer approves the manager for the whole initial supply.
    TransferFrom,
}

/// One staking pool to deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub name: String,
    /// Also the pool's address label; must be unique within a deployment.
    pub symbol: String,
    pub weight: u64,
    #[serde(default = "default_max_bonus_bps")]
    pub max_bonus_bps: u64,
    #[serde(default = "default_max_lock_duration")]
    pub max_lock_duration: Timestamp,
}

fn default_max_bonus_bps() -> u64 {
    10_000
}

fn default_max_lock_duration() -> Timestamp {
    600
}

impl PoolConfig {
    pub fn bonus(&self) -> LockBonus {
        LockBonus {
            max_bonus_bps: self.max_bonus_bps,
            max_lock_duration: self.max_lock_duration,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            name: "Staked Dino Token".to_string(),
            symbol: "SDT".to_string(),
            weight: 100,
            max_bonus_bps: default_max_bonus_bps(),
            max_lock_duration: default_max_lock_duration(),
        }
    }
}

/// Parameters of a fresh deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub token_name: String,
    pub token_symbol: String,
    /// Minted to the deployer (in atto).
    pub initial_supply: Amount,
    pub max_supply: Option<Amount>,
    pub dino_base_uri: String,
    /// Dino assets minted to the deployer at deployment.
    pub dino_premint: u64,
    /// In atto per second.
    pub reward_per_second: Amount,
    pub funding: FundingSource,
    pub pools: Vec<PoolConfig>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            token_name: "Fossil".to_string(),
            token_symbol: "FOS".to_string(),
            initial_supply: INITIAL_SUPPLY_ATTO,
            max_supply: None,
            dino_base_uri: "https://dinotoken/".to_string(),
            dino_premint: 10,
            reward_per_second: 1,
            funding: FundingSource::TransferFrom,
            pools: vec![PoolConfig::default()],
        }
    }
}

/// A staking pool together with the rewards pool that pays its claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolDeployment {
    pub pool: StakingPool,
    pub reservoir: RewardsPool,
}

/// Deployed staking pools keyed by pool address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StakingPools {
    entries: BTreeMap<Address, PoolDeployment>,
}

impl StakingPools {
    pub fn get(&self, pool: &Address) -> Option<&PoolDeployment> {
        self.entries.get(pool)
    }

    pub fn get_mut(&mut self, pool: &Address) -> Option<&mut PoolDeployment> {
        self.entries.get_mut(pool)
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &PoolDeployment)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn contains(&self, pool: &Address) -> bool {
        self.entries.contains_key(pool)
    }

    fn insert(&mut self, entry: PoolDeployment) {
        self.entries.insert(entry.pool.address(), entry);
    }

    fn require_mut(&mut self, pool: &Address) -> Result<&mut PoolDeployment, FossilError> {
        self.entries
            .get_mut(pool)
            .ok_or_else(|| FossilError::NotFound(format!("No staking pool at {}", pool)))
    }
}

impl PoolDirectory for StakingPools {
    fn sink(&self, pool: &Address) -> Option<&dyn RewardSink> {
        self.entries.get(pool).map(|e| &e.pool as &dyn RewardSink)
    }

    fn sink_mut(&mut self, pool: &Address) -> Option<&mut dyn RewardSink> {
        self.entries
            .get_mut(pool)
            .map(|e| &mut e.pool as &mut dyn RewardSink)
    }

    fn reservoir_of(&self, pool: &Address) -> Option<Address> {
        self.entries.get(pool).map(|e| e.pool.reservoir())
    }
}

pub fn fossil_token_address() -> Address {
    Address::derive("fossil-token")
}

pub fn dino_token_address() -> Address {
    Address::derive("dino-token")
}

pub fn manager_address() -> Address {
    Address::derive("liquidity-mining-manager")
}

pub fn pool_address(symbol: &str) -> Address {
    Address::derive(&format!("staking-pool:{}", symbol))
}

pub fn reservoir_address(symbol: &str) -> Address {
    Address::derive(&format!("rewards-pool:{}", symbol))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    deployer: Address,
    governance: RoleRegistry,
    fossil: FossilToken,
    dino: DinoToken,
    utility: UtilityManager,
    manager: LiquidityMiningManager,
    pools: StakingPools,
}

impl Deployment {
    /// Deploy and wire every component, with `deployer` as admin of all of
    /// them and holder of the Governance and Distributor roles.
    ///
    /// # Errors
    /// Returns `FossilError::InvalidConfig` for duplicate pool symbols or an
    /// out-of-range lock bonus, and propagates token construction errors.
    pub fn deploy(
        config: &DeploymentConfig,
        deployer: Address,
        now: Timestamp,
    ) -> Result<Self, FossilError> {
        let mut governance = RoleRegistry::new(deployer);
        governance.grant_role(&deployer, Role::Governance, &deployer)?;
        governance.grant_role(&deployer, Role::Distributor, &deployer)?;

        let mut fossil = FossilToken::new(
            fossil_token_address(),
            &config.token_name,
            &config.token_symbol,
            config.initial_supply,
            deployer,
            config.max_supply,
        )?;

        let mut dino = DinoToken::new(dino_token_address(), &config.dino_base_uri, deployer);
        dino.mint_batch(&deployer, &deployer, config.dino_premint)?;

        let funding = match config.funding {
            FundingSource::Mint => {
                fossil.grant_role(&deployer, Role::Minter, &manager_address())?;
                RewardFunding::Mint
            }
            FundingSource::TransferFrom => {
                let supply = fossil.total_supply();
                fossil.approve(&deployer, &manager_address(), supply)?;
                RewardFunding::TransferFrom { source: deployer }
            }
        };
        let mut manager = LiquidityMiningManager::new(manager_address(), funding, now);

        let mut pools = StakingPools::default();
        for pool_config in &config.pools {
            let entry = build_pool(pool_config, deployer)?;
            if pools.contains(&entry.pool.address()) {
                return Err(FossilError::InvalidConfig(format!(
                    "Duplicate pool symbol {}",
                    pool_config.symbol
                )));
            }
            manager.add_pool(&deployer, &governance, entry.pool.address(), pool_config.weight)?;
            pools.insert(entry);
        }
        manager.set_reward_per_second(&deployer, &governance, config.reward_per_second)?;

        let mut utility = UtilityManager::new(deployer);
        utility.set_contract_address(
            &deployer,
            fossil.address(),
            &pools.addresses(),
            manager.address(),
        )?;
        utility.update_pending_rewards(&deployer, fossil.total_supply(), 0)?;

        tracing::info!(
            "Fossil liquidity mining deployed by {} ({} pools, {} atto/s, funding {:?})",
            deployer,
            pools.len(),
            config.reward_per_second,
            config.funding
        );

        Ok(Self {
            deployer,
            governance,
            fossil,
            dino,
            utility,
            manager,
            pools,
        })
    }

    /// Deploy an additional staking pool and register it with the manager.
    ///
    /// `caller` must hold Governance and becomes admin of the new rewards pool.
    pub fn add_pool(&mut self, caller: &Address, config: &PoolConfig) -> Result<PoolId, FossilError> {
        let entry = build_pool(config, *caller)?;
        if self.pools.contains(&entry.pool.address()) {
            return Err(FossilError::InvalidConfig(format!(
                "A pool with symbol {} was already deployed",
                config.symbol
            )));
        }
        let id = self
            .manager
            .add_pool(caller, &self.governance, entry.pool.address(), config.weight)?;
        self.pools.insert(entry);
        self.sync_utility_pools();
        Ok(id)
    }

    pub fn adjust_weight(&mut self, caller: &Address, pool_id: PoolId, weight: u64) -> Result<(), FossilError> {
        self.manager
            .adjust_weight(caller, &self.governance, pool_id, weight)
    }

    /// Stop rewarding a pool. Its deposits stay withdrawable.
    pub fn remove_pool(&mut self, caller: &Address, pool_id: PoolId) -> Result<(), FossilError> {
        self.manager.remove_pool(caller, &self.governance, pool_id)
    }

    pub fn set_reward_per_second(&mut self, caller: &Address, rate: Amount) -> Result<(), FossilError> {
        self.manager
            .set_reward_per_second(caller, &self.governance, rate)
    }

    pub fn set_funding(&mut self, caller: &Address, funding: RewardFunding) -> Result<(), FossilError> {
        self.manager.set_funding(caller, &self.governance, funding)
    }

    /// Pay every registered pool for the time elapsed since the last call.
    pub fn distribute_rewards(
        &mut self,
        caller: &Address,
        now: Timestamp,
    ) -> Result<DistributionReport, FossilError> {
        let report = self.manager.distribute_rewards(
            caller,
            now,
            &self.governance,
            &mut self.fossil,
            &mut self.pools,
            &mut self.utility,
        )?;
        if !report.is_noop() {
            self.utility.sync_supply(&self.fossil);
        }
        Ok(report)
    }

    /// Mint `count` Dino assets to `to`. Only the Dino owner may mint.
    pub fn mint_dino(&mut self, caller: &Address, to: &Address, count: u64) -> Result<Vec<AssetId>, FossilError> {
        self.dino.mint_batch(caller, to, count)
    }

    /// Approve `pool` to take custody of `asset_id`.
    pub fn approve_dino(&mut self, caller: &Address, pool: &Address, asset_id: AssetId) -> Result<(), FossilError> {
        self.dino.approve(caller, pool, asset_id)
    }

    pub fn deposit(
        &mut self,
        caller: &Address,
        pool: &Address,
        asset_ids: &[AssetId],
        lock_duration: Timestamp,
        recipient: &Address,
        now: Timestamp,
    ) -> Result<Vec<Deposit>, FossilError> {
        let entry = self.pools.require_mut(pool)?;
        entry
            .pool
            .deposit(caller, asset_ids, lock_duration, recipient, now, &mut self.dino)
    }

    pub fn withdraw(
        &mut self,
        caller: &Address,
        pool: &Address,
        asset_id: AssetId,
        now: Timestamp,
    ) -> Result<WithdrawReceipt, FossilError> {
        let entry = self.pools.require_mut(pool)?;
        entry.pool.withdraw(
            caller,
            asset_id,
            now,
            &mut self.dino,
            &mut entry.reservoir,
            &mut self.fossil,
        )
    }

    pub fn deposits_of(&self, pool: &Address, owner: &Address) -> Result<Vec<Deposit>, FossilError> {
        self.pools
            .get(pool)
            .map(|e| e.pool.get_deposits_of(owner))
            .ok_or_else(|| FossilError::NotFound(format!("No staking pool at {}", pool)))
    }

    /// Hand the Fossil token to a new contract owner.
    pub fn change_token_owner(&mut self, caller: &Address, new_owner: &Address) -> Result<(), FossilError> {
        self.fossil.change_contract_owner(caller, new_owner)
    }

    pub fn deployer(&self) -> Address {
        self.deployer
    }

    pub fn governance(&self) -> &RoleRegistry {
        &self.governance
    }

    pub fn governance_mut(&mut self) -> &mut RoleRegistry {
        &mut self.governance
    }

    pub fn fossil(&self) -> &FossilToken {
        &self.fossil
    }

    pub fn fossil_mut(&mut self) -> &mut FossilToken {
        &mut self.fossil
    }

    pub fn dino(&self) -> &DinoToken {
        &self.dino
    }

    pub fn dino_owner_of(&self, asset_id: AssetId) -> Result<Address, FossilError> {
        self.dino.owner_of(asset_id)
    }

    pub fn utility(&self) -> &UtilityManager {
        &self.utility
    }

    pub fn manager(&self) -> &LiquidityMiningManager {
        &self.manager
    }

    pub fn pools(&self) -> &StakingPools {
        &self.pools
    }

    pub fn pool(&self, pool: &Address) -> Option<&PoolDeployment> {
        self.pools.get(pool)
    }

    pub fn to_json(&self) -> Result<String, FossilError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, FossilError> {
        Ok(serde_json::from_str(json)?)
    }

    fn sync_utility_pools(&mut self) {
        let token = self.fossil.address();
        let manager = self.manager.address();
        let pools = self.pools.addresses();
        if let Err(e) = self
            .utility
            .set_contract_address(&self.deployer, token, &pools, manager)
        {
            tracing::warn!("Could not refresh supply ledger pool list: {}", e);
        }
    }
}

fn build_pool(config: &PoolConfig, admin: Address) -> Result<PoolDeployment, FossilError> {
    let pool_addr = pool_address(&config.symbol);
    let reservoir_addr = reservoir_address(&config.symbol);
    let pool = StakingPool::new(
        pool_addr,
        &config.name,
        &config.symbol,
        manager_address(),
        reservoir_addr,
        config.bonus(),
    )?;
    let mut reservoir = RewardsPool::new(reservoir_addr, admin);
    reservoir.set_staking_pool(&admin, pool_addr)?;
    Ok(PoolDeployment { pool, reservoir })
}
