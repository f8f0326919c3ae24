// crates/fossil-economics/src/lib.rs
//
// fossil-economics: Fossil reward token, Dino staking pools, the liquidity
// mining manager, and the ledgers that fund and account for rewards.
//
// All monetary values are tracked in atto (the smallest unit of FOS).
// 1 FOS = 10^18 atto.

pub mod access;
pub mod deployment;
pub mod dino_token;
pub mod fossil_token;
pub mod manager;
pub mod reservoir;
pub mod rewards;
pub mod staking_pool;
pub mod supply;
pub mod token;

// Re-export key types for ergonomic access from downstream crates.
pub use access::RoleRegistry;
pub use deployment::{
    Deployment, DeploymentConfig, FundingSource, PoolConfig, PoolDeployment, StakingPools,
};
pub use dino_token::DinoToken;
pub use fossil_token::FossilToken;
pub use manager::{
    DistributionReport, LiquidityMiningManager, PoolAllocation, PoolId, PoolSlot, RewardFunding,
};
pub use reservoir::RewardsPool;
pub use rewards::{split_by_weight, WeightedSplit};
pub use staking_pool::{Deposit, LockBonus, StakingPool, WithdrawReceipt, BONUS_BASE};
pub use supply::UtilityManager;
pub use token::{Fossil, ATTO_PER_FOSSIL, DECIMALS, INITIAL_SUPPLY_ATTO};
