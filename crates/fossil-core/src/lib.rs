// crates/fossil-core/src/lib.rs
//
// fossil-core: Core types, roles, errors, and collaborator traits for the
// Fossil liquidity mining engine.
//
// This is the leaf crate that every other crate in the workspace depends on.
// It defines the ledger identifiers, the protocol-wide error type, and the
// narrow trait contracts through which the staking pool and the liquidity
// mining manager reach the reward token, the staked asset ledger, the funding
// reservoir, and the supply ledger.

pub mod address;
pub mod error;
pub mod role;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use fossil_core::Address;`

pub use address::{Address, Amount, AssetId, Timestamp};
pub use error::FossilError;
pub use role::Role;
pub use traits::{
    AccessControl, FundingReservoir, PoolDirectory, RewardSink, RewardToken, StakeAsset,
    SupplyLedger,
};
