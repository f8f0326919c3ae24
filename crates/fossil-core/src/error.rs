// crates/fossil-core/src/error.rs

use thiserror::Error;

use crate::address::{Amount, AssetId, Timestamp};

/// Protocol-wide error types for Fossil liquidity mining.
///
/// Every variant aborts the operation that raised it with no partial state
/// change. Rounding dust from reward splitting is never reported here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FossilError {
    /// Caller lacks the role (or identity) the operation requires.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Pool weight rejected, including duplicate pool registration.
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),

    /// Reward rate rejected.
    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    /// Staked asset transfer failed (ownership, approval, or target).
    #[error("Transfer rejected: {0}")]
    TransferRejected(String),

    /// Withdrawal attempted before the deposit's lock window elapsed.
    #[error("Lock not expired: asset {asset_id} unlocks at {unlocks_at}")]
    LockNotExpired {
        asset_id: AssetId,
        unlocks_at: Timestamp,
    },

    /// Referenced deposit, asset, or pool does not exist in the caller's scope.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Funding reservoir cannot cover a payout. The withdrawal may be retried.
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    /// Reward token balance too low for a transfer.
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    /// Reward token allowance too low for a `transfer_from`.
    #[error("Insufficient allowance: requested {requested}, allowed {allowed}")]
    InsufficientAllowance { requested: Amount, allowed: Amount },

    /// Minting would push total supply past the token's cap.
    #[error("Supply cap exceeded: cap {cap}, would reach {attempted}")]
    SupplyCapExceeded { cap: Amount, attempted: Amount },

    /// Checked arithmetic overflowed while computing rewards or balances.
    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    /// Configuration or identifier could not be parsed or is inconsistent.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for FossilError {
    fn from(e: serde_json::Error) -> Self {
        FossilError::Serialization(e.to_string())
    }
}
