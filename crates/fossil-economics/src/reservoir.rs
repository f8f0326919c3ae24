// crates/fossil-economics/src/reservoir.rs
//
// Rewards pool: the funding reservoir behind a staking pool.
//
// The reservoir's balance lives in the Fossil ledger under its own address.
// The liquidity mining manager tops it up on every distribution; the one
// authorized staking pool draws on it when a depositor withdraws.

use serde::{Deserialize, Serialize};

use fossil_core::{Address, Amount, FossilError, FundingReservoir, RewardToken};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsPool {
    address: Address,
    /// Account allowed to configure the authorized staking pool.
    admin: Address,
    /// The single staking pool allowed to call `release`.
    staking_pool: Option<Address>,
    /// Running total released to depositors (in atto).
    total_released: Amount,
}

impl RewardsPool {
    pub fn new(address: Address, admin: Address) -> Self {
        Self {
            address,
            admin,
            staking_pool: None,
            total_released: 0,
        }
    }

    /// Authorize `staking_pool` as the only caller of `release`.
    ///
    /// # Errors
    /// Returns `FossilError::Unauthorized` if `caller` is not the admin.
    pub fn set_staking_pool(
        &mut self,
        caller: &Address,
        staking_pool: Address,
    ) -> Result<(), FossilError> {
        if *caller != self.admin {
            return Err(FossilError::Unauthorized(format!(
                "{} may not configure the rewards pool",
                caller
            )));
        }
        self.staking_pool = Some(staking_pool);
        Ok(())
    }

    pub fn staking_pool(&self) -> Option<Address> {
        self.staking_pool
    }

    pub fn total_released(&self) -> Amount {
        self.total_released
    }
}

impl FundingReservoir for RewardsPool {
    fn address(&self) -> Address {
        self.address
    }

    fn available(&self, token: &dyn RewardToken) -> Amount {
        token.balance_of(&self.address)
    }

    fn release(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: Amount,
        token: &mut dyn RewardToken,
    ) -> Result<(), FossilError> {
        if self.staking_pool.as_ref() != Some(caller) {
            return Err(FossilError::Unauthorized(format!(
                "{} may not draw from rewards pool {}",
                caller, self.address
            )));
        }

        let available = self.available(token);
        if amount > available {
            return Err(FossilError::InsufficientFunds {
                requested: amount,
                available,
            });
        }

        token.transfer(&self.address, to, amount)?;
        self.total_released = self.total_released.saturating_add(amount);
        Ok(())
    }
}
