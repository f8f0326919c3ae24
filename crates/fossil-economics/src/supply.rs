// crates/fossil-economics/src/supply.rs
//
// Utility manager: the supply ledger that forecasts inflation by tracking
// rewards promised by the liquidity mining manager against the circulating
// Fossil supply. It only records; the supply cap itself is enforced by the
// token.

use serde::{Deserialize, Serialize};

use fossil_core::{Address, Amount, FossilError, RewardToken, SupplyLedger};

/// Basis-point denominator for `pending_ratio_bps`.
pub const BPS_DENOMINATOR: u128 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilityManager {
    admin: Address,
    reward_token: Option<Address>,
    staking_pools: Vec<Address>,
    /// The only account whose `record_pending` calls are counted.
    mining_manager: Option<Address>,
    /// Cumulative rewards promised to stakers (in atto).
    pending_rewards: Amount,
    /// Fossil supply as of the last sync (in atto).
    circulating_supply: Amount,
    /// `record_pending` calls dropped because the caller was not authorized.
    ignored_updates: u64,
}

impl UtilityManager {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            reward_token: None,
            staking_pools: Vec::new(),
            mining_manager: None,
            pending_rewards: 0,
            circulating_supply: 0,
            ignored_updates: 0,
        }
    }

    /// Register the contracts this ledger accounts for. Admin only.
    pub fn set_contract_address(
        &mut self,
        caller: &Address,
        reward_token: Address,
        staking_pools: &[Address],
        mining_manager: Address,
    ) -> Result<(), FossilError> {
        self.require_admin(caller)?;
        self.reward_token = Some(reward_token);
        self.staking_pools = staking_pools.to_vec();
        self.mining_manager = Some(mining_manager);
        Ok(())
    }

    /// Overwrite both counters. Admin only; used at deployment to seed the
    /// ledger with the token's initial supply.
    pub fn update_pending_rewards(
        &mut self,
        caller: &Address,
        circulating_supply: Amount,
        pending_rewards: Amount,
    ) -> Result<(), FossilError> {
        self.require_admin(caller)?;
        self.circulating_supply = circulating_supply;
        self.pending_rewards = pending_rewards;
        tracing::info!(
            "Supply ledger updated: circulating {}, pending {}",
            circulating_supply,
            pending_rewards
        );
        Ok(())
    }

    /// Refresh `circulating_supply` from the token.
    pub fn sync_supply(&mut self, token: &dyn RewardToken) {
        self.circulating_supply = token.total_supply();
    }

    pub fn pending_rewards(&self) -> Amount {
        self.pending_rewards
    }

    pub fn circulating_supply(&self) -> Amount {
        self.circulating_supply
    }

    pub fn ignored_updates(&self) -> u64 {
        self.ignored_updates
    }

    pub fn reward_token(&self) -> Option<Address> {
        self.reward_token
    }

    pub fn staking_pools(&self) -> &[Address] {
        &self.staking_pools
    }

    /// Pending rewards as a fraction of circulating supply, in basis points.
    ///
    /// Returns 0 before any supply is recorded.
    pub fn pending_ratio_bps(&self) -> u128 {
        if self.circulating_supply == 0 {
            return 0;
        }
        match self.pending_rewards.checked_mul(BPS_DENOMINATOR) {
            Some(scaled) => scaled / self.circulating_supply,
            // Scale the supply down instead when the numerator would overflow.
            None => self.pending_rewards / (self.circulating_supply / BPS_DENOMINATOR).max(1),
        }
    }

    fn require_admin(&self, caller: &Address) -> Result<(), FossilError> {
        if *caller != self.admin {
            return Err(FossilError::Unauthorized(format!(
                "{} may not administer the utility manager",
                caller
            )));
        }
        Ok(())
    }
}

impl SupplyLedger for UtilityManager {
    fn record_pending(&mut self, caller: &Address, amount: Amount) {
        if self.mining_manager.as_ref() != Some(caller) {
            self.ignored_updates += 1;
            tracing::warn!(
                "Ignoring pending-reward update of {} from unregistered caller {}",
                amount,
                caller
            );
            return;
        }
        self.pending_rewards = self.pending_rewards.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Address {
        Address::derive("admin")
    }

    fn manager() -> Address {
        Address::derive("manager")
    }

    fn configured() -> UtilityManager {
        let mut utility = UtilityManager::new(admin());
        utility
            .set_contract_address(
                &admin(),
                Address::derive("fossil"),
                &[Address::derive("pool")],
                manager(),
            )
            .unwrap();
        utility
    }

    #[test]
    fn test_record_pending_accumulates() {
        let mut utility = configured();
        utility.record_pending(&manager(), 600);
        utility.record_pending(&manager(), 400);
        assert_eq!(utility.pending_rewards(), 1_000);
    }

    #[test]
    fn test_record_pending_ignores_unknown_caller() {
        let mut utility = configured();
        utility.record_pending(&Address::derive("intruder"), 600);
        assert_eq!(utility.pending_rewards(), 0);
        assert_eq!(utility.ignored_updates(), 1);
    }

    #[test]
    fn test_update_pending_rewards_admin_only() {
        let mut utility = configured();
        assert!(utility.update_pending_rewards(&manager(), 1, 1).is_err());
        utility.update_pending_rewards(&admin(), 1_000_000, 1).unwrap();
        assert_eq!(utility.circulating_supply(), 1_000_000);
        assert_eq!(utility.pending_rewards(), 1);
    }

    #[test]
    fn test_set_contract_address_admin_only() {
        let mut utility = UtilityManager::new(admin());
        let result = utility.set_contract_address(
            &manager(),
            Address::derive("fossil"),
            &[],
            manager(),
        );
        assert!(matches!(result, Err(FossilError::Unauthorized(_))));
        assert_eq!(utility.reward_token(), None);
    }

    #[test]
    fn test_pending_ratio_bps() {
        let mut utility = configured();
        assert_eq!(utility.pending_ratio_bps(), 0);
        utility.update_pending_rewards(&admin(), 10_000, 250).unwrap();
        assert_eq!(utility.pending_ratio_bps(), 250);
    }

    #[test]
    fn test_pending_ratio_bps_large_values() {
        let mut utility = configured();
        utility
            .update_pending_rewards(&admin(), u128::MAX / 2, u128::MAX / 4)
            .unwrap();
        assert_eq!(utility.pending_ratio_bps(), 5_000);
    }
}
