// crates/fossil-daemon/tests/end_to_end.rs
//
// End-to-end tests for Fossil liquidity mining.
//
// Replays the reference deployment flow (deploy, stake, wait ten minutes,
// distribute, withdraw, hand over the token) and checks the ledger-wide
// properties: conservation, lock enforcement, role gating, and serialized
// access through the keeper's RwLock.
//
// These tests use the public APIs of the library crates directly since the
// daemon is a binary crate with no lib.rs.

use std::sync::Arc;

use tokio::sync::RwLock;

use fossil_core::{AccessControl, Address, Amount, FossilError, RewardToken, Role};
use fossil_economics::deployment::{pool_address, reservoir_address};
use fossil_economics::{
    Deployment, DeploymentConfig, FundingSource, PoolConfig, INITIAL_SUPPLY_ATTO,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn user(n: u8) -> Address {
    Address::derive(&format!("user_{}", n))
}

fn sdt() -> Address {
    pool_address("SDT")
}

/// Reference deployment at t=0 by user_1, with Dino assets 0 and 1 moved to
/// user_2 and approved for the pool.
fn reference_deployment() -> Deployment {
    let mut d = Deployment::deploy(&DeploymentConfig::default(), user(1), 0).unwrap();
    let minted = d.mint_dino(&user(1), &user(2), 2).unwrap();
    for id in minted {
        d.approve_dino(&user(2), &sdt(), id).unwrap();
    }
    d
}

/// Every atto that ever entered a pool, from the pool's own bookkeeping.
fn pool_accounted(d: &Deployment, pool: &Address) -> Amount {
    let entry = d.pool(pool).unwrap();
    let accrued: Amount = entry.pool.deposits().iter().map(|dep| dep.accrued_reward).sum();
    accrued + entry.pool.total_paid_out() + entry.pool.dust_lost() + entry.pool.unassigned_reward()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_ten_minute_reference_scenario() {
    let mut d = reference_deployment();
    let premint = d.dino().total_minted() - 2;

    d.deposit(&user(2), &sdt(), &[premint], 600, &user(2), 0)
        .unwrap();
    assert_eq!(d.deposits_of(&sdt(), &user(2)).unwrap().len(), 1);
    assert_eq!(d.dino_owner_of(premint).unwrap(), sdt());

    let before = d.fossil().balance_of(&user(1));
    let report = d.distribute_rewards(&user(1), 600).unwrap();
    let after = d.fossil().balance_of(&user(1));

    assert_eq!(report.total_reward, 600);
    assert_eq!(before - after, 600);
    assert_eq!(d.fossil().balance_of(&reservoir_address("SDT")), 600);
    assert_eq!(d.pool(&sdt()).unwrap().pool.pending_reward_of(&user(2)), 600);
    assert_eq!(d.utility().pending_rewards(), 600);

    let receipt = d.withdraw(&user(2), &sdt(), premint, 600).unwrap();
    assert_eq!(receipt.reward, 600);
    assert_eq!(d.fossil().balance_of(&user(2)), 600);
    assert_eq!(d.dino_owner_of(premint).unwrap(), user(2));
    assert!(d.deposits_of(&sdt(), &user(2)).unwrap().is_empty());
}

#[test]
fn test_withdraw_before_lock_expiry_rejected() {
    let mut d = reference_deployment();
    let id = d.dino().total_minted() - 1;
    d.deposit(&user(2), &sdt(), &[id], 600, &user(2), 100).unwrap();
    d.distribute_rewards(&user(1), 400).unwrap();

    let result = d.withdraw(&user(2), &sdt(), id, 699);
    assert_eq!(
        result,
        Err(FossilError::LockNotExpired {
            asset_id: id,
            unlocks_at: 700
        })
    );
    assert_eq!(d.dino_owner_of(id).unwrap(), sdt());
    assert!(d.withdraw(&user(2), &sdt(), id, 700).is_ok());
}

#[test]
fn test_conservation_across_pools_and_withdrawals() {
    let config = DeploymentConfig {
        reward_per_second: 7,
        pools: vec![
            PoolConfig::default(),
            PoolConfig {
                name: "Long Dino".to_string(),
                symbol: "LDT".to_string(),
                weight: 3,
                ..PoolConfig::default()
            },
        ],
        ..DeploymentConfig::default()
    };
    let mut d = Deployment::deploy(&config, user(1), 0).unwrap();
    let ldt = pool_address("LDT");
    let ids = d.mint_dino(&user(1), &user(2), 4).unwrap();
    for &id in &ids[..2] {
        d.approve_dino(&user(2), &sdt(), id).unwrap();
    }
    for &id in &ids[2..] {
        d.approve_dino(&user(2), &ldt, id).unwrap();
    }

    // Rewards before any deposit are carried forward, not lost.
    d.distribute_rewards(&user(1), 13).unwrap();
    d.deposit(&user(2), &sdt(), &ids[..2], 0, &user(2), 13).unwrap();
    d.deposit(&user(2), &ldt, &ids[2..3], 300, &user(3), 13).unwrap();
    d.distribute_rewards(&user(1), 331).unwrap();
    d.withdraw(&user(2), &sdt(), ids[0], 331).unwrap();
    d.deposit(&user(2), &ldt, &ids[3..], 0, &user(2), 400).unwrap();
    d.distribute_rewards(&user(1), 977).unwrap();

    let reservoirs = d.fossil().balance_of(&reservoir_address("SDT"))
        + d.fossil().balance_of(&reservoir_address("LDT"));
    let paid = d.fossil().balance_of(&user(2)) + d.fossil().balance_of(&user(3));
    let funded = INITIAL_SUPPLY_ATTO - d.fossil().balance_of(&user(1));

    // Fossil only moves from the deployer into reservoirs and on to stakers.
    assert_eq!(funded, reservoirs + paid);
    // Each pool accounts for exactly what it was sent.
    for pool in [sdt(), ldt] {
        let entry = d.pool(&pool).unwrap();
        assert_eq!(pool_accounted(&d, &pool), entry.pool.total_received());
    }
    // Everything promised was funded, less manager-level dust.
    assert!(d.utility().pending_rewards() - funded < 4 * 3);
    assert_eq!(d.utility().pending_rewards(), 977 * 7);
}

#[test]
fn test_role_gating_leaves_ledger_unchanged() {
    let mut d = reference_deployment();
    let snapshot = d.to_json().unwrap();

    assert!(matches!(
        d.distribute_rewards(&user(2), 600),
        Err(FossilError::Unauthorized(_))
    ));
    assert!(matches!(
        d.set_reward_per_second(&user(2), 1_000),
        Err(FossilError::Unauthorized(_))
    ));
    assert!(matches!(
        d.add_pool(&user(2), &PoolConfig { symbol: "X".to_string(), ..PoolConfig::default() }),
        Err(FossilError::Unauthorized(_))
    ));
    assert_eq!(d.to_json().unwrap(), snapshot);

    // Once granted, the same account may distribute.
    d.governance_mut()
        .grant_role(&user(1), Role::Distributor, &user(2))
        .unwrap();
    assert!(d.distribute_rewards(&user(2), 600).is_ok());
}

#[test]
fn test_token_ownership_transfer() {
    let mut d = reference_deployment();
    let old_owner = d.fossil().contract_owner();
    d.change_token_owner(&user(1), &user(3)).unwrap();

    assert_ne!(d.fossil().contract_owner(), old_owner);
    assert!(d.fossil().has_role(Role::DefaultAdmin, &user(3)));

    // The previous owner still administers roles and can make itself a minter.
    let supply = d.fossil().total_supply();
    d.fossil_mut()
        .grant_role(&user(1), Role::Minter, &user(1))
        .unwrap();
    d.fossil_mut()
        .mint(&user(1), &user(1), INITIAL_SUPPLY_ATTO)
        .unwrap();
    assert!(d.fossil().total_supply() > supply);
}

#[test]
fn test_mint_funding_with_cap() {
    let config = DeploymentConfig {
        funding: FundingSource::Mint,
        initial_supply: 1_000,
        max_supply: Some(1_500),
        ..DeploymentConfig::default()
    };
    let mut d = Deployment::deploy(&config, user(1), 0).unwrap();
    d.distribute_rewards(&user(1), 400).unwrap();
    assert_eq!(d.fossil().total_supply(), 1_400);

    // The next interval would break the cap: nothing moves.
    let result = d.distribute_rewards(&user(1), 600);
    assert!(matches!(result, Err(FossilError::SupplyCapExceeded { .. })));
    assert_eq!(d.manager().last_distribution(), 400);
    assert_eq!(d.fossil().total_supply(), 1_400);
}

#[test]
fn test_pool_side_overflow_rejected_before_minting() {
    let config = DeploymentConfig {
        funding: FundingSource::Mint,
        ..DeploymentConfig::default()
    };
    let mut d = Deployment::deploy(&config, user(1), 0).unwrap();
    let id = d.mint_dino(&user(1), &user(2), 1).unwrap()[0];
    d.approve_dino(&user(2), &sdt(), id).unwrap();
    d.set_reward_per_second(&user(1), 100_000_000_000_000_000_000_000_000)
        .unwrap();
    // A full-bonus lock doubles the share weight, which the pool cannot
    // multiply against this reward.
    d.deposit(&user(2), &sdt(), &[id], 600, &user(2), 0).unwrap();
    let supply = d.fossil().total_supply();

    let result = d.distribute_rewards(&user(1), 1_000_000_000);
    assert!(matches!(result, Err(FossilError::ArithmeticOverflow(_))));
    assert_eq!(d.fossil().total_supply(), supply);
    assert_eq!(d.fossil().balance_of(&reservoir_address("SDT")), 0);
    assert_eq!(d.manager().last_distribution(), 0);
    assert_eq!(d.utility().pending_rewards(), 0);
    assert_eq!(d.pool(&sdt()).unwrap().pool.total_received(), 0);

    // A shorter interval fits and goes through.
    let report = d.distribute_rewards(&user(1), 1).unwrap();
    assert_eq!(d.fossil().total_supply(), supply + report.distributed());
    assert_eq!(
        d.pool(&sdt()).unwrap().pool.pending_reward_of(&user(2)),
        report.distributed()
    );
}

#[tokio::test]
async fn test_concurrent_access_through_rwlock() {
    let state = Arc::new(RwLock::new(reference_deployment()));
    let id = state.read().await.dino().total_minted() - 1;

    {
        let mut d = state.write().await;
        d.deposit(&user(2), &sdt(), &[id], 0, &user(2), 0).unwrap();
    }

    let mut handles = Vec::new();
    for now in [100u64, 200, 300, 400] {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            let mut d = state.write().await;
            d.distribute_rewards(&user(1), now).map(|r| r.total_reward)
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Whatever order the ticks ran in, the latest one bounds what was paid.
    let d = state.read().await;
    assert_eq!(d.manager().last_distribution(), 400);
    assert_eq!(d.pool(&sdt()).unwrap().pool.pending_reward_of(&user(2)), 400);
}
