// crates/fossil-daemon/src/keeper.rs
//
// Distribution keeper: calls `distribute_rewards` on a fixed interval with
// the wall-clock time until the process receives Ctrl-C.
//
// The deployment sits behind one RwLock; each tick holds the write guard
// for exactly one distribution.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use fossil_core::{Address, FossilError, Timestamp};
use fossil_economics::{Deployment, DistributionReport};

/// Current Unix time in seconds, clamped at 0.
pub fn unix_now() -> Timestamp {
    chrono::Utc::now().timestamp().max(0) as Timestamp
}

pub struct DistributionKeeper {
    deployment: Arc<RwLock<Deployment>>,
    /// Account holding the Distributor role.
    distributor: Address,
    interval: Duration,
    ticks: u64,
    failures: u64,
}

impl DistributionKeeper {
    pub fn new(deployment: Arc<RwLock<Deployment>>, distributor: Address, interval_secs: u64) -> Self {
        Self {
            deployment,
            distributor,
            interval: Duration::from_secs(interval_secs.max(1)),
            ticks: 0,
            failures: 0,
        }
    }

    /// Run until Ctrl-C. A failed distribution is logged and retried on the
    /// next tick; the checkpoint has not moved, so nothing is lost.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        tracing::info!(
            "Distribution keeper started (interval={}s, distributor={})",
            self.interval.as_secs(),
            self.distributor
        );

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Distribution keeper received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {
                    let _ = self.tick(unix_now()).await;
                }
            }
        }

        tracing::info!(
            "Distribution keeper stopped after {} ticks ({} failed)",
            self.ticks,
            self.failures
        );
        Ok(())
    }

    /// Distribute rewards as of `now`.
    pub async fn tick(&mut self, now: Timestamp) -> Result<DistributionReport, FossilError> {
        self.ticks += 1;
        let mut deployment = self.deployment.write().await;
        match deployment.distribute_rewards(&self.distributor, now) {
            Ok(report) => {
                if !report.is_noop() {
                    tracing::info!(
                        "Tick {}: distributed {} atto over {}s to {} pools (dust {})",
                        self.ticks,
                        report.distributed(),
                        report.elapsed,
                        report.allocations.len(),
                        report.dust
                    );
                }
                Ok(report)
            }
            Err(e) => {
                self.failures += 1;
                tracing::warn!("Tick {}: distribution failed: {}", self.ticks, e);
                Err(e)
            }
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fossil_economics::DeploymentConfig;

    fn deployer() -> Address {
        Address::derive("deployer")
    }

    fn shared(now: Timestamp) -> Arc<RwLock<Deployment>> {
        let deployment = Deployment::deploy(&DeploymentConfig::default(), deployer(), now).unwrap();
        Arc::new(RwLock::new(deployment))
    }

    #[tokio::test]
    async fn test_tick_distributes_elapsed_interval() {
        let state = shared(1_000);
        let mut keeper = DistributionKeeper::new(state.clone(), deployer(), 600);

        let report = keeper.tick(1_600).await.unwrap();
        assert_eq!(report.total_reward, 600);
        assert_eq!(state.read().await.manager().last_distribution(), 1_600);

        let report = keeper.tick(1_600).await.unwrap();
        assert!(report.is_noop());
        assert_eq!(keeper.ticks(), 2);
        assert_eq!(keeper.failures(), 0);
    }

    #[tokio::test]
    async fn test_tick_without_distributor_role_fails() {
        let state = shared(0);
        let mut keeper = DistributionKeeper::new(state.clone(), Address::derive("intruder"), 600);

        assert!(matches!(
            keeper.tick(600).await,
            Err(FossilError::Unauthorized(_))
        ));
        assert_eq!(keeper.failures(), 1);
        assert_eq!(state.read().await.manager().last_distribution(), 0);
    }

    #[test]
    fn test_unix_now_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(unix_now() > 1_577_836_800);
    }
}
