// crates/fossil-daemon/src/main.rs
//
// Binary entrypoint for the Fossil distribution keeper.
//
// Parses CLI arguments, loads configuration, initializes tracing, restores
// the deployment snapshot (or deploys fresh), runs the keeper until Ctrl-C,
// and writes the snapshot back on shutdown.

mod config;
mod keeper;
mod snapshot;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::RwLock;

use config::DaemonConfig;
use fossil_economics::{Deployment, Fossil};
use keeper::{unix_now, DistributionKeeper};

/// Fossil liquidity mining keeper: distributes rewards on an interval.
#[derive(Parser, Debug)]
#[command(name = "fossil-daemon", version = "0.1.0", about = "Fossil reward distribution keeper")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.fossil/config.toml")]
    config: String,

    /// Override the snapshot path from the config file.
    #[arg(long)]
    snapshot: Option<String>,

    /// Run a single distribution, write the snapshot, and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_path = expand_tilde(&args.config);
    let loaded = DaemonConfig::load(&config_path);
    let mut daemon_config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => DaemonConfig::default(),
    };
    if let Some(snapshot) = args.snapshot {
        daemon_config.snapshot_path = snapshot;
    }

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    match &loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", config_path),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            config_path,
            e
        ),
    }

    tracing::info!("Fossil Distribution Keeper v0.1.0");
    tracing::info!("Snapshot: {}", daemon_config.snapshot_path);
    tracing::info!(
        "Distribution interval: {}s",
        daemon_config.distribution_interval_secs
    );

    let snapshot_path = PathBuf::from(expand_tilde(&daemon_config.snapshot_path));
    let deployer = daemon_config.deployer_address();

    let deployment = match snapshot::load(&snapshot_path)? {
        Some(deployment) => deployment,
        None => {
            tracing::info!("No snapshot found; deploying fresh");
            Deployment::deploy(&daemon_config.deployment_config(), deployer, unix_now())?
        }
    };
    log_summary(&deployment);

    let state = Arc::new(RwLock::new(deployment));
    let mut keeper = DistributionKeeper::new(
        state.clone(),
        deployer,
        daemon_config.distribution_interval_secs,
    );

    if args.once {
        if let Err(e) = keeper.tick(unix_now()).await {
            tracing::error!("Distribution failed: {}", e);
        }
    } else {
        keeper.run().await?;
    }

    let deployment = state.read().await;
    snapshot::save(&snapshot_path, &deployment)?;
    log_summary(&deployment);
    tracing::info!("Fossil keeper shut down gracefully");

    Ok(())
}

fn log_summary(deployment: &Deployment) {
    let manager = deployment.manager();
    tracing::info!(
        "Manager {}: {} pools, total weight {}, {} atto/s, last distribution at {}",
        manager.address(),
        manager.pools().iter().filter(|p| p.active).count(),
        manager.total_weight(),
        manager.reward_per_second(),
        manager.last_distribution()
    );
    tracing::info!(
        "Pending rewards: {}",
        Fossil::from_atto(deployment.utility().pending_rewards())
    );
    for (address, entry) in deployment.pools().iter() {
        tracing::info!(
            "Pool {} ({}): {} deposits, {} received, {} paid out",
            entry.pool.symbol(),
            address,
            entry.pool.deposits().len(),
            Fossil::from_atto(entry.pool.total_received()),
            Fossil::from_atto(entry.pool.total_paid_out())
        );
    }
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
