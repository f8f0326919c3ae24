// crates/fossil-daemon/src/config.rs
//
// Runtime configuration for the Fossil distribution keeper.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use fossil_core::{Address, Amount};
use fossil_economics::{DeploymentConfig, Fossil, FundingSource, PoolConfig};

/// Fossil token parameters, in whole FOS.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSection {
    #[serde(default = "default_token_name")]
    pub name: String,

    #[serde(default = "default_token_symbol")]
    pub symbol: String,

    /// Minted to the deployer at deployment.
    #[serde(default = "default_initial_supply_fos")]
    pub initial_supply_fos: u64,

    /// Hard cap on total supply. None means uncapped.
    #[serde(default)]
    pub max_supply_fos: Option<u64>,
}

fn default_token_name() -> String {
    "Fossil".to_string()
}

fn default_token_symbol() -> String {
    "FOS".to_string()
}

fn default_initial_supply_fos() -> u64 {
    1_000_000_000
}

impl Default for TokenSection {
    fn default() -> Self {
        Self {
            name: default_token_name(),
            symbol: default_token_symbol(),
            initial_supply_fos: default_initial_supply_fos(),
            max_supply_fos: None,
        }
    }
}

/// Runtime configuration for the keeper.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Log level used when RUST_LOG is not set: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// JSON snapshot of the deployment, restored on start and written on shutdown.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Seconds between `distribute_rewards` calls.
    #[serde(default = "default_distribution_interval_secs")]
    pub distribution_interval_secs: u64,

    /// Reward rate for a fresh deployment, in atto per second.
    #[serde(default = "default_reward_per_second")]
    pub reward_per_second: Amount,

    /// Deployer and distributor account: a 0x address or a label to derive one from.
    #[serde(default = "default_deployer")]
    pub deployer: String,

    #[serde(default)]
    pub token: TokenSection,

    /// "mint" or "transfer_from".
    #[serde(default = "default_funding")]
    pub funding: FundingSource,

    #[serde(default = "default_dino_base_uri")]
    pub dino_base_uri: String,

    /// Dino assets minted to the deployer at deployment.
    #[serde(default = "default_dino_premint")]
    pub dino_premint: u64,

    /// Staking pools for a fresh deployment.
    #[serde(default = "default_pools")]
    pub pools: Vec<PoolConfig>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_snapshot_path() -> String {
    "~/.fossil/deployment.json".to_string()
}

fn default_distribution_interval_secs() -> u64 {
    600
}

fn default_reward_per_second() -> Amount {
    1
}

fn default_deployer() -> String {
    "deployer".to_string()
}

fn default_funding() -> FundingSource {
    FundingSource::TransferFrom
}

fn default_dino_base_uri() -> String {
    "https://dinotoken/".to_string()
}

fn default_dino_premint() -> u64 {
    10
}

fn default_pools() -> Vec<PoolConfig> {
    vec![PoolConfig::default()]
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            snapshot_path: default_snapshot_path(),
            distribution_interval_secs: default_distribution_interval_secs(),
            reward_per_second: default_reward_per_second(),
            deployer: default_deployer(),
            token: TokenSection::default(),
            funding: default_funding(),
            dino_base_uri: default_dino_base_uri(),
            dino_premint: default_dino_premint(),
            pools: default_pools(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// The deployer account: parsed when given as a 0x address, derived otherwise.
    pub fn deployer_address(&self) -> Address {
        if self.deployer.starts_with("0x") {
            if let Ok(address) = self.deployer.parse() {
                return address;
            }
            tracing::warn!("Deployer {} is not a valid address; deriving one", self.deployer);
        }
        Address::derive(&self.deployer)
    }

    /// Parameters for a fresh deployment.
    pub fn deployment_config(&self) -> DeploymentConfig {
        DeploymentConfig {
            token_name: self.token.name.clone(),
            token_symbol: self.token.symbol.clone(),
            initial_supply: Fossil::from_fossil(self.token.initial_supply_fos as u128).atto,
            max_supply: self
                .token
                .max_supply_fos
                .map(|cap| Fossil::from_fossil(cap as u128).atto),
            dino_base_uri: self.dino_base_uri.clone(),
            dino_premint: self.dino_premint,
            reward_per_second: self.reward_per_second,
            funding: self.funding,
            pools: self.pools.clone(),
        }
    }
}
