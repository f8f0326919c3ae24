// crates/fossil-core/src/role.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque capability tokens checked before every gated mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Administers every other role (grant/revoke).
    DefaultAdmin,
    /// Configures pools and the reward rate on the liquidity mining manager.
    Governance,
    /// Triggers periodic reward distribution.
    Distributor,
    /// Mints reward tokens.
    Minter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::DefaultAdmin => write!(f, "DEFAULT_ADMIN_ROLE"),
            Role::Governance => write!(f, "GOV_ROLE"),
            Role::Distributor => write!(f, "REWARD_DISTRIBUTOR_ROLE"),
            Role::Minter => write!(f, "MINTER_ROLE"),
        }
    }
}
