// crates/fossil-economics/src/token.rs
//
// FOS (Fossil) amount type and supply constants.
//
// The smallest unit of FOS is the "atto". 1 FOS = 10^18 atto, matching the
// 18 decimals of the deployed reward token. All internal accounting uses
// atto in u128 to avoid floating-point error and u64 overflow (the initial
// supply alone is 10^27 atto).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimals reported by the Fossil token.
pub const DECIMALS: u8 = 18;

/// Number of atto in one FOS. 1 FOS = 10^18 atto.
pub const ATTO_PER_FOSSIL: u128 = 1_000_000_000_000_000_000;

/// Initial supply minted to the deployer: 1,000,000,000 FOS (in atto).
pub const INITIAL_SUPPLY_ATTO: u128 = 1_000_000_000 * ATTO_PER_FOSSIL;

/// A FOS (Fossil) token amount.
///
/// Wraps an amount in atto. Arithmetic stays in integer atto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fossil {
    /// Amount in atto (1 FOS = 10^18 atto).
    pub atto: u128,
}

impl Fossil {
    /// Create an amount from a whole number of FOS.
    ///
    /// # Example
    /// ```
    /// use fossil_economics::token::Fossil;
    /// let amount = Fossil::from_fossil(3);
    /// assert_eq!(amount.atto, 3_000_000_000_000_000_000);
    /// ```
    pub fn from_fossil(whole: u128) -> Self {
        Self {
            atto: whole.saturating_mul(ATTO_PER_FOSSIL),
        }
    }

    pub fn from_atto(atto: u128) -> Self {
        Self { atto }
    }
}

impl fmt::Display for Fossil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.atto / ATTO_PER_FOSSIL;
        let frac = self.atto % ATTO_PER_FOSSIL;
        if frac == 0 {
            write!(f, "{} FOS", whole)
        } else {
            let frac_str = format!("{:018}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{} FOS", whole, trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_supply() {
        // Matches the 1e27 atto total supply the token is deployed with.
        assert_eq!(INITIAL_SUPPLY_ATTO, 1_000_000_000_000_000_000_000_000_000);
    }

    #[test]
    fn test_from_fossil_saturates() {
        assert_eq!(Fossil::from_fossil(1).atto, ATTO_PER_FOSSIL);
        assert_eq!(Fossil::from_fossil(u128::MAX).atto, u128::MAX);
    }

    #[test]
    fn test_display_whole() {
        assert_eq!(format!("{}", Fossil::from_fossil(42)), "42 FOS");
    }

    #[test]
    fn test_display_fractional() {
        let amount = Fossil::from_atto(ATTO_PER_FOSSIL + ATTO_PER_FOSSIL / 2);
        assert_eq!(format!("{}", amount), "1.5 FOS");
    }

    #[test]
    fn test_display_single_atto() {
        assert_eq!(format!("{}", Fossil::from_atto(1)), "0.000000000000000001 FOS");
    }
}
