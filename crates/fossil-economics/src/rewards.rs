// crates/fossil-economics/src/rewards.rs
//
// Weighted reward splitting shared by the liquidity mining manager (pool
// weights) and the staking pools (per-deposit share weights).
//
// Rounding rule: every share is floored,
//   share_i = total * weight_i / sum(weights)
// and the remainder is reported as dust. Dust is never redistributed, so a
// split of `total` over `n` non-zero weights loses at most `n - 1` atto (and
// at most `sum(weights) - 1`).

use fossil_core::{Amount, FossilError};

/// The result of splitting an amount across weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedSplit {
    /// One share per input weight, in input order (in atto).
    pub shares: Vec<Amount>,
    /// `total - sum(shares)`.
    pub dust: Amount,
}

impl WeightedSplit {
    pub fn distributed(&self) -> Amount {
        self.shares.iter().sum()
    }
}

/// Split `total` across `weights` pro-rata, flooring each share.
///
/// When every weight is zero nothing is distributed and all of `total` is
/// returned as dust.
///
/// # Errors
/// Returns `FossilError::ArithmeticOverflow` if `total * weight` overflows u128.
pub fn split_by_weight(total: Amount, weights: &[u64]) -> Result<WeightedSplit, FossilError> {
    let weight_sum: u128 = weights.iter().map(|&w| w as u128).sum();
    if weight_sum == 0 {
        return Ok(WeightedSplit {
            shares: vec![0; weights.len()],
            dust: total,
        });
    }

    let mut shares = Vec::with_capacity(weights.len());
    for &weight in weights {
        let scaled = total.checked_mul(weight as u128).ok_or_else(|| {
            FossilError::ArithmeticOverflow(format!(
                "Reward {} times weight {} overflows",
                total, weight
            ))
        })?;
        shares.push(scaled / weight_sum);
    }

    let distributed: Amount = shares.iter().sum();
    Ok(WeightedSplit {
        shares,
        dust: total - distributed,
    })
}
