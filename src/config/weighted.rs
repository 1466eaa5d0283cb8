//! State for Balancer weighted pools.

use ethnum::U256;
use serde::{Deserialize, Serialize};

use super::pool_state::ensure_len;
use super::BasePoolState;
use crate::error::AmmError;
use crate::math::WAD;

/// Smallest normalized weight a token may carry (1%).
pub const MIN_WEIGHT: U256 = U256::new(10_000_000_000_000_000);

/// Weighted pool snapshot.
///
/// # Invariant
///
/// ```text
/// ∏(Bᵢ ^ Wᵢ) = k
/// ```
///
/// where `Bᵢ` is the scaled-18 balance of token `i` and `Wᵢ` its
/// normalized weight (18 decimals).
///
/// # Validation
///
/// - The base state is valid.
/// - `weights.len() == tokens.len()`.
/// - Every weight is at least [`MIN_WEIGHT`].
/// - Weights sum to exactly `1e18`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedState {
    /// Shared pool state.
    #[serde(flatten)]
    pub base: BasePoolState,
    /// Normalized weights (18 decimals).
    #[serde(with = "super::big_int::vec")]
    pub weights: Vec<U256>,
    /// Pool math release.  Release `1` evaluates every power through
    /// `ln`/`exp`, later releases take the exact fast paths for exponents
    /// 1, 2 and 4.
    #[serde(default)]
    pub version: u32,
}

impl WeightedState {
    /// Validates the base state and the weights.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] for any violated rule.
    pub fn validate(&self) -> Result<(), AmmError> {
        self.base.validate()?;
        validate_weights(&self.base, &self.weights)
    }
}

/// Shared weight checks for weighted-style pools.
pub(crate) fn validate_weights(base: &BasePoolState, weights: &[U256]) -> Result<(), AmmError> {
    ensure_len(base, weights.len(), "weights must match the token count")?;
    if weights.iter().any(|w| *w < MIN_WEIGHT) {
        return Err(AmmError::InvalidConfiguration(
            "every weight must be at least 1e16",
        ));
    }
    let mut sum = U256::ZERO;
    for w in weights {
        sum = sum
            .checked_add(*w)
            .ok_or(AmmError::Overflow("weight sum"))?;
    }
    if sum != WAD {
        return Err(AmmError::InvalidConfiguration("weights must sum to 1e18"));
    }
    Ok(())
}
