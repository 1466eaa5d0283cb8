//! State for QuantAMM time-weighted pools.

use ethnum::{I256, U256};
use serde::{Deserialize, Serialize};

use super::BasePoolState;
use crate::error::AmmError;

/// Time-weighted pool snapshot.
///
/// Weights and their per-second multipliers are packed in two groups of
/// up to four tokens each:
///
/// ```text
/// first_four  = [w0, w1, w2, w3, m0, m1, m2, m3]   (n > 4)
///             = [w0 .. w(n-1), m0 .. m(n-1)]         (n <= 4)
/// second_four = [w4, .., m4, ..]                     (n > 4 only)
/// ```
///
/// Multipliers are signed: a weight can drift down over time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantAmmState {
    /// Shared pool state.
    #[serde(flatten)]
    pub base: BasePoolState,
    #[serde(with = "super::big_int::signed_vec")]
    pub first_four_weights_and_multipliers: Vec<I256>,
    #[serde(default, with = "super::big_int::signed_vec")]
    pub second_four_weights_and_multipliers: Vec<I256>,
    /// Time the weights were last set.
    #[serde(with = "super::big_int")]
    pub last_update_time: U256,
    /// Time after which the weights stop moving.
    #[serde(with = "super::big_int")]
    pub last_interop_time: U256,
    /// Time of the quote.
    #[serde(with = "super::big_int")]
    pub current_timestamp: U256,
    /// Largest trade, as a fraction of the balance, on either side.
    #[serde(with = "super::big_int")]
    pub max_trade_size_ratio: U256,
}

impl QuantAmmState {
    /// Validates the base state and the packed weight layout.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] if the packed arrays
    /// cannot hold a weight and a multiplier for every token.
    pub fn validate(&self) -> Result<(), AmmError> {
        self.base.validate()?;
        let n = self.base.tokens.len();
        let first = self.first_four_weights_and_multipliers.len();
        let second = self.second_four_weights_and_multipliers.len();
        let ok = if n <= 4 {
            first >= 2 * n
        } else {
            first >= 8 && second >= 2 * (n - 4)
        };
        if !ok {
            return Err(AmmError::InvalidConfiguration(
                "packed weights and multipliers too short for the token count",
            ));
        }
        Ok(())
    }
}
