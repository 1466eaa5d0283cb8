//! State for liquidity bootstrapping pools.

use ethnum::U256;
use serde::{Deserialize, Serialize};

use super::BasePoolState;
use crate::error::AmmError;

/// Liquidity bootstrapping pool snapshot.
///
/// A two-token weighted pool whose weights move linearly from
/// `start_weights` to `end_weights` over `[start_time, end_time]`.  One
/// token is the project token being sold, the other the reserve token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityBootstrappingState {
    /// Shared pool state.
    #[serde(flatten)]
    pub base: BasePoolState,
    /// Index of the project token (0 or 1).
    pub project_token_index: usize,
    /// Whether buyers may sell the project token back into the pool.
    pub is_project_token_swap_in_blocked: bool,
    #[serde(with = "super::big_int::vec")]
    pub start_weights: Vec<U256>,
    #[serde(with = "super::big_int::vec")]
    pub end_weights: Vec<U256>,
    #[serde(with = "super::big_int")]
    pub start_time: U256,
    #[serde(with = "super::big_int")]
    pub end_time: U256,
    /// Whether swaps are open at the quote time.
    pub is_swap_enabled: bool,
    /// Time of the quote.
    #[serde(with = "super::big_int")]
    pub current_timestamp: U256,
}

impl LiquidityBootstrappingState {
    /// Validates the base state and the sale schedule.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] if the pool does not hold
    /// exactly 2 tokens, the project index is out of range, a weight array
    /// is malformed, or the window ends before it starts.
    pub fn validate(&self) -> Result<(), AmmError> {
        self.base.validate()?;
        if self.base.tokens.len() != 2 {
            return Err(AmmError::InvalidConfiguration(
                "liquidity bootstrapping pools hold exactly 2 tokens",
            ));
        }
        if self.project_token_index > 1 {
            return Err(AmmError::InvalidConfiguration(
                "project token index must be 0 or 1",
            ));
        }
        if self.start_weights.len() != 2 || self.end_weights.len() != 2 {
            return Err(AmmError::InvalidConfiguration(
                "start and end weights must hold 2 entries",
            ));
        }
        if self.end_time < self.start_time {
            return Err(AmmError::InvalidConfiguration(
                "end time must not precede start time",
            ));
        }
        Ok(())
    }
}
