//! State for range-tracking (ReClamm) pools.
//!
//! Both releases share one snapshot shape; the `poolType` tag
//! (`RECLAMM` or `RECLAMM_V2`) selects the math.

use ethnum::U256;
use serde::{Deserialize, Serialize};

use super::BasePoolState;
use crate::error::AmmError;

/// Range-tracking pool snapshot.
///
/// Timestamps are Unix seconds.  `current_timestamp` is the block time
/// the quote is computed for; virtual balances are brought forward from
/// `last_timestamp` to it before any math runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReClammState {
    /// Shared pool state.
    #[serde(flatten)]
    pub base: BasePoolState,
    /// Virtual balances stored at `last_timestamp`.
    #[serde(with = "super::big_int::vec")]
    pub last_virtual_balances: Vec<U256>,
    /// Per-second decay base of the range shift.
    #[serde(with = "super::big_int")]
    pub daily_price_shift_base: U256,
    /// Time of the last virtual balance update.
    #[serde(with = "super::big_int")]
    pub last_timestamp: U256,
    /// Time of the quote.
    #[serde(with = "super::big_int")]
    pub current_timestamp: U256,
    /// Centeredness below which the range starts shifting.
    #[serde(with = "super::big_int")]
    pub centeredness_margin: U256,
    /// Fourth root of the price ratio when the current update started.
    #[serde(with = "super::big_int")]
    pub start_fourth_root_price_ratio: U256,
    /// Fourth root of the price ratio the update converges to.
    #[serde(with = "super::big_int")]
    pub end_fourth_root_price_ratio: U256,
    #[serde(with = "super::big_int")]
    pub price_ratio_update_start_time: U256,
    #[serde(with = "super::big_int")]
    pub price_ratio_update_end_time: U256,
}

impl ReClammState {
    /// Validates the base state and the virtual balances.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] unless the pool holds
    /// exactly 2 tokens with one virtual balance each.
    pub fn validate(&self) -> Result<(), AmmError> {
        self.base.validate()?;
        if self.base.tokens.len() != 2 || self.last_virtual_balances.len() != 2 {
            return Err(AmmError::InvalidConfiguration(
                "ReClamm pools hold exactly 2 tokens and 2 virtual balances",
            ));
        }
        Ok(())
    }
}
