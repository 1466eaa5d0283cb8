//! State for StableSwap pools.

use ethnum::U256;
use serde::{Deserialize, Serialize};

use super::BasePoolState;
use crate::error::AmmError;

/// Precision of the amplification parameter.
pub const AMP_PRECISION: U256 = U256::new(1_000);
/// Smallest amplification, before [`AMP_PRECISION`] is applied.
pub const MIN_AMP: u128 = 1;
/// Largest amplification, before [`AMP_PRECISION`] is applied.
pub const MAX_AMP: u128 = 50_000;

/// StableSwap pool snapshot.
///
/// `amp` already includes [`AMP_PRECISION`]: an amplification of 1000
/// arrives as `1_000_000`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StableState {
    /// Shared pool state.
    #[serde(flatten)]
    pub base: BasePoolState,
    /// Amplification parameter times [`AMP_PRECISION`].
    #[serde(with = "super::big_int")]
    pub amp: U256,
}

impl StableState {
    /// Validates the base state and the amplification range.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] if `amp` lies outside
    /// `[MIN_AMP, MAX_AMP] * AMP_PRECISION`.
    pub fn validate(&self) -> Result<(), AmmError> {
        self.base.validate()?;
        if self.amp < AMP_PRECISION * MIN_AMP || self.amp > AMP_PRECISION * MAX_AMP {
            return Err(AmmError::InvalidConfiguration(
                "amplification out of range",
            ));
        }
        Ok(())
    }
}
