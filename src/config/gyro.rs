//! States for Gyroscope concentrated liquidity pools.
//!
//! | State | Pool | Parameters |
//! |-------|------|------------|
//! | [`GyroEclpState`] | elliptic (E-CLP) | rotated ellipse, 18 + 38 decimals |
//! | [`Gyro2ClpState`] | two-asset (2-CLP) | square roots of the price bounds |
//!
//! Parameter consistency (unit rotation vector, derived `tau`, price
//! bounds) is checked when the pool is built, since it needs the
//! extended-precision math.

use ethnum::{I256, U256};
use serde::{Deserialize, Serialize};

use super::BasePoolState;
use crate::error::AmmError;

fn ensure_two_tokens(base: &BasePoolState) -> Result<(), AmmError> {
    if base.tokens.len() == 2 {
        Ok(())
    } else {
        Err(AmmError::InvalidConfiguration(
            "Gyro pools hold exactly 2 tokens",
        ))
    }
}

/// Elliptic concentrated liquidity pool snapshot.
///
/// Base parameters (`params_*`) are 18-decimal; the derived `tau_*`, `u`,
/// `v`, `w`, `z` and `d_sq` are 38-decimal, precomputed on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GyroEclpState {
    /// Shared pool state.
    #[serde(flatten)]
    pub base: BasePoolState,
    /// Lower price bound.
    #[serde(with = "super::big_int::signed")]
    pub params_alpha: I256,
    /// Upper price bound.
    #[serde(with = "super::big_int::signed")]
    pub params_beta: I256,
    /// Cosine of the rotation angle.
    #[serde(with = "super::big_int::signed")]
    pub params_c: I256,
    /// Sine of the rotation angle.
    #[serde(with = "super::big_int::signed")]
    pub params_s: I256,
    /// Stretching factor.
    #[serde(with = "super::big_int::signed")]
    pub params_lambda: I256,
    #[serde(with = "super::big_int::signed")]
    pub tau_alpha_x: I256,
    #[serde(with = "super::big_int::signed")]
    pub tau_alpha_y: I256,
    #[serde(with = "super::big_int::signed")]
    pub tau_beta_x: I256,
    #[serde(with = "super::big_int::signed")]
    pub tau_beta_y: I256,
    #[serde(with = "super::big_int::signed")]
    pub u: I256,
    #[serde(with = "super::big_int::signed")]
    pub v: I256,
    #[serde(with = "super::big_int::signed")]
    pub w: I256,
    #[serde(with = "super::big_int::signed")]
    pub z: I256,
    #[serde(with = "super::big_int::signed")]
    pub d_sq: I256,
}

impl GyroEclpState {
    /// Validates the base state and the token count.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] unless the pool holds
    /// exactly 2 tokens.
    pub fn validate(&self) -> Result<(), AmmError> {
        self.base.validate()?;
        ensure_two_tokens(&self.base)
    }
}

/// Two-asset concentrated liquidity pool snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gyro2ClpState {
    /// Shared pool state.
    #[serde(flatten)]
    pub base: BasePoolState,
    /// Square root of the lower price bound.
    #[serde(with = "super::big_int")]
    pub sqrt_alpha: U256,
    /// Square root of the upper price bound.
    #[serde(with = "super::big_int")]
    pub sqrt_beta: U256,
}

impl Gyro2ClpState {
    /// Validates the base state and the token count.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] unless the pool holds
    /// exactly 2 tokens.
    pub fn validate(&self) -> Result<(), AmmError> {
        self.base.validate()?;
        ensure_two_tokens(&self.base)
    }
}
