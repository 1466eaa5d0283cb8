//! Gyroscope two-asset concentrated liquidity pool (2-CLP).
//!
//! A constant-product curve over *virtual* balances, which concentrates
//! liquidity in the price range `[alpha, beta]`:
//!
//! ```text
//! (x + L / √β) · (y + L · √α) = L²
//! ```
//!
//! `L` is the invariant, the root of a quadratic in the real balances.
//! Both price bounds enter only through their square roots.

use ethnum::U256;

use super::at;
use crate::config::Gyro2ClpState;
use crate::domain::{MaxSwapParams, Rounding, SwapKind, SwapParams};
use crate::error::AmmError;
use crate::math::checked::CheckedArithmetic;
use crate::math::fixed_point::{div_rounding, mul_rounding, FOUR_WAD, TWO_WAD};
use crate::math::{
    div_down, div_up, div_up_raw, gyro_sqrt, mul_down, mul_up, to_raw_undo_rate_round_down, WAD,
};
use crate::traits::{FromConfig, PoolBase};

/// Largest scaled-18 balance a gyro pool can hold (`2^128 - 1`).
pub const MAX_BALANCE: U256 = U256::new(u128::MAX);

/// Share of the output balance a single gyro swap may take (99%).
const MAX_OUT_SHARE: U256 = U256::new(990_000_000_000_000_000);

const SQRT_TOLERANCE: U256 = U256::new(5);

/// Max swap amount shared by the gyro pools.
///
/// `GivenIn` may fill the input balance up to [`MAX_BALANCE`]; `GivenOut`
/// may take 99% of the output balance.  Both are returned in raw units.
pub(crate) fn gyro_max_swap_amount(params: &MaxSwapParams<'_>) -> Result<U256, AmmError> {
    match params.swap_kind {
        SwapKind::GivenIn => {
            let index = params.index_in;
            let headroom =
                MAX_BALANCE.saturating_sub(at(params.balances_live_scaled18, index)?);
            to_raw_undo_rate_round_down(
                headroom,
                at(params.scaling_factors, index)?,
                at(params.token_rates, index)?,
            )
        }
        SwapKind::GivenOut => {
            let index = params.index_out;
            let max = mul_down(MAX_OUT_SHARE, at(params.balances_live_scaled18, index)?)?;
            to_raw_undo_rate_round_down(
                max,
                at(params.scaling_factors, index)?,
                at(params.token_rates, index)?,
            )
        }
    }
}

// ---------------------------------------------------------------------------
// 2-CLP math
// ---------------------------------------------------------------------------

/// Coefficients of `a·L² − mb·L − mc = 0`, with `b²` computed separately
/// for precision.
struct QuadraticTerms {
    a: U256,
    mb: U256,
    b_square: U256,
    mc: U256,
}

fn quadratic_terms(
    x: U256,
    y: U256,
    sqrt_alpha: U256,
    sqrt_beta: U256,
    rounding: Rounding,
) -> Result<QuadraticTerms, AmmError> {
    let mul = |a, b| mul_rounding(a, b, rounding);
    let div = |a, b| div_rounding(a, b, rounding);
    let mul_opposite = |a, b| mul_rounding(a, b, rounding.opposite());

    let a = WAD.safe_sub(div(sqrt_alpha, sqrt_beta)?)?;
    let mb = div(y, sqrt_beta)?.safe_add(mul(x, sqrt_alpha)?)?;
    let mc = mul(x, y)?;

    let b_sq1 = mul(mul(mul(x, x)?, sqrt_alpha)?, sqrt_alpha)?;
    let b_sq2 = div(mul(mul(x, y)?, sqrt_alpha)?.safe_mul(U256::new(2))?, sqrt_beta)?;
    let b_sq3 = div(mul(y, y)?, mul_opposite(sqrt_beta, sqrt_beta)?)?;
    let b_square = b_sq1.safe_add(b_sq2)?.safe_add(b_sq3)?;

    Ok(QuadraticTerms { a, mb, b_square, mc })
}

/// Computes the 2-CLP invariant `L`.
///
/// # Errors
///
/// - [`AmmError::InvalidConfiguration`] unless there are exactly 2
///   balances.
/// - [`AmmError::SqrtFailed`] or arithmetic errors from the quadratic.
pub fn compute_invariant(
    balances: &[U256],
    sqrt_alpha: U256,
    sqrt_beta: U256,
    rounding: Rounding,
) -> Result<U256, AmmError> {
    let [x, y] = balances else {
        return Err(AmmError::InvalidConfiguration(
            "2-CLP pools hold exactly 2 tokens",
        ));
    };
    let terms = quadratic_terms(*x, *y, sqrt_alpha, sqrt_beta, rounding)?;

    let denominator = mul_up(terms.a, TWO_WAD)?;
    let add_term = mul_down(mul_down(terms.mc, FOUR_WAD)?, terms.a)?;
    let radicand = terms.b_square.safe_add(add_term)?;
    let numerator = terms.mb.safe_add(gyro_sqrt(radicand, SQRT_TOLERANCE)?)?;
    div_down(numerator, denominator)
}

/// Virtual offset of token 0: `L / √β`.
pub fn virtual_offset0(invariant: U256, sqrt_beta: U256, rounding: Rounding) -> Result<U256, AmmError> {
    div_rounding(invariant, sqrt_beta, rounding)
}

/// Virtual offset of token 1: `L · √α`.
pub fn virtual_offset1(invariant: U256, sqrt_alpha: U256, rounding: Rounding) -> Result<U256, AmmError> {
    mul_rounding(invariant, sqrt_alpha, rounding)
}

/// Inflates the input offset and deflates the output offset slightly, so
/// rounding in the invariant never favours the trader.
fn virtual_balances(
    balance_in: U256,
    balance_out: U256,
    offset_in: U256,
    offset_out: U256,
) -> Result<(U256, U256), AmmError> {
    let in_over = balance_in.safe_add(mul_up(offset_in, WAD + 2)?)?;
    let out_under = balance_out.safe_add(mul_down(offset_out, WAD - 1)?)?;
    Ok((in_over, out_under))
}

/// Amount out for `amount_in` on the virtual constant-product curve.
///
/// # Errors
///
/// Returns [`AmmError::AssetBoundsExceeded`] if the result exceeds the
/// real output balance.
pub fn calc_out_given_in(
    balance_in: U256,
    balance_out: U256,
    amount_in: U256,
    offset_in: U256,
    offset_out: U256,
) -> Result<U256, AmmError> {
    let (in_over, out_under) = virtual_balances(balance_in, balance_out, offset_in, offset_out)?;
    let amount_out = div_down(mul_down(out_under, amount_in)?, in_over.safe_add(amount_in)?)?;
    if amount_out > balance_out {
        return Err(AmmError::AssetBoundsExceeded);
    }
    Ok(amount_out)
}

/// Amount in required for `amount_out` on the virtual curve.
///
/// # Errors
///
/// Returns [`AmmError::AssetBoundsExceeded`] if `amount_out` exceeds the
/// real output balance.
pub fn calc_in_given_out(
    balance_in: U256,
    balance_out: U256,
    amount_out: U256,
    offset_in: U256,
    offset_out: U256,
) -> Result<U256, AmmError> {
    if amount_out > balance_out {
        return Err(AmmError::AssetBoundsExceeded);
    }
    let (in_over, out_under) = virtual_balances(balance_in, balance_out, offset_in, offset_out)?;
    div_up(mul_up(in_over, amount_out)?, out_under.safe_sub(amount_out)?)
}

// ---------------------------------------------------------------------------
// Gyro2ClpPool
// ---------------------------------------------------------------------------

/// A Gyroscope 2-CLP pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gyro2ClpPool {
    sqrt_alpha: U256,
    sqrt_beta: U256,
}

impl Gyro2ClpPool {
    /// Creates a pool from the square roots of its price bounds.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::SqrtParamsWrong`] unless
    /// `sqrt_alpha < sqrt_beta`.
    pub fn new(sqrt_alpha: U256, sqrt_beta: U256) -> Result<Self, AmmError> {
        if sqrt_alpha >= sqrt_beta {
            return Err(AmmError::SqrtParamsWrong);
        }
        Ok(Self {
            sqrt_alpha,
            sqrt_beta,
        })
    }

    /// Square root of the lower price bound.
    #[must_use]
    pub const fn sqrt_alpha(&self) -> U256 {
        self.sqrt_alpha
    }

    /// Square root of the upper price bound.
    #[must_use]
    pub const fn sqrt_beta(&self) -> U256 {
        self.sqrt_beta
    }

    /// Virtual offsets `(in, out)` for a swap, from the invariant rounded
    /// down.
    fn virtual_offsets(
        &self,
        balance_in: U256,
        balance_out: U256,
        token_in_is_token0: bool,
    ) -> Result<(U256, U256), AmmError> {
        let balances = if token_in_is_token0 {
            [balance_in, balance_out]
        } else {
            [balance_out, balance_in]
        };
        let invariant =
            compute_invariant(&balances, self.sqrt_alpha, self.sqrt_beta, Rounding::Down)?;
        if token_in_is_token0 {
            Ok((
                virtual_offset0(invariant, self.sqrt_beta, Rounding::Up)?,
                virtual_offset1(invariant, self.sqrt_alpha, Rounding::Down)?,
            ))
        } else {
            Ok((
                virtual_offset1(invariant, self.sqrt_alpha, Rounding::Up)?,
                virtual_offset0(invariant, self.sqrt_beta, Rounding::Down)?,
            ))
        }
    }
}

impl FromConfig<Gyro2ClpState> for Gyro2ClpPool {
    fn from_config(config: &Gyro2ClpState) -> Result<Self, AmmError> {
        config.validate()?;
        Self::new(config.sqrt_alpha, config.sqrt_beta)
    }
}

impl PoolBase for Gyro2ClpPool {
    fn on_swap(&self, params: &SwapParams) -> Result<U256, AmmError> {
        let balance_in = at(&params.balances_live_scaled18, params.index_in)?;
        let balance_out = at(&params.balances_live_scaled18, params.index_out)?;
        let (offset_in, offset_out) =
            self.virtual_offsets(balance_in, balance_out, params.index_in == 0)?;
        match params.swap_kind {
            SwapKind::GivenIn => calc_out_given_in(
                balance_in,
                balance_out,
                params.amount_given_scaled18,
                offset_in,
                offset_out,
            ),
            SwapKind::GivenOut => calc_in_given_out(
                balance_in,
                balance_out,
                params.amount_given_scaled18,
                offset_in,
                offset_out,
            ),
        }
    }

    fn compute_invariant(
        &self,
        balances_live_scaled18: &[U256],
        rounding: Rounding,
    ) -> Result<U256, AmmError> {
        compute_invariant(balances_live_scaled18, self.sqrt_alpha, self.sqrt_beta, rounding)
    }

    fn compute_balance(
        &self,
        balances_live_scaled18: &[U256],
        token_in_index: usize,
        invariant_ratio: U256,
    ) -> Result<U256, AmmError> {
        let invariant = compute_invariant(
            balances_live_scaled18,
            self.sqrt_alpha,
            self.sqrt_beta,
            Rounding::Up,
        )?;
        let invariant = mul_up(invariant, invariant_ratio)?;
        let square = invariant.safe_mul(invariant)?;
        let a = div_down(invariant, self.sqrt_beta)?;
        let b = mul_down(invariant, self.sqrt_alpha)?;

        // (x + a)(y + b) = L²
        match token_in_index {
            0 => {
                let y = at(balances_live_scaled18, 1)?;
                div_up_raw(square, y.safe_add(b)?)?.safe_sub(a)
            }
            1 => {
                let x = at(balances_live_scaled18, 0)?;
                div_up_raw(square, x.safe_add(a)?)?.safe_sub(b)
            }
            _ => Err(AmmError::InvalidConfiguration("token index out of range")),
        }
    }

    /// Unbounded.
    fn get_maximum_invariant_ratio(&self) -> U256 {
        U256::MAX
    }

    /// Unbounded.
    fn get_minimum_invariant_ratio(&self) -> U256 {
        U256::ZERO
    }

    fn get_max_swap_amount(&self, params: &MaxSwapParams<'_>) -> Result<U256, AmmError> {
        gyro_max_swap_amount(params)
    }
}
