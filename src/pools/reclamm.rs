//! Range-tracking concentrated liquidity pool (ReClamm), first release.
//!
//! Swaps run on a constant product over `real + virtual` balances:
//!
//! ```text
//! (Ra + Va) · (Rb + Vb) = L
//! ```
//!
//! The virtual balances are not fixed.  Before every quote they are
//! brought forward from the last stored snapshot to the quote timestamp:
//!
//! 1. While a price-ratio update is in flight, the fourth root of the
//!    price ratio is interpolated geometrically and the virtual balances
//!    are resized around the current centeredness.
//! 2. If the pool has drifted out of its centeredness margin, the
//!    overvalued virtual balance decays exponentially with time and the
//!    range follows the market price.
//!
//! Liquidity can only be added or removed proportionally, so the
//! invariant hooks of [`PoolBase`] report zero.
//!
//! The math that differs between releases (range shift and swap formulas)
//! sits behind [`ReClammMath`]; [`V1`] here and
//! [`V2`](super::reclamm_v2::V2) in the second release.

use ethnum::U256;

use super::at;
use crate::config::ReClammState;
use crate::domain::{MaxSingleTokenRemoveParams, MaxSwapParams, Rounding, SwapKind, SwapParams};
use crate::error::AmmError;
use crate::math::checked::CheckedArithmetic;
use crate::math::fixed_point::{mul_rounding, TWO_WAD};
use crate::math::log_exp::pow;
use crate::math::{div_down, div_up, mul_down, oz_sqrt, to_raw_undo_rate_round_down, WAD};
use crate::traits::{FromConfig, PoolBase};

/// Smallest real balance a swap may leave behind.
pub const MIN_TOKEN_BALANCE_SCALED18: U256 = U256::new(1_000_000_000_000);

/// Smallest centeredness a swap may leave behind.
pub const MIN_POOL_CENTEREDNESS: U256 = U256::new(1_000);

/// `1e36`, so that `oz_sqrt` of a 36-decimal value is 18-decimal.
const RAY: U256 = U256::new(1_000_000_000_000_000_000_000_000_000_000_000_000);

const A: usize = 0;
const B: usize = 1;

// ---------------------------------------------------------------------------
// RangeParams
// ---------------------------------------------------------------------------

/// Time-dependent parameters of a ReClamm pool, taken from its snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeParams {
    /// Virtual balances stored at `last_timestamp`.
    pub last_virtual_balances: [U256; 2],
    /// Per-second decay base of the overvalued virtual balance.
    pub daily_price_shift_base: U256,
    pub last_timestamp: U256,
    pub current_timestamp: U256,
    /// Centeredness below which the range starts moving.
    pub centeredness_margin: U256,
    pub start_fourth_root_price_ratio: U256,
    pub end_fourth_root_price_ratio: U256,
    pub price_ratio_update_start_time: U256,
    pub price_ratio_update_end_time: U256,
}

impl RangeParams {
    /// Extracts the range parameters from a validated snapshot.
    ///
    /// # Errors
    ///
    /// Propagates [`ReClammState::validate`].
    pub fn from_state(state: &ReClammState) -> Result<Self, AmmError> {
        state.validate()?;
        Ok(Self {
            last_virtual_balances: pair(&state.last_virtual_balances)?,
            daily_price_shift_base: state.daily_price_shift_base,
            last_timestamp: state.last_timestamp,
            current_timestamp: state.current_timestamp,
            centeredness_margin: state.centeredness_margin,
            start_fourth_root_price_ratio: state.start_fourth_root_price_ratio,
            end_fourth_root_price_ratio: state.end_fourth_root_price_ratio,
            price_ratio_update_start_time: state.price_ratio_update_start_time,
            price_ratio_update_end_time: state.price_ratio_update_end_time,
        })
    }

    /// Seconds elapsed since the last snapshot.
    pub(crate) fn elapsed(&self) -> Result<U256, AmmError> {
        self.current_timestamp.safe_sub(self.last_timestamp)
    }
}

pub(crate) fn pair(values: &[U256]) -> Result<[U256; 2], AmmError> {
    match values {
        [a, b] => Ok([*a, *b]),
        _ => Err(AmmError::InvalidConfiguration(
            "ReClamm pools hold exactly 2 tokens",
        )),
    }
}

// ---------------------------------------------------------------------------
// Release-specific math
// ---------------------------------------------------------------------------

/// The parts of the ReClamm math that changed between releases.
pub(crate) trait ReClammMath {
    /// Moves the price range towards the market price after the pool left
    /// its centeredness margin.
    fn shift_range(
        balances: &[U256; 2],
        virtual_balances: &[U256; 2],
        above_center: bool,
        params: &RangeParams,
    ) -> Result<[U256; 2], AmmError>;

    /// Amount out for `amount_in`, scaled-18.
    fn out_given_in(
        balances: &[U256; 2],
        virtual_balances: &[U256; 2],
        index_in: usize,
        index_out: usize,
        amount_in: U256,
    ) -> Result<U256, AmmError>;

    /// Amount in for `amount_out`, scaled-18.
    fn in_given_out(
        balances: &[U256; 2],
        virtual_balances: &[U256; 2],
        index_in: usize,
        index_out: usize,
        amount_out: U256,
    ) -> Result<U256, AmmError>;
}

/// First-release math: unbounded decay, invariant-based swaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct V1;

impl ReClammMath for V1 {
    fn shift_range(
        balances: &[U256; 2],
        virtual_balances: &[U256; 2],
        above_center: bool,
        params: &RangeParams,
    ) -> Result<[U256; 2], AmmError> {
        let sqrt_price_ratio = oz_sqrt(
            compute_price_ratio(balances, virtual_balances)?.safe_mul(WAD)?,
        );
        let (undervalued, overvalued) = split_by_value(balances, above_center);
        let virtual_overvalued = if above_center {
            virtual_balances[B]
        } else {
            virtual_balances[A]
        };

        // Vo = Vo · base^(Tc - Tl)
        let decay = pow(params.daily_price_shift_base, params.elapsed()?.safe_mul(WAD)?)?;
        let virtual_overvalued = mul_down(virtual_overvalued, decay)?;

        let virtual_undervalued =
            undervalued_virtual_balance(undervalued, overvalued, virtual_overvalued, sqrt_price_ratio)?;
        Ok(join_by_value(virtual_undervalued, virtual_overvalued, above_center))
    }

    fn out_given_in(
        balances: &[U256; 2],
        virtual_balances: &[U256; 2],
        index_in: usize,
        index_out: usize,
        amount_in: U256,
    ) -> Result<U256, AmmError> {
        let (virtual_in, virtual_out) = virtual_in_out(virtual_balances, index_in);
        let invariant = compute_invariant(balances, virtual_balances, Rounding::Up)?;

        let new_total_out = div_up(
            invariant,
            at(balances, index_in)?.safe_add(virtual_in)?.safe_add(amount_in)?,
        )?;
        let balance_out = at(balances, index_out)?;
        let current_total_out = balance_out.safe_add(virtual_out)?;
        if new_total_out > current_total_out {
            return Err(AmmError::NegativeAmountOut);
        }

        let amount_out = current_total_out - new_total_out;
        if amount_out > balance_out {
            return Err(AmmError::AmountOutGreaterThanBalance);
        }
        Ok(amount_out)
    }

    fn in_given_out(
        balances: &[U256; 2],
        virtual_balances: &[U256; 2],
        index_in: usize,
        index_out: usize,
        amount_out: U256,
    ) -> Result<U256, AmmError> {
        let balance_out = at(balances, index_out)?;
        if amount_out > balance_out {
            return Err(AmmError::AmountOutGreaterThanBalance);
        }
        let (virtual_in, virtual_out) = virtual_in_out(virtual_balances, index_in);
        let invariant = compute_invariant(balances, virtual_balances, Rounding::Up)?;

        div_up(invariant, balance_out.safe_add(virtual_out)?.safe_sub(amount_out)?)?
            .safe_sub(at(balances, index_in)?)?
            .safe_sub(virtual_in)
    }
}

// ---------------------------------------------------------------------------
// Shared math
// ---------------------------------------------------------------------------

/// `(Ra + Va) · (Rb + Vb)`, rounded as requested.
///
/// # Errors
///
/// Propagates overflow.
pub fn compute_invariant(
    balances: &[U256; 2],
    virtual_balances: &[U256; 2],
    rounding: Rounding,
) -> Result<U256, AmmError> {
    mul_rounding(
        balances[A].safe_add(virtual_balances[A])?,
        balances[B].safe_add(virtual_balances[B])?,
        rounding,
    )
}

/// How close the pool sits to the middle of its price range, in `[0, 1e18]`,
/// and whether token A is the relatively abundant side.
///
/// An empty A balance reports `(0, false)`, an empty B balance `(0, true)`.
///
/// # Errors
///
/// Propagates overflow and division by a zero virtual balance.
pub fn compute_centeredness(
    balances: &[U256; 2],
    virtual_balances: &[U256; 2],
) -> Result<(U256, bool), AmmError> {
    if balances[A] == U256::ZERO {
        return Ok((U256::ZERO, false));
    }
    if balances[B] == U256::ZERO {
        return Ok((U256::ZERO, true));
    }

    let numerator = balances[A].safe_mul(virtual_balances[B])?;
    let denominator = virtual_balances[A].safe_mul(balances[B])?;
    if numerator <= denominator {
        Ok((div_down(numerator, denominator)?, false))
    } else {
        Ok((div_down(denominator, numerator)?, true))
    }
}

/// Fourth root of the price ratio at `now`, interpolated geometrically
/// between the start and end values of the update window.
///
/// # Errors
///
/// Propagates `pow` domain errors and division by a zero start value.
pub fn compute_fourth_root_price_ratio(
    now: U256,
    start_value: U256,
    end_value: U256,
    start_time: U256,
    end_time: U256,
) -> Result<U256, AmmError> {
    if now >= end_time {
        return Ok(end_value);
    }
    if now <= start_time {
        return Ok(start_value);
    }

    let exponent = div_down(now - start_time, end_time - start_time)?;
    let current = mul_down(start_value, pow(div_down(end_value, start_value)?, exponent)?)?;

    // rounded down, so only the lower bound can be crossed
    Ok(current.max(start_value.min(end_value)))
}

/// `max_price / min_price` of the current range.
pub(crate) fn compute_price_ratio(
    balances: &[U256; 2],
    virtual_balances: &[U256; 2],
) -> Result<U256, AmmError> {
    let invariant = compute_invariant(balances, virtual_balances, Rounding::Down)?;

    // P_min = Vb² / L,  P_max = L / Va²
    let min_price = virtual_balances[B]
        .safe_mul(virtual_balances[B])?
        .safe_div(invariant)?;
    let max_price = div_down(invariant, mul_down(virtual_balances[A], virtual_balances[A])?)?;
    div_up(max_price, min_price)
}

/// Resizes the virtual balances to a new fourth-root price ratio while
/// keeping the centeredness of the last snapshot.
fn update_price_ratio(
    fourth_root_price_ratio: U256,
    balances: &[U256; 2],
    last_virtual_balances: &[U256; 2],
) -> Result<[U256; 2], AmmError> {
    let (centeredness, above_center) = compute_centeredness(balances, last_virtual_balances)?;
    let (undervalued, _) = split_by_value(balances, above_center);
    let (last_undervalued, last_overvalued) = if above_center {
        (last_virtual_balances[A], last_virtual_balances[B])
    } else {
        (last_virtual_balances[B], last_virtual_balances[A])
    };

    // Vu = Ru · (1 + C + √(1 + C·(C + 4·Q0 − 2))) / (2·(Q0 − 1))
    let sqrt_price_ratio = mul_down(fourth_root_price_ratio, fourth_root_price_ratio)?;
    let radicand = centeredness
        .safe_add(sqrt_price_ratio.safe_mul(U256::new(4))?)?
        .safe_sub(TWO_WAD)?
        .safe_mul(centeredness)?
        .safe_add(RAY)?;
    let virtual_undervalued = undervalued
        .safe_mul(WAD.safe_add(centeredness)?.safe_add(oz_sqrt(radicand))?)?
        .safe_div(sqrt_price_ratio.safe_sub(WAD)?.safe_mul(U256::new(2))?)?;
    let virtual_overvalued = virtual_undervalued
        .safe_mul(last_overvalued)?
        .safe_div(last_undervalued)?;

    Ok(join_by_value(virtual_undervalued, virtual_overvalued, above_center))
}

/// `Vu = Ru · (Vo + Ro) / ((Q0 − 1) · Vo − Ro)`
pub(crate) fn undervalued_virtual_balance(
    undervalued: U256,
    overvalued: U256,
    virtual_overvalued: U256,
    sqrt_price_ratio: U256,
) -> Result<U256, AmmError> {
    let denominator =
        mul_down(sqrt_price_ratio.safe_sub(WAD)?, virtual_overvalued)?.safe_sub(overvalued)?;
    undervalued
        .safe_mul(virtual_overvalued.safe_add(overvalued)?)?
        .safe_div(denominator)
}

/// `(undervalued, overvalued)` real balances.  Above center, token A is
/// the abundant (undervalued) side.
pub(crate) fn split_by_value(balances: &[U256; 2], above_center: bool) -> (U256, U256) {
    if above_center {
        (balances[A], balances[B])
    } else {
        (balances[B], balances[A])
    }
}

pub(crate) fn join_by_value(undervalued: U256, overvalued: U256, above_center: bool) -> [U256; 2] {
    if above_center {
        [undervalued, overvalued]
    } else {
        [overvalued, undervalued]
    }
}

pub(crate) fn virtual_in_out(virtual_balances: &[U256; 2], index_in: usize) -> (U256, U256) {
    if index_in == A {
        (virtual_balances[A], virtual_balances[B])
    } else {
        (virtual_balances[B], virtual_balances[A])
    }
}

/// Virtual balances at `params.current_timestamp`, and whether they moved
/// since the snapshot.
///
/// # Errors
///
/// Propagates `pow` domain errors (for instance a decay exponent past the
/// natural exponent range) and arithmetic failures.
pub(crate) fn current_virtual_balances<M: ReClammMath>(
    balances: &[U256; 2],
    params: &RangeParams,
) -> Result<([U256; 2], bool), AmmError> {
    let mut virtual_balances = params.last_virtual_balances;
    if params.last_timestamp == params.current_timestamp {
        return Ok((virtual_balances, false));
    }

    let mut changed = false;
    if params.current_timestamp > params.price_ratio_update_start_time
        && params.last_timestamp < params.price_ratio_update_end_time
    {
        let fourth_root = compute_fourth_root_price_ratio(
            params.current_timestamp,
            params.start_fourth_root_price_ratio,
            params.end_fourth_root_price_ratio,
            params.price_ratio_update_start_time,
            params.price_ratio_update_end_time,
        )?;
        virtual_balances =
            update_price_ratio(fourth_root, balances, &params.last_virtual_balances)?;
        changed = true;
    }

    let (centeredness, above_center) = compute_centeredness(balances, &virtual_balances)?;
    if centeredness < params.centeredness_margin {
        virtual_balances = M::shift_range(balances, &virtual_balances, above_center, params)?;
        changed = true;
    }

    Ok((virtual_balances, changed))
}

/// Rejects swaps that leave the pool too thin for reliable range updates.
///
/// # Errors
///
/// - [`AmmError::TokenBalanceTooLow`] if the output balance drops below
///   [`MIN_TOKEN_BALANCE_SCALED18`].
/// - [`AmmError::PoolCenterednessTooLow`] if the centeredness drops below
///   [`MIN_POOL_CENTEREDNESS`].
pub(crate) fn ensure_valid_pool_state_after_swap(
    balances: &[U256; 2],
    virtual_balances: &[U256; 2],
    index_in: usize,
    index_out: usize,
    amount_in: U256,
    amount_out: U256,
) -> Result<(), AmmError> {
    let mut updated = *balances;
    updated[index_in] = updated[index_in].safe_add(amount_in)?;
    updated[index_out] = updated[index_out].safe_sub(amount_out)?;

    if updated[index_out] < MIN_TOKEN_BALANCE_SCALED18 {
        return Err(AmmError::TokenBalanceTooLow);
    }
    if compute_centeredness(&updated, virtual_balances)?.0 < MIN_POOL_CENTEREDNESS {
        return Err(AmmError::PoolCenterednessTooLow);
    }
    Ok(())
}

fn swap_indices(balances: &[U256; 2], index_in: usize, index_out: usize) -> Result<(), AmmError> {
    at(balances, index_in)?;
    at(balances, index_out)?;
    if index_in == index_out {
        return Err(AmmError::InvalidConfiguration("token in and out must differ"));
    }
    Ok(())
}

/// Quotes a swap with the given release math, guards included.
pub(crate) fn swap_with<M: ReClammMath>(
    params: &RangeParams,
    swap: &SwapParams,
) -> Result<U256, AmmError> {
    let balances = pair(&swap.balances_live_scaled18)?;
    let (index_in, index_out) = (swap.index_in, swap.index_out);
    swap_indices(&balances, index_in, index_out)?;
    let (virtual_balances, _) = current_virtual_balances::<M>(&balances, params)?;

    let amount = swap.amount_given_scaled18;
    match swap.swap_kind {
        SwapKind::GivenIn => {
            let amount_out =
                M::out_given_in(&balances, &virtual_balances, index_in, index_out, amount)?;
            ensure_valid_pool_state_after_swap(
                &balances,
                &virtual_balances,
                index_in,
                index_out,
                amount,
                amount_out,
            )?;
            Ok(amount_out)
        }
        SwapKind::GivenOut => {
            let amount_in =
                M::in_given_out(&balances, &virtual_balances, index_in, index_out, amount)?;
            ensure_valid_pool_state_after_swap(
                &balances,
                &virtual_balances,
                index_in,
                index_out,
                amount_in,
                amount,
            )?;
            Ok(amount_in)
        }
    }
}

/// Largest raw swap that keeps [`MIN_TOKEN_BALANCE_SCALED18`] of the
/// output token in the pool.
///
/// `GivenOut` takes the output balance less the minimum; `GivenIn` takes
/// the input needed for that output, less one wei.
pub(crate) fn max_swap_amount_with<M: ReClammMath>(
    params: &RangeParams,
    max: &MaxSwapParams<'_>,
) -> Result<U256, AmmError> {
    let balances = pair(max.balances_live_scaled18)?;
    swap_indices(&balances, max.index_in, max.index_out)?;
    let max_amount_out = balances[max.index_out].saturating_sub(MIN_TOKEN_BALANCE_SCALED18);

    let (amount, index) = match max.swap_kind {
        SwapKind::GivenIn => {
            let (virtual_balances, _) = current_virtual_balances::<M>(&balances, params)?;
            let amount_in = M::in_given_out(
                &balances,
                &virtual_balances,
                max.index_in,
                max.index_out,
                max_amount_out,
            )?;
            (amount_in.saturating_sub(U256::ONE), max.index_in)
        }
        SwapKind::GivenOut => (max_amount_out, max.index_out),
    };
    to_raw_undo_rate_round_down(amount, at(max.scaling_factors, index)?, at(max.token_rates, index)?)
}

// ---------------------------------------------------------------------------
// ReClammPool
// ---------------------------------------------------------------------------

/// A first-release ReClamm pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReClammPool {
    params: RangeParams,
}

impl ReClammPool {
    #[must_use]
    pub const fn new(params: RangeParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub const fn params(&self) -> &RangeParams {
        &self.params
    }

    /// Virtual balances at the quote timestamp, and whether they moved
    /// since the snapshot.
    ///
    /// # Errors
    ///
    /// Propagates range update failures.
    pub fn current_virtual_balances(
        &self,
        balances_live_scaled18: &[U256],
    ) -> Result<([U256; 2], bool), AmmError> {
        current_virtual_balances::<V1>(&pair(balances_live_scaled18)?, &self.params)
    }
}

impl FromConfig<ReClammState> for ReClammPool {
    fn from_config(config: &ReClammState) -> Result<Self, AmmError> {
        RangeParams::from_state(config).map(Self::new)
    }
}

impl PoolBase for ReClammPool {
    fn on_swap(&self, params: &SwapParams) -> Result<U256, AmmError> {
        swap_with::<V1>(&self.params, params)
    }

    /// Proportional liquidity only.
    fn compute_invariant(&self, _: &[U256], _: Rounding) -> Result<U256, AmmError> {
        Ok(U256::ZERO)
    }

    fn compute_balance(&self, _: &[U256], _: usize, _: U256) -> Result<U256, AmmError> {
        Ok(U256::ZERO)
    }

    fn get_maximum_invariant_ratio(&self) -> U256 {
        U256::ZERO
    }

    fn get_minimum_invariant_ratio(&self) -> U256 {
        U256::ZERO
    }

    fn get_max_swap_amount(&self, params: &MaxSwapParams<'_>) -> Result<U256, AmmError> {
        max_swap_amount_with::<V1>(&self.params, params)
    }

    fn get_max_single_token_add_amount(&self) -> U256 {
        U256::ZERO
    }

    fn get_max_single_token_remove_amount(
        &self,
        _: &MaxSingleTokenRemoveParams,
    ) -> Result<U256, AmmError> {
        Ok(U256::ZERO)
    }
}
