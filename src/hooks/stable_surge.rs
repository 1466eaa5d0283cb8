//! Stable surge hook.
//!
//! Charges a surcharge on swaps that push a stable pool off balance.  The
//! imbalance of a set of balances is
//!
//! ```text
//! imbalance = Σ |bᵢ − median(b)| / Σ bᵢ
//! ```
//!
//! A swap whose post-trade imbalance grows past `surge_threshold` pays
//!
//! ```text
//! fee = static + (max − static) · (imbalance − threshold) / (1 − threshold)
//! ```
//!
//! Unbalanced adds and single-token removes that would leave the pool
//! surging are refused outright.

use ethnum::U256;
use tracing::trace;

use crate::config::{wrong_state, HookState, StableSurgeHookState};
use crate::domain::{RemoveLiquidityKind, SwapKind, SwapParams};
use crate::error::AmmError;
use crate::math::checked::CheckedArithmetic;
use crate::math::{complement, div_down, mul_down};
use crate::pools::at;
use crate::pools::StablePool;
use crate::traits::{
    AfterAddLiquidityParams, AfterRemoveLiquidityParams, HookBase, HookFlags, HookOutcome,
    PoolBase,
};

/// Median of `balances`; the mean of the two middle values for an even
/// count.
fn median(balances: &[U256]) -> Result<U256, AmmError> {
    let mut sorted = balances.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok(at(&sorted, mid - 1)?.safe_add(at(&sorted, mid)?)? / 2)
    } else {
        at(&sorted, mid)
    }
}

/// Normalized distance of `balances` from their median, 18 decimals.
///
/// # Errors
///
/// [`AmmError::DivisionByZero`] for an empty pool; arithmetic errors.
pub fn calculate_imbalance(balances: &[U256]) -> Result<U256, AmmError> {
    if balances.is_empty() {
        return Err(AmmError::DivisionByZero);
    }
    let median = median(balances)?;
    let mut total = U256::ZERO;
    let mut total_diff = U256::ZERO;
    for balance in balances {
        total = total.safe_add(*balance)?;
        let diff = if *balance > median {
            *balance - median
        } else {
            median - *balance
        };
        total_diff = total_diff.safe_add(diff)?;
    }
    div_down(total_diff, total)
}

fn is_surging(
    threshold: U256,
    old_balances: &[U256],
    new_total_imbalance: U256,
) -> Result<bool, AmmError> {
    if new_total_imbalance == U256::ZERO {
        return Ok(false);
    }
    let old_total_imbalance = calculate_imbalance(old_balances)?;
    Ok(new_total_imbalance > old_total_imbalance && new_total_imbalance > threshold)
}

/// Swap fee for `params` under `state`, starting from `static_fee`.
///
/// Simulates the swap on a stable pool with the hook's amplification to
/// find the post-trade balances.
///
/// # Errors
///
/// Stable solver and arithmetic errors.
pub fn surge_fee_percentage(
    params: &SwapParams,
    state: &StableSurgeHookState,
    static_fee: U256,
) -> Result<U256, AmmError> {
    let amount_calculated = StablePool::new(state.amp).on_swap(params)?;

    let (amount_in, amount_out) = match params.swap_kind {
        SwapKind::GivenIn => (params.amount_given_scaled18, amount_calculated),
        SwapKind::GivenOut => (amount_calculated, params.amount_given_scaled18),
    };
    let mut new_balances = params.balances_live_scaled18.clone();
    let balance_in = at(&new_balances, params.index_in)?.safe_add(amount_in)?;
    let balance_out = at(&new_balances, params.index_out)?.safe_sub(amount_out)?;
    new_balances[params.index_in] = balance_in;
    new_balances[params.index_out] = balance_out;

    let new_total_imbalance = calculate_imbalance(&new_balances)?;
    if new_total_imbalance == U256::ZERO {
        return Ok(static_fee);
    }
    let old_total_imbalance = calculate_imbalance(&params.balances_live_scaled18)?;
    let threshold = state.surge_threshold_percentage;
    if new_total_imbalance <= old_total_imbalance || new_total_imbalance <= threshold {
        return Ok(static_fee);
    }

    let surge_multiplier = div_down(new_total_imbalance - threshold, complement(threshold))?;
    let increase = mul_down(
        state.max_surge_fee_percentage.safe_sub(static_fee)?,
        surge_multiplier,
    )?;
    trace!(%new_total_imbalance, %increase, "stable surge");
    static_fee.safe_add(increase)
}

/// Imbalance-driven dynamic fee for stable pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StableSurgeHook;

impl StableSurgeHook {
    fn state(hook_state: &HookState) -> Result<&StableSurgeHookState, AmmError> {
        match hook_state {
            HookState::StableSurge(state) => Ok(state),
            _ => Err(wrong_state()),
        }
    }
}

impl HookBase for StableSurgeHook {
    fn hook_type(&self) -> &str {
        "StableSurge"
    }

    fn flags(&self) -> HookFlags {
        HookFlags {
            should_call_compute_dynamic_swap_fee: true,
            should_call_after_add_liquidity: true,
            should_call_after_remove_liquidity: true,
            ..HookFlags::NONE
        }
    }

    fn on_compute_dynamic_swap_fee(
        &self,
        params: &SwapParams,
        static_swap_fee: U256,
        hook_state: &HookState,
    ) -> Result<HookOutcome<U256>, AmmError> {
        let state = Self::state(hook_state)?;
        surge_fee_percentage(params, state, static_swap_fee).map(HookOutcome::accept)
    }

    fn on_after_add_liquidity(
        &self,
        params: &AfterAddLiquidityParams<'_>,
        hook_state: &HookState,
    ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
        let state = Self::state(hook_state)?;
        let old_balances = params
            .balances_scaled18
            .iter()
            .zip(params.amounts_in_scaled18)
            .map(|(balance, amount)| balance.safe_sub(*amount))
            .collect::<Result<Vec<_>, _>>()?;
        let new_total_imbalance = calculate_imbalance(params.balances_scaled18)?;
        let surging = is_surging(
            state.surge_threshold_percentage,
            &old_balances,
            new_total_imbalance,
        )?;
        let raw = params.amounts_in_raw.to_vec();
        Ok(if surging {
            HookOutcome::reject(raw)
        } else {
            HookOutcome::accept(raw)
        })
    }

    fn on_after_remove_liquidity(
        &self,
        params: &AfterRemoveLiquidityParams<'_>,
        hook_state: &HookState,
    ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
        let state = Self::state(hook_state)?;
        let raw = params.amounts_out_raw.to_vec();
        // proportional exits never change the imbalance
        if params.kind == RemoveLiquidityKind::Proportional {
            return Ok(HookOutcome::accept(raw));
        }

        let old_balances = params
            .balances_scaled18
            .iter()
            .zip(params.amounts_out_scaled18)
            .map(|(balance, amount)| balance.safe_add(*amount))
            .collect::<Result<Vec<_>, _>>()?;
        let new_total_imbalance = calculate_imbalance(params.balances_scaled18)?;
        let surging = is_surging(
            state.surge_threshold_percentage,
            &old_balances,
            new_total_imbalance,
        )?;
        Ok(if surging {
            HookOutcome::reject(raw)
        } else {
            HookOutcome::accept(raw)
        })
    }
}
