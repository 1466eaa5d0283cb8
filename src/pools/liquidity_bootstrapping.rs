//! Liquidity bootstrapping pool (LBP).
//!
//! A two-token weighted pool used for token sales.  The project token's
//! weight moves linearly from its start to its end weight over
//! `[start_time, end_time]`; the reserve token always holds the remainder
//! of `1e18`.  Owner-only adds and post-sale removes are enforced by the
//! paired hook, see [`crate::hooks::LiquidityBootstrappingHook`].

use ethnum::U256;

use super::at;
use super::weighted::{
    compute_balance_out_given_invariant, compute_in_given_exact_out, compute_invariant,
    compute_out_given_exact_in, max_swap_amount_by_ratio, MAX_IN_RATIO, MAX_INVARIANT_RATIO,
    MAX_OUT_RATIO, MIN_INVARIANT_RATIO,
};
use crate::config::LiquidityBootstrappingState;
use crate::domain::{MaxSwapParams, Rounding, SwapKind, SwapParams};
use crate::error::AmmError;
use crate::math::checked::CheckedArithmetic;
use crate::math::{div_down, mul_down, WAD};
use crate::traits::{FromConfig, PoolBase};

const VERSION: u32 = 0;

/// Progress through `[start_time, end_time]`, in `[0, 1e18]`.
///
/// # Errors
///
/// Propagates fixed-point overflow.
pub fn value_change_progress(now: U256, start_time: U256, end_time: U256) -> Result<U256, AmmError> {
    if now >= end_time {
        return Ok(WAD);
    }
    if now <= start_time {
        return Ok(U256::ZERO);
    }
    div_down(now - start_time, end_time - start_time)
}

/// Linear interpolation from `start` to `end` at `progress`.
///
/// # Errors
///
/// Propagates fixed-point overflow.
pub fn interpolate_value(start: U256, end: U256, progress: U256) -> Result<U256, AmmError> {
    if progress >= WAD || start == end {
        return Ok(end);
    }
    if progress == U256::ZERO {
        return Ok(start);
    }
    if start > end {
        start.safe_sub(mul_down(progress, start - end)?)
    } else {
        start.safe_add(mul_down(progress, end - start)?)
    }
}

/// Weights at `now`, indexed like the pool tokens.
///
/// # Errors
///
/// Returns [`AmmError::InvalidConfiguration`] for a project index other
/// than 0 or 1, or [`AmmError::Underflow`] if the project weight exceeds
/// `1e18`.
pub fn normalized_weights(
    project_token_index: usize,
    now: U256,
    start_time: U256,
    end_time: U256,
    project_start_weight: U256,
    project_end_weight: U256,
) -> Result<[U256; 2], AmmError> {
    let progress = value_change_progress(now, start_time, end_time)?;
    let project = interpolate_value(project_start_weight, project_end_weight, progress)?;
    let reserve = WAD.safe_sub(project)?;
    match project_token_index {
        0 => Ok([project, reserve]),
        1 => Ok([reserve, project]),
        _ => Err(AmmError::InvalidConfiguration(
            "project token index must be 0 or 1",
        )),
    }
}

/// A liquidity bootstrapping pool frozen at its quote timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityBootstrappingPool {
    normalized_weights: [U256; 2],
    project_token_index: usize,
    is_project_token_swap_in_blocked: bool,
    is_swap_enabled: bool,
}

impl LiquidityBootstrappingPool {
    #[must_use]
    pub const fn normalized_weights(&self) -> &[U256; 2] {
        &self.normalized_weights
    }

    #[must_use]
    pub const fn project_token_index(&self) -> usize {
        self.project_token_index
    }

    fn ensure_swap_allowed(&self, index_in: usize) -> Result<(), AmmError> {
        if !self.is_swap_enabled {
            return Err(AmmError::SwapsDisabled);
        }
        // the project token is the one sold into the pool, whatever the kind
        if self.is_project_token_swap_in_blocked && index_in == self.project_token_index {
            return Err(AmmError::ProjectTokenSwapInBlocked);
        }
        Ok(())
    }
}

impl FromConfig<LiquidityBootstrappingState> for LiquidityBootstrappingPool {
    fn from_config(config: &LiquidityBootstrappingState) -> Result<Self, AmmError> {
        config.validate()?;
        let index = config.project_token_index;
        let normalized_weights = normalized_weights(
            index,
            config.current_timestamp,
            config.start_time,
            config.end_time,
            at(&config.start_weights, index)?,
            at(&config.end_weights, index)?,
        )?;
        Ok(Self {
            normalized_weights,
            project_token_index: index,
            is_project_token_swap_in_blocked: config.is_project_token_swap_in_blocked,
            is_swap_enabled: config.is_swap_enabled,
        })
    }
}

impl PoolBase for LiquidityBootstrappingPool {
    fn on_swap(&self, params: &SwapParams) -> Result<U256, AmmError> {
        let balances = &params.balances_live_scaled18;
        let balance_in = at(balances, params.index_in)?;
        let balance_out = at(balances, params.index_out)?;
        let weight_in = at(&self.normalized_weights, params.index_in)?;
        let weight_out = at(&self.normalized_weights, params.index_out)?;
        self.ensure_swap_allowed(params.index_in)?;

        let amount = params.amount_given_scaled18;
        match params.swap_kind {
            SwapKind::GivenIn => compute_out_given_exact_in(
                balance_in, weight_in, balance_out, weight_out, amount, VERSION,
            ),
            SwapKind::GivenOut => compute_in_given_exact_out(
                balance_in, weight_in, balance_out, weight_out, amount, VERSION,
            ),
        }
    }

    fn compute_invariant(
        &self,
        balances_live_scaled18: &[U256],
        rounding: Rounding,
    ) -> Result<U256, AmmError> {
        compute_invariant(&self.normalized_weights, balances_live_scaled18, rounding, VERSION)
    }

    fn compute_balance(
        &self,
        balances_live_scaled18: &[U256],
        token_in_index: usize,
        invariant_ratio: U256,
    ) -> Result<U256, AmmError> {
        compute_balance_out_given_invariant(
            at(balances_live_scaled18, token_in_index)?,
            at(&self.normalized_weights, token_in_index)?,
            invariant_ratio,
            VERSION,
        )
    }

    fn get_maximum_invariant_ratio(&self) -> U256 {
        MAX_INVARIANT_RATIO
    }

    fn get_minimum_invariant_ratio(&self) -> U256 {
        MIN_INVARIANT_RATIO
    }

    fn get_max_swap_amount(&self, params: &MaxSwapParams<'_>) -> Result<U256, AmmError> {
        let ratio = match params.swap_kind {
            SwapKind::GivenIn => MAX_IN_RATIO,
            SwapKind::GivenOut => MAX_OUT_RATIO,
        };
        max_swap_amount_by_ratio(params, ratio)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::config::pool_state::tests::base;

    const E18: U256 = WAD;

    /// Project token 0 sold from 90/10 to 30/70 over `[1000, 2000]`.
    pub(crate) fn state(now: u128) -> LiquidityBootstrappingState {
        LiquidityBootstrappingState {
            base: base(2),
            project_token_index: 0,
            is_project_token_swap_in_blocked: true,
            start_weights: vec![U256::new(900_000_000_000_000_000), U256::new(100_000_000_000_000_000)],
            end_weights: vec![U256::new(300_000_000_000_000_000), U256::new(700_000_000_000_000_000)],
            start_time: U256::new(1_000),
            end_time: U256::new(2_000),
            is_swap_enabled: true,
            current_timestamp: U256::new(now),
        }
    }

    fn pool(now: u128) -> LiquidityBootstrappingPool {
        let Ok(pool) = LiquidityBootstrappingPool::from_config(&state(now)) else {
            panic!("expected valid bootstrapping state");
        };
        pool
    }

    fn swap(kind: SwapKind, index_in: usize) -> SwapParams {
        SwapParams {
            swap_kind: kind,
            amount_given_scaled18: E18 * 10,
            balances_live_scaled18: vec![E18 * 1000, E18 * 500],
            index_in,
            index_out: 1 - index_in,
        }
    }

    // -- weights --------------------------------------------------------------

    #[test]
    fn weights_follow_schedule() {
        let w = |a: u128, b: u128| [U256::new(a), U256::new(b)];
        assert_eq!(
            pool(500).normalized_weights(),
            &w(900_000_000_000_000_000, 100_000_000_000_000_000)
        );
        assert_eq!(
            pool(1_250).normalized_weights(),
            &w(750_000_000_000_000_000, 250_000_000_000_000_000)
        );
        assert_eq!(
            pool(1_500).normalized_weights(),
            &w(600_000_000_000_000_000, 400_000_000_000_000_000)
        );
        assert_eq!(
            pool(5_000).normalized_weights(),
            &w(300_000_000_000_000_000, 700_000_000_000_000_000)
        );
    }

    #[test]
    fn reserve_weight_is_the_remainder() {
        let Ok(weights) = normalized_weights(
            1,
            U256::new(1_500),
            U256::new(1_000),
            U256::new(2_000),
            U256::new(200_000_000_000_000_000),
            U256::new(800_000_000_000_000_000),
        ) else {
            panic!("expected weights");
        };
        assert_eq!(weights, [U256::new(500_000_000_000_000_000); 2]);
    }

    #[test]
    fn interpolation_edges() {
        assert_eq!(value_change_progress(U256::new(1_250), U256::new(1_000), U256::new(2_000)), Ok(U256::new(250_000_000_000_000_000)));
        assert_eq!(interpolate_value(E18, E18, U256::ZERO), Ok(E18));
        assert_eq!(interpolate_value(E18, E18 * 3, U256::ZERO), Ok(E18));
        assert_eq!(interpolate_value(E18, E18 * 3, WAD), Ok(E18 * 3));
    }

    // -- swaps ----------------------------------------------------------------

    #[test]
    fn buying_project_token() {
        let p = pool(1_500);
        assert_eq!(
            p.on_swap(&swap(SwapKind::GivenIn, 1)),
            Ok(U256::new(13_114_990_627_330_390_000))
        );
        assert_eq!(
            p.on_swap(&swap(SwapKind::GivenOut, 1)),
            Ok(U256::new(7_594_856_191_526_327_000))
        );
        assert_eq!(
            pool(1_250).on_swap(&swap(SwapKind::GivenIn, 1)),
            Ok(U256::new(6_579_137_841_025_869_000))
        );
    }

    #[test]
    fn selling_project_token_blocked() {
        let p = pool(1_500);
        assert_eq!(
            p.on_swap(&swap(SwapKind::GivenIn, 0)),
            Err(AmmError::ProjectTokenSwapInBlocked)
        );
        assert_eq!(
            p.on_swap(&swap(SwapKind::GivenOut, 0)),
            Err(AmmError::ProjectTokenSwapInBlocked)
        );

        let mut s = state(1_500);
        s.is_project_token_swap_in_blocked = false;
        let Ok(open) = LiquidityBootstrappingPool::from_config(&s) else {
            panic!("expected valid bootstrapping state");
        };
        assert_eq!(
            open.on_swap(&swap(SwapKind::GivenIn, 0)),
            Ok(U256::new(7_407_331_579_208_371_500))
        );
    }

    #[test]
    fn disabled_pool_rejects_swaps() {
        let mut s = state(1_500);
        s.is_swap_enabled = false;
        let Ok(p) = LiquidityBootstrappingPool::from_config(&s) else {
            panic!("expected valid bootstrapping state");
        };
        assert_eq!(p.on_swap(&swap(SwapKind::GivenIn, 1)), Err(AmmError::SwapsDisabled));
    }

    #[test]
    fn project_weight_above_one_rejected() {
        let mut s = state(1_500);
        s.start_weights[0] = E18 * 2;
        s.end_weights[0] = E18 * 2;
        assert!(matches!(
            LiquidityBootstrappingPool::from_config(&s),
            Err(AmmError::Underflow(_))
        ));
    }
}
