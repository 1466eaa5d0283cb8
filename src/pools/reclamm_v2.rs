//! Range-tracking concentrated liquidity pool (ReClamm), second release.
//!
//! Shares the virtual balance machinery of [`super::reclamm`] and changes
//! three things:
//!
//! - The range decay runs for at most 30 days per update and uses
//!   `pow_down`.
//! - The overvalued virtual balance never drops below the value that
//!   would put the pool exactly at its center.
//! - Swaps use the direct constant-product formulas instead of going
//!   through the rounded invariant.

use ethnum::U256;

use super::at;
use super::reclamm::{
    compute_price_ratio, current_virtual_balances, join_by_value, max_swap_amount_with, pair,
    split_by_value, swap_with, undervalued_virtual_balance, virtual_in_out, RangeParams,
    ReClammMath,
};
use crate::config::ReClammState;
use crate::domain::{MaxSingleTokenRemoveParams, MaxSwapParams, Rounding, SwapParams};
use crate::error::AmmError;
use crate::math::checked::CheckedArithmetic;
use crate::math::{div_down, mul_div_up, mul_down, oz_sqrt, pow_down, WAD};
use crate::traits::{FromConfig, PoolBase};

/// Longest decay applied in one update.
pub const MAX_DECAY_DURATION: U256 = U256::new(30 * 24 * 60 * 60);

/// Square root of an 18-decimal value, in 18 decimals.
fn sqrt_scaled18(value: U256) -> Result<U256, AmmError> {
    Ok(oz_sqrt(value.safe_mul(WAD)?))
}

/// Second-release math: capped decay with a floor, direct swaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct V2;

impl ReClammMath for V2 {
    fn shift_range(
        balances: &[U256; 2],
        virtual_balances: &[U256; 2],
        above_center: bool,
        params: &RangeParams,
    ) -> Result<[U256; 2], AmmError> {
        let sqrt_price_ratio = sqrt_scaled18(compute_price_ratio(balances, virtual_balances)?)?;
        let (undervalued, overvalued) = split_by_value(balances, above_center);
        let virtual_overvalued = if above_center {
            virtual_balances[1]
        } else {
            virtual_balances[0]
        };

        let duration = params.elapsed()?.min(MAX_DECAY_DURATION);
        let decay = pow_down(params.daily_price_shift_base, duration.safe_mul(WAD)?)?;
        let decayed = mul_down(virtual_overvalued, decay)?;

        // centeredness one
        let floor = div_down(overvalued, sqrt_scaled18(sqrt_price_ratio)?.safe_sub(WAD)?)?;
        let virtual_overvalued = decayed.max(floor);

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
        let balance_out = at(balances, index_out)?;

        // (Ro + Vo) · Δin / (Ri + Vi + Δin), floored
        let amount_out = balance_out
            .safe_add(virtual_out)?
            .safe_mul(amount_in)?
            .safe_div(at(balances, index_in)?.safe_add(virtual_in)?.safe_add(amount_in)?)?;
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
        mul_div_up(
            at(balances, index_in)?.safe_add(virtual_in)?,
            amount_out,
            balance_out.safe_add(virtual_out)?.safe_sub(amount_out)?,
        )
    }
}

/// A second-release ReClamm pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReClammV2Pool {
    params: RangeParams,
}

impl ReClammV2Pool {
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
        current_virtual_balances::<V2>(&pair(balances_live_scaled18)?, &self.params)
    }
}

impl FromConfig<ReClammState> for ReClammV2Pool {
    fn from_config(config: &ReClammState) -> Result<Self, AmmError> {
        RangeParams::from_state(config).map(Self::new)
    }
}

impl PoolBase for ReClammV2Pool {
    fn on_swap(&self, params: &SwapParams) -> Result<U256, AmmError> {
        swap_with::<V2>(&self.params, params)
    }

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
        max_swap_amount_with::<V2>(&self.params, params)
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

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::SwapKind;
    use crate::pools::reclamm::tests::{
        centered, off_center, params, swap, updating_ratio, E18, LAST_TS,
    };
    use crate::pools::reclamm::ReClammPool;

    // -- virtual balances -----------------------------------------------------

    #[test]
    fn off_center_pool_shifts_range() {
        let pool = ReClammV2Pool::new(params());
        assert_eq!(
            pool.current_virtual_balances(&off_center()),
            Ok((
                [
                    U256::new(971_531_862_020_198_013_000),
                    U256::new(2_012_475_598_262_665_045_368)
                ],
                true
            ))
        );
    }

    #[test]
    fn decay_is_capped_at_thirty_days() {
        let pool = ReClammV2Pool::new(RangeParams {
            current_timestamp: LAST_TS + 100 * 86_400,
            ..params()
        });
        assert_eq!(
            pool.current_virtual_balances(&off_center()),
            Ok((
                [
                    U256::new(258_102_020_816_341_707_981),
                    U256::new(3_871_530_312_245_125_606_266)
                ],
                true
            ))
        );
    }

    #[test]
    fn price_ratio_update_matches_first_release() {
        let v2 = ReClammV2Pool::new(updating_ratio());
        let v1 = ReClammPool::new(updating_ratio());
        let Ok(expected) = v1.current_virtual_balances(&centered()) else {
            panic!("expected virtual balances");
        };
        assert_eq!(v2.current_virtual_balances(&centered()), Ok(expected));
    }

    // -- swaps ----------------------------------------------------------------

    #[test]
    fn off_center_swaps() {
        let pool = ReClammV2Pool::new(params());
        let amount = E18 * 10;
        let cases = [
            (SwapKind::GivenIn, 0, 32_476_857_331_800_625_645u128),
            (SwapKind::GivenIn, 1, 3_041_985_195_152_786_109),
            (SwapKind::GivenOut, 0, 3_059_355_681_312_128_397),
            (SwapKind::GivenOut, 1, 33_088_743_955_156_311_242),
        ];
        for (kind, index_in, expected) in cases {
            assert_eq!(
                pool.on_swap(&swap(kind, amount, index_in, off_center())),
                Ok(U256::new(expected))
            );
        }
    }

    #[test]
    fn centered_swaps() {
        let pool = ReClammV2Pool::new(params());
        assert_eq!(
            pool.on_swap(&swap(SwapKind::GivenIn, E18 * 10, 0, centered())),
            Ok(U256::new(19_859_571_622_343_807_685))
        );
        assert_eq!(
            pool.on_swap(&swap(SwapKind::GivenOut, E18 * 10, 1, centered())),
            Ok(U256::new(20_142_428_477_661_192_565))
        );
    }

    #[test]
    fn guards_apply() {
        let pool = ReClammV2Pool::new(params());
        let balance_out = centered()[1];
        assert_eq!(
            pool.on_swap(&swap(SwapKind::GivenOut, balance_out + 1, 0, centered())),
            Err(AmmError::AmountOutGreaterThanBalance)
        );
        assert_eq!(
            pool.on_swap(&swap(SwapKind::GivenOut, balance_out - 999_999_999_999, 0, centered())),
            Err(AmmError::TokenBalanceTooLow)
        );
    }

    #[test]
    fn max_swap_amount_round_trips() {
        let pool = ReClammV2Pool::new(params());
        let balances = centered();
        let rates = [WAD, WAD];
        let scaling = [U256::ONE, U256::ONE];
        let Ok(max_in) = pool.get_max_swap_amount(&MaxSwapParams {
            swap_kind: SwapKind::GivenIn,
            balances_live_scaled18: &balances,
            token_rates: &rates,
            scaling_factors: &scaling,
            index_in: 0,
            index_out: 1,
        }) else {
            panic!("expected max amount");
        };
        assert_eq!(max_in, U256::new(585_786_436_626_904_950_232));
        assert_eq!(
            pool.on_swap(&swap(SwapKind::GivenIn, max_in, 0, centered())),
            Ok(U256::new(828_427_123_746_190_095_999))
        );
    }

    #[test]
    fn proportional_only() {
        let pool = ReClammV2Pool::new(params());
        assert_eq!(pool.get_maximum_invariant_ratio(), U256::ZERO);
        assert_eq!(pool.get_max_single_token_add_amount(), U256::ZERO);
    }
}
