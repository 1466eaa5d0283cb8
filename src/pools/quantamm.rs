//! QuantAMM time-weighted pool.
//!
//! A weighted pool whose weights drift linearly between on-chain updates.
//! Every weight carries a signed per-second multiplier; the weight in
//! effect at `current_timestamp` is
//!
//! ```text
//! w(t) = w + m · (min(t, last_interop_time) − last_update_time)
//! ```
//!
//! Swaps use the weighted formulas with those weights, and both sides of a
//! trade are capped at `max_trade_size_ratio` of the matching balance.

use ethnum::{I256, U256};

use super::at;
use super::weighted::{
    compute_balance_out_given_invariant, compute_in_given_exact_out, compute_invariant,
    compute_out_given_exact_in, max_swap_amount_by_ratio, MAX_INVARIANT_RATIO,
    MIN_INVARIANT_RATIO,
};
use crate::config::QuantAmmState;
use crate::domain::{MaxSwapParams, Rounding, SwapKind, SwapParams};
use crate::error::AmmError;
use crate::math::checked::CheckedArithmetic;
use crate::math::{mul_down, to_unsigned, WAD};
use crate::traits::{FromConfig, PoolBase};

/// Tokens per packed group.
const GROUP_SIZE: usize = 4;

/// Weights always use the current math release.
const VERSION: u32 = 0;

/// Splits one packed group into `(weights, multipliers)` for `count`
/// tokens: the first `count` entries are weights, the next `count`
/// multipliers.
fn unpack_group(packed: &[I256], count: usize) -> Result<(&[I256], &[I256]), AmmError> {
    if packed.len() < 2 * count {
        return Err(AmmError::InvalidConfiguration(
            "packed weights and multipliers too short for the token count",
        ));
    }
    Ok((&packed[..count], &packed[count..2 * count]))
}

/// Unpacks both groups into per-token weights and multipliers.
///
/// # Errors
///
/// Returns [`AmmError::InvalidConfiguration`] if a group is too short, or
/// [`AmmError::NegativeAmountOut`] for a negative base weight.
pub fn unpack_weights_and_multipliers(
    token_count: usize,
    first_four: &[I256],
    second_four: &[I256],
) -> Result<(Vec<U256>, Vec<I256>), AmmError> {
    let first_count = token_count.min(GROUP_SIZE);
    let second_count = token_count.saturating_sub(GROUP_SIZE);

    let (w1, m1) = unpack_group(first_four, first_count)?;
    let (w2, m2) = if second_count > 0 {
        unpack_group(second_four, second_count)?
    } else {
        (&[][..], &[][..])
    };

    let weights = w1
        .iter()
        .chain(w2)
        .map(|w| to_unsigned(*w))
        .collect::<Result<Vec<_>, _>>()?;
    let multipliers = m1.iter().chain(m2).copied().collect();
    Ok((weights, multipliers))
}

/// Weight after `elapsed` seconds of drift at `multiplier` per second.
///
/// The multiplier is scaled by `1e18` before the fixed-point product, so
/// sub-wei rates keep their precision.
///
/// # Errors
///
/// Returns [`AmmError::Underflow`] if a falling weight would go negative.
pub fn calculate_block_normalised_weight(
    weight: U256,
    multiplier: I256,
    elapsed: U256,
) -> Result<U256, AmmError> {
    let drift = mul_down(multiplier.unsigned_abs().safe_mul(WAD)?, elapsed)?;
    if multiplier > I256::ZERO {
        weight.safe_add(drift)
    } else {
        weight.safe_sub(drift)
    }
}

/// A QuantAMM pool frozen at its quote timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantAmmPool {
    normalized_weights: Vec<U256>,
    max_trade_size_ratio: U256,
}

impl QuantAmmPool {
    /// Interpolates the weights at `current_timestamp`.
    ///
    /// # Errors
    ///
    /// Propagates unpacking and drift errors, and
    /// [`AmmError::Underflow`] if `last_update_time` is past the
    /// interpolation end.
    pub fn new(state: &QuantAmmState) -> Result<Self, AmmError> {
        let (weights, multipliers) = unpack_weights_and_multipliers(
            state.base.tokens.len(),
            &state.first_four_weights_and_multipliers,
            &state.second_four_weights_and_multipliers,
        )?;

        let multiplier_time = state.current_timestamp.min(state.last_interop_time);
        let elapsed = multiplier_time.safe_sub(state.last_update_time)?;

        let normalized_weights = weights
            .iter()
            .zip(&multipliers)
            .map(|(w, m)| calculate_block_normalised_weight(*w, *m, elapsed))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            normalized_weights,
            max_trade_size_ratio: state.max_trade_size_ratio,
        })
    }

    /// Weights in effect at the quote timestamp.
    #[must_use]
    pub fn normalized_weights(&self) -> &[U256] {
        &self.normalized_weights
    }

    fn check_trade_size(&self, amount: U256, balance: U256) -> Result<(), AmmError> {
        if amount > mul_down(balance, self.max_trade_size_ratio)? {
            return Err(AmmError::MaxTradeSizeRatioExceeded);
        }
        Ok(())
    }
}

impl FromConfig<QuantAmmState> for QuantAmmPool {
    fn from_config(config: &QuantAmmState) -> Result<Self, AmmError> {
        config.validate()?;
        Self::new(config)
    }
}

impl PoolBase for QuantAmmPool {
    fn on_swap(&self, params: &SwapParams) -> Result<U256, AmmError> {
        let balances = &params.balances_live_scaled18;
        let balance_in = at(balances, params.index_in)?;
        let balance_out = at(balances, params.index_out)?;
        let weight_in = at(&self.normalized_weights, params.index_in)?;
        let weight_out = at(&self.normalized_weights, params.index_out)?;
        let amount = params.amount_given_scaled18;

        match params.swap_kind {
            SwapKind::GivenIn => {
                self.check_trade_size(amount, balance_in)?;
                let amount_out = compute_out_given_exact_in(
                    balance_in, weight_in, balance_out, weight_out, amount, VERSION,
                )?;
                self.check_trade_size(amount_out, balance_out)?;
                Ok(amount_out)
            }
            SwapKind::GivenOut => {
                self.check_trade_size(amount, balance_out)?;
                let amount_in = compute_in_given_exact_out(
                    balance_in, weight_in, balance_out, weight_out, amount, VERSION,
                )?;
                self.check_trade_size(amount_in, balance_in)?;
                Ok(amount_in)
            }
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

    /// `max_trade_size_ratio` of the limiting balance, in raw units.
    fn get_max_swap_amount(&self, params: &MaxSwapParams<'_>) -> Result<U256, AmmError> {
        max_swap_amount_by_ratio(params, self.max_trade_size_ratio)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::config::pool_state::tests::base;

    const E18: U256 = WAD;
    const HALF: I256 = I256::new(500_000_000_000_000_000);
    const RATE: I256 = I256::new(1_000_000_000);
    const TENTH: U256 = U256::new(100_000_000_000_000_000);

    fn state(now: u128) -> QuantAmmState {
        let mut base = base(2);
        base.balances_live_scaled18 = vec![E18 * 1000, E18 * 2000];
        QuantAmmState {
            base,
            first_four_weights_and_multipliers: vec![HALF, HALF, RATE, -RATE],
            second_four_weights_and_multipliers: vec![],
            last_update_time: U256::new(1_000),
            last_interop_time: U256::new(3_000),
            current_timestamp: U256::new(now),
            max_trade_size_ratio: TENTH,
        }
    }

    pub(crate) fn pool(now: u128) -> QuantAmmPool {
        let Ok(pool) = QuantAmmPool::from_config(&state(now)) else {
            panic!("expected valid quantamm state");
        };
        pool
    }

    fn swap(kind: SwapKind, amount: U256, index_in: usize) -> SwapParams {
        SwapParams {
            swap_kind: kind,
            amount_given_scaled18: amount,
            balances_live_scaled18: vec![E18 * 1000, E18 * 2000],
            index_in,
            index_out: 1 - index_in,
        }
    }

    // -- weights --------------------------------------------------------------

    #[test]
    fn weights_drift_until_interop_time() {
        assert_eq!(
            pool(2_000).normalized_weights(),
            &[U256::new(500_001_000_000_000_000), U256::new(499_999_000_000_000_000)]
        );
        let frozen = [U256::new(500_002_000_000_000_000), U256::new(499_998_000_000_000_000)];
        assert_eq!(pool(3_000).normalized_weights(), &frozen);
        assert_eq!(pool(9_000).normalized_weights(), &frozen);
    }

    #[test]
    fn falling_weight_cannot_go_negative() {
        assert!(matches!(
            calculate_block_normalised_weight(U256::ONE, -RATE, U256::ONE),
            Err(AmmError::Underflow(_))
        ));
    }

    #[test]
    fn unpacks_two_groups() {
        let w = |v: i128| I256::new(v);
        let first = [w(10), w(11), w(12), w(13), w(-1), w(-2), w(-3), w(-4)];
        let second = [w(14), w(15), w(5), w(6)];
        let Ok((weights, multipliers)) = unpack_weights_and_multipliers(6, &first, &second) else {
            panic!("expected unpacked weights");
        };
        assert_eq!(weights, [10u128, 11, 12, 13, 14, 15].map(U256::new));
        assert_eq!(multipliers, vec![w(-1), w(-2), w(-3), w(-4), w(5), w(6)]);
    }

    #[test]
    fn short_group_rejected() {
        let first = [HALF, HALF, RATE];
        assert!(matches!(
            unpack_weights_and_multipliers(2, &first, &[]),
            Err(AmmError::InvalidConfiguration(_))
        ));
    }

    // -- swaps ----------------------------------------------------------------

    #[test]
    fn swaps_use_interpolated_weights() {
        let p = pool(2_000);
        assert_eq!(
            p.on_swap(&swap(SwapKind::GivenIn, E18 * 10, 0)),
            Ok(U256::new(19_802_059_012_657_864_000))
        );
        assert_eq!(
            p.on_swap(&swap(SwapKind::GivenOut, E18 * 10, 0)),
            Ok(U256::new(5_025_105_477_269_355_000))
        );
        assert_eq!(
            p.on_swap(&swap(SwapKind::GivenIn, E18 * 10, 1)),
            Ok(U256::new(4_975_104_527_227_516_000))
        );
    }

    #[test]
    fn trade_size_capped_on_both_sides() {
        let p = pool(2_000);
        // 10% of 1000
        assert!(p.on_swap(&swap(SwapKind::GivenIn, E18 * 100, 0)).is_ok());
        assert_eq!(
            p.on_swap(&swap(SwapKind::GivenIn, E18 * 100 + 1, 0)),
            Err(AmmError::MaxTradeSizeRatioExceeded)
        );
        assert_eq!(
            p.on_swap(&swap(SwapKind::GivenOut, E18 * 100 + 1, 1)),
            Err(AmmError::MaxTradeSizeRatioExceeded)
        );
        // 100 out of token 0 needs more than 200 of token 1
        assert_eq!(
            p.on_swap(&swap(SwapKind::GivenOut, E18 * 100, 1)),
            Err(AmmError::MaxTradeSizeRatioExceeded)
        );
    }

    #[test]
    fn max_swap_amount_uses_trade_size_ratio() {
        let p = pool(2_000);
        let balances = [E18 * 1000, E18 * 2000];
        let rates = [WAD, WAD];
        let scaling = [U256::ONE, U256::new(1_000_000_000_000)];
        let max = |kind| {
            p.get_max_swap_amount(&MaxSwapParams {
                swap_kind: kind,
                balances_live_scaled18: &balances,
                token_rates: &rates,
                scaling_factors: &scaling,
                index_in: 0,
                index_out: 1,
            })
        };
        assert_eq!(max(SwapKind::GivenIn), Ok(E18 * 100));
        assert_eq!(max(SwapKind::GivenOut), Ok(U256::new(200_000_000)));
    }

    #[test]
    fn invariant_bounds_follow_weighted() {
        let p = pool(2_000);
        assert_eq!(p.get_maximum_invariant_ratio(), MAX_INVARIANT_RATIO);
        assert_eq!(p.get_minimum_invariant_ratio(), MIN_INVARIANT_RATIO);
        assert!(p.compute_invariant(&[E18 * 1000, E18 * 2000], Rounding::Down).is_ok());
    }

    #[test]
    fn update_after_interop_rejected() {
        let mut s = state(2_000);
        s.last_update_time = U256::new(4_000);
        assert!(QuantAmmPool::from_config(&s).is_err());
    }
}
