//! Akron loss-versus-rebalancing fee hook for weighted pools.
//!
//! Prices each swap at the fee that would make an arbitrageur indifferent
//! between trading now and waiting for the pool to rebalance.  The fee is
//! floored at `minimum_swap_fee_percentage`.

use ethnum::U256;

use crate::config::{wrong_state, HookState};
use crate::domain::{SwapKind, SwapParams};
use crate::error::AmmError;
use crate::math::checked::CheckedArithmetic;
use crate::math::{div_down, div_up, mul_div_up, pow_up, WAD};
use crate::pools::at;
use crate::traits::{HookBase, HookFlags, HookOutcome};

/// Fee for an exact amount in, with `exponent = w_in / w_out`.
///
/// # Errors
///
/// Fixed-point and pow errors.
pub fn fee_percentage_given_exact_in(
    balance_in: U256,
    exponent: U256,
    amount_in: U256,
) -> Result<U256, AmmError> {
    let balance_plus_amount = balance_in.safe_add(amount_in)?;
    let balance_plus_twice = balance_plus_amount.safe_add(amount_in)?;

    let power_with_fees = pow_up(div_up(balance_plus_amount, balance_plus_twice)?, exponent)?;
    let power_without_fees = pow_up(div_up(balance_in, balance_plus_amount)?, exponent)?;

    let numerator = mul_div_up(
        balance_plus_amount,
        power_with_fees.safe_sub(power_without_fees)?,
        power_with_fees,
    )?;
    mul_div_up(exponent, numerator, amount_in)
}

/// Fee for an exact amount out, with `exponent = w_out / w_in`.
///
/// # Errors
///
/// Fixed-point and pow errors; [`AmmError::Underflow`] once the amount
/// reaches half the balance out.
pub fn fee_percentage_given_exact_out(
    balance_out: U256,
    exponent: U256,
    amount_out: U256,
) -> Result<U256, AmmError> {
    let balance_minus_amount = balance_out.safe_sub(amount_out)?;
    let balance_minus_twice = balance_minus_amount.safe_sub(amount_out)?;

    let power_with_fees = pow_up(div_up(balance_minus_amount, balance_minus_twice)?, exponent)?;
    let power_without_fees = pow_up(div_up(balance_out, balance_minus_amount)?, exponent)?;

    div_up(
        power_with_fees.safe_sub(power_without_fees)?,
        power_with_fees.safe_sub(WAD)?,
    )
}

/// LVR dynamic fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AkronHook;

impl HookBase for AkronHook {
    fn hook_type(&self) -> &str {
        "Akron"
    }

    fn flags(&self) -> HookFlags {
        HookFlags {
            should_call_compute_dynamic_swap_fee: true,
            ..HookFlags::NONE
        }
    }

    fn on_compute_dynamic_swap_fee(
        &self,
        params: &SwapParams,
        _static_swap_fee: U256,
        hook_state: &HookState,
    ) -> Result<HookOutcome<U256>, AmmError> {
        let HookState::Akron(state) = hook_state else {
            return Err(wrong_state());
        };
        let weight_in = at(&state.weights, params.index_in)?;
        let weight_out = at(&state.weights, params.index_out)?;
        let balances = &params.balances_live_scaled18;

        let calculated = match params.swap_kind {
            SwapKind::GivenIn => fee_percentage_given_exact_in(
                at(balances, params.index_in)?,
                div_down(weight_in, weight_out)?,
                params.amount_given_scaled18,
            )?,
            SwapKind::GivenOut => fee_percentage_given_exact_out(
                at(balances, params.index_out)?,
                div_up(weight_out, weight_in)?,
                params.amount_given_scaled18,
            )?,
        };
        Ok(HookOutcome::accept(
            calculated.max(state.minimum_swap_fee_percentage),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::config::AkronHookState;

    const E18: U256 = WAD;
    const MIN_FEE: U256 = U256::new(10_000_000_000_000);

    fn state(w0: u128, w1: u128) -> HookState {
        HookState::Akron(AkronHookState {
            weights: vec![U256::new(w0), U256::new(w1)],
            minimum_swap_fee_percentage: MIN_FEE,
        })
    }

    fn fee(kind: SwapKind, amount: U256, hook_state: &HookState) -> Result<U256, AmmError> {
        let params = SwapParams {
            swap_kind: kind,
            amount_given_scaled18: amount,
            balances_live_scaled18: vec![E18 * 1000, E18 * 1000],
            index_in: 0,
            index_out: 1,
        };
        AkronHook
            .on_compute_dynamic_swap_fee(&params, U256::ZERO, hook_state)
            .map(|outcome| outcome.value)
    }

    #[test]
    fn equal_weights() {
        let s = state(500_000_000_000_000_000, 500_000_000_000_000_000);
        assert_eq!(
            fee(SwapKind::GivenIn, E18 * 10, &s),
            Ok(U256::new(9_900_990_099_009_900))
        );
        assert_eq!(
            fee(SwapKind::GivenOut, E18 * 10, &s),
            Ok(U256::new(10_101_010_101_010_080))
        );
    }

    #[test]
    fn skewed_weights() {
        let s = state(800_000_000_000_000_000, 200_000_000_000_000_000);
        assert_eq!(
            fee(SwapKind::GivenIn, E18 * 10, &s),
            Ok(U256::new(158_392_548_942_915_702))
        );
        assert_eq!(
            fee(SwapKind::GivenOut, E18 * 10, &s),
            Ok(U256::new(10_063_052_808_086_304))
        );
    }

    #[test]
    fn tiny_swap_pays_minimum() {
        let s = state(500_000_000_000_000_000, 500_000_000_000_000_000);
        assert_eq!(fee(SwapKind::GivenIn, U256::new(1_000_000_000_000), &s), Ok(MIN_FEE));
    }

    #[test]
    fn exact_out_of_half_the_balance_fails() {
        let s = state(500_000_000_000_000_000, 500_000_000_000_000_000);
        assert!(fee(SwapKind::GivenOut, E18 * 500, &s).is_err());
    }
}
