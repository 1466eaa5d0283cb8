//! Conversions between raw token amounts and the scaled-18 domain.
//!
//! A raw amount becomes scaled-18 by multiplying with the token's decimal
//! scaling factor (`10^(18 - decimals)`) and then by its 18-decimal rate.
//! The reverse divides by `scaling_factor * rate`, which is exact in 18
//! decimals, so only the final division rounds.

use ethnum::U256;

use super::checked::CheckedArithmetic;
use super::fixed_point::{div_down, div_up, mul_down, mul_up, WAD};
use crate::error::AmmError;

/// `amount * scaling_factor * rate / 1e18`, rounded down.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] on multiplication overflow.
#[inline]
pub fn to_scaled18_apply_rate_round_down(
    amount: U256,
    scaling_factor: U256,
    rate: U256,
) -> Result<U256, AmmError> {
    mul_down(amount.safe_mul(scaling_factor)?, rate)
}

/// `amount * scaling_factor * rate / 1e18`, rounded up.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] on multiplication overflow.
#[inline]
pub fn to_scaled18_apply_rate_round_up(
    amount: U256,
    scaling_factor: U256,
    rate: U256,
) -> Result<U256, AmmError> {
    mul_up(amount.safe_mul(scaling_factor)?, rate)
}

/// Undoes [`to_scaled18_apply_rate_round_down`], rounding down.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if the scaling factor or rate is zero.
/// - [`AmmError::Overflow`] on multiplication overflow.
#[inline]
pub fn to_raw_undo_rate_round_down(
    amount: U256,
    scaling_factor: U256,
    rate: U256,
) -> Result<U256, AmmError> {
    div_down(amount, scaling_factor.safe_mul(rate)?)
}

/// Undoes [`to_scaled18_apply_rate_round_up`], rounding up.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if the scaling factor or rate is zero.
/// - [`AmmError::Overflow`] on multiplication overflow.
#[inline]
pub fn to_raw_undo_rate_round_up(
    amount: U256,
    scaling_factor: U256,
    rate: U256,
) -> Result<U256, AmmError> {
    div_up(amount, scaling_factor.safe_mul(rate)?)
}

/// Scales every amount with [`to_scaled18_apply_rate_round_down`].
///
/// # Errors
///
/// - [`AmmError::InvalidConfiguration`] if the slices differ in length.
/// - Any error from the per-token conversion.
pub fn copy_to_scaled18_apply_rate_round_down(
    amounts: &[U256],
    scaling_factors: &[U256],
    rates: &[U256],
) -> Result<Vec<U256>, AmmError> {
    scale_all(amounts, scaling_factors, rates, to_scaled18_apply_rate_round_down)
}

/// Scales every amount with [`to_scaled18_apply_rate_round_up`].
///
/// # Errors
///
/// - [`AmmError::InvalidConfiguration`] if the slices differ in length.
/// - Any error from the per-token conversion.
pub fn copy_to_scaled18_apply_rate_round_up(
    amounts: &[U256],
    scaling_factors: &[U256],
    rates: &[U256],
) -> Result<Vec<U256>, AmmError> {
    scale_all(amounts, scaling_factors, rates, to_scaled18_apply_rate_round_up)
}

fn scale_all(
    amounts: &[U256],
    scaling_factors: &[U256],
    rates: &[U256],
    convert: fn(U256, U256, U256) -> Result<U256, AmmError>,
) -> Result<Vec<U256>, AmmError> {
    if amounts.len() != scaling_factors.len() || amounts.len() != rates.len() {
        return Err(AmmError::InvalidConfiguration(
            "amounts, scaling factors and rates differ in length",
        ));
    }
    amounts
        .iter()
        .zip(scaling_factors)
        .zip(rates)
        .map(|((&amount, &factor), &rate)| convert(amount, factor, rate))
        .collect()
}

/// Rate used to unscale an amount the user pays, rounded up so the raw
/// amount in never comes out short.
///
/// Rates that are an exact multiple of `1e18` are returned unchanged.
#[must_use]
#[inline]
pub fn compute_rate_round_up(rate: U256) -> U256 {
    let rounded = rate / WAD * WAD;
    if rounded == rate {
        rate
    } else {
        rate + 1
    }
}

/// Part of a scaled-18 swap fee that leaves the pool, in raw units of the
/// fee token.
///
/// Zero when either the fee or the aggregate percentage is zero.
///
/// # Errors
///
/// - [`AmmError::InvalidConfiguration`] if `index` is out of range.
/// - Any error from the raw conversion.
pub fn compute_and_charge_aggregate_swap_fees(
    swap_fee_amount_scaled18: U256,
    aggregate_swap_fee_percentage: U256,
    scaling_factors: &[U256],
    rates: &[U256],
    index: usize,
) -> Result<U256, AmmError> {
    if swap_fee_amount_scaled18 == U256::ZERO || aggregate_swap_fee_percentage == U256::ZERO {
        return Ok(U256::ZERO);
    }
    let (Some(&factor), Some(&rate)) = (scaling_factors.get(index), rates.get(index)) else {
        return Err(AmmError::InvalidConfiguration("fee token index out of range"));
    };
    // fee may leave the pool entirely, so round the raw amount down
    let total_fee_raw = to_raw_undo_rate_round_down(swap_fee_amount_scaled18, factor, rate)?;
    mul_down(total_fee_raw, aggregate_swap_fee_percentage)
}

/// Index of the only non-zero amount.
///
/// # Errors
///
/// - [`AmmError::MultipleNonZeroInputs`] if more than one amount is set.
/// - [`AmmError::AllZeroInputs`] if none is.
pub fn get_single_input_index(amounts: &[U256]) -> Result<usize, AmmError> {
    let mut found = None;
    for (i, amount) in amounts.iter().enumerate() {
        if *amount != U256::ZERO {
            if found.is_some() {
                return Err(AmmError::MultipleNonZeroInputs);
            }
            found = Some(i);
        }
    }
    found.ok_or(AmmError::AllZeroInputs)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const USDC_FACTOR: U256 = U256::new(1_000_000_000_000);

    #[test]
    fn scale_six_decimal_token() {
        let raw = U256::new(1_500_000);
        assert_eq!(
            to_scaled18_apply_rate_round_down(raw, USDC_FACTOR, WAD),
            Ok(U256::new(1_500_000_000_000_000_000))
        );
    }

    #[test]
    fn rate_rounding_directions() {
        let rate = U256::new(1_100_000_000_000_000_001);
        let Ok(down) = to_scaled18_apply_rate_round_down(U256::new(3), U256::ONE, rate) else {
            panic!("expected Ok");
        };
        let Ok(up) = to_scaled18_apply_rate_round_up(U256::new(3), U256::ONE, rate) else {
            panic!("expected Ok");
        };
        assert_eq!(down, U256::new(3));
        assert_eq!(up, U256::new(4));
    }

    #[test]
    fn undo_rate_brackets_raw_amount() {
        let scaled = U256::new(1_000_000_000_000_000_001);
        assert_eq!(
            to_raw_undo_rate_round_down(scaled, USDC_FACTOR, WAD),
            Ok(U256::new(1_000_000))
        );
        assert_eq!(
            to_raw_undo_rate_round_up(scaled, USDC_FACTOR, WAD),
            Ok(U256::new(1_000_001))
        );
    }

    #[test]
    fn undo_rate_zero_factor() {
        assert_eq!(
            to_raw_undo_rate_round_down(WAD, U256::ZERO, WAD),
            Err(AmmError::DivisionByZero)
        );
    }

    #[test]
    fn copy_scaling_checks_lengths() {
        let Err(AmmError::InvalidConfiguration(_)) =
            copy_to_scaled18_apply_rate_round_down(&[WAD], &[], &[WAD])
        else {
            panic!("expected InvalidConfiguration");
        };
        assert_eq!(
            copy_to_scaled18_apply_rate_round_up(&[U256::ONE, U256::new(2)], &[USDC_FACTOR, U256::ONE], &[WAD, WAD]),
            Ok(vec![USDC_FACTOR, U256::new(2)])
        );
    }

    #[test]
    fn rate_round_up() {
        assert_eq!(compute_rate_round_up(WAD), WAD);
        assert_eq!(compute_rate_round_up(U256::new(2) * WAD), U256::new(2) * WAD);
        let rate = U256::new(1_050_000_000_000_000_000);
        assert_eq!(compute_rate_round_up(rate), rate + 1);
    }

    #[test]
    fn aggregate_fee_charged_in_raw_units() {
        // 1e18 scaled fee on a 6 decimal token, 50% aggregate
        let fee = compute_and_charge_aggregate_swap_fees(
            WAD,
            U256::new(500_000_000_000_000_000),
            &[U256::ONE, USDC_FACTOR],
            &[WAD, WAD],
            1,
        );
        assert_eq!(fee, Ok(U256::new(500_000)));
    }

    #[test]
    fn aggregate_fee_zero_cases() {
        assert_eq!(
            compute_and_charge_aggregate_swap_fees(U256::ZERO, WAD, &[], &[], 3),
            Ok(U256::ZERO)
        );
        assert_eq!(
            compute_and_charge_aggregate_swap_fees(WAD, U256::ZERO, &[], &[], 3),
            Ok(U256::ZERO)
        );
    }

    #[test]
    fn single_input_index() {
        assert_eq!(get_single_input_index(&[U256::ZERO, WAD]), Ok(1));
        assert_eq!(
            get_single_input_index(&[WAD, WAD]),
            Err(AmmError::MultipleNonZeroInputs)
        );
        assert_eq!(
            get_single_input_index(&[U256::ZERO, U256::ZERO]),
            Err(AmmError::AllZeroInputs)
        );
    }
}
