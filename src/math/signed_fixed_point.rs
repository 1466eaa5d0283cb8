//! Signed 18-decimal and 38-decimal ("extra precision") fixed point.
//!
//! The elliptic pool carries intermediate terms with 38 decimals because
//! 18 are not enough to keep its invariant quadratic stable.  This module
//! provides the signed primitives for both scales plus the conversions
//! from 38 back to 18 decimals.
//!
//! "Mag" operations round the *magnitude*: `mul_up_mag(-3, 0.5)` is `-2`,
//! not `-1`.
//!
//! Functions with a `_u` suffix skip the overflow checks, matching the
//! `unchecked` blocks on chain; they wrap on overflow instead of failing.
//! Callers use them only where the operands are bounded by construction.
//!
//! | Function | Scale in | Scale out | Rounding |
//! |----------|----------|-----------|----------|
//! | [`mul_down_mag`] | 18 × 18 | 18 | toward zero |
//! | [`mul_up_mag`] | 18 × 18 | 18 | away from zero |
//! | [`div_down_mag`] | 18 / 18 | 18 | toward zero |
//! | [`div_up_mag`] | 18 / 18 | 18 | away from zero |
//! | [`mul_xp`] | 38 × 38 | 38 | toward zero |
//! | [`div_xp`] | 38 / 38 | 38 | toward zero |
//! | [`mul_down_xp_to_np`] | 18 × 38 | 18 | toward −∞ |
//! | [`mul_up_xp_to_np`] | 18 × 38 | 18 | toward +∞ |

use ethnum::I256;

use super::checked::CheckedArithmetic;
use crate::error::AmmError;

/// One, in 18 decimals.
pub const ONE: I256 = I256::new(1_000_000_000_000_000_000);
/// One, in 38 decimals.
pub const ONE_XP: I256 = I256::new(100_000_000_000_000_000_000_000_000_000_000_000_000);

const E19: I256 = I256::new(10_000_000_000_000_000_000);

/// Checked signed addition.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] on overflow in either direction.
#[inline]
pub fn add(a: I256, b: I256) -> Result<I256, AmmError> {
    a.checked_add(b)
        .ok_or(AmmError::Overflow("signed add overflow"))
}

/// Checked signed subtraction.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] on overflow in either direction.
#[inline]
pub fn sub(a: I256, b: I256) -> Result<I256, AmmError> {
    a.checked_sub(b)
        .ok_or(AmmError::Overflow("signed sub overflow"))
}

/// Adds `b` to the magnitude of `a`: `a + b` for positive `a`, `a - b`
/// otherwise.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] on overflow.
#[inline]
pub fn add_mag(a: I256, b: I256) -> Result<I256, AmmError> {
    if a > I256::ZERO {
        add(a, b)
    } else {
        sub(a, b)
    }
}

/// `a * b / 1e18`, truncated toward zero.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if `a * b` overflows.
#[inline]
pub fn mul_down_mag(a: I256, b: I256) -> Result<I256, AmmError> {
    Ok(a.safe_mul(b)? / ONE)
}

/// Unchecked [`mul_down_mag`].
#[must_use]
#[inline]
pub fn mul_down_mag_u(a: I256, b: I256) -> I256 {
    a.wrapping_mul(b) / ONE
}

/// `a * b / 1e18`, rounded away from zero.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if `a * b` overflows.
#[inline]
pub fn mul_up_mag(a: I256, b: I256) -> Result<I256, AmmError> {
    Ok(round_mag_up(a.safe_mul(b)?, ONE))
}

/// Unchecked [`mul_up_mag`].
#[must_use]
#[inline]
pub fn mul_up_mag_u(a: I256, b: I256) -> I256 {
    round_mag_up(a.wrapping_mul(b), ONE)
}

/// `a * 1e18 / b`, truncated toward zero.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `b` is zero.
/// - [`AmmError::DivIntervalError`] if `a * 1e18` overflows.
#[inline]
pub fn div_down_mag(a: I256, b: I256) -> Result<I256, AmmError> {
    if b == I256::ZERO {
        return Err(AmmError::DivisionByZero);
    }
    if a == I256::ZERO {
        return Ok(I256::ZERO);
    }
    let inflated = a.checked_mul(ONE).ok_or(AmmError::DivIntervalError)?;
    Ok(inflated / b)
}

/// Unchecked [`div_down_mag`].
///
/// # Errors
///
/// Returns [`AmmError::DivisionByZero`] if `b` is zero.
#[inline]
pub fn div_down_mag_u(a: I256, b: I256) -> Result<I256, AmmError> {
    if b == I256::ZERO {
        return Err(AmmError::DivisionByZero);
    }
    Ok(a.wrapping_mul(ONE) / b)
}

/// `a * 1e18 / b`, rounded away from zero.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `b` is zero.
/// - [`AmmError::DivIntervalError`] if `a * 1e18` overflows.
pub fn div_up_mag(a: I256, b: I256) -> Result<I256, AmmError> {
    if b == I256::ZERO {
        return Err(AmmError::DivisionByZero);
    }
    if a == I256::ZERO {
        return Ok(I256::ZERO);
    }
    let (a, b) = if b < I256::ZERO { (-a, -b) } else { (a, b) };
    let inflated = a.checked_mul(ONE).ok_or(AmmError::DivIntervalError)?;
    Ok(round_mag_up(inflated, b))
}

/// Unchecked [`div_up_mag`].
///
/// # Errors
///
/// Returns [`AmmError::DivisionByZero`] if `b` is zero.
pub fn div_up_mag_u(a: I256, b: I256) -> Result<I256, AmmError> {
    if b == I256::ZERO {
        return Err(AmmError::DivisionByZero);
    }
    if a == I256::ZERO {
        return Ok(I256::ZERO);
    }
    let (a, b) = if b < I256::ZERO { (-a, -b) } else { (a, b) };
    Ok(round_mag_up(a.wrapping_mul(ONE), b))
}

/// `a * b / 1e38`, truncated toward zero.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if `a * b` overflows.
#[inline]
pub fn mul_xp(a: I256, b: I256) -> Result<I256, AmmError> {
    Ok(a.safe_mul(b)? / ONE_XP)
}

/// Unchecked [`mul_xp`].
#[must_use]
#[inline]
pub fn mul_xp_u(a: I256, b: I256) -> I256 {
    a.wrapping_mul(b) / ONE_XP
}

/// `a * 1e38 / b`, truncated toward zero.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `b` is zero.
/// - [`AmmError::DivIntervalError`] if `a * 1e38` overflows.
#[inline]
pub fn div_xp(a: I256, b: I256) -> Result<I256, AmmError> {
    if b == I256::ZERO {
        return Err(AmmError::DivisionByZero);
    }
    if a == I256::ZERO {
        return Ok(I256::ZERO);
    }
    let inflated = a.checked_mul(ONE_XP).ok_or(AmmError::DivIntervalError)?;
    Ok(inflated / b)
}

/// Unchecked [`div_xp`].
///
/// # Errors
///
/// Returns [`AmmError::DivisionByZero`] if `b` is zero.
#[inline]
pub fn div_xp_u(a: I256, b: I256) -> Result<I256, AmmError> {
    if b == I256::ZERO {
        return Err(AmmError::DivisionByZero);
    }
    Ok(a.wrapping_mul(ONE_XP) / b)
}

/// `a * b / 1e38` with `a` in 18 and `b` in 38 decimals, rounded toward
/// negative infinity.
///
/// `b` is split at 19 digits so neither partial product overflows.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if a partial product overflows.
pub fn mul_down_xp_to_np(a: I256, b: I256) -> Result<I256, AmmError> {
    let b1 = b / E19;
    let b2 = b % E19;
    let prod1 = a.safe_mul(b1)?;
    let prod2 = a.safe_mul(b2)?;
    Ok(xp_to_np_down(prod1, prod2))
}

/// Unchecked [`mul_down_xp_to_np`].
#[must_use]
pub fn mul_down_xp_to_np_u(a: I256, b: I256) -> I256 {
    let prod1 = a.wrapping_mul(b / E19);
    let prod2 = a.wrapping_mul(b % E19);
    xp_to_np_down(prod1, prod2)
}

/// `a * b / 1e38` with `a` in 18 and `b` in 38 decimals, rounded toward
/// positive infinity.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if a partial product overflows.
pub fn mul_up_xp_to_np(a: I256, b: I256) -> Result<I256, AmmError> {
    let b1 = b / E19;
    let b2 = b % E19;
    let prod1 = a.safe_mul(b1)?;
    let prod2 = a.safe_mul(b2)?;
    Ok(xp_to_np_up(prod1, prod2))
}

/// Unchecked [`mul_up_xp_to_np`].
#[must_use]
pub fn mul_up_xp_to_np_u(a: I256, b: I256) -> I256 {
    let prod1 = a.wrapping_mul(b / E19);
    let prod2 = a.wrapping_mul(b % E19);
    xp_to_np_up(prod1, prod2)
}

/// `1e18 - x` for `0 < x < 1e18`, zero otherwise.
#[must_use]
#[inline]
pub fn complement(x: I256) -> I256 {
    if x >= ONE || x <= I256::ZERO {
        return I256::ZERO;
    }
    ONE - x
}

fn round_mag_up(value: I256, divisor: I256) -> I256 {
    if value > I256::ZERO {
        (value - 1) / divisor + 1
    } else if value < I256::ZERO {
        (value + 1) / divisor - 1
    } else {
        I256::ZERO
    }
}

fn xp_to_np_down(prod1: I256, prod2: I256) -> I256 {
    if prod1 >= I256::ZERO && prod2 >= I256::ZERO {
        (prod1 + prod2 / E19) / E19
    } else {
        (prod1 + prod2 / E19 + 1) / E19 - 1
    }
}

fn xp_to_np_up(prod1: I256, prod2: I256) -> I256 {
    if prod1 <= I256::ZERO && prod2 <= I256::ZERO {
        (prod1 + prod2 / E19) / E19
    } else {
        (prod1 + prod2 / E19 - 1) / E19 + 1
    }
}
