//! 18-decimal unsigned fixed-point arithmetic with explicit rounding.
//!
//! Every multiply and divide exists in a `_down` and an `_up` flavour; there
//! is no round-to-nearest.  Callers choose the direction that favours the
//! pool:
//!
//! | Quantity | Direction | Rationale |
//! |----------|-----------|-----------|
//! | Amount out | down | User receives less |
//! | Amount in | up | User pays more |
//! | Fee | up | Protocol takes more |
//! | Invariant before a mint | up | Fewer shares minted |
//!
//! Failures are reported, never saturated: a zero divisor returns
//! [`AmmError::DivisionByZero`] and a 256-bit overflow returns
//! [`AmmError::Overflow`].
//!
//! # Examples
//!
//! ```
//! use balancer_maths::math::fixed_point::{div_up, mul_down, mul_up, WAD};
//! use ethnum::U256;
//!
//! let third = U256::new(333_333_333_333_333_333);
//! assert_eq!(mul_down(third, U256::new(3)), Ok(U256::ZERO));
//! assert_eq!(mul_up(third, U256::new(3)), Ok(U256::ONE));
//! assert_eq!(div_up(WAD, U256::new(3) * WAD), Ok(U256::new(333_333_333_333_333_334)));
//! ```

use ethnum::U256;

use super::checked::CheckedArithmetic;
use super::log_exp;
use crate::domain::Rounding;
use crate::error::AmmError;

/// One, in 18-decimal fixed point.
pub const WAD: U256 = U256::new(1_000_000_000_000_000_000);
/// Two, in 18-decimal fixed point.
pub const TWO_WAD: U256 = U256::new(2_000_000_000_000_000_000);
/// Four, in 18-decimal fixed point.
pub const FOUR_WAD: U256 = U256::new(4_000_000_000_000_000_000);
/// Relative error bound of [`log_exp::pow`], `1e-14` in 18 decimals.
pub const MAX_POW_RELATIVE_ERROR: U256 = U256::new(10_000);

/// `a * b / 1e18`, rounded down.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if `a * b` overflows.
#[inline]
pub fn mul_down(a: U256, b: U256) -> Result<U256, AmmError> {
    Ok(a.safe_mul(b)? / WAD)
}

/// `a * b / 1e18`, rounded up.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if `a * b` overflows.
#[inline]
pub fn mul_up(a: U256, b: U256) -> Result<U256, AmmError> {
    let product = a.safe_mul(b)?;
    if product == U256::ZERO {
        return Ok(U256::ZERO);
    }
    Ok((product - 1) / WAD + 1)
}

/// `a * 1e18 / b`, rounded down.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `b` is zero.
/// - [`AmmError::Overflow`] if `a * 1e18` overflows.
#[inline]
pub fn div_down(a: U256, b: U256) -> Result<U256, AmmError> {
    if b == U256::ZERO {
        return Err(AmmError::DivisionByZero);
    }
    if a == U256::ZERO {
        return Ok(U256::ZERO);
    }
    Ok(a.safe_mul(WAD)? / b)
}

/// `a * 1e18 / b`, rounded up.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `b` is zero.
/// - [`AmmError::Overflow`] if `a * 1e18` overflows.
#[inline]
pub fn div_up(a: U256, b: U256) -> Result<U256, AmmError> {
    mul_div_up(a, WAD, b)
}

/// Plain integer `a / b`, rounded up.
///
/// # Errors
///
/// Returns [`AmmError::DivisionByZero`] if `b` is zero.
#[inline]
pub fn div_up_raw(a: U256, b: U256) -> Result<U256, AmmError> {
    if b == U256::ZERO {
        return Err(AmmError::DivisionByZero);
    }
    if a == U256::ZERO {
        return Ok(U256::ZERO);
    }
    Ok(U256::ONE + (a - 1) / b)
}

/// `a * b / c`, rounded up.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `c` is zero.
/// - [`AmmError::Overflow`] if `a * b` overflows.
#[inline]
pub fn mul_div_up(a: U256, b: U256, c: U256) -> Result<U256, AmmError> {
    if c == U256::ZERO {
        return Err(AmmError::DivisionByZero);
    }
    let product = a.safe_mul(b)?;
    if product == U256::ZERO {
        return Ok(U256::ZERO);
    }
    Ok((product - 1) / c + 1)
}

/// `a * b / c`, rounded down.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `c` is zero.
/// - [`AmmError::Overflow`] if `a * b` overflows.
#[inline]
pub fn mul_div_down(a: U256, b: U256, c: U256) -> Result<U256, AmmError> {
    a.safe_mul(b)?.safe_div(c)
}

/// [`mul_up`] or [`mul_down`] depending on `rounding`.
///
/// # Errors
///
/// Same as the selected primitive.
#[inline]
pub fn mul_rounding(a: U256, b: U256, rounding: Rounding) -> Result<U256, AmmError> {
    match rounding {
        Rounding::Up => mul_up(a, b),
        Rounding::Down => mul_down(a, b),
    }
}

/// [`div_up`] or [`div_down`] depending on `rounding`.
///
/// # Errors
///
/// Same as the selected primitive.
#[inline]
pub fn div_rounding(a: U256, b: U256, rounding: Rounding) -> Result<U256, AmmError> {
    match rounding {
        Rounding::Up => div_up(a, b),
        Rounding::Down => div_down(a, b),
    }
}

/// `max(1e18 - x, 0)`.
#[must_use]
#[inline]
pub fn complement(x: U256) -> U256 {
    if x < WAD {
        WAD - x
    } else {
        U256::ZERO
    }
}

/// `x^y`, biased low by the pow error bound.
///
/// Exponents of exactly 1, 2 and 4 short-circuit to multiplications.
///
/// # Errors
///
/// Propagates [`log_exp::pow`] domain errors and multiplication overflow.
pub fn pow_down(x: U256, y: U256) -> Result<U256, AmmError> {
    pow_down_versioned(x, y, 0)
}

/// `x^y`, biased high by the pow error bound.
///
/// # Errors
///
/// Propagates [`log_exp::pow`] domain errors and multiplication overflow.
pub fn pow_up(x: U256, y: U256) -> Result<U256, AmmError> {
    pow_up_versioned(x, y, 0)
}

/// [`pow_down`] with a pool math version.
///
/// Version-1 weighted pools always take the log/exp path.
///
/// # Errors
///
/// Propagates [`log_exp::pow`] domain errors and multiplication overflow.
pub fn pow_down_versioned(x: U256, y: U256, version: u32) -> Result<U256, AmmError> {
    if let Some(fast) = pow_fast_path(x, y, version)? {
        return Ok(fast);
    }
    let raw = log_exp::pow(x, y)?;
    let max_error = mul_up(raw, MAX_POW_RELATIVE_ERROR)?.safe_add(U256::ONE)?;
    if raw < max_error {
        return Ok(U256::ZERO);
    }
    Ok(raw - max_error)
}

/// [`pow_up`] with a pool math version.
///
/// # Errors
///
/// Propagates [`log_exp::pow`] domain errors and multiplication overflow.
pub fn pow_up_versioned(x: U256, y: U256, version: u32) -> Result<U256, AmmError> {
    if let Some(fast) = pow_fast_path(x, y, version)? {
        return Ok(fast);
    }
    let raw = log_exp::pow(x, y)?;
    let max_error = mul_up(raw, MAX_POW_RELATIVE_ERROR)?.safe_add(U256::ONE)?;
    raw.safe_add(max_error)
}

fn pow_fast_path(x: U256, y: U256, version: u32) -> Result<Option<U256>, AmmError> {
    if version == 1 {
        return Ok(None);
    }
    if y == WAD {
        Ok(Some(x))
    } else if y == TWO_WAD {
        mul_up(x, x).map(Some)
    } else if y == FOUR_WAD {
        let square = mul_up(x, x)?;
        mul_up(square, square).map(Some)
    } else {
        Ok(None)
    }
}
