//! Checked arithmetic over 256-bit integers.
//!
//! The [`CheckedArithmetic`] trait provides fallible arithmetic operations
//! that return [`Result<Self, AmmError>`](crate::error::AmmError) instead
//! of panicking or wrapping on overflow, underflow, or division by zero.
//!
//! # Implementations
//!
//! - [`U256`]: balances, amounts, 18-decimal fixed point
//! - [`I256`]: signed Gyro and log/exp intermediates
//!
//! # Examples
//!
//! ```
//! use balancer_maths::math::CheckedArithmetic;
//! use ethnum::U256;
//!
//! let sum = U256::new(100).safe_add(U256::new(200));
//! assert_eq!(sum, Ok(U256::new(300)));
//! assert!(U256::ZERO.safe_sub(U256::ONE).is_err());
//! ```

use ethnum::{I256, U256};

use crate::error::AmmError;

/// Fallible arithmetic for 256-bit integers.
///
/// Every method returns [`Result<Self, AmmError>`] with a specific error
/// variant so callers can distinguish overflow from underflow from
/// division by zero.
///
/// # Contract
///
/// - **No panics**: all error conditions produce `Err`.
/// - **No saturation**: saturation hides bugs; errors propagate instead.
/// - Division truncates toward zero, as the EVM does.
pub trait CheckedArithmetic: Sized + Copy {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the result exceeds the
    /// representable range.
    fn safe_add(self, other: Self) -> Result<Self, AmmError>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if the result leaves the
    /// representable range from below.
    fn safe_sub(self, other: Self) -> Result<Self, AmmError>;

    /// Checked multiplication.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the result exceeds the
    /// representable range.
    fn safe_mul(self, other: Self) -> Result<Self, AmmError>;

    /// Checked truncating division.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if `other` is zero.
    fn safe_div(self, other: Self) -> Result<Self, AmmError>;
}

// ---------------------------------------------------------------------------
// U256
// ---------------------------------------------------------------------------

impl CheckedArithmetic for U256 {
    #[inline]
    fn safe_add(self, other: Self) -> Result<Self, AmmError> {
        self.checked_add(other)
            .ok_or(AmmError::Overflow("uint256 addition overflow"))
    }

    #[inline]
    fn safe_sub(self, other: Self) -> Result<Self, AmmError> {
        self.checked_sub(other)
            .ok_or(AmmError::Underflow("uint256 subtraction underflow"))
    }

    #[inline]
    fn safe_mul(self, other: Self) -> Result<Self, AmmError> {
        self.checked_mul(other)
            .ok_or(AmmError::Overflow("uint256 multiplication overflow"))
    }

    #[inline]
    fn safe_div(self, other: Self) -> Result<Self, AmmError> {
        self.checked_div(other).ok_or(AmmError::DivisionByZero)
    }
}

// ---------------------------------------------------------------------------
// I256
// ---------------------------------------------------------------------------

impl CheckedArithmetic for I256 {
    #[inline]
    fn safe_add(self, other: Self) -> Result<Self, AmmError> {
        self.checked_add(other)
            .ok_or(AmmError::Overflow("int256 addition overflow"))
    }

    #[inline]
    fn safe_sub(self, other: Self) -> Result<Self, AmmError> {
        self.checked_sub(other)
            .ok_or(AmmError::Underflow("int256 subtraction overflow"))
    }

    #[inline]
    fn safe_mul(self, other: Self) -> Result<Self, AmmError> {
        self.checked_mul(other)
            .ok_or(AmmError::Overflow("int256 multiplication overflow"))
    }

    #[inline]
    fn safe_div(self, other: Self) -> Result<Self, AmmError> {
        if other == I256::ZERO {
            return Err(AmmError::DivisionByZero);
        }
        // MIN / -1 is the only other failure
        self.checked_div(other)
            .ok_or(AmmError::Overflow("int256 division overflow"))
    }
}

/// Converts a `U256` into an `I256`, rejecting values at or above `2^255`.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if `value` does not fit.
#[inline]
pub fn to_signed(value: U256) -> Result<I256, AmmError> {
    let signed = value.as_i256();
    if signed.is_negative() {
        return Err(AmmError::Overflow("uint256 does not fit int256"));
    }
    Ok(signed)
}

/// Converts a non-negative `I256` into a `U256`.
///
/// # Errors
///
/// Returns [`AmmError::NegativeAmountOut`] if `value` is negative.
#[inline]
pub fn to_unsigned(value: I256) -> Result<U256, AmmError> {
    if value.is_negative() {
        return Err(AmmError::NegativeAmountOut);
    }
    Ok(value.as_u256())
}
