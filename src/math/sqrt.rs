//! Square roots used by the Gyro and ReClamm pools.
//!
//! - [`oz_sqrt`]: integer square root of a plain `uint256`, rounded down
//!   (OpenZeppelin `Math.sqrt`).
//! - [`gyro_sqrt`]: square root of an 18-decimal value, returned in 18
//!   decimals, checked against a caller tolerance (Gyro `GyroPoolMath`).

use ethnum::U256;

use super::checked::CheckedArithmetic;
use super::fixed_point::{mul_down, mul_up, WAD};
use crate::error::AmmError;

/// Newton rounds after the bit-length guess; each doubles the correct bits.
const OZ_NEWTON_ROUNDS: usize = 6;
/// Newton rounds for the Gyro square root.
const GYRO_NEWTON_ROUNDS: usize = 7;

/// Integer square root, rounded down.
#[must_use]
pub fn oz_sqrt(a: U256) -> U256 {
    if a <= U256::ONE {
        return a;
    }

    // 2^(log2(a) / 2), within a factor of sqrt(2) of the root
    let mut aa = a;
    let mut xn = U256::ONE;
    for (threshold_bits, shift) in [(128u32, 64u32), (64, 32), (32, 16), (16, 8), (8, 4), (4, 2)] {
        if aa >= (U256::ONE << threshold_bits) {
            aa >>= threshold_bits;
            xn <<= shift;
        }
    }
    if aa >= U256::new(4) {
        xn <<= 1;
    }

    xn = (xn * 3) >> 1;
    for _ in 0..OZ_NEWTON_ROUNDS {
        xn = (xn + a / xn) >> 1;
    }

    if xn > a / xn {
        xn - 1
    } else {
        xn
    }
}

/// Square root of an 18-decimal value, in 18 decimals.
///
/// The result `g` must satisfy `|g * g / 1e18 - x| <= g * tolerance / 1e18`.
///
/// # Errors
///
/// - [`AmmError::SqrtFailed`] if the result misses the tolerance window.
/// - [`AmmError::Overflow`] if `x * 1e18` overflows.
pub fn gyro_sqrt(x: U256, tolerance: U256) -> Result<U256, AmmError> {
    if x == U256::ZERO {
        return Ok(U256::ZERO);
    }

    let scaled = x.safe_mul(WAD)?;
    let mut guess = initial_guess(x);
    for _ in 0..GYRO_NEWTON_ROUNDS {
        guess = (guess + scaled / guess) / 2;
    }

    let guess_squared = mul_down(guess, guess)?;
    let margin = mul_up(guess, tolerance)?;
    let upper = x.safe_add(margin)?;
    let lower = x.checked_sub(margin).unwrap_or(U256::ZERO);
    if guess_squared > upper || guess_squared < lower {
        return Err(AmmError::SqrtFailed);
    }
    Ok(guess)
}

fn initial_guess(x: U256) -> U256 {
    if x >= WAD {
        return (U256::ONE << int_log2_halved(x / WAD)) * WAD;
    }

    // sqrt(10^-k) in 18 decimals, indexed by the decade of x
    const GUESSES: [(u128, u128); 17] = [
        (10, 3_162_277_660),
        (100, 10_000_000_000),
        (1_000, 31_622_776_601),
        (10_000, 100_000_000_000),
        (100_000, 316_227_766_016),
        (1_000_000, 1_000_000_000_000),
        (10_000_000, 3_162_277_660_168),
        (100_000_000, 10_000_000_000_000),
        (1_000_000_000, 31_622_776_601_683),
        (10_000_000_000, 100_000_000_000_000),
        (100_000_000_000, 316_227_766_016_837),
        (1_000_000_000_000, 1_000_000_000_000_000),
        (10_000_000_000_000, 3_162_277_660_168_379),
        (100_000_000_000_000, 10_000_000_000_000_000),
        (1_000_000_000_000_000, 31_622_776_601_683_793),
        (10_000_000_000_000_000, 100_000_000_000_000_000),
        (100_000_000_000_000_000, 316_227_766_016_837_933),
    ];
    GUESSES
        .iter()
        .find(|(bound, _)| x <= U256::new(*bound))
        .map_or(x, |(_, guess)| U256::new(*guess))
}

fn int_log2_halved(x: U256) -> u32 {
    let mut n = 0;
    let mut x = x;
    for (bits, half) in [(128u32, 64u32), (64, 32), (32, 16), (16, 8), (8, 4), (4, 2), (2, 1)] {
        if x >= (U256::ONE << bits) {
            x >>= bits;
            n += half;
        }
    }
    n
}
