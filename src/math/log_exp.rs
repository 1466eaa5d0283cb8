//! Natural logarithm and exponential over 18-decimal signed fixed point.
//!
//! `x^y` is evaluated as `exp(y * ln(x))`.  Both halves decompose their
//! argument against a table of precomputed powers of `e` and finish with a
//! short series, exactly reproducing the on-chain `LogExpMath` library:
//!
//! ```text
//! exp(x) = e^(x0 or x1) * prod(e^(x2..x9)) * taylor_12(x_rest)
//! ln(a)  = sum(x_n for e^(x_n) dividing a) + 2 * atanh_series_11(z)
//!          z = (a - 1) / (a + 1)
//! ```
//!
//! Bases close to one (`0.9 < x < 1.1`) take a 36-decimal logarithm to keep
//! the relative error of `pow` below `1e-18`.
//!
//! # Domain
//!
//! | Quantity | Range |
//! |----------|-------|
//! | `pow` base | `0 <= x < 2^255` |
//! | `pow` exponent | `0 <= y < 2^254 / 1e20` |
//! | `exp` argument | `-41e18 <= x <= 130e18` |
//! | `ln` argument | `x > 0` |
//!
//! All intermediates are bounded by these ranges, so the series run on
//! plain `I256` operators the same way the Solidity code runs `unchecked`.

use ethnum::{I256, U256};

use crate::error::AmmError;

/// One in 18-decimal fixed point.
const ONE_18: I256 = I256::new(1_000_000_000_000_000_000);
/// One in 20-decimal fixed point; the series carry two extra digits.
const ONE_20: I256 = I256::new(100_000_000_000_000_000_000);
/// One in 36-decimal fixed point.
const ONE_36: I256 = ethnum::int!("1000000000000000000000000000000000000");

const MAX_NATURAL_EXPONENT: I256 = I256::new(130_000_000_000_000_000_000);
const MIN_NATURAL_EXPONENT: I256 = I256::new(-41_000_000_000_000_000_000);

const LN_36_LOWER_BOUND: I256 = I256::new(900_000_000_000_000_000);
const LN_36_UPPER_BOUND: I256 = I256::new(1_100_000_000_000_000_000);

/// `2^254 / ONE_20`; keeps `ln(x) * y` inside 256 bits.
const MILD_EXPONENT_BOUND: U256 =
    ethnum::uint!("289480223093290488558927462521719769633174961664101410098");

// 18 decimals, no fractional part on the `a` values
const X0: I256 = I256::new(128_000_000_000_000_000_000); // 2^7
const A0: I256 = ethnum::int!("38877084059945950922200000000000000000000000000000000000"); // e^(x0)
const X1: I256 = I256::new(64_000_000_000_000_000_000); // 2^6
const A1: I256 = I256::new(6_235_149_080_811_616_882_910_000_000); // e^(x1)

// 20 decimals
const X2: I256 = I256::new(3_200_000_000_000_000_000_000); // 2^5
const A2: I256 = ethnum::int!("7896296018268069516100000000000000"); // e^(x2)
const X3: I256 = I256::new(1_600_000_000_000_000_000_000); // 2^4
const A3: I256 = I256::new(888_611_052_050_787_263_676_000_000); // e^(x3)
const X4: I256 = I256::new(800_000_000_000_000_000_000); // 2^3
const A4: I256 = I256::new(298_095_798_704_172_827_474_000); // e^(x4)
const X5: I256 = I256::new(400_000_000_000_000_000_000); // 2^2
const A5: I256 = I256::new(5_459_815_003_314_423_907_810); // e^(x5)
const X6: I256 = I256::new(200_000_000_000_000_000_000); // 2^1
const A6: I256 = I256::new(738_905_609_893_065_022_723); // e^(x6)
const X7: I256 = I256::new(100_000_000_000_000_000_000); // 2^0
const A7: I256 = I256::new(271_828_182_845_904_523_536); // e^(x7)
const X8: I256 = I256::new(50_000_000_000_000_000_000); // 2^-1
const A8: I256 = I256::new(164_872_127_070_012_814_685); // e^(x8)
const X9: I256 = I256::new(25_000_000_000_000_000_000); // 2^-2
const A9: I256 = I256::new(128_402_541_668_774_148_407); // e^(x9)
const X10: I256 = I256::new(12_500_000_000_000_000_000); // 2^-3
const A10: I256 = I256::new(113_314_845_306_682_631_683); // e^(x10)
const X11: I256 = I256::new(6_250_000_000_000_000_000); // 2^-4
const A11: I256 = I256::new(106_449_445_891_785_942_956); // e^(x11)

/// Reductions applied by `exp` after the `x0`/`x1` step.
const EXP_TABLE: [(I256, I256); 8] = [
    (X2, A2),
    (X3, A3),
    (X4, A4),
    (X5, A5),
    (X6, A6),
    (X7, A7),
    (X8, A8),
    (X9, A9),
];

/// Reductions applied by `ln` after the `a0`/`a1` step.
const LN_TABLE: [(I256, I256); 10] = [
    (X2, A2),
    (X3, A3),
    (X4, A4),
    (X5, A5),
    (X6, A6),
    (X7, A7),
    (X8, A8),
    (X9, A9),
    (X10, A10),
    (X11, A11),
];

/// Computes `x^y` for 18-decimal unsigned fixed point.
///
/// `pow(x, 0) == 1e18` for every `x`, including zero; `pow(0, y) == 0`
/// for `y > 0`.
///
/// # Errors
///
/// - [`AmmError::BaseOutOfBounds`] if `x >= 2^255`.
/// - [`AmmError::ExponentOutOfBounds`] if `y` exceeds the mild bound.
/// - [`AmmError::ProductOutOfBounds`] if `y * ln(x)` leaves the natural
///   exponent range.
pub fn pow(x: U256, y: U256) -> Result<U256, AmmError> {
    if y == U256::ZERO {
        return Ok(ONE_18.as_u256());
    }
    if x == U256::ZERO {
        return Ok(U256::ZERO);
    }

    let x_int = x.as_i256();
    if x_int.is_negative() {
        return Err(AmmError::BaseOutOfBounds);
    }
    if y >= MILD_EXPONENT_BOUND {
        return Err(AmmError::ExponentOutOfBounds);
    }
    let y_int = y.as_i256();

    let logx_times_y = if LN_36_LOWER_BOUND < x_int && x_int < LN_36_UPPER_BOUND {
        let ln_36_x = ln_36(x_int);
        // ln_36_x has 36 decimals; split it to keep the product in range
        (ln_36_x / ONE_18) * y_int + ((ln_36_x % ONE_18) * y_int) / ONE_18
    } else {
        ln_unchecked(x_int) * y_int
    };
    let logx_times_y = logx_times_y / ONE_18;

    if !(MIN_NATURAL_EXPONENT..=MAX_NATURAL_EXPONENT).contains(&logx_times_y) {
        return Err(AmmError::ProductOutOfBounds);
    }

    Ok(exp(logx_times_y)?.as_u256())
}

/// Computes `e^x` for 18-decimal signed fixed point.
///
/// # Errors
///
/// Returns [`AmmError::InvalidExponent`] if `x` is outside
/// `[-41e18, 130e18]`.
pub fn exp(x: I256) -> Result<I256, AmmError> {
    if !(MIN_NATURAL_EXPONENT..=MAX_NATURAL_EXPONENT).contains(&x) {
        return Err(AmmError::InvalidExponent);
    }
    if x.is_negative() {
        // e^(-x) >= 1, so the division cannot hit zero
        return Ok((ONE_18 * ONE_18) / exp(-x)?);
    }

    let mut x = x;
    let first_an = if x >= X0 {
        x -= X0;
        A0
    } else if x >= X1 {
        x -= X1;
        A1
    } else {
        I256::ONE
    };

    // 20 decimals from here on
    x *= 100;

    let mut product = ONE_20;
    for (x_n, a_n) in EXP_TABLE {
        if x >= x_n {
            x -= x_n;
            product = (product * a_n) / ONE_20;
        }
    }

    // Taylor series for the remainder, x < 0.25
    let mut series_sum = ONE_20;
    let mut term = x;
    series_sum += term;
    for n in 2..=12 {
        term = ((term * x) / ONE_20) / n;
        series_sum += term;
    }

    Ok((((product * series_sum) / ONE_20) * first_an) / 100)
}

/// Computes `ln(a)` for 18-decimal signed fixed point.
///
/// # Errors
///
/// Returns [`AmmError::BaseOutOfBounds`] if `a <= 0`.
pub fn ln(a: I256) -> Result<I256, AmmError> {
    if a <= I256::ZERO {
        return Err(AmmError::BaseOutOfBounds);
    }
    if LN_36_LOWER_BOUND < a && a < LN_36_UPPER_BOUND {
        return Ok(ln_36(a) / ONE_18);
    }
    Ok(ln_unchecked(a))
}

fn ln_unchecked(a: I256) -> I256 {
    if a < ONE_18 {
        // ln(a) = -ln(1/a), and 1/a is above one
        return -ln_unchecked((ONE_18 * ONE_18) / a);
    }

    let mut a = a;
    let mut sum = I256::ZERO;
    // integer division: a0 and a1 carry no decimals
    if a >= A0 * ONE_18 {
        a /= A0;
        sum += X0;
    }
    if a >= A1 * ONE_18 {
        a /= A1;
        sum += X1;
    }

    sum *= 100;
    a *= 100;

    for (x_n, a_n) in LN_TABLE {
        if a >= a_n {
            a = (a * ONE_20) / a_n;
            sum += x_n;
        }
    }

    // a is now in [1, e^(1/16)); finish with the atanh series
    let z = ((a - ONE_20) * ONE_20) / (a + ONE_20);
    let z_squared = (z * z) / ONE_20;

    let mut num = z;
    let mut series_sum = num;
    for divisor in [3, 5, 7, 9, 11] {
        num = (num * z_squared) / ONE_20;
        series_sum += num / divisor;
    }
    series_sum *= 2;

    (sum + series_sum) / 100
}

/// 36-decimal `ln` for arguments close to one.
fn ln_36(x: I256) -> I256 {
    let x = x * ONE_18;

    let z = ((x - ONE_36) * ONE_36) / (x + ONE_36);
    let z_squared = (z * z) / ONE_36;

    let mut num = z;
    let mut series_sum = num;
    for divisor in [3, 5, 7, 9, 11, 13, 15] {
        num = (num * z_squared) / ONE_36;
        series_sum += num / divisor;
    }

    series_sum * 2
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const WAD: U256 = U256::new(1_000_000_000_000_000_000);

    #[test]
    fn pow_zero_exponent_is_one() {
        assert_eq!(pow(U256::ZERO, U256::ZERO), Ok(WAD));
        assert_eq!(pow(U256::new(5), U256::ZERO), Ok(WAD));
    }

    #[test]
    fn pow_zero_base_is_zero() {
        assert_eq!(pow(U256::ZERO, WAD), Ok(U256::ZERO));
    }

    #[test]
    fn pow_rejects_huge_base() {
        assert_eq!(pow(U256::MAX, WAD), Err(AmmError::BaseOutOfBounds));
    }

    #[test]
    fn pow_rejects_huge_exponent() {
        assert_eq!(
            pow(WAD * 2, MILD_EXPONENT_BOUND),
            Err(AmmError::ExponentOutOfBounds)
        );
    }

    #[test]
    fn pow_rejects_product_out_of_range() {
        // ln(1e6) * 100 is far above 130
        let base = WAD * 1_000_000;
        assert_eq!(pow(base, WAD * 100), Err(AmmError::ProductOutOfBounds));
    }

    #[test]
    fn pow_two_squared_is_close_to_four() {
        let Ok(r) = pow(WAD * 2, WAD * 2) else {
            panic!("expected Ok");
        };
        let four = WAD * 4;
        let diff = if r > four { r - four } else { four - r };
        assert!(diff < U256::new(100_000), "diff {diff}");
    }

    #[test]
    fn pow_near_one_uses_high_precision_path() {
        // 1.05^2 = 1.1025
        let Ok(r) = pow(U256::new(1_050_000_000_000_000_000), WAD * 2) else {
            panic!("expected Ok");
        };
        let expected = U256::new(1_102_500_000_000_000_000);
        let diff = if r > expected { r - expected } else { expected - r };
        assert!(diff < U256::new(10), "diff {diff}");
    }

    #[test]
    fn exp_of_zero_is_one() {
        assert_eq!(exp(I256::ZERO), Ok(ONE_18));
    }

    #[test]
    fn exp_of_one_is_e() {
        let Ok(e) = exp(ONE_18) else {
            panic!("expected Ok");
        };
        // e = 2.718281828459045235...
        let diff = (e - I256::new(2_718_281_828_459_045_235)).abs();
        assert!(diff < I256::new(100), "diff {diff}");
    }

    #[test]
    fn exp_rejects_out_of_range() {
        assert_eq!(exp(MAX_NATURAL_EXPONENT + 1), Err(AmmError::InvalidExponent));
        assert_eq!(exp(MIN_NATURAL_EXPONENT - 1), Err(AmmError::InvalidExponent));
    }

    #[test]
    fn exp_negative_is_reciprocal() {
        let Ok(inv_e) = exp(-ONE_18) else {
            panic!("expected Ok");
        };
        // 1/e = 0.367879441171442321...
        let diff = (inv_e - I256::new(367_879_441_171_442_321)).abs();
        assert!(diff < I256::new(100), "diff {diff}");
    }

    #[test]
    fn ln_of_one_is_zero() {
        assert_eq!(ln(ONE_18), Ok(I256::ZERO));
    }

    #[test]
    fn ln_rejects_non_positive() {
        assert_eq!(ln(I256::ZERO), Err(AmmError::BaseOutOfBounds));
        assert_eq!(ln(I256::MINUS_ONE), Err(AmmError::BaseOutOfBounds));
    }

    #[test]
    fn ln_of_e_squared_is_two() {
        // e^2 = 7.389056098930650227
        let Ok(r) = ln(I256::new(7_389_056_098_930_650_227)) else {
            panic!("expected Ok");
        };
        let diff = (r - ONE_18 * 2).abs();
        assert!(diff < I256::new(100), "diff {diff}");
    }

    #[test]
    fn ln_of_small_value_is_negative() {
        let Ok(r) = ln(I256::new(500_000_000_000_000_000)) else {
            panic!("expected Ok");
        };
        // ln(0.5) = -0.693147180559945309
        let diff = (r + I256::new(693_147_180_559_945_309)).abs();
        assert!(diff < I256::new(100), "diff {diff}");
    }
}
