//! Gyroscope elliptic concentrated liquidity pool (E-CLP).
//!
//! Liquidity lives on a rotated and stretched ellipse between the price
//! bounds `alpha` and `beta`.  The curve is described by
//!
//! - `(c, s)`: unit rotation vector (`c = cos φ`, `s = sin φ`);
//! - `lambda`: stretch factor along the rotated x axis;
//! - `tau_alpha`, `tau_beta`: the price bounds mapped onto the unit circle;
//! - `u, v, w, z, d_sq`: pre-computed combinations of the above, kept in
//!   38-decimal precision.
//!
//! The derived parameters are computed off chain with high precision and
//! supplied with the pool state; [`GyroEclpPool::from_config`] only checks
//! that they are consistent.
//!
//! Every computation rounds toward the pool.  The invariant comes with an
//! error bound: swaps use `(r + 2·err, r)` as the over/under estimate pair,
//! and `compute_invariant` returns `r ∓ err` depending on the rounding.
//!
//! # Limits
//!
//! | Limit | Value |
//! |-------|-------|
//! | Sum of balances | `1e34` (scaled-18) |
//! | Invariant | `3e37` |
//! | Invariant ratio | `[0.6, 5.0]` |

use ethnum::{I256, U256};

use super::at;
use super::gyro_2clp::gyro_max_swap_amount;
use crate::config::GyroEclpState;
use crate::domain::{MaxSwapParams, Rounding, SwapKind, SwapParams};
use crate::error::AmmError;
use crate::math::checked::{to_signed, to_unsigned};
use crate::math::signed_fixed_point::{
    div_down_mag, div_down_mag_u, div_up_mag_u, div_xp_u, mul_down_mag, mul_down_mag_u,
    mul_down_xp_to_np_u, mul_up_mag_u, mul_up_xp_to_np_u, mul_xp, mul_xp_u, ONE, ONE_XP,
};
use crate::math::{gyro_sqrt, mul_up};
use crate::traits::{FromConfig, PoolBase};

/// Largest invariant growth of a single liquidity operation.
pub const MAX_INVARIANT_RATIO: U256 = U256::new(5_000_000_000_000_000_000);
/// Largest invariant shrink of a single liquidity operation.
pub const MIN_INVARIANT_RATIO: U256 = U256::new(600_000_000_000_000_000);

const ROTATION_VECTOR_NORM_ACCURACY: I256 = I256::new(1_000);
const MAX_STRETCH_FACTOR: I256 = I256::new(100_000_000_000_000_000_000_000_000);
const DERIVED_TAU_NORM_ACCURACY_XP: I256 = I256::new(100_000_000_000_000_000_000_000);
// 1e43, which does not fit the 128-bit constructor.
const MAX_INV_INVARIANT_DENOMINATOR_XP: I256 =
    I256::from_words(29_387, 122_083_294_381_374_201_810_411_402_627_569_942_528);
const DERIVED_DSQ_NORM_ACCURACY_XP: I256 = I256::new(100_000_000_000_000_000_000_000);

const MAX_BALANCES: I256 = I256::new(10_000_000_000_000_000_000_000_000_000_000_000);
const MAX_INVARIANT: I256 = I256::new(30_000_000_000_000_000_000_000_000_000_000_000_000);

const E36: I256 = I256::new(1_000_000_000_000_000_000_000_000_000_000_000_000);
const SQRT_TOLERANCE: U256 = U256::new(5);

/// A pair of signed fixed-point values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vector2 {
    /// First component.
    pub x: I256,
    /// Second component.
    pub y: I256,
}

impl Vector2 {
    /// Creates a vector from its components.
    #[must_use]
    pub const fn new(x: I256, y: I256) -> Self {
        Self { x, y }
    }
}

/// Base ellipse parameters, 18 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EclpParams {
    /// Lower price bound.
    pub alpha: I256,
    /// Upper price bound.
    pub beta: I256,
    /// Cosine of the rotation angle.
    pub c: I256,
    /// Sine of the rotation angle.
    pub s: I256,
    /// Stretch factor.
    pub lambda: I256,
}

/// Derived ellipse parameters, 38 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedEclpParams {
    /// `alpha` mapped onto the unit circle.
    pub tau_alpha: Vector2,
    /// `beta` mapped onto the unit circle.
    pub tau_beta: Vector2,
    /// `s·c·(tau_beta.x − tau_alpha.x)`
    pub u: I256,
    /// `s²·tau_beta.y + c²·tau_alpha.y`
    pub v: I256,
    /// `s·c·(tau_beta.y − tau_alpha.y)`
    pub w: I256,
    /// `c²·tau_beta.x + s²·tau_alpha.x`
    pub z: I256,
    /// `c² + s²`, which is one up to rounding.
    pub d_sq: I256,
}

// ---------------------------------------------------------------------------
// Parameter validation
// ---------------------------------------------------------------------------

/// Checks the base ellipse parameters.
///
/// # Errors
///
/// - [`AmmError::PriceBoundsWrong`] unless `0 < alpha < beta`.
/// - [`AmmError::RotationVectorWrong`] if `c` or `s` is outside `[0, 1]`.
/// - [`AmmError::RotationVectorNotNormalized`] if `c² + s²` is not one
///   within `1e-15`.
/// - [`AmmError::StretchingFactorWrong`] unless `1 <= lambda <= 1e8`.
pub fn validate_params(params: &EclpParams) -> Result<(), AmmError> {
    if params.alpha <= I256::ZERO || params.beta <= params.alpha {
        return Err(AmmError::PriceBoundsWrong);
    }
    let unit = I256::ZERO..=ONE;
    if !unit.contains(&params.s) || !unit.contains(&params.c) {
        return Err(AmmError::RotationVectorWrong);
    }
    let sc = Vector2::new(params.s, params.c);
    let norm2 = scalar_prod(&sc, &sc)?;
    if norm2 < ONE - ROTATION_VECTOR_NORM_ACCURACY || norm2 > ONE + ROTATION_VECTOR_NORM_ACCURACY
    {
        return Err(AmmError::RotationVectorNotNormalized);
    }
    if params.lambda < ONE || params.lambda > MAX_STRETCH_FACTOR {
        return Err(AmmError::StretchingFactorWrong);
    }
    Ok(())
}

/// Checks the derived parameters against their accuracy bounds.
///
/// # Errors
///
/// - [`AmmError::DerivedTauNotNormalized`] if a tau vector or `d_sq` is
///   not one within `1e-15`.
/// - [`AmmError::DerivedZWrong`] if any of `u, v, w, z` exceeds one.
/// - [`AmmError::InvalidConfiguration`] if the invariant denominator is
///   too close to zero.
pub fn validate_derived_params(
    params: &EclpParams,
    derived: &DerivedEclpParams,
) -> Result<(), AmmError> {
    let within_tau_accuracy = |norm2: I256| {
        norm2 >= ONE_XP - DERIVED_TAU_NORM_ACCURACY_XP
            && norm2 <= ONE_XP + DERIVED_TAU_NORM_ACCURACY_XP
    };
    if !within_tau_accuracy(scalar_prod_xp(&derived.tau_alpha, &derived.tau_alpha)?)
        || !within_tau_accuracy(scalar_prod_xp(&derived.tau_beta, &derived.tau_beta)?)
    {
        return Err(AmmError::DerivedTauNotNormalized);
    }
    if [derived.u, derived.v, derived.w, derived.z]
        .iter()
        .any(|value| *value > ONE_XP)
    {
        return Err(AmmError::DerivedZWrong);
    }
    if derived.d_sq < ONE_XP - DERIVED_DSQ_NORM_ACCURACY_XP
        || derived.d_sq > ONE_XP + DERIVED_DSQ_NORM_ACCURACY_XP
    {
        return Err(AmmError::DerivedTauNotNormalized);
    }
    let mul_denominator = div_xp_u(ONE_XP, calc_a_chi_a_chi_in_xp(params, derived)? - ONE_XP)?;
    if mul_denominator > MAX_INV_INVARIANT_DENOMINATOR_XP {
        return Err(AmmError::InvalidConfiguration(
            "E-CLP invariant denominator out of range",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Vector helpers
// ---------------------------------------------------------------------------

fn scalar_prod(t1: &Vector2, t2: &Vector2) -> Result<I256, AmmError> {
    Ok(mul_down_mag(t1.x, t2.x)? + mul_down_mag(t1.y, t2.y)?)
}

fn scalar_prod_xp(t1: &Vector2, t2: &Vector2) -> Result<I256, AmmError> {
    Ok(mul_xp(t1.x, t2.x)? + mul_xp(t1.y, t2.y)?)
}

/// Applies the ellipse transform `A` to `tp`.
fn mul_a(params: &EclpParams, tp: &Vector2) -> Result<Vector2, AmmError> {
    Ok(Vector2 {
        x: div_down_mag_u(
            mul_down_mag_u(params.c, tp.x) - mul_down_mag_u(params.s, tp.y),
            params.lambda,
        )?,
        y: mul_down_mag_u(params.s, tp.x) + mul_down_mag_u(params.c, tp.y),
    })
}

// ---------------------------------------------------------------------------
// Virtual offsets and balance bounds
// ---------------------------------------------------------------------------

/// Virtual offset of token 0 (`a`), rounded up.
fn virtual_offset0(p: &EclpParams, d: &DerivedEclpParams, r: &Vector2) -> Result<I256, AmmError> {
    let term_xp = div_xp_u(d.tau_beta.x, d.d_sq)?;
    let a = if d.tau_beta.x > I256::ZERO {
        mul_up_xp_to_np_u(mul_up_mag_u(mul_up_mag_u(r.x, p.lambda), p.c), term_xp)
    } else {
        mul_up_xp_to_np_u(mul_down_mag_u(mul_down_mag_u(r.y, p.lambda), p.c), term_xp)
    };
    Ok(a + mul_up_xp_to_np_u(mul_up_mag_u(r.x, p.s), div_xp_u(d.tau_beta.y, d.d_sq)?))
}

/// Virtual offset of token 1 (`b`), rounded up.
fn virtual_offset1(p: &EclpParams, d: &DerivedEclpParams, r: &Vector2) -> Result<I256, AmmError> {
    let term_xp = div_xp_u(d.tau_alpha.x, d.d_sq)?;
    let b = if d.tau_alpha.x < I256::ZERO {
        mul_up_xp_to_np_u(mul_up_mag_u(mul_up_mag_u(r.x, p.lambda), p.s), -term_xp)
    } else {
        mul_up_xp_to_np_u(mul_down_mag_u(mul_down_mag_u(-r.y, p.lambda), p.s), term_xp)
    };
    Ok(b + mul_up_xp_to_np_u(mul_up_mag_u(r.x, p.c), div_xp_u(d.tau_alpha.y, d.d_sq)?))
}

/// Largest balance of token 0 the curve supports for invariant `r`.
fn max_balances0(p: &EclpParams, d: &DerivedEclpParams, r: &Vector2) -> Result<I256, AmmError> {
    let term_xp1 = div_xp_u(d.tau_beta.x - d.tau_alpha.x, d.d_sq)?;
    let term_xp2 = div_xp_u(d.tau_beta.y - d.tau_alpha.y, d.d_sq)?;
    let xp = mul_down_xp_to_np_u(mul_down_mag_u(mul_down_mag_u(r.y, p.lambda), p.c), term_xp1);
    let term2 = if term_xp2 > I256::ZERO {
        mul_down_mag_u(r.y, p.s)
    } else {
        mul_up_mag_u(r.x, p.s)
    };
    Ok(xp + mul_down_xp_to_np_u(term2, term_xp2))
}

/// Largest balance of token 1 the curve supports for invariant `r`.
fn max_balances1(p: &EclpParams, d: &DerivedEclpParams, r: &Vector2) -> Result<I256, AmmError> {
    let term_xp1 = div_xp_u(d.tau_beta.x - d.tau_alpha.x, d.d_sq)?;
    let term_xp2 = div_xp_u(d.tau_alpha.y - d.tau_beta.y, d.d_sq)?;
    let yp = mul_down_xp_to_np_u(mul_down_mag_u(mul_down_mag_u(r.y, p.lambda), p.s), term_xp1);
    let term2 = if term_xp2 > I256::ZERO {
        mul_down_mag_u(r.y, p.c)
    } else {
        mul_up_mag_u(r.x, p.c)
    };
    Ok(yp + mul_down_xp_to_np_u(term2, term_xp2))
}

// ---------------------------------------------------------------------------
// Invariant
// ---------------------------------------------------------------------------

/// `(A·t)·(A·χ)` for `t = (x, y)`, rounded down.
fn calc_at_a_chi(x: I256, y: I256, p: &EclpParams, d: &DerivedEclpParams) -> Result<I256, AmmError> {
    let d_sq2 = mul_xp_u(d.d_sq, d.d_sq);

    // (cx - sy) * (w/lambda + z) / lambda
    let term_xp = div_xp_u(
        div_down_mag_u(div_down_mag_u(d.w, p.lambda)? + d.z, p.lambda)?,
        d_sq2,
    )?;
    let mut val = mul_down_xp_to_np_u(mul_down_mag_u(x, p.c) - mul_down_mag_u(y, p.s), term_xp);

    // (x lambda s + y lambda c) * u
    let term_np = mul_down_mag_u(mul_down_mag_u(x, p.lambda), p.s)
        + mul_down_mag_u(mul_down_mag_u(y, p.lambda), p.c);
    val = val + mul_down_xp_to_np_u(term_np, div_xp_u(d.u, d_sq2)?);

    // (sx + cy) * v
    let term_np = mul_down_mag_u(x, p.s) + mul_down_mag_u(y, p.c);
    val = val + mul_down_xp_to_np_u(term_np, div_xp_u(d.v, d_sq2)?);

    Ok(val)
}

/// `(A·χ)·(A·χ)` in 38 decimals, rounded up.
fn calc_a_chi_a_chi_in_xp(p: &EclpParams, d: &DerivedEclpParams) -> Result<I256, AmmError> {
    let d_sq3 = mul_xp_u(mul_xp_u(d.d_sq, d.d_sq), d.d_sq);

    let mut val = mul_up_mag_u(p.lambda, div_xp_u(mul_xp_u(d.u * 2, d.v), d_sq3)?);

    let u_plus = d.u + 1;
    val = val
        + mul_up_mag_u(
            mul_up_mag_u(div_xp_u(mul_xp_u(u_plus, u_plus), d_sq3)?, p.lambda),
            p.lambda,
        );

    val = val + div_xp_u(mul_xp_u(d.v, d.v), d_sq3)?;

    let term_xp = div_up_mag_u(d.w, p.lambda)? + d.z;
    val = val + div_xp_u(mul_xp_u(term_xp, term_xp), d_sq3)?;

    Ok(val)
}

fn d_sq4(d: &DerivedEclpParams) -> I256 {
    mul_xp_u(mul_xp_u(mul_xp_u(d.d_sq, d.d_sq), d.d_sq), d.d_sq)
}

fn calc_min_atx_a_chiy_sq_plus_atx_sq(
    x: I256,
    y: I256,
    p: &EclpParams,
    d: &DerivedEclpParams,
) -> Result<I256, AmmError> {
    let mut term_np = mul_up_mag_u(mul_up_mag_u(mul_up_mag_u(x, x), p.c), p.c)
        + mul_up_mag_u(mul_up_mag_u(mul_up_mag_u(y, y), p.s), p.s);
    term_np = term_np - mul_down_mag_u(mul_down_mag_u(mul_down_mag_u(x, y), p.c * 2), p.s);

    let term_xp = mul_xp_u(d.u, d.u)
        + div_down_mag_u(mul_xp_u(d.u * 2, d.v), p.lambda)?
        + div_down_mag_u(div_down_mag_u(mul_xp_u(d.v, d.v), p.lambda)?, p.lambda)?;
    let term_xp = div_xp_u(term_xp, d_sq4(d))?;

    let mut val = mul_down_xp_to_np_u(-term_np, term_xp);
    val = val
        + mul_down_xp_to_np_u(
            div_down_mag_u(div_down_mag_u(term_np - 9, p.lambda)?, p.lambda)?,
            div_xp_u(ONE_XP, d.d_sq)?,
        );
    Ok(val)
}

fn calc_2_atx_aty_a_chix_a_chiy(
    x: I256,
    y: I256,
    p: &EclpParams,
    d: &DerivedEclpParams,
) -> Result<I256, AmmError> {
    let mut term_np = mul_down_mag_u(
        mul_down_mag_u(mul_down_mag_u(x, x) - mul_up_mag_u(y, y), p.c * 2),
        p.s,
    );
    let xy = mul_down_mag_u(y, x * 2);
    term_np = term_np + mul_down_mag_u(mul_down_mag_u(xy, p.c), p.c)
        - mul_down_mag_u(mul_down_mag_u(xy, p.s), p.s);

    let mut term_xp = mul_xp_u(d.z, d.u)
        + div_down_mag_u(div_down_mag_u(mul_xp_u(d.w, d.v), p.lambda)?, p.lambda)?;
    term_xp = term_xp + div_down_mag_u(mul_xp_u(d.w, d.u) + mul_xp_u(d.z, d.v), p.lambda)?;
    let term_xp = div_xp_u(term_xp, d_sq4(d))?;

    Ok(mul_down_xp_to_np_u(term_np, term_xp))
}

fn calc_min_aty_a_chix_sq_plus_aty_sq(
    x: I256,
    y: I256,
    p: &EclpParams,
    d: &DerivedEclpParams,
) -> Result<I256, AmmError> {
    let mut term_np = mul_up_mag_u(mul_up_mag_u(mul_up_mag_u(x, x), p.s), p.s)
        + mul_up_mag_u(mul_up_mag_u(mul_up_mag_u(y, y), p.c), p.c);
    term_np = term_np + mul_up_mag_u(mul_up_mag_u(mul_up_mag_u(x, y), p.s * 2), p.c);

    let mut term_xp = mul_xp_u(d.z, d.z)
        + div_down_mag_u(div_down_mag_u(mul_xp_u(d.w, d.w), p.lambda)?, p.lambda)?;
    term_xp = term_xp + div_down_mag_u(mul_xp_u(d.z * 2, d.w), p.lambda)?;
    let term_xp = div_xp_u(term_xp, d_sq4(d))?;

    let mut val = mul_down_xp_to_np_u(-term_np, term_xp);
    val = val + mul_down_xp_to_np_u(term_np - 9, div_xp_u(ONE_XP, d.d_sq)?);
    Ok(val)
}

/// Square root term of the invariant and its error.
fn calc_invariant_sqrt(
    x: I256,
    y: I256,
    p: &EclpParams,
    d: &DerivedEclpParams,
) -> Result<(I256, I256), AmmError> {
    let val = calc_min_atx_a_chiy_sq_plus_atx_sq(x, y, p, d)?
        + calc_2_atx_aty_a_chix_a_chiy(x, y, p, d)?
        + calc_min_aty_a_chix_sq_plus_aty_sq(x, y, p, d)?;
    let err = (mul_up_mag_u(x, x) + mul_up_mag_u(y, y)) / ONE_XP;
    Ok((signed_sqrt(val)?, err))
}

/// Square root of a signed value; non-positive inputs give zero.
fn signed_sqrt(value: I256) -> Result<I256, AmmError> {
    if value <= I256::ZERO {
        return Ok(I256::ZERO);
    }
    to_signed(gyro_sqrt(value.as_u256(), SQRT_TOLERANCE)?)
}

/// Computes the invariant `r` together with an upper bound on its error.
///
/// # Errors
///
/// - [`AmmError::MaxBalancesExceeded`] if `x + y > 1e34`.
/// - [`AmmError::MaxInvariantExceeded`] if `r + err > 3e37`.
/// - [`AmmError::InvalidConfiguration`] unless there are exactly 2
///   balances.
pub fn calculate_invariant_with_error(
    balances: &[U256],
    params: &EclpParams,
    derived: &DerivedEclpParams,
) -> Result<(I256, I256), AmmError> {
    let (x, y) = signed_pair(balances)?;
    if x + y > MAX_BALANCES {
        return Err(AmmError::MaxBalancesExceeded);
    }

    let at_a_chi = calc_at_a_chi(x, y, params, derived)?;
    let (sqrt, mut err) = calc_invariant_sqrt(x, y, params, derived)?;

    // The smallest non-zero sqrt is 1e-9, so a zero result means the error
    // inside the root did not get magnified.
    err = if sqrt > I256::ZERO {
        div_up_mag_u(err + 1, sqrt * 2)?
    } else if err > I256::ZERO {
        signed_sqrt(err)?
    } else {
        I256::new(1_000_000_000)
    };

    err = ((params.lambda * (x + y)) / ONE_XP + err + 1) * 20;

    let achiachi = calc_a_chi_a_chi_in_xp(params, derived)?;
    let mul_denominator = div_xp_u(ONE_XP, achiachi - ONE_XP)?;

    let invariant = mul_down_xp_to_np_u(at_a_chi + sqrt - err, mul_denominator);

    // Relative error from the denominator scales with lambda².
    err = mul_up_xp_to_np_u(err, mul_denominator);
    let lambda_squared = (params.lambda * params.lambda) / E36;
    let denominator_err = mul_up_xp_to_np_u(invariant, mul_denominator) * lambda_squared * 40;
    err = err + denominator_err / ONE_XP + 1;

    if invariant + err > MAX_INVARIANT {
        return Err(AmmError::MaxInvariantExceeded);
    }
    Ok((invariant, err))
}

fn signed_pair(balances: &[U256]) -> Result<(I256, I256), AmmError> {
    let [x, y] = balances else {
        return Err(AmmError::InvalidConfiguration(
            "E-CLP pools hold exactly 2 tokens",
        ));
    };
    Ok((to_signed(*x)?, to_signed(*y)?))
}

/// Price of token 0 in units of token 1 at the given balances.
///
/// # Errors
///
/// Propagates arithmetic errors; balances must hold exactly 2 entries.
pub fn calc_spot_price0in1(
    balances: &[U256],
    params: &EclpParams,
    derived: &DerivedEclpParams,
    invariant: I256,
) -> Result<I256, AmmError> {
    let (x, y) = signed_pair(balances)?;
    let r = Vector2::new(invariant, invariant);
    let ab = Vector2::new(
        virtual_offset0(params, derived, &r)?,
        virtual_offset1(params, derived, &r)?,
    );
    let transformed = mul_a(params, &Vector2::new(x - ab.x, y - ab.y))?;
    let pc = Vector2::new(div_down_mag_u(transformed.x, transformed.y)?, ONE);

    let pgx = scalar_prod(&pc, &mul_a(params, &Vector2::new(ONE, I256::ZERO))?)?;
    let pgy = scalar_prod(&pc, &mul_a(params, &Vector2::new(I256::ZERO, ONE))?)?;
    div_down_mag(pgx, pgy)
}

// ---------------------------------------------------------------------------
// Swap solver
// ---------------------------------------------------------------------------

/// Solves the swap quadratic for the balance of the other token.
///
/// `x` is the new balance of the known token; `ab` holds the virtual
/// offsets ordered (known, unknown).
#[allow(clippy::too_many_arguments)]
fn solve_quadratic_swap(
    lambda: I256,
    x: I256,
    s: I256,
    c: I256,
    r: &Vector2,
    ab: &Vector2,
    tau_beta: &Vector2,
    d_sq: I256,
) -> Result<I256, AmmError> {
    let lam_bar = Vector2::new(
        ONE_XP - div_down_mag_u(div_down_mag_u(ONE_XP, lambda)?, lambda)?,
        ONE_XP - div_up_mag_u(div_up_mag_u(ONE_XP, lambda)?, lambda)?,
    );

    let xp = x - ab.x;
    let qb = if xp > I256::ZERO {
        mul_up_xp_to_np_u(
            mul_down_mag_u(mul_down_mag_u(-xp, s), c),
            div_xp_u(lam_bar.y, d_sq)?,
        )
    } else {
        mul_up_xp_to_np_u(
            mul_up_mag_u(mul_up_mag_u(-xp, s), c),
            div_xp_u(lam_bar.x, d_sq)? + 1,
        )
    };

    let s_term = Vector2::new(
        div_xp_u(mul_down_mag_u(mul_down_mag_u(lam_bar.y, s), s), d_sq)?,
        div_xp_u(mul_up_mag_u(mul_up_mag_u(lam_bar.x, s), s), d_sq + 1)? + 1,
    );
    let s_term = Vector2::new(ONE_XP - s_term.x, ONE_XP - s_term.y);

    let mut qc = -calc_xp_xp_div_lambda_lambda(x, r, lambda, s, c, tau_beta, d_sq)?;
    qc = qc + mul_down_xp_to_np_u(mul_down_mag_u(r.y, r.y), s_term.y);
    let qc = signed_sqrt(qc)?;

    let qa = if qb - qc > I256::ZERO {
        mul_up_xp_to_np_u(qb - qc, div_xp_u(ONE_XP, s_term.y)? + 1)
    } else {
        mul_up_xp_to_np_u(qb - qc, div_xp_u(ONE_XP, s_term.x)?)
    };
    Ok(qa + ab.y)
}

/// `(x − a)² / lambda²` expanded so every term rounds up.
fn calc_xp_xp_div_lambda_lambda(
    x: I256,
    r: &Vector2,
    lambda: I256,
    s: I256,
    c: I256,
    tau_beta: &Vector2,
    d_sq: I256,
) -> Result<I256, AmmError> {
    let sq_vars = Vector2::new(mul_xp_u(d_sq, d_sq), mul_up_mag_u(r.x, r.x));

    let term_xp = div_xp_u(mul_xp_u(tau_beta.x, tau_beta.y), sq_vars.x)?;
    let mut qa = if term_xp > I256::ZERO {
        let q = mul_up_mag_u(sq_vars.y, s * 2);
        mul_up_xp_to_np_u(mul_up_mag_u(q, c), term_xp + 7)
    } else {
        let q = mul_down_mag_u(mul_down_mag_u(r.y, r.y), s * 2);
        mul_up_xp_to_np_u(mul_down_mag_u(q, c), term_xp)
    };

    let qb = if tau_beta.x < I256::ZERO {
        mul_up_xp_to_np_u(
            mul_up_mag_u(mul_up_mag_u(r.x, x), c * 2),
            -div_xp_u(tau_beta.x, d_sq)? + 3,
        )
    } else {
        mul_up_xp_to_np_u(
            mul_down_mag_u(mul_down_mag_u(-r.y, x), c * 2),
            div_xp_u(tau_beta.x, d_sq)?,
        )
    };
    qa = qa + qb;

    let term_xp2 = div_xp_u(mul_xp_u(tau_beta.y, tau_beta.y), sq_vars.x)? + 7;
    let mut qb = mul_up_xp_to_np_u(mul_up_mag_u(mul_up_mag_u(sq_vars.y, s), s), term_xp2);
    let qc = mul_up_xp_to_np_u(
        mul_down_mag_u(mul_down_mag_u(-r.y, x), s * 2),
        div_xp_u(tau_beta.y, d_sq)?,
    );
    qb = qb + qc + mul_up_mag_u(x, x);
    qb = if qb > I256::ZERO {
        div_up_mag_u(qb, lambda)?
    } else {
        div_down_mag_u(qb, lambda)?
    };

    qa = qa + qb;
    qa = if qa > I256::ZERO {
        div_up_mag_u(qa, lambda)?
    } else {
        div_down_mag_u(qa, lambda)?
    };

    let term_xp2 = div_xp_u(mul_xp_u(tau_beta.x, tau_beta.x), sq_vars.x)? + 7;
    let val = mul_up_mag_u(mul_up_mag_u(sq_vars.y, c), c);
    Ok(mul_up_xp_to_np_u(val, term_xp2) + qa)
}

/// Balance of token 1 on the curve for token 0 balance `x`.
fn calc_y_given_x(
    x: I256,
    params: &EclpParams,
    d: &DerivedEclpParams,
    r: &Vector2,
) -> Result<I256, AmmError> {
    let ab = Vector2::new(virtual_offset0(params, d, r)?, virtual_offset1(params, d, r)?);
    solve_quadratic_swap(params.lambda, x, params.s, params.c, r, &ab, &d.tau_beta, d.d_sq)
}

/// Balance of token 0 on the curve for token 1 balance `y`.
fn calc_x_given_y(
    y: I256,
    params: &EclpParams,
    d: &DerivedEclpParams,
    r: &Vector2,
) -> Result<I256, AmmError> {
    let ba = Vector2::new(virtual_offset1(params, d, r)?, virtual_offset0(params, d, r)?);
    // Swapping the roles of the tokens mirrors the ellipse: c and s trade
    // places and tau_alpha.x flips sign.
    let mirrored_tau = Vector2::new(-d.tau_alpha.x, d.tau_alpha.y);
    solve_quadratic_swap(params.lambda, y, params.c, params.s, r, &ba, &mirrored_tau, d.d_sq)
}

fn check_asset_bounds(
    params: &EclpParams,
    derived: &DerivedEclpParams,
    invariant: &Vector2,
    new_balance: I256,
    token_index: usize,
) -> Result<(), AmmError> {
    let bound = if token_index == 0 {
        max_balances0(params, derived, invariant)?
    } else {
        max_balances1(params, derived, invariant)?
    };
    if new_balance > MAX_BALANCES || new_balance > bound {
        return Err(AmmError::AssetBoundsExceeded);
    }
    Ok(())
}

/// Amount of the other token paid out for `amount_in`.
///
/// `invariant` is the (over, under) estimate pair.
///
/// # Errors
///
/// - [`AmmError::AssetBoundsExceeded`] if the new input balance leaves
///   the curve.
/// - [`AmmError::NegativeAmountOut`] if rounding would make the pool pay
///   a negative amount.
pub fn calc_out_given_in(
    balances: &[U256],
    amount_in: U256,
    token_in_is_token0: bool,
    params: &EclpParams,
    derived: &DerivedEclpParams,
    invariant: &Vector2,
) -> Result<U256, AmmError> {
    let (x, y) = signed_pair(balances)?;
    let amount_in = to_signed(amount_in)?;
    let amount_out = if token_in_is_token0 {
        let balance_in_new = x + amount_in;
        check_asset_bounds(params, derived, invariant, balance_in_new, 0)?;
        y - calc_y_given_x(balance_in_new, params, derived, invariant)?
    } else {
        let balance_in_new = y + amount_in;
        check_asset_bounds(params, derived, invariant, balance_in_new, 1)?;
        x - calc_x_given_y(balance_in_new, params, derived, invariant)?
    };
    to_unsigned(amount_out)
}

/// Amount of the input token required to receive `amount_out`.
///
/// # Errors
///
/// - [`AmmError::AssetBoundsExceeded`] if `amount_out` exceeds the output
///   balance or the new input balance leaves the curve.
/// - [`AmmError::NegativeAmountOut`] if the solved balance is below the
///   current one.
pub fn calc_in_given_out(
    balances: &[U256],
    amount_out: U256,
    token_in_is_token0: bool,
    params: &EclpParams,
    derived: &DerivedEclpParams,
    invariant: &Vector2,
) -> Result<U256, AmmError> {
    let (x, y) = signed_pair(balances)?;
    let amount_out = to_signed(amount_out)?;
    let (balance_in, balance_out, index_in) = if token_in_is_token0 {
        (x, y, 0)
    } else {
        (y, x, 1)
    };
    if amount_out > balance_out {
        return Err(AmmError::AssetBoundsExceeded);
    }
    let balance_out_new = balance_out - amount_out;
    let balance_in_new = if token_in_is_token0 {
        calc_x_given_y(balance_out_new, params, derived, invariant)?
    } else {
        calc_y_given_x(balance_out_new, params, derived, invariant)?
    };
    check_asset_bounds(params, derived, invariant, balance_in_new, index_in)?;
    to_unsigned(balance_in_new - balance_in)
}

/// Balance of `token_index` that scales the invariant by
/// `invariant_ratio`, the other balance fixed.
///
/// # Errors
///
/// - [`AmmError::InvalidConfiguration`] for a bad index or token count.
/// - [`AmmError::MaxInvariantExceeded`] if the scaled invariant is too
///   large.
pub fn compute_balance(
    balances: &[U256],
    token_index: usize,
    invariant_ratio: U256,
    params: &EclpParams,
    derived: &DerivedEclpParams,
) -> Result<U256, AmmError> {
    if token_index >= 2 {
        return Err(AmmError::InvalidConfiguration("token index out of range"));
    }
    let (invariant, err) = calculate_invariant_with_error(balances, params, derived)?;

    // Over- and under-estimate, both scaled; the offsets pick whichever is
    // conservative for their sign.
    let invariant = Vector2::new(
        to_signed(mul_up(to_unsigned(invariant + err)?, invariant_ratio)?)?,
        to_signed(mul_up(to_unsigned(invariant - err)?, invariant_ratio)?)?,
    );
    if invariant.x > MAX_INVARIANT {
        return Err(AmmError::MaxInvariantExceeded);
    }

    let (x, y) = signed_pair(balances)?;
    let balance = if token_index == 0 {
        calc_x_given_y(y, params, derived, &invariant)?
    } else {
        calc_y_given_x(x, params, derived, &invariant)?
    };
    to_unsigned(balance)
}

// ---------------------------------------------------------------------------
// GyroEclpPool
// ---------------------------------------------------------------------------

/// A Gyroscope E-CLP pool.
///
/// Constructed from a [`GyroEclpState`]; construction validates both the
/// base and the derived ellipse parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GyroEclpPool {
    params: EclpParams,
    derived: DerivedEclpParams,
}

impl GyroEclpPool {
    /// Base ellipse parameters.
    #[must_use]
    pub const fn params(&self) -> &EclpParams {
        &self.params
    }

    /// Derived ellipse parameters.
    #[must_use]
    pub const fn derived(&self) -> &DerivedEclpParams {
        &self.derived
    }

    /// Spot price of token 0 in token 1 at `balances_live_scaled18`.
    ///
    /// # Errors
    ///
    /// Propagates invariant and arithmetic errors.
    pub fn spot_price0in1(&self, balances_live_scaled18: &[U256]) -> Result<I256, AmmError> {
        let (invariant, _) =
            calculate_invariant_with_error(balances_live_scaled18, &self.params, &self.derived)?;
        calc_spot_price0in1(balances_live_scaled18, &self.params, &self.derived, invariant)
    }
}

impl FromConfig<GyroEclpState> for GyroEclpPool {
    /// # Errors
    ///
    /// Base state errors, then [`validate_params`] and
    /// [`validate_derived_params`].
    fn from_config(config: &GyroEclpState) -> Result<Self, AmmError> {
        config.validate()?;
        let params = EclpParams {
            alpha: config.params_alpha,
            beta: config.params_beta,
            c: config.params_c,
            s: config.params_s,
            lambda: config.params_lambda,
        };
        let derived = DerivedEclpParams {
            tau_alpha: Vector2::new(config.tau_alpha_x, config.tau_alpha_y),
            tau_beta: Vector2::new(config.tau_beta_x, config.tau_beta_y),
            u: config.u,
            v: config.v,
            w: config.w,
            z: config.z,
            d_sq: config.d_sq,
        };
        validate_params(&params)?;
        validate_derived_params(&params, &derived)?;
        Ok(Self { params, derived })
    }
}

impl PoolBase for GyroEclpPool {
    fn on_swap(&self, params: &SwapParams) -> Result<U256, AmmError> {
        let balances = &params.balances_live_scaled18;
        at(balances, params.index_in)?;
        at(balances, params.index_out)?;
        let token_in_is_token0 = params.index_in == 0;
        let (invariant, err) =
            calculate_invariant_with_error(balances, &self.params, &self.derived)?;
        let invariant = Vector2::new(invariant + err * 2, invariant);

        match params.swap_kind {
            SwapKind::GivenIn => calc_out_given_in(
                balances,
                params.amount_given_scaled18,
                token_in_is_token0,
                &self.params,
                &self.derived,
                &invariant,
            ),
            SwapKind::GivenOut => calc_in_given_out(
                balances,
                params.amount_given_scaled18,
                token_in_is_token0,
                &self.params,
                &self.derived,
                &invariant,
            ),
        }
    }

    fn compute_invariant(
        &self,
        balances_live_scaled18: &[U256],
        rounding: Rounding,
    ) -> Result<U256, AmmError> {
        let (invariant, err) =
            calculate_invariant_with_error(balances_live_scaled18, &self.params, &self.derived)?;
        match rounding {
            Rounding::Down => to_unsigned(invariant - err),
            Rounding::Up => to_unsigned(invariant + err),
        }
    }

    fn compute_balance(
        &self,
        balances_live_scaled18: &[U256],
        token_in_index: usize,
        invariant_ratio: U256,
    ) -> Result<U256, AmmError> {
        compute_balance(
            balances_live_scaled18,
            token_in_index,
            invariant_ratio,
            &self.params,
            &self.derived,
        )
    }

    fn get_maximum_invariant_ratio(&self) -> U256 {
        MAX_INVARIANT_RATIO
    }

    fn get_minimum_invariant_ratio(&self) -> U256 {
        MIN_INVARIANT_RATIO
    }

    fn get_max_swap_amount(&self, params: &MaxSwapParams<'_>) -> Result<U256, AmmError> {
        gyro_max_swap_amount(params)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::config::pool_state::tests::base;
    use crate::math::WAD;

    // -- fixture --------------------------------------------------------------

    // A pool pegged at 1 with a 45° rotation, price range [0.998, 1.002]
    // and lambda = 4000.
    const C: I256 = I256::new(707_106_781_186_547_524);

    fn state() -> GyroEclpState {
        GyroEclpState {
            base: base(2),
            params_alpha: I256::new(998_000_000_000_000_000),
            params_beta: I256::new(1_002_000_000_000_000_000),
            params_c: C,
            params_s: C,
            params_lambda: I256::new(4_000_000_000_000_000_000_000),
            tau_alpha_x: I256::new(-97_019_954_384_842_043_544_724_424_672_955_519_092),
            tau_alpha_y: I256::new(24_230_733_607_614_300_375_294_925_062_070_640_893),
            tau_beta_x: I256::new(97_008_540_944_572_199_263_830_476_557_668_219_903),
            tau_beta_y: I256::new(24_276_387_371_379_192_865_773_576_758_556_472_031),
            u: I256::new(97_014_247_664_707_121_294_286_667_738_115_525_588),
            v: I256::new(24_253_560_489_496_746_593_036_556_808_525_893_834),
            w: I256::new(22_826_881_882_446_245_213_445_663_946_965_623),
            z: I256::new(-5_706_720_134_922_140_440_504_011_950_253_032),
            d_sq: I256::new(99_999_999_999_999_999_886_624_093_342_106_115_200),
        }
    }

    pub(crate) fn pool() -> GyroEclpPool {
        let Ok(pool) = GyroEclpPool::from_config(&state()) else {
            panic!("expected valid E-CLP params");
        };
        pool
    }

    fn balances() -> Vec<U256> {
        vec![WAD * 100, WAD * 100]
    }

    fn swap(kind: SwapKind, amount: U256, index_in: usize) -> SwapParams {
        SwapParams {
            swap_kind: kind,
            amount_given_scaled18: amount,
            balances_live_scaled18: balances(),
            index_in,
            index_out: 1 - index_in,
        }
    }

    // -- validation -----------------------------------------------------------

    #[test]
    fn fixture_is_valid() {
        let p = pool();
        assert_eq!(p.params().lambda, state().params_lambda);
        assert_eq!(p.derived().d_sq, state().d_sq);
    }

    #[test]
    fn price_bounds_must_be_ordered() {
        let mut s = state();
        s.params_beta = s.params_alpha;
        assert_eq!(GyroEclpPool::from_config(&s), Err(AmmError::PriceBoundsWrong));
    }

    #[test]
    fn rotation_vector_must_be_unit() {
        let mut s = state();
        s.params_c = I256::new(500_000_000_000_000_000);
        s.params_s = I256::new(500_000_000_000_000_000);
        assert_eq!(
            GyroEclpPool::from_config(&s),
            Err(AmmError::RotationVectorNotNormalized)
        );

        let mut s = state();
        s.params_s = -C;
        assert_eq!(GyroEclpPool::from_config(&s), Err(AmmError::RotationVectorWrong));
    }

    #[test]
    fn stretch_factor_bounds() {
        let mut s = state();
        s.params_lambda = ONE - 1;
        assert_eq!(GyroEclpPool::from_config(&s), Err(AmmError::StretchingFactorWrong));
        s.params_lambda = MAX_STRETCH_FACTOR + 1;
        assert_eq!(GyroEclpPool::from_config(&s), Err(AmmError::StretchingFactorWrong));
    }

    #[test]
    fn derived_params_checked() {
        let mut s = state();
        s.tau_alpha_y = s.tau_alpha_y + I256::new(1_000_000_000_000_000_000_000_000);
        assert_eq!(
            GyroEclpPool::from_config(&s),
            Err(AmmError::DerivedTauNotNormalized)
        );

        let mut s = state();
        s.u = ONE_XP + 1;
        assert_eq!(GyroEclpPool::from_config(&s), Err(AmmError::DerivedZWrong));
    }

    #[test]
    fn three_tokens_rejected() {
        let mut s = state();
        s.base = base(3);
        assert!(matches!(
            GyroEclpPool::from_config(&s),
            Err(AmmError::InvalidConfiguration(_))
        ));
    }

    // -- invariant ------------------------------------------------------------

    #[test]
    fn invariant_with_error() {
        let p = pool();
        assert_eq!(
            calculate_invariant_with_error(&balances(), p.params(), p.derived()),
            Ok((I256::new(36_450_565_161_162_178), I256::new(2)))
        );
        assert_eq!(
            p.compute_invariant(&balances(), Rounding::Down),
            Ok(U256::new(36_450_565_161_162_176))
        );
        assert_eq!(
            p.compute_invariant(&balances(), Rounding::Up),
            Ok(U256::new(36_450_565_161_162_180))
        );
    }

    #[test]
    fn oversized_balances_rejected() {
        let p = pool();
        let huge = U256::new(10_000_000_000_000_000_000_000_000_000_000_000);
        assert_eq!(
            p.compute_invariant(&[huge, WAD], Rounding::Down),
            Err(AmmError::MaxBalancesExceeded)
        );
    }

    // -- swaps ----------------------------------------------------------------

    #[test]
    fn swaps_at_peg() {
        let p = pool();
        assert_eq!(
            p.on_swap(&swap(SwapKind::GivenIn, WAD, 0)),
            Ok(U256::new(999_997_546_559_733_451))
        );
        assert_eq!(
            p.on_swap(&swap(SwapKind::GivenOut, WAD, 0)),
            Ok(U256::new(1_000_002_453_452_235_686))
        );
        assert_eq!(
            p.on_swap(&swap(SwapKind::GivenIn, WAD, 1)),
            Ok(U256::new(999_997_603_572_342_274))
        );
    }

    #[test]
    fn swap_past_the_curve_exceeds_bounds() {
        let p = pool();
        assert_eq!(
            p.on_swap(&swap(SwapKind::GivenIn, WAD * 150, 0)),
            Err(AmmError::AssetBoundsExceeded)
        );
        assert_eq!(
            p.on_swap(&swap(SwapKind::GivenOut, WAD * 101, 0)),
            Err(AmmError::AssetBoundsExceeded)
        );
    }

    #[test]
    fn spot_price_near_peg() {
        let p = pool();
        assert_eq!(
            p.spot_price0in1(&balances()),
            Ok(I256::new(999_999_971_494_933_290))
        );
    }

    // -- compute_balance ------------------------------------------------------

    #[test]
    fn compute_balance_values() {
        let p = pool();
        assert_eq!(
            p.compute_balance(&balances(), 0, WAD),
            Ok(U256::new(100_000_000_000_000_007_368))
        );
        assert_eq!(
            p.compute_balance(&balances(), 0, WAD * 2),
            Ok(U256::new(300_012_941_024_458_319_754))
        );
        assert!(p.compute_balance(&balances(), 2, WAD).is_err());
    }

    #[test]
    fn limits() {
        let p = pool();
        assert_eq!(p.get_maximum_invariant_ratio(), MAX_INVARIANT_RATIO);
        assert_eq!(p.get_minimum_invariant_ratio(), MIN_INVARIANT_RATIO);
    }
}
