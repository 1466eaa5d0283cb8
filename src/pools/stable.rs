//! StableSwap pool implementation (Curve style, Balancer V3 rounding).
//!
//! Specialised for low-slippage swaps between similarly-priced assets.
//!
//! # Invariant (n tokens)
//!
//! ```text
//! A·nⁿ·S + D = A·D·nⁿ + D^(n+1) / (nⁿ·P)
//! ```
//!
//! where `S = Σ xᵢ`, `P = ∏ xᵢ` and `A` carries [`AMP_PRECISION`].
//!
//! # Swap Algorithm
//!
//! 1. Compute `D` for the current balances.
//! 2. Move the given side by the given amount.
//! 3. Solve the invariant for the other side's balance with
//!    Newton-Raphson.
//! 4. Return the difference, shaded by one wei in the pool's favour.
//!
//! Both solvers stop when consecutive iterates differ by at most one and
//! give up after 255 rounds with
//! [`AmmError::StableInvariantDidntConverge`].

use ethnum::U256;

use super::at;
use crate::config::{StableState, AMP_PRECISION};
use crate::domain::{MaxSwapParams, Rounding, SwapKind, SwapParams};
use crate::error::AmmError;
use crate::math::checked::CheckedArithmetic;
use crate::math::{div_up_raw, mul_down, to_raw_undo_rate_round_down};
use crate::traits::{FromConfig, PoolBase};

/// Largest invariant growth of a single liquidity operation (500%).
pub const MAX_INVARIANT_RATIO: U256 = U256::new(5_000_000_000_000_000_000);
/// Largest invariant shrink of a single liquidity operation (60%).
pub const MIN_INVARIANT_RATIO: U256 = U256::new(600_000_000_000_000_000);

const MAX_ITERATIONS: usize = 255;

// ---------------------------------------------------------------------------
// StableSwap math helpers
// ---------------------------------------------------------------------------

#[inline]
fn converged(a: U256, b: U256) -> bool {
    let diff = if a > b { a - b } else { b - a };
    diff <= U256::ONE
}

/// Computes the invariant `D` via Newton-Raphson.
///
/// ```text
/// D' = (A·n·S / P + n·D_P) · D / ((A·n − P)·D / P + (n+1)·D_P)
/// ```
///
/// with `P = AMP_PRECISION` and `D_P = Dⁿ⁺¹ / (nⁿ·∏xᵢ)` built one factor
/// at a time.  All divisions truncate.
///
/// # Errors
///
/// - [`AmmError::StableInvariantDidntConverge`] after 255 rounds.
/// - [`AmmError::DivisionByZero`] if a balance is zero while the total is
///   not.
pub fn compute_invariant(amp: U256, balances: &[U256]) -> Result<U256, AmmError> {
    let mut total = U256::ZERO;
    for balance in balances {
        total = total.safe_add(*balance)?;
    }
    if total == U256::ZERO {
        return Ok(U256::ZERO);
    }

    let n = U256::from(balances.len() as u64);
    let amp_times_total = amp.safe_mul(n)?;
    let mut invariant = total;

    for _ in 0..MAX_ITERATIONS {
        let mut d_p = invariant;
        for balance in balances {
            d_p = d_p.safe_mul(invariant)?.safe_div(balance.safe_mul(n)?)?;
        }

        let previous = invariant;

        let numerator = amp_times_total
            .safe_mul(total)?
            .safe_div(AMP_PRECISION)?
            .safe_add(d_p.safe_mul(n)?)?
            .safe_mul(invariant)?;
        let denominator = amp_times_total
            .safe_sub(AMP_PRECISION)?
            .safe_mul(invariant)?
            .safe_div(AMP_PRECISION)?
            .safe_add((n + 1).safe_mul(d_p)?)?;

        invariant = numerator.safe_div(denominator)?;

        if converged(invariant, previous) {
            return Ok(invariant);
        }
    }

    Err(AmmError::StableInvariantDidntConverge)
}

/// Solves the invariant for the balance of `token_index`, all other
/// balances fixed.  Rounds up.
///
/// # Errors
///
/// - [`AmmError::StableInvariantDidntConverge`] after 255 rounds.
/// - Arithmetic errors.
pub fn compute_balance(
    amp: U256,
    balances: &[U256],
    invariant: U256,
    token_index: usize,
) -> Result<U256, AmmError> {
    let n = U256::from(balances.len() as u64);
    let amp_times_total = amp.safe_mul(n)?;

    let first = at(balances, 0)?;
    let mut sum = first;
    let mut p_d = first.safe_mul(n)?;
    for balance in balances.iter().skip(1) {
        p_d = p_d.safe_mul(*balance)?.safe_mul(n)?.safe_div(invariant)?;
        sum = sum.safe_add(*balance)?;
    }
    let balance = at(balances, token_index)?;
    sum = sum.safe_sub(balance)?;

    let inv2 = invariant.safe_mul(invariant)?;
    let c = div_up_raw(
        inv2.safe_mul(AMP_PRECISION)?,
        amp_times_total.safe_mul(p_d)?,
    )?
    .safe_mul(balance)?;
    let b = sum.safe_add(invariant.safe_mul(AMP_PRECISION)?.safe_div(amp_times_total)?)?;

    let mut token_balance = div_up_raw(inv2.safe_add(c)?, invariant.safe_add(b)?)?;

    for _ in 0..MAX_ITERATIONS {
        let previous = token_balance;
        let numerator = token_balance.safe_mul(token_balance)?.safe_add(c)?;
        let denominator = token_balance
            .safe_mul(U256::new(2))?
            .safe_add(b)?
            .safe_sub(invariant)?;
        token_balance = div_up_raw(numerator, denominator)?;

        if converged(token_balance, previous) {
            return Ok(token_balance);
        }
    }

    Err(AmmError::StableInvariantDidntConverge)
}

/// Amount out for an exact amount in, one wei below the exact solution.
///
/// # Errors
///
/// Solver and arithmetic errors; [`AmmError::Underflow`] if the solution
/// would be negative.
pub fn compute_out_given_exact_in(
    amp: U256,
    balances: &[U256],
    index_in: usize,
    index_out: usize,
    amount_in: U256,
    invariant: U256,
) -> Result<U256, AmmError> {
    let mut working = balances.to_vec();
    let Some(balance_in) = working.get_mut(index_in) else {
        return Err(AmmError::InvalidConfiguration("token index out of range"));
    };
    *balance_in = balance_in.safe_add(amount_in)?;

    let final_balance_out = compute_balance(amp, &working, invariant, index_out)?;
    at(&working, index_out)?
        .safe_sub(final_balance_out)?
        .safe_sub(U256::ONE)
}

/// Amount in for an exact amount out, one wei above the exact solution.
///
/// # Errors
///
/// Solver and arithmetic errors; [`AmmError::Underflow`] if `amount_out`
/// exceeds the balance.
pub fn compute_in_given_exact_out(
    amp: U256,
    balances: &[U256],
    index_in: usize,
    index_out: usize,
    amount_out: U256,
    invariant: U256,
) -> Result<U256, AmmError> {
    let mut working = balances.to_vec();
    let Some(balance_out) = working.get_mut(index_out) else {
        return Err(AmmError::InvalidConfiguration("token index out of range"));
    };
    *balance_out = balance_out.safe_sub(amount_out)?;

    let final_balance_in = compute_balance(amp, &working, invariant, index_in)?;
    final_balance_in
        .safe_sub(at(&working, index_in)?)?
        .safe_add(U256::ONE)
}

// ---------------------------------------------------------------------------
// StablePool
// ---------------------------------------------------------------------------

/// A StableSwap pool.
///
/// Created from a [`StableState`] via [`FromConfig`], or directly from an
/// amplification through [`StablePool::new`] (the stable surge hook
/// simulates swaps this way).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StablePool {
    amp: U256,
}

impl StablePool {
    /// Creates a pool with amplification `amp` (including
    /// [`AMP_PRECISION`]).
    #[must_use]
    pub const fn new(amp: U256) -> Self {
        Self { amp }
    }

    /// Amplification parameter, including [`AMP_PRECISION`].
    #[must_use]
    pub const fn amp(&self) -> U256 {
        self.amp
    }
}

impl FromConfig<StableState> for StablePool {
    /// # Errors
    ///
    /// Propagates any error from [`StableState::validate`].
    fn from_config(config: &StableState) -> Result<Self, AmmError> {
        config.validate()?;
        Ok(Self::new(config.amp))
    }
}

impl PoolBase for StablePool {
    fn on_swap(&self, params: &SwapParams) -> Result<U256, AmmError> {
        let balances = &params.balances_live_scaled18;
        let invariant = compute_invariant(self.amp, balances)?;
        match params.swap_kind {
            SwapKind::GivenIn => compute_out_given_exact_in(
                self.amp,
                balances,
                params.index_in,
                params.index_out,
                params.amount_given_scaled18,
                invariant,
            ),
            SwapKind::GivenOut => compute_in_given_exact_out(
                self.amp,
                balances,
                params.index_in,
                params.index_out,
                params.amount_given_scaled18,
                invariant,
            ),
        }
    }

    /// The Newton solution truncates; `Rounding::Up` adds one wei to any
    /// non-zero invariant.
    fn compute_invariant(
        &self,
        balances_live_scaled18: &[U256],
        rounding: Rounding,
    ) -> Result<U256, AmmError> {
        let invariant = compute_invariant(self.amp, balances_live_scaled18)?;
        match rounding {
            Rounding::Up if invariant > U256::ZERO => invariant.safe_add(U256::ONE),
            _ => Ok(invariant),
        }
    }

    fn compute_balance(
        &self,
        balances_live_scaled18: &[U256],
        token_in_index: usize,
        invariant_ratio: U256,
    ) -> Result<U256, AmmError> {
        let invariant = self.compute_invariant(balances_live_scaled18, Rounding::Up)?;
        compute_balance(
            self.amp,
            balances_live_scaled18,
            mul_down(invariant, invariant_ratio)?,
            token_in_index,
        )
    }

    fn get_maximum_invariant_ratio(&self) -> U256 {
        MAX_INVARIANT_RATIO
    }

    fn get_minimum_invariant_ratio(&self) -> U256 {
        MIN_INVARIANT_RATIO
    }

    /// Bounded by the whole output balance, which in the scaled-18 domain
    /// is worth the same amount of either token.
    fn get_max_swap_amount(&self, params: &MaxSwapParams<'_>) -> Result<U256, AmmError> {
        let balance_out = at(params.balances_live_scaled18, params.index_out)?;
        let index = match params.swap_kind {
            SwapKind::GivenIn => params.index_in,
            SwapKind::GivenOut => params.index_out,
        };
        to_raw_undo_rate_round_down(
            balance_out,
            at(params.scaling_factors, index)?,
            at(params.token_rates, index)?,
        )
    }
}
