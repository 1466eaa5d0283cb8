//! Weighted pool implementation (Balancer style).
//!
//! Supports 2 to 8 tokens with arbitrary normalized weights (80/20,
//! 50/50, 33/33/34, ...).
//!
//! # Invariant
//!
//! ```text
//! V = ∏ Bᵢ ^ Wᵢ
//! ```
//!
//! # Swap Formulas
//!
//! ```text
//! out = Bo · (1 − (Bi / (Bi + in)) ^ (Wi / Wo))      GivenIn
//! in  = Bi · ((Bo / (Bo − out)) ^ (Wo / Wi) − 1)     GivenOut
//! ```
//!
//! Every step rounds against the trader: the base and exponent of the
//! power are chosen so the result is an under-estimate of `out` and an
//! over-estimate of `in`.
//!
//! # Limits
//!
//! | Limit | Value |
//! |-------|-------|
//! | Max in / out ratio | 30% of the balance |
//! | Invariant ratio | `[0.7, 3.0]` |
//! | Min weight | 1% |

use ethnum::U256;

use super::at;
use crate::config::WeightedState;
use crate::domain::{MaxSwapParams, Rounding, SwapKind, SwapParams};
use crate::error::AmmError;
use crate::math::checked::CheckedArithmetic;
use crate::math::fixed_point::{pow_down_versioned, pow_up_versioned};
use crate::math::{complement, div_down, div_up, mul_down, mul_up, to_raw_undo_rate_round_down, WAD};
use crate::traits::{FromConfig, PoolBase};

/// Largest swap input as a fraction of the input balance.
pub const MAX_IN_RATIO: U256 = U256::new(300_000_000_000_000_000);
/// Largest swap output as a fraction of the output balance.
pub const MAX_OUT_RATIO: U256 = U256::new(300_000_000_000_000_000);
/// Largest invariant growth of a single liquidity operation.
pub const MAX_INVARIANT_RATIO: U256 = U256::new(3_000_000_000_000_000_000);
/// Largest invariant shrink of a single liquidity operation.
pub const MIN_INVARIANT_RATIO: U256 = U256::new(700_000_000_000_000_000);

// ---------------------------------------------------------------------------
// Weighted math
// ---------------------------------------------------------------------------

/// `∏ Bᵢ ^ Wᵢ` with every factor rounded in `rounding`'s direction.
///
/// # Errors
///
/// - [`AmmError::ZeroInvariant`] if the product rounds to zero.
/// - [`AmmError::InvalidConfiguration`] if the arrays differ in length.
/// - Power and multiplication errors.
pub fn compute_invariant(
    normalized_weights: &[U256],
    balances: &[U256],
    rounding: Rounding,
    version: u32,
) -> Result<U256, AmmError> {
    if normalized_weights.len() != balances.len() {
        return Err(AmmError::InvalidConfiguration(
            "weights and balances must have equal length",
        ));
    }
    let mut invariant = WAD;
    for (balance, weight) in balances.iter().zip(normalized_weights) {
        invariant = match rounding {
            Rounding::Down => mul_down(invariant, pow_down_versioned(*balance, *weight, version)?)?,
            Rounding::Up => mul_up(invariant, pow_up_versioned(*balance, *weight, version)?)?,
        };
    }
    if invariant == U256::ZERO {
        return Err(AmmError::ZeroInvariant);
    }
    Ok(invariant)
}

/// Amount out for an exact amount in.
///
/// # Errors
///
/// - [`AmmError::MaxInRatioExceeded`] if `amount_in` is above 30% of
///   `balance_in`.
/// - Arithmetic errors.
pub fn compute_out_given_exact_in(
    balance_in: U256,
    weight_in: U256,
    balance_out: U256,
    weight_out: U256,
    amount_in: U256,
    version: u32,
) -> Result<U256, AmmError> {
    if amount_in > mul_down(balance_in, MAX_IN_RATIO)? {
        return Err(AmmError::MaxInRatioExceeded);
    }
    let denominator = balance_in.safe_add(amount_in)?;
    let base = div_up(balance_in, denominator)?;
    let exponent = div_down(weight_in, weight_out)?;
    let power = pow_up_versioned(base, exponent, version)?;
    mul_down(balance_out, complement(power))
}

/// Amount in for an exact amount out.
///
/// # Errors
///
/// - [`AmmError::MaxOutRatioExceeded`] if `amount_out` is above 30% of
///   `balance_out`.
/// - Arithmetic errors.
pub fn compute_in_given_exact_out(
    balance_in: U256,
    weight_in: U256,
    balance_out: U256,
    weight_out: U256,
    amount_out: U256,
    version: u32,
) -> Result<U256, AmmError> {
    if amount_out > mul_down(balance_out, MAX_OUT_RATIO)? {
        return Err(AmmError::MaxOutRatioExceeded);
    }
    let base = div_up(balance_out, balance_out.safe_sub(amount_out)?)?;
    let exponent = div_up(weight_out, weight_in)?;
    let power = pow_up_versioned(base, exponent, version)?;
    mul_up(balance_in, power.safe_sub(WAD)?)
}

/// Balance of a token that moves the invariant by `invariant_ratio`.
///
/// ```text
/// B' = B · ratio ^ (1 / W)
/// ```
///
/// # Errors
///
/// Arithmetic and power errors.
pub fn compute_balance_out_given_invariant(
    current_balance: U256,
    weight: U256,
    invariant_ratio: U256,
    version: u32,
) -> Result<U256, AmmError> {
    let balance_ratio = pow_up_versioned(invariant_ratio, div_up(WAD, weight)?, version)?;
    mul_up(current_balance, balance_ratio)
}

/// Max swap amount shared by weighted-style pools: `ratio` of the limiting
/// balance, converted back to raw units of that token.
pub(crate) fn max_swap_amount_by_ratio(
    params: &MaxSwapParams<'_>,
    ratio: U256,
) -> Result<U256, AmmError> {
    let index = match params.swap_kind {
        SwapKind::GivenIn => params.index_in,
        SwapKind::GivenOut => params.index_out,
    };
    let max_scaled18 = mul_down(at(params.balances_live_scaled18, index)?, ratio)?;
    to_raw_undo_rate_round_down(
        max_scaled18,
        at(params.scaling_factors, index)?,
        at(params.token_rates, index)?,
    )
}

// ---------------------------------------------------------------------------
// WeightedPool
// ---------------------------------------------------------------------------

/// A Balancer weighted pool.
///
/// Created from a [`WeightedState`] via [`FromConfig`].  Holds only the
/// normalized weights and the math release; balances arrive per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedPool {
    normalized_weights: Vec<U256>,
    version: u32,
}

impl WeightedPool {
    /// Normalized weights, in token order.
    #[must_use]
    pub fn normalized_weights(&self) -> &[U256] {
        &self.normalized_weights
    }

    /// Pool math release.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }
}

impl FromConfig<WeightedState> for WeightedPool {
    /// # Errors
    ///
    /// Propagates any error from [`WeightedState::validate`].
    fn from_config(config: &WeightedState) -> Result<Self, AmmError> {
        config.validate()?;
        Ok(Self {
            normalized_weights: config.weights.clone(),
            version: config.version,
        })
    }
}

impl PoolBase for WeightedPool {
    fn on_swap(&self, params: &SwapParams) -> Result<U256, AmmError> {
        let balances = &params.balances_live_scaled18;
        let balance_in = at(balances, params.index_in)?;
        let balance_out = at(balances, params.index_out)?;
        let weight_in = at(&self.normalized_weights, params.index_in)?;
        let weight_out = at(&self.normalized_weights, params.index_out)?;
        match params.swap_kind {
            SwapKind::GivenIn => compute_out_given_exact_in(
                balance_in,
                weight_in,
                balance_out,
                weight_out,
                params.amount_given_scaled18,
                self.version,
            ),
            SwapKind::GivenOut => compute_in_given_exact_out(
                balance_in,
                weight_in,
                balance_out,
                weight_out,
                params.amount_given_scaled18,
                self.version,
            ),
        }
    }

    fn compute_invariant(
        &self,
        balances_live_scaled18: &[U256],
        rounding: Rounding,
    ) -> Result<U256, AmmError> {
        compute_invariant(
            &self.normalized_weights,
            balances_live_scaled18,
            rounding,
            self.version,
        )
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
            self.version,
        )
    }

    fn get_maximum_invariant_ratio(&self) -> U256 {
        MAX_INVARIANT_RATIO
    }

    fn get_minimum_invariant_ratio(&self) -> U256 {
        MIN_INVARIANT_RATIO
    }

    fn get_max_swap_amount(&self, params: &MaxSwapParams<'_>) -> Result<U256, AmmError> {
        let ratio = match params.swap_kind {
            SwapKind::GivenIn => MAX_IN_RATIO,
            SwapKind::GivenOut => MAX_OUT_RATIO,
        };
        max_swap_amount_by_ratio(params, ratio)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::config::pool_state::tests::base;
    use crate::domain::MaxSingleTokenRemoveParams;

    // -- helpers --------------------------------------------------------------

    const W60: U256 = U256::new(600_000_000_000_000_000);
    const W40: U256 = U256::new(400_000_000_000_000_000);
    const W50: U256 = U256::new(500_000_000_000_000_000);

    fn pool(weights: Vec<U256>) -> WeightedPool {
        let state = WeightedState {
            base: base(weights.len()),
            weights,
            version: 0,
        };
        let Ok(pool) = WeightedPool::from_config(&state) else {
            panic!("valid weighted state");
        };
        pool
    }

    fn swap(kind: SwapKind, amount: U256, balances: Vec<U256>) -> SwapParams {
        SwapParams {
            swap_kind: kind,
            amount_given_scaled18: amount,
            balances_live_scaled18: balances,
            index_in: 0,
            index_out: 1,
        }
    }

    // -- construction ---------------------------------------------------------

    #[test]
    fn invalid_weights_rejected() {
        let state = WeightedState {
            base: base(2),
            weights: vec![W60, W60],
            version: 0,
        };
        assert!(WeightedPool::from_config(&state).is_err());
    }

    // -- invariant ------------------------------------------------------------

    #[test]
    fn equal_weights_invariant_is_geometric_mean() {
        let p = pool(vec![W50, W50]);
        let balances = [WAD * 100, WAD * 100];
        let Ok(down) = p.compute_invariant(&balances, Rounding::Down) else {
            panic!("expected invariant");
        };
        let Ok(up) = p.compute_invariant(&balances, Rounding::Up) else {
            panic!("expected invariant");
        };
        assert!(down <= up);
        let target = WAD * 100;
        assert!(target - down < U256::new(100_000_000));
        assert!(up - target < U256::new(100_000_000));
    }

    #[test]
    fn zero_balance_gives_zero_invariant_error() {
        let p = pool(vec![W50, W50]);
        let result = p.compute_invariant(&[U256::ZERO, WAD], Rounding::Down);
        assert_eq!(result, Err(AmmError::ZeroInvariant));
    }

    // -- swaps ----------------------------------------------------------------

    #[test]
    fn given_in_then_given_out_never_profits() {
        let p = pool(vec![W60, W40]);
        let balances = vec![WAD * 60, WAD * 40];
        let amount_in = WAD;
        let Ok(out) = p.on_swap(&swap(SwapKind::GivenIn, amount_in, balances.clone())) else {
            panic!("expected amount out");
        };
        assert!(out > U256::ZERO);
        let Ok(back_in) = p.on_swap(&swap(SwapKind::GivenOut, out, balances)) else {
            panic!("expected amount in");
        };
        assert!(back_in >= amount_in);
    }

    #[test]
    fn max_in_ratio_enforced() {
        let p = pool(vec![W50, W50]);
        let balances = vec![WAD * 100, WAD * 100];
        let at_limit = p.on_swap(&swap(SwapKind::GivenIn, WAD * 30, balances.clone()));
        assert!(at_limit.is_ok());
        let over = p.on_swap(&swap(SwapKind::GivenIn, WAD * 30 + 1, balances));
        assert_eq!(over, Err(AmmError::MaxInRatioExceeded));
    }

    #[test]
    fn max_out_ratio_enforced() {
        let p = pool(vec![W50, W50]);
        let over = p.on_swap(&swap(
            SwapKind::GivenOut,
            WAD * 30 + 1,
            vec![WAD * 100, WAD * 100],
        ));
        assert_eq!(over, Err(AmmError::MaxOutRatioExceeded));
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let p = pool(vec![W50, W50]);
        let mut params = swap(SwapKind::GivenIn, WAD, vec![WAD * 100, WAD * 100]);
        params.index_out = 5;
        assert!(matches!(
            p.on_swap(&params),
            Err(AmmError::InvalidConfiguration(_))
        ));
    }

    // -- compute_balance ------------------------------------------------------

    #[test]
    fn compute_balance_identity_ratio_keeps_balance() {
        let p = pool(vec![W50, W50]);
        let Ok(balance) = p.compute_balance(&[WAD * 100, WAD * 100], 0, WAD) else {
            panic!("expected balance");
        };
        assert_eq!(balance, WAD * 100);
    }

    #[test]
    fn compute_balance_doubles_with_equal_weights() {
        let p = pool(vec![W50, W50]);
        let Ok(balance) = p.compute_balance(&[WAD * 100, WAD * 100], 1, WAD * 2) else {
            panic!("expected balance");
        };
        // ratio ^ 2 with the exact fast path
        assert_eq!(balance, WAD * 400);
    }

    // -- max amounts ----------------------------------------------------------

    #[test]
    fn max_swap_amount_sixty_forty() {
        let p = pool(vec![W60, W40]);
        let balances = [WAD * 60, WAD * 40];
        let rates = [WAD, WAD];
        let scaling_factors = [U256::ONE, U256::new(1_000_000_000_000)];
        let mut params = MaxSwapParams {
            swap_kind: SwapKind::GivenIn,
            balances_live_scaled18: &balances,
            token_rates: &rates,
            scaling_factors: &scaling_factors,
            index_in: 0,
            index_out: 1,
        };
        assert_eq!(
            p.get_max_swap_amount(&params),
            Ok(U256::new(18_000_000_000_000_000_000))
        );
        params.swap_kind = SwapKind::GivenOut;
        assert_eq!(p.get_max_swap_amount(&params), Ok(U256::new(12_000_000)));
    }

    #[test]
    fn max_single_token_amounts() {
        let p = pool(vec![W50, W50]);
        assert_eq!(p.get_max_single_token_add_amount(), U256::MAX);
        let Ok(max) = p.get_max_single_token_remove_amount(&MaxSingleTokenRemoveParams {
            is_exact_in: false,
            total_supply: WAD * 100,
            token_out_balance: WAD * 50,
            token_out_scaling_factor: U256::ONE,
            token_out_rate: WAD,
        }) else {
            panic!("expected max remove");
        };
        assert_eq!(max, WAD * 15);
    }

    #[test]
    fn version_one_skips_fast_paths() {
        let balances = [WAD * 100, WAD * 100];
        let Ok(fast) = compute_invariant(&[WAD, WAD], &balances, Rounding::Down, 0) else {
            panic!("expected invariant");
        };
        let Ok(slow) = compute_invariant(&[WAD, WAD], &balances, Rounding::Down, 1) else {
            panic!("expected invariant");
        };
        assert_eq!(fast, WAD * 10_000);
        assert!(slow < fast);
    }
}
