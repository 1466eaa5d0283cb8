//! Core pool trait: swap, invariant and balance math in the scaled-18
//! domain.
//!
//! [`PoolBase`] is the seam between the vault and every pool family.  The
//! vault handles scaling, fees and hooks; a pool only ever sees scaled-18
//! balances and amounts.
//!
//! # Rounding contract
//!
//! - `on_swap` rounds in favour of the pool: amounts out down, amounts in
//!   up.
//! - `compute_invariant` rounds in the direction requested by the caller.
//!   Base pool math asks for `Down` before a mint and `Up` before a burn,
//!   so the share price never moves against existing holders.
//! - `compute_balance` rounds the returned balance up.
//!
//! # Dispatch Model
//!
//! Built-in pools are dispatched through the closed
//! [`PoolBox`](crate::pools::PoolBox) enum.  Callers can register their
//! own implementations as boxed trait objects on the
//! [`Vault`](crate::vault::Vault).

use ethnum::U256;

use crate::domain::{MaxSingleTokenRemoveParams, MaxSwapParams, Rounding, SwapKind, SwapParams};
use crate::error::AmmError;
use crate::math::WAD;

/// Swap and liquidity math for one pool family.
///
/// # Errors
///
/// Methods that can fail return [`Result<T, AmmError>`].  Common variants:
///
/// - [`AmmError::MaxInRatioExceeded`] / [`AmmError::MaxOutRatioExceeded`]
///   when a trade is too large for the pool.
/// - [`AmmError::Overflow`] / [`AmmError::DivisionByZero`] from the
///   fixed-point primitives.
/// - Pool-specific invariant errors such as
///   [`AmmError::StableInvariantDidntConverge`].
pub trait PoolBase {
    /// Computes the calculated side of a swap.
    ///
    /// For `GivenIn` the result is the amount out, for `GivenOut` the
    /// amount in, both scaled-18 and before fees.
    ///
    /// # Errors
    ///
    /// Returns a typed error rather than a negative or out-of-range
    /// amount.
    fn on_swap(&self, params: &SwapParams) -> Result<U256, AmmError>;

    /// Computes the pool invariant for `balances_live_scaled18`.
    ///
    /// # Errors
    ///
    /// Propagates arithmetic and convergence errors.
    fn compute_invariant(
        &self,
        balances_live_scaled18: &[U256],
        rounding: Rounding,
    ) -> Result<U256, AmmError>;

    /// Computes the balance of `token_in_index` that moves the invariant by
    /// `invariant_ratio`, all other balances fixed.
    ///
    /// # Errors
    ///
    /// Propagates arithmetic and convergence errors.
    fn compute_balance(
        &self,
        balances_live_scaled18: &[U256],
        token_in_index: usize,
        invariant_ratio: U256,
    ) -> Result<U256, AmmError>;

    /// Largest invariant growth allowed by a single liquidity operation.
    #[must_use]
    fn get_maximum_invariant_ratio(&self) -> U256;

    /// Largest invariant shrink allowed by a single liquidity operation.
    #[must_use]
    fn get_minimum_invariant_ratio(&self) -> U256;

    /// Largest raw amount the pool accepts for a swap.
    ///
    /// For `GivenIn` the amount is in units of token in, for `GivenOut` in
    /// units of token out.
    ///
    /// # Errors
    ///
    /// Propagates arithmetic errors from the raw conversion.
    fn get_max_swap_amount(&self, params: &MaxSwapParams<'_>) -> Result<U256, AmmError>;

    /// Largest amount a single-token add may take.  Unbounded unless the
    /// pool restricts liquidity changes.
    #[must_use]
    fn get_max_single_token_add_amount(&self) -> U256 {
        U256::MAX
    }

    /// Largest amount a single-token remove may take.
    ///
    /// The default treats the remove as a swap of BPT (an 18-decimal
    /// token with balance `total_supply` and rate one) for the token out.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`PoolBase::get_max_swap_amount`].
    fn get_max_single_token_remove_amount(
        &self,
        params: &MaxSingleTokenRemoveParams,
    ) -> Result<U256, AmmError> {
        let balances = [params.total_supply, params.token_out_balance];
        let rates = [WAD, params.token_out_rate];
        let scaling_factors = [U256::ONE, params.token_out_scaling_factor];
        self.get_max_swap_amount(&MaxSwapParams {
            swap_kind: if params.is_exact_in {
                SwapKind::GivenIn
            } else {
                SwapKind::GivenOut
            },
            balances_live_scaled18: &balances,
            token_rates: &rates,
            scaling_factors: &scaling_factors,
            index_in: 0,
            index_out: 1,
        })
    }
}
