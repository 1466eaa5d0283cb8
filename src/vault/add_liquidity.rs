//! Add liquidity orchestration.

use ethnum::U256;
use tracing::trace;

use super::base_pool_math::{
    compute_add_liquidity_single_token_exact_out, compute_add_liquidity_unbalanced,
};
use super::{aggregate_fees, apply_to_balances, flags_of, require_unbalanced_liquidity, unscale_all, Vault};
use crate::config::{HookState, PoolState};
use crate::domain::{AddLiquidityInput, AddLiquidityKind, AddLiquidityResult};
use crate::error::AmmError;
use crate::math::checked::CheckedArithmetic;
use crate::math::scaling::copy_to_scaled18_apply_rate_round_down;
use crate::math::{get_single_input_index, to_raw_undo_rate_round_up};
use crate::traits::{AfterAddLiquidityParams, BeforeAddLiquidityParams};

impl Vault {
    /// Quotes an add-liquidity request.
    ///
    /// Token amounts are scaled rounding down and paid back in raw units
    /// rounding up, so the pool never credits more than it receives.
    ///
    /// # Errors
    ///
    /// - [`AmmError::DoesNotSupportUnbalancedLiquidity`] on a
    ///   proportional-only pool.
    /// - [`AmmError::MultipleNonZeroInputs`] / [`AmmError::AllZeroInputs`]
    ///   for a malformed single-token request.
    /// - [`AmmError::InvariantRatioAboveMax`] from the base pool math.
    /// - [`AmmError::BeforeAddLiquidityHookFailed`] /
    ///   [`AmmError::AfterAddLiquidityHookFailed`].
    pub fn add_liquidity(
        &self,
        input: &AddLiquidityInput,
        state: &PoolState,
        hook_state: Option<&HookState>,
    ) -> Result<AddLiquidityResult, AmmError> {
        let pool = self.resolve_pool(state)?;
        let hook = self.resolve_hook(state, hook_state)?;
        let flags = flags_of(hook.as_ref());
        let base = state.base();

        let max_amounts_in_scaled18 = copy_to_scaled18_apply_rate_round_down(
            &input.max_amounts_in_raw,
            &base.scaling_factors,
            &base.token_rates,
        )?;
        let mut balances = base.balances_live_scaled18.clone();

        if let Some(hook) = hook
            .as_ref()
            .filter(|_| flags.should_call_before_add_liquidity)
        {
            let params = BeforeAddLiquidityParams {
                kind: input.kind,
                max_amounts_in_scaled18: &max_amounts_in_scaled18,
                min_bpt_amount_out: input.min_bpt_amount_out_raw,
                balances_scaled18: &balances,
            };
            let outcome = hook.get().on_before_add_liquidity(&params, hook.state)?;
            if !outcome.success || outcome.value.len() != balances.len() {
                return Err(hook.failure(|pool_type, hook_type| {
                    AmmError::BeforeAddLiquidityHookFailed {
                        pool_type,
                        hook_type,
                    }
                }));
            }
            balances = outcome.value;
        }

        let math = pool.math();
        let (bpt_amount_out, amounts_in_scaled18, swap_fee_amounts) = match input.kind {
            AddLiquidityKind::Unbalanced => {
                require_unbalanced_liquidity(base)?;
                let computed = compute_add_liquidity_unbalanced(
                    &balances,
                    &max_amounts_in_scaled18,
                    base.total_supply,
                    base.swap_fee,
                    math.get_maximum_invariant_ratio(),
                    math,
                )?;
                (
                    computed.bpt_amount_out,
                    max_amounts_in_scaled18,
                    computed.swap_fee_amounts,
                )
            }
            AddLiquidityKind::SingleTokenExactOut => {
                require_unbalanced_liquidity(base)?;
                let token_in_index = get_single_input_index(&max_amounts_in_scaled18)?;
                let bpt_amount_out = input.min_bpt_amount_out_raw;
                let computed = compute_add_liquidity_single_token_exact_out(
                    &balances,
                    token_in_index,
                    bpt_amount_out,
                    base.total_supply,
                    base.swap_fee,
                    math.get_maximum_invariant_ratio(),
                    math,
                )?;
                let mut amounts_in = vec![U256::ZERO; balances.len()];
                if let Some(slot) = amounts_in.get_mut(token_in_index) {
                    *slot = computed.amount_in_with_fee;
                }
                (bpt_amount_out, amounts_in, computed.swap_fee_amounts)
            }
        };

        let mut amounts_in_raw = unscale_all(&amounts_in_scaled18, base, to_raw_undo_rate_round_up)?;
        let aggregate = aggregate_fees(&swap_fee_amounts, base)?;
        apply_to_balances(&mut balances, &amounts_in_scaled18, U256::safe_add)?;
        apply_to_balances(&mut balances, &aggregate, U256::safe_sub)?;
        trace!(%bpt_amount_out, ?amounts_in_raw, ?swap_fee_amounts, "add liquidity computed");

        if let Some(hook) = hook
            .as_ref()
            .filter(|_| flags.should_call_after_add_liquidity)
        {
            let params = AfterAddLiquidityParams {
                kind: input.kind,
                amounts_in_scaled18: &amounts_in_scaled18,
                amounts_in_raw: &amounts_in_raw,
                bpt_amount_out,
                balances_scaled18: &balances,
            };
            let outcome = hook.get().on_after_add_liquidity(&params, hook.state)?;
            if !outcome.success || outcome.value.len() != amounts_in_raw.len() {
                return Err(hook.failure(|pool_type, hook_type| {
                    AmmError::AfterAddLiquidityHookFailed {
                        pool_type,
                        hook_type,
                    }
                }));
            }
            if flags.enable_hook_adjusted_amounts {
                amounts_in_raw = outcome.value;
            }
        }

        Ok(AddLiquidityResult {
            bpt_amount_out_raw: bpt_amount_out,
            amounts_in_raw,
        })
    }
}
