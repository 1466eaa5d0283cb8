//! Remove liquidity orchestration.

use ethnum::U256;
use tracing::trace;

use super::base_pool_math::{
    compute_proportional_amounts_out, compute_remove_liquidity_single_token_exact_in,
    compute_remove_liquidity_single_token_exact_out,
};
use super::{aggregate_fees, apply_to_balances, flags_of, require_unbalanced_liquidity, unscale_all, Vault};
use crate::config::{HookState, PoolState};
use crate::domain::{RemoveLiquidityInput, RemoveLiquidityKind, RemoveLiquidityResult};
use crate::error::AmmError;
use crate::math::checked::CheckedArithmetic;
use crate::math::scaling::copy_to_scaled18_apply_rate_round_up;
use crate::math::{get_single_input_index, to_raw_undo_rate_round_down};
use crate::pools::at;
use crate::traits::{AfterRemoveLiquidityParams, BeforeRemoveLiquidityParams};

impl Vault {
    /// Quotes a remove-liquidity request.
    ///
    /// Minimum amounts are scaled rounding up and amounts out are paid in
    /// raw units rounding down.
    ///
    /// # Errors
    ///
    /// - [`AmmError::DoesNotSupportUnbalancedLiquidity`] for a single-token
    ///   remove on a proportional-only pool.
    /// - [`AmmError::MultipleNonZeroInputs`] / [`AmmError::AllZeroInputs`]
    ///   for a malformed single-token request.
    /// - [`AmmError::InvariantRatioBelowMin`] from the base pool math.
    /// - [`AmmError::BeforeRemoveLiquidityHookFailed`] /
    ///   [`AmmError::AfterRemoveLiquidityHookFailed`].
    pub fn remove_liquidity(
        &self,
        input: &RemoveLiquidityInput,
        state: &PoolState,
        hook_state: Option<&HookState>,
    ) -> Result<RemoveLiquidityResult, AmmError> {
        let pool = self.resolve_pool(state)?;
        let hook = self.resolve_hook(state, hook_state)?;
        let flags = flags_of(hook.as_ref());
        let base = state.base();

        let min_amounts_out_scaled18 = copy_to_scaled18_apply_rate_round_up(
            &input.min_amounts_out_raw,
            &base.scaling_factors,
            &base.token_rates,
        )?;
        let mut balances = base.balances_live_scaled18.clone();

        if let Some(hook) = hook
            .as_ref()
            .filter(|_| flags.should_call_before_remove_liquidity)
        {
            let params = BeforeRemoveLiquidityParams {
                kind: input.kind,
                max_bpt_amount_in: input.max_bpt_amount_in_raw,
                min_amounts_out_scaled18: &min_amounts_out_scaled18,
                balances_scaled18: &balances,
            };
            let outcome = hook.get().on_before_remove_liquidity(&params, hook.state)?;
            if !outcome.success || outcome.value.len() != balances.len() {
                return Err(hook.failure(|pool_type, hook_type| {
                    AmmError::BeforeRemoveLiquidityHookFailed {
                        pool_type,
                        hook_type,
                    }
                }));
            }
            balances = outcome.value;
        }

        let math = pool.math();
        let (bpt_amount_in, amounts_out_scaled18, swap_fee_amounts) = match input.kind {
            RemoveLiquidityKind::Proportional => {
                let bpt_amount_in = input.max_bpt_amount_in_raw;
                let amounts_out =
                    compute_proportional_amounts_out(&balances, base.total_supply, bpt_amount_in)?;
                (bpt_amount_in, amounts_out, vec![U256::ZERO; balances.len()])
            }
            RemoveLiquidityKind::SingleTokenExactIn => {
                require_unbalanced_liquidity(base)?;
                let token_out_index = get_single_input_index(&input.min_amounts_out_raw)?;
                let bpt_amount_in = input.max_bpt_amount_in_raw;
                let computed = compute_remove_liquidity_single_token_exact_in(
                    &balances,
                    token_out_index,
                    bpt_amount_in,
                    base.total_supply,
                    base.swap_fee,
                    math.get_minimum_invariant_ratio(),
                    math,
                )?;
                let mut amounts_out = min_amounts_out_scaled18;
                if let Some(slot) = amounts_out.get_mut(token_out_index) {
                    *slot = computed.amount_out_with_fee;
                }
                (bpt_amount_in, amounts_out, computed.swap_fee_amounts)
            }
            RemoveLiquidityKind::SingleTokenExactOut => {
                require_unbalanced_liquidity(base)?;
                let token_out_index = get_single_input_index(&input.min_amounts_out_raw)?;
                let computed = compute_remove_liquidity_single_token_exact_out(
                    &balances,
                    token_out_index,
                    at(&min_amounts_out_scaled18, token_out_index)?,
                    base.total_supply,
                    base.swap_fee,
                    math.get_minimum_invariant_ratio(),
                    math,
                )?;
                (
                    computed.bpt_amount_in,
                    min_amounts_out_scaled18,
                    computed.swap_fee_amounts,
                )
            }
        };

        let mut amounts_out_raw =
            unscale_all(&amounts_out_scaled18, base, to_raw_undo_rate_round_down)?;
        let aggregate = aggregate_fees(&swap_fee_amounts, base)?;
        apply_to_balances(&mut balances, &amounts_out_scaled18, U256::safe_sub)?;
        apply_to_balances(&mut balances, &aggregate, U256::safe_sub)?;
        trace!(%bpt_amount_in, ?amounts_out_raw, ?swap_fee_amounts, "remove liquidity computed");

        if let Some(hook) = hook
            .as_ref()
            .filter(|_| flags.should_call_after_remove_liquidity)
        {
            let params = AfterRemoveLiquidityParams {
                kind: input.kind,
                bpt_amount_in,
                amounts_out_scaled18: &amounts_out_scaled18,
                amounts_out_raw: &amounts_out_raw,
                balances_scaled18: &balances,
            };
            let outcome = hook.get().on_after_remove_liquidity(&params, hook.state)?;
            if !outcome.success || outcome.value.len() != amounts_out_raw.len() {
                return Err(hook.failure(|pool_type, hook_type| {
                    AmmError::AfterRemoveLiquidityHookFailed {
                        pool_type,
                        hook_type,
                    }
                }));
            }
            if flags.enable_hook_adjusted_amounts {
                amounts_out_raw = outcome.value;
            }
        }

        Ok(RemoveLiquidityResult {
            bpt_amount_in_raw: bpt_amount_in,
            amounts_out_raw,
        })
    }
}
