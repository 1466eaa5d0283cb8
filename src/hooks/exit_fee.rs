//! Exit fee hook.
//!
//! Charges a fixed percentage on every token leaving the pool through a
//! proportional remove.  The fee stays in the pool, so the caller simply
//! receives less.  Any other remove kind is refused.

use ethnum::U256;

use crate::config::{wrong_state, HookState};
use crate::domain::RemoveLiquidityKind;
use crate::error::AmmError;
use crate::math::mul_down;
use crate::traits::{AfterRemoveLiquidityParams, HookBase, HookFlags, HookOutcome};

/// Deducts `remove_liquidity_hook_fee_percentage` from proportional
/// removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExitFeeHook;

impl HookBase for ExitFeeHook {
    fn hook_type(&self) -> &str {
        "ExitFee"
    }

    fn flags(&self) -> HookFlags {
        HookFlags {
            should_call_after_remove_liquidity: true,
            enable_hook_adjusted_amounts: true,
            ..HookFlags::NONE
        }
    }

    fn on_after_remove_liquidity(
        &self,
        params: &AfterRemoveLiquidityParams<'_>,
        hook_state: &HookState,
    ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
        let HookState::ExitFee(state) = hook_state else {
            return Err(wrong_state());
        };
        if params.kind != RemoveLiquidityKind::Proportional {
            return Ok(HookOutcome::reject(params.amounts_out_raw.to_vec()));
        }

        let pct = state.remove_liquidity_hook_fee_percentage;
        if pct == U256::ZERO {
            return Ok(HookOutcome::accept(params.amounts_out_raw.to_vec()));
        }
        let adjusted = params
            .amounts_out_raw
            .iter()
            .map(|amount| Ok(*amount - mul_down(*amount, pct)?))
            .collect::<Result<Vec<_>, AmmError>>()?;
        Ok(HookOutcome::accept(adjusted))
    }
}
