//! Directional fee hook.
//!
//! Raises the swap fee for trades that push the pair further apart.  The
//! fee is the normalized distance between the two balances after the
//! swap, `(in' - out') / (in' + out')`, and never drops below the static
//! fee.  Trades that rebalance the pair pay the static fee.

use ethnum::U256;

use crate::config::HookState;
use crate::domain::SwapParams;
use crate::error::AmmError;
use crate::math::checked::CheckedArithmetic;
use crate::math::div_down;
use crate::pools::at;
use crate::traits::{HookBase, HookFlags, HookOutcome};

/// Dynamic fee from the post-swap balance distance.
///
/// Needs no parameters; any hook state is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DirectionalFeeHook;

impl HookBase for DirectionalFeeHook {
    fn hook_type(&self) -> &str {
        "DirectionalFee"
    }

    fn flags(&self) -> HookFlags {
        HookFlags {
            should_call_compute_dynamic_swap_fee: true,
            ..HookFlags::NONE
        }
    }

    fn on_compute_dynamic_swap_fee(
        &self,
        params: &SwapParams,
        static_swap_fee: U256,
        _hook_state: &HookState,
    ) -> Result<HookOutcome<U256>, AmmError> {
        let amount = params.amount_given_scaled18;
        let final_in = at(&params.balances_live_scaled18, params.index_in)?.safe_add(amount)?;
        let final_out = at(&params.balances_live_scaled18, params.index_out)?.safe_sub(amount)?;

        let calculated = if final_in > final_out {
            div_down(final_in - final_out, final_in.safe_add(final_out)?)?
        } else {
            U256::ZERO
        };
        Ok(HookOutcome::accept(calculated.max(static_swap_fee)))
    }
}
