//! Access rules paired with [`LiquidityBootstrappingPool`](crate::pools::LiquidityBootstrappingPool).
//!
//! Only the sale owner may add liquidity, and nobody may remove it before
//! the sale ends.

use ethnum::U256;
use tracing::debug;

use crate::config::{wrong_state, HookState, LiquidityBootstrappingHookState};
use crate::error::AmmError;
use crate::traits::{
    BeforeAddLiquidityParams, BeforeRemoveLiquidityParams, HookBase, HookFlags, HookOutcome,
};

/// Owner-only adds, post-sale removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LiquidityBootstrappingHook;

impl LiquidityBootstrappingHook {
    fn state(hook_state: &HookState) -> Result<&LiquidityBootstrappingHookState, AmmError> {
        match hook_state {
            HookState::LiquidityBootstrapping(state) => Ok(state),
            _ => Err(wrong_state()),
        }
    }
}

impl HookBase for LiquidityBootstrappingHook {
    fn hook_type(&self) -> &str {
        "LiquidityBootstrapping"
    }

    fn flags(&self) -> HookFlags {
        HookFlags {
            should_call_before_add_liquidity: true,
            should_call_before_remove_liquidity: true,
            ..HookFlags::NONE
        }
    }

    fn on_before_add_liquidity(
        &self,
        params: &BeforeAddLiquidityParams<'_>,
        hook_state: &HookState,
    ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
        let state = Self::state(hook_state)?;
        let balances = params.balances_scaled18.to_vec();
        if state.sender.matches(state.lbp_owner.as_str()) {
            Ok(HookOutcome::accept(balances))
        } else {
            debug!(sender = %state.sender, owner = %state.lbp_owner, "adder is not the sale owner");
            Ok(HookOutcome::reject(balances))
        }
    }

    fn on_before_remove_liquidity(
        &self,
        params: &BeforeRemoveLiquidityParams<'_>,
        hook_state: &HookState,
    ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
        let state = Self::state(hook_state)?;
        let balances = params.balances_scaled18.to_vec();
        if state.current_timestamp < state.end_time {
            debug!(now = %state.current_timestamp, end = %state.end_time, "sale still running");
            return Ok(HookOutcome::reject(balances));
        }
        Ok(HookOutcome::accept(balances))
    }
}
