//! Hook lifecycle trait.
//!
//! A hook declares through [`HookFlags`] which lifecycle points it wants
//! to observe.  The vault only calls the callbacks whose flag is set; the
//! others keep their identity default.
//!
//! | Flag | Callback | Adjusts |
//! |------|----------|---------|
//! | `should_call_before_swap` | [`HookBase::on_before_swap`] | working balances |
//! | `should_call_compute_dynamic_swap_fee` | [`HookBase::on_compute_dynamic_swap_fee`] | swap fee |
//! | `should_call_after_swap` | [`HookBase::on_after_swap`] | raw calculated amount |
//! | `should_call_before_add_liquidity` | [`HookBase::on_before_add_liquidity`] | working balances |
//! | `should_call_after_add_liquidity` | [`HookBase::on_after_add_liquidity`] | raw amounts in |
//! | `should_call_before_remove_liquidity` | [`HookBase::on_before_remove_liquidity`] | working balances |
//! | `should_call_after_remove_liquidity` | [`HookBase::on_after_remove_liquidity`] | raw amounts out |
//!
//! Every callback returns a [`HookOutcome`].  `success = false` aborts the
//! whole operation with the matching `*HookFailed` error.  Amounts returned
//! by the `after` callbacks only replace the vault's own result when
//! `enable_hook_adjusted_amounts` is set.

use ethnum::U256;

use crate::config::HookState;
use crate::domain::{AddLiquidityKind, RemoveLiquidityKind, SwapKind, SwapParams, TokenAddress};
use crate::error::AmmError;

/// Lifecycle points a hook subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HookFlags {
    /// Call [`HookBase::on_compute_dynamic_swap_fee`] before every swap.
    pub should_call_compute_dynamic_swap_fee: bool,
    /// Call [`HookBase::on_before_swap`].
    pub should_call_before_swap: bool,
    /// Call [`HookBase::on_after_swap`].
    pub should_call_after_swap: bool,
    /// Call [`HookBase::on_before_add_liquidity`].
    pub should_call_before_add_liquidity: bool,
    /// Call [`HookBase::on_after_add_liquidity`].
    pub should_call_after_add_liquidity: bool,
    /// Call [`HookBase::on_before_remove_liquidity`].
    pub should_call_before_remove_liquidity: bool,
    /// Call [`HookBase::on_after_remove_liquidity`].
    pub should_call_after_remove_liquidity: bool,
    /// Apply the amounts returned by the `after` callbacks.
    pub enable_hook_adjusted_amounts: bool,
}

impl HookFlags {
    /// No lifecycle point subscribed.
    pub const NONE: Self = Self {
        should_call_compute_dynamic_swap_fee: false,
        should_call_before_swap: false,
        should_call_after_swap: false,
        should_call_before_add_liquidity: false,
        should_call_after_add_liquidity: false,
        should_call_before_remove_liquidity: false,
        should_call_after_remove_liquidity: false,
        enable_hook_adjusted_amounts: false,
    };
}

/// Result of a hook callback: a success flag plus the adjusted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookOutcome<T> {
    /// `false` aborts the operation.
    pub success: bool,
    /// Adjusted balances, fee or amounts, depending on the callback.
    pub value: T,
}

impl<T> HookOutcome<T> {
    /// Successful outcome carrying `value`.
    #[must_use]
    pub const fn accept(value: T) -> Self {
        Self {
            success: true,
            value,
        }
    }

    /// Failed outcome; `value` is ignored by the vault.
    #[must_use]
    pub const fn reject(value: T) -> Self {
        Self {
            success: false,
            value,
        }
    }
}

/// What the vault reports to [`HookBase::on_after_swap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AfterSwapParams<'a> {
    pub kind: SwapKind,
    pub token_in: &'a TokenAddress,
    pub token_out: &'a TokenAddress,
    pub amount_in_scaled18: U256,
    pub amount_out_scaled18: U256,
    /// Balance of token in after the swap.
    pub token_in_balance_scaled18: U256,
    /// Balance of token out after the swap.
    pub token_out_balance_scaled18: U256,
    pub amount_calculated_scaled18: U256,
    /// Raw calculated amount the vault would return without the hook.
    pub amount_calculated_raw: U256,
}

/// What the vault reports to [`HookBase::on_before_add_liquidity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeforeAddLiquidityParams<'a> {
    pub kind: AddLiquidityKind,
    pub max_amounts_in_scaled18: &'a [U256],
    pub min_bpt_amount_out: U256,
    pub balances_scaled18: &'a [U256],
}

/// What the vault reports to [`HookBase::on_after_add_liquidity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AfterAddLiquidityParams<'a> {
    pub kind: AddLiquidityKind,
    pub amounts_in_scaled18: &'a [U256],
    pub amounts_in_raw: &'a [U256],
    pub bpt_amount_out: U256,
    /// Balances after the add, net of aggregate fees.
    pub balances_scaled18: &'a [U256],
}

/// What the vault reports to [`HookBase::on_before_remove_liquidity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeforeRemoveLiquidityParams<'a> {
    pub kind: RemoveLiquidityKind,
    pub max_bpt_amount_in: U256,
    pub min_amounts_out_scaled18: &'a [U256],
    pub balances_scaled18: &'a [U256],
}

/// What the vault reports to [`HookBase::on_after_remove_liquidity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AfterRemoveLiquidityParams<'a> {
    pub kind: RemoveLiquidityKind,
    pub bpt_amount_in: U256,
    pub amounts_out_scaled18: &'a [U256],
    pub amounts_out_raw: &'a [U256],
    /// Balances after the remove, net of aggregate fees.
    pub balances_scaled18: &'a [U256],
}

/// Pool hook contract.
///
/// Every callback has an identity default, so an implementation only
/// overrides the ones its [`HookFlags`] subscribe to.
///
/// # Errors
///
/// Callbacks return `Err` for arithmetic failures or a hook state of the
/// wrong kind; both abort the vault operation with that error.
pub trait HookBase {
    /// Name the hook is registered under, e.g. `"ExitFee"`.
    fn hook_type(&self) -> &str;

    /// Lifecycle points this hook subscribes to.
    fn flags(&self) -> HookFlags;

    /// Called before pool math runs; may replace the working balances.
    ///
    /// # Errors
    ///
    /// See the trait-level section.
    fn on_before_swap(
        &self,
        params: &SwapParams,
        _hook_state: &HookState,
    ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
        Ok(HookOutcome::accept(params.balances_live_scaled18.clone()))
    }

    /// Called after balances are updated; may replace the raw result.
    ///
    /// # Errors
    ///
    /// See the trait-level section.
    fn on_after_swap(
        &self,
        params: &AfterSwapParams<'_>,
        _hook_state: &HookState,
    ) -> Result<HookOutcome<U256>, AmmError> {
        Ok(HookOutcome::accept(params.amount_calculated_raw))
    }

    /// Returns the swap fee to charge instead of the static one.
    ///
    /// # Errors
    ///
    /// See the trait-level section.
    fn on_compute_dynamic_swap_fee(
        &self,
        _params: &SwapParams,
        static_swap_fee: U256,
        _hook_state: &HookState,
    ) -> Result<HookOutcome<U256>, AmmError> {
        Ok(HookOutcome::accept(static_swap_fee))
    }

    /// Called before an add; may replace the working balances.
    ///
    /// # Errors
    ///
    /// See the trait-level section.
    fn on_before_add_liquidity(
        &self,
        params: &BeforeAddLiquidityParams<'_>,
        _hook_state: &HookState,
    ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
        Ok(HookOutcome::accept(params.balances_scaled18.to_vec()))
    }

    /// Called after an add; may replace the raw amounts in.
    ///
    /// # Errors
    ///
    /// See the trait-level section.
    fn on_after_add_liquidity(
        &self,
        params: &AfterAddLiquidityParams<'_>,
        _hook_state: &HookState,
    ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
        Ok(HookOutcome::accept(params.amounts_in_raw.to_vec()))
    }

    /// Called before a remove; may replace the working balances.
    ///
    /// # Errors
    ///
    /// See the trait-level section.
    fn on_before_remove_liquidity(
        &self,
        params: &BeforeRemoveLiquidityParams<'_>,
        _hook_state: &HookState,
    ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
        Ok(HookOutcome::accept(params.balances_scaled18.to_vec()))
    }

    /// Called after a remove; may replace the raw amounts out.
    ///
    /// # Errors
    ///
    /// See the trait-level section.
    fn on_after_remove_liquidity(
        &self,
        params: &AfterRemoveLiquidityParams<'_>,
        _hook_state: &HookState,
    ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
        Ok(HookOutcome::accept(params.amounts_out_raw.to_vec()))
    }
}
