//! Built-in pool hooks.
//!
//! | Hook | Subscribes to | Effect |
//! |------|---------------|--------|
//! | [`DefaultHook`] | nothing | none |
//! | [`ExitFeeHook`] | after remove | percentage fee on proportional exits |
//! | [`DirectionalFeeHook`] | dynamic fee | fee grows with post-swap distance |
//! | [`StableSurgeHook`] | dynamic fee, after add/remove | surge fee, blocks imbalancing liquidity |
//! | [`AkronHook`] | dynamic fee | loss-versus-rebalancing fee |
//! | [`LiquidityBootstrappingHook`] | before add/remove | owner-only adds, post-sale removes |
//!
//! Hooks are stateless; their parameters arrive with every call as a
//! [`HookState`].  Hooks defined outside the crate go
//! through [`HookRegistry`](crate::factory::HookRegistry).

mod akron;
mod default;
mod directional_fee;
mod exit_fee;
mod liquidity_bootstrapping;
#[cfg(feature = "stable")]
mod stable_surge;

use ethnum::U256;

pub use akron::{fee_percentage_given_exact_in, fee_percentage_given_exact_out, AkronHook};
pub use default::DefaultHook;
pub use directional_fee::DirectionalFeeHook;
pub use exit_fee::ExitFeeHook;
pub use liquidity_bootstrapping::LiquidityBootstrappingHook;
#[cfg(feature = "stable")]
pub use stable_surge::{calculate_imbalance, surge_fee_percentage, StableSurgeHook};

use crate::config::HookState;
use crate::domain::SwapParams;
use crate::error::AmmError;
use crate::traits::{
    AfterAddLiquidityParams, AfterRemoveLiquidityParams, AfterSwapParams,
    BeforeAddLiquidityParams, BeforeRemoveLiquidityParams, HookBase, HookFlags, HookOutcome,
};

/// Dispatch enum over the built-in hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HookBox {
    #[default]
    Default,
    ExitFee,
    DirectionalFee,
    #[cfg(feature = "stable")]
    StableSurge,
    Akron,
    LiquidityBootstrapping,
}

impl HookBox {
    /// Built-in hook registered under `hook_type`, if any.
    #[must_use]
    pub fn from_hook_type(hook_type: &str) -> Option<Self> {
        match hook_type {
            "ExitFee" => Some(Self::ExitFee),
            "DirectionalFee" => Some(Self::DirectionalFee),
            #[cfg(feature = "stable")]
            "StableSurge" => Some(Self::StableSurge),
            "Akron" => Some(Self::Akron),
            "LiquidityBootstrapping" => Some(Self::LiquidityBootstrapping),
            _ => None,
        }
    }
}

macro_rules! delegate {
    ($self:ident, $method:ident ( $($arg:expr),* )) => {
        match $self {
            HookBox::Default => DefaultHook.$method($($arg),*),
            HookBox::ExitFee => ExitFeeHook.$method($($arg),*),
            HookBox::DirectionalFee => DirectionalFeeHook.$method($($arg),*),
            #[cfg(feature = "stable")]
            HookBox::StableSurge => StableSurgeHook.$method($($arg),*),
            HookBox::Akron => AkronHook.$method($($arg),*),
            HookBox::LiquidityBootstrapping => LiquidityBootstrappingHook.$method($($arg),*),
        }
    };
}

impl HookBase for HookBox {
    fn hook_type(&self) -> &str {
        match self {
            Self::Default => "Default",
            Self::ExitFee => "ExitFee",
            Self::DirectionalFee => "DirectionalFee",
            #[cfg(feature = "stable")]
            Self::StableSurge => "StableSurge",
            Self::Akron => "Akron",
            Self::LiquidityBootstrapping => "LiquidityBootstrapping",
        }
    }

    fn flags(&self) -> HookFlags {
        delegate!(self, flags())
    }

    fn on_before_swap(
        &self,
        params: &SwapParams,
        hook_state: &HookState,
    ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
        delegate!(self, on_before_swap(params, hook_state))
    }

    fn on_after_swap(
        &self,
        params: &AfterSwapParams<'_>,
        hook_state: &HookState,
    ) -> Result<HookOutcome<U256>, AmmError> {
        delegate!(self, on_after_swap(params, hook_state))
    }

    fn on_compute_dynamic_swap_fee(
        &self,
        params: &SwapParams,
        static_swap_fee: U256,
        hook_state: &HookState,
    ) -> Result<HookOutcome<U256>, AmmError> {
        delegate!(self, on_compute_dynamic_swap_fee(params, static_swap_fee, hook_state))
    }

    fn on_before_add_liquidity(
        &self,
        params: &BeforeAddLiquidityParams<'_>,
        hook_state: &HookState,
    ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
        delegate!(self, on_before_add_liquidity(params, hook_state))
    }

    fn on_after_add_liquidity(
        &self,
        params: &AfterAddLiquidityParams<'_>,
        hook_state: &HookState,
    ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
        delegate!(self, on_after_add_liquidity(params, hook_state))
    }

    fn on_before_remove_liquidity(
        &self,
        params: &BeforeRemoveLiquidityParams<'_>,
        hook_state: &HookState,
    ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
        delegate!(self, on_before_remove_liquidity(params, hook_state))
    }

    fn on_after_remove_liquidity(
        &self,
        params: &AfterRemoveLiquidityParams<'_>,
        hook_state: &HookState,
    ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
        delegate!(self, on_after_remove_liquidity(params, hook_state))
    }
}
