//! Enum dispatch wrapper for the built-in pool families.
//!
//! [`PoolBox`] wraps every concrete pool implementation behind a single
//! enum, enabling static dispatch from the vault.  Each variant is
//! feature-gated to match its pool type.

use ethnum::U256;

#[cfg(feature = "gyro")]
use super::gyro_2clp::Gyro2ClpPool;
#[cfg(feature = "gyro")]
use super::gyro_eclp::GyroEclpPool;
#[cfg(feature = "liquidity-bootstrapping")]
use super::liquidity_bootstrapping::LiquidityBootstrappingPool;
#[cfg(feature = "quantamm")]
use super::quantamm::QuantAmmPool;
#[cfg(feature = "reclamm")]
use super::reclamm::ReClammPool;
#[cfg(feature = "reclamm")]
use super::reclamm_v2::ReClammV2Pool;
#[cfg(feature = "stable")]
use super::stable::StablePool;
#[cfg(feature = "weighted")]
use super::weighted::WeightedPool;

use crate::domain::{MaxSingleTokenRemoveParams, MaxSwapParams, Rounding, SwapParams};
use crate::error::AmmError;
use crate::traits::PoolBase;

/// Dispatch enum wrapping the built-in pool implementations.
///
/// The enum implements [`PoolBase`] by delegating every method call to the
/// inner pool via `match`.  Pools implemented outside the crate are
/// registered on the vault as `Box<dyn PoolBase>` instead.
///
/// # Example
///
/// ```text
/// let pool = PoolBox::Weighted(Box::new(WeightedPool::from_config(&state)?));
/// let out = pool.on_swap(&params)?;
/// ```
#[derive(Debug, Clone)]
pub enum PoolBox {
    /// Balancer weighted pool.
    #[cfg(feature = "weighted")]
    Weighted(Box<WeightedPool>),

    /// StableSwap pool.
    #[cfg(feature = "stable")]
    Stable(Box<StablePool>),

    /// Gyro elliptic concentrated liquidity pool.
    #[cfg(feature = "gyro")]
    GyroEclp(Box<GyroEclpPool>),

    /// Gyro two-asset concentrated liquidity pool.
    #[cfg(feature = "gyro")]
    Gyro2Clp(Box<Gyro2ClpPool>),

    /// Range-tracking pool, first release.
    #[cfg(feature = "reclamm")]
    ReClamm(Box<ReClammPool>),

    /// Range-tracking pool, second release.
    #[cfg(feature = "reclamm")]
    ReClammV2(Box<ReClammV2Pool>),

    /// Time-weighted weighted pool.
    #[cfg(feature = "quantamm")]
    QuantAmm(Box<QuantAmmPool>),

    /// Liquidity bootstrapping pool.
    #[cfg(feature = "liquidity-bootstrapping")]
    LiquidityBootstrapping(Box<LiquidityBootstrappingPool>),
}

/// Helper macro to delegate a method call to every PoolBox variant.
macro_rules! delegate {
    ($self:ident, $method:ident ( $($arg:expr),* )) => {
        match $self {
            #[cfg(feature = "weighted")]
            PoolBox::Weighted(p) => p.$method($($arg),*),
            #[cfg(feature = "stable")]
            PoolBox::Stable(p) => p.$method($($arg),*),
            #[cfg(feature = "gyro")]
            PoolBox::GyroEclp(p) => p.$method($($arg),*),
            #[cfg(feature = "gyro")]
            PoolBox::Gyro2Clp(p) => p.$method($($arg),*),
            #[cfg(feature = "reclamm")]
            PoolBox::ReClamm(p) => p.$method($($arg),*),
            #[cfg(feature = "reclamm")]
            PoolBox::ReClammV2(p) => p.$method($($arg),*),
            #[cfg(feature = "quantamm")]
            PoolBox::QuantAmm(p) => p.$method($($arg),*),
            #[cfg(feature = "liquidity-bootstrapping")]
            PoolBox::LiquidityBootstrapping(p) => p.$method($($arg),*),
        }
    };
}

impl PoolBox {
    /// The `poolType` tag of the wrapped pool.
    #[must_use]
    pub const fn pool_type(&self) -> &'static str {
        match self {
            #[cfg(feature = "weighted")]
            Self::Weighted(_) => "WEIGHTED",
            #[cfg(feature = "stable")]
            Self::Stable(_) => "STABLE",
            #[cfg(feature = "gyro")]
            Self::GyroEclp(_) => "GYROE",
            #[cfg(feature = "gyro")]
            Self::Gyro2Clp(_) => "GYRO",
            #[cfg(feature = "reclamm")]
            Self::ReClamm(_) => "RECLAMM",
            #[cfg(feature = "reclamm")]
            Self::ReClammV2(_) => "RECLAMM_V2",
            #[cfg(feature = "quantamm")]
            Self::QuantAmm(_) => "QUANT_AMM_WEIGHTED",
            #[cfg(feature = "liquidity-bootstrapping")]
            Self::LiquidityBootstrapping(_) => "LIQUIDITY_BOOTSTRAPPING",
        }
    }
}

impl PoolBase for PoolBox {
    fn on_swap(&self, params: &SwapParams) -> Result<U256, AmmError> {
        delegate!(self, on_swap(params))
    }

    fn compute_invariant(
        &self,
        balances_live_scaled18: &[U256],
        rounding: Rounding,
    ) -> Result<U256, AmmError> {
        delegate!(self, compute_invariant(balances_live_scaled18, rounding))
    }

    fn compute_balance(
        &self,
        balances_live_scaled18: &[U256],
        token_in_index: usize,
        invariant_ratio: U256,
    ) -> Result<U256, AmmError> {
        delegate!(
            self,
            compute_balance(balances_live_scaled18, token_in_index, invariant_ratio)
        )
    }

    fn get_maximum_invariant_ratio(&self) -> U256 {
        delegate!(self, get_maximum_invariant_ratio())
    }

    fn get_minimum_invariant_ratio(&self) -> U256 {
        delegate!(self, get_minimum_invariant_ratio())
    }

    fn get_max_swap_amount(&self, params: &MaxSwapParams<'_>) -> Result<U256, AmmError> {
        delegate!(self, get_max_swap_amount(params))
    }

    fn get_max_single_token_add_amount(&self) -> U256 {
        delegate!(self, get_max_single_token_add_amount())
    }

    fn get_max_single_token_remove_amount(
        &self,
        params: &MaxSingleTokenRemoveParams,
    ) -> Result<U256, AmmError> {
        delegate!(self, get_max_single_token_remove_amount(params))
    }
}
