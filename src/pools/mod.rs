//! Feature-gated pool math and the [`PoolBox`] dispatch enum.
//!
//! Each pool family is behind its own Cargo feature flag.  The [`PoolBox`]
//! enum provides static dispatch across all enabled families, so the vault
//! holds one concrete type for every built-in pool and reserves `dyn`
//! trait objects for registered custom pools.
//!
//! # Pool Types
//!
//! | Feature | Pool | `poolType` |
//! |---------|------|------------|
//! | `weighted` | [`WeightedPool`] | `WEIGHTED` |
//! | `stable` | [`StablePool`] | `STABLE` |
//! | `gyro` | [`GyroEclpPool`] | `GYROE` |
//! | `gyro` | [`Gyro2ClpPool`] | `GYRO` |
//! | `reclamm` | [`ReClammPool`] | `RECLAMM` |
//! | `reclamm` | [`ReClammV2Pool`] | `RECLAMM_V2` |
//! | `quantamm` | [`QuantAmmPool`] | `QUANT_AMM_WEIGHTED` |
//! | `liquidity-bootstrapping` | [`LiquidityBootstrappingPool`] | `LIQUIDITY_BOOTSTRAPPING` |
//! | `buffer` | [`BufferPool`] | ERC-4626 buffer |
//!
//! Buffers have no invariant and do not implement
//! [`PoolBase`](crate::traits::PoolBase); the vault routes them
//! separately.

use ethnum::U256;

use crate::error::AmmError;

#[cfg(feature = "buffer")]
pub mod buffer;
#[cfg(feature = "gyro")]
pub mod gyro_2clp;
#[cfg(feature = "gyro")]
pub mod gyro_eclp;
#[cfg(feature = "liquidity-bootstrapping")]
pub mod liquidity_bootstrapping;
#[cfg(feature = "quantamm")]
pub mod quantamm;
#[cfg(feature = "reclamm")]
pub mod reclamm;
#[cfg(feature = "reclamm")]
pub mod reclamm_v2;
#[cfg(feature = "stable")]
pub mod stable;
#[cfg(feature = "weighted")]
pub mod weighted;

mod pool_box;

#[cfg(all(test, feature = "all-pools"))]
#[allow(clippy::panic)]
mod proptest_properties;

#[cfg(feature = "buffer")]
pub use buffer::{BufferPool, WrappingDirection};
#[cfg(feature = "gyro")]
pub use gyro_2clp::Gyro2ClpPool;
#[cfg(feature = "gyro")]
pub use gyro_eclp::GyroEclpPool;
#[cfg(feature = "liquidity-bootstrapping")]
pub use liquidity_bootstrapping::LiquidityBootstrappingPool;
pub use pool_box::PoolBox;
#[cfg(feature = "quantamm")]
pub use quantamm::QuantAmmPool;
#[cfg(feature = "reclamm")]
pub use reclamm::ReClammPool;
#[cfg(feature = "reclamm")]
pub use reclamm_v2::ReClammV2Pool;
#[cfg(feature = "stable")]
pub use stable::StablePool;
#[cfg(feature = "weighted")]
pub use weighted::WeightedPool;

/// Bounds-checked element access for per-token arrays.
#[allow(dead_code)]
pub(crate) fn at(values: &[U256], index: usize) -> Result<U256, AmmError> {
    values
        .get(index)
        .copied()
        .ok_or(AmmError::InvalidConfiguration("token index out of range"))
}
