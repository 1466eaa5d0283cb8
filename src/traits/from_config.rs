//! Construction of pools from their state snapshots.
//!
//! [`FromConfig`] provides a uniform interface for creating pool instances
//! from the serde state structs in [`config`](crate::config).  Each pool
//! implements `FromConfig<C>` for its own state type, so the factory
//! dispatches construction without `dyn` trait objects.
//!
//! # Validation Contract
//!
//! Implementations **must** validate the pool-specific parameters during
//! construction (weights in range, E-CLP rotation vector normalized, and
//! so on).  A successfully constructed pool never fails later because of
//! its own parameters; only the balances passed per call can.
//!
//! # Factory Integration
//!
//! [`DefaultPoolFactory`](crate::factory::DefaultPoolFactory) uses
//! `FromConfig` to build a [`PoolBox`](crate::pools::PoolBox) from a
//! [`PoolState`](crate::config::PoolState):
//!
//! ```text
//! PoolState::Weighted(state) => WeightedPool::from_config(&state)
//! PoolState::Stable(state)   => StablePool::from_config(&state)
//! ```
//!
//! There is no blanket implementation: every pool/state pairing is
//! intentional.

use crate::error::AmmError;

/// Builds a pool from a validated state snapshot.
///
/// # Type Parameters
///
/// - `C`: the state type carrying the pool's immutable parameters.
///
/// # Errors
///
/// Returns [`AmmError::InvalidConfiguration`] (or a more specific
/// variant such as [`AmmError::RotationVectorNotNormalized`]) if the
/// parameters are invalid.
pub trait FromConfig<C> {
    /// Creates a new pool instance from `config`.
    ///
    /// # Errors
    ///
    /// Any validation error for the pool's parameters.
    fn from_config(config: &C) -> Result<Self, AmmError>
    where
        Self: Sized;
}
