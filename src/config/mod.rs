//! Pool, buffer and hook state snapshots.
//!
//! This module contains [`PoolState`], the declarative snapshot of any
//! pool the vault can quote, along with the per-family state structs, the
//! [`BufferState`] of ERC-4626 buffers and the [`HookState`] forwarded to
//! pool hooks.  Every snapshot is plain serde data; big integers go
//! through the [`big_int`] adapters.

pub mod big_int;
mod buffer;
mod gyro;
mod hook_state;
mod liquidity_bootstrapping;
pub(crate) mod pool_state;
mod quantamm;
mod reclamm;
mod stable;
mod weighted;

pub use buffer::BufferState;
pub use gyro::{Gyro2ClpState, GyroEclpState};
pub use hook_state::{
    AkronHookState, DirectionalFeeHookState, ExitFeeHookState, HookState,
    LiquidityBootstrappingHookState, StableSurgeHookState,
};
pub(crate) use hook_state::wrong_state;
pub use liquidity_bootstrapping::LiquidityBootstrappingState;
pub use pool_state::{BasePoolState, PoolState, PoolStateOrBuffer};
pub use quantamm::QuantAmmState;
pub use reclamm::ReClammState;
pub use stable::{StableState, AMP_PRECISION, MAX_AMP, MIN_AMP};
pub use weighted::{WeightedState, MIN_WEIGHT};
