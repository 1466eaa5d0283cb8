//! Core trait abstractions for pools and hooks.
//!
//! - [`PoolBase`]: swap, invariant and balance math of one pool family.
//! - [`HookBase`]: optional lifecycle callbacks around vault operations.
//! - [`FromConfig`]: construction of a pool from its state snapshot.

mod from_config;
mod hook_base;
mod pool_base;

pub use from_config::FromConfig;
pub use hook_base::{
    AfterAddLiquidityParams, AfterRemoveLiquidityParams, AfterSwapParams,
    BeforeAddLiquidityParams, BeforeRemoveLiquidityParams, HookBase, HookFlags, HookOutcome,
};
pub use pool_base::PoolBase;
