//! Pool construction and custom extension points.
//!
//! [`DefaultPoolFactory`] builds the built-in pool families from a
//! [`PoolState`](crate::config::PoolState), validating the snapshot and
//! dispatching to the pool's [`FromConfig`](crate::traits::FromConfig)
//! implementation.
//!
//! Pools and hooks implemented outside the crate are registered by name
//! in a [`PoolRegistry`] or [`HookRegistry`] and handed to the
//! [`Vault`](crate::vault::Vault):
//!
//! ```text
//! let mut pools = PoolRegistry::new();
//! pools.register("CONSTANT_SUM", |base| Ok(Box::new(ConstantSum::new(base)?) as DynPool));
//! let vault = Vault::new().with_pool_registry(pools);
//! ```
//!
//! # Feature Gating
//!
//! Each factory arm is gated behind its pool family's feature.  A
//! snapshot for a disabled family yields
//! [`AmmError::UnsupportedPoolType`](crate::error::AmmError::UnsupportedPoolType).

mod default_factory;
mod registry;

pub use default_factory::DefaultPoolFactory;
pub use registry::{DynHook, DynPool, HookRegistry, PoolConstructor, PoolRegistry};
