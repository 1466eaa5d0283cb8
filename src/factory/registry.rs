//! String-keyed registries for pools and hooks defined outside the crate.

use std::collections::HashMap;
use std::fmt;

use crate::config::BasePoolState;
use crate::error::AmmError;
use crate::traits::{HookBase, PoolBase};

/// A pool built by a registered constructor.
pub type DynPool = Box<dyn PoolBase + Send + Sync>;

/// A registered hook.
pub type DynHook = Box<dyn HookBase + Send + Sync>;

/// Builds a custom pool from the shared state of its snapshot.
pub type PoolConstructor = Box<dyn Fn(&BasePoolState) -> Result<DynPool, AmmError> + Send + Sync>;

/// Custom pool constructors keyed by `poolType`.
#[derive(Default)]
pub struct PoolRegistry {
    constructors: HashMap<String, PoolConstructor>,
}

impl PoolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `constructor` under `pool_type`, replacing any previous
    /// entry.
    pub fn register<F>(&mut self, pool_type: impl Into<String>, constructor: F)
    where
        F: Fn(&BasePoolState) -> Result<DynPool, AmmError> + Send + Sync + 'static,
    {
        self.constructors
            .insert(pool_type.into(), Box::new(constructor));
    }

    #[must_use]
    pub fn contains(&self, pool_type: &str) -> bool {
        self.constructors.contains_key(pool_type)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Builds the pool registered under `pool_type`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::UnsupportedPoolType`] if nothing is registered.
    /// - Whatever the constructor returns.
    pub fn create(&self, pool_type: &str, base: &BasePoolState) -> Result<DynPool, AmmError> {
        let constructor = self
            .constructors
            .get(pool_type)
            .ok_or_else(|| AmmError::UnsupportedPoolType(pool_type.to_owned()))?;
        constructor(base)
    }
}

impl fmt::Debug for PoolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.constructors.keys().collect();
        keys.sort();
        f.debug_struct("PoolRegistry").field("pool_types", &keys).finish()
    }
}

/// Custom hooks keyed by their [`HookBase::hook_type`].
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<String, DynHook>,
}

impl HookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `hook` under its own `hook_type`, replacing any previous
    /// entry.
    pub fn register<H>(&mut self, hook: H)
    where
        H: HookBase + Send + Sync + 'static,
    {
        self.hooks.insert(hook.hook_type().to_owned(), Box::new(hook));
    }

    #[must_use]
    pub fn get(&self, hook_type: &str) -> Option<&(dyn HookBase + Send + Sync)> {
        self.hooks.get(hook_type).map(|hook| hook.as_ref())
    }

    #[must_use]
    pub fn contains(&self, hook_type: &str) -> bool {
        self.hooks.contains_key(hook_type)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.hooks.keys().collect();
        keys.sort();
        f.debug_struct("HookRegistry").field("hook_types", &keys).finish()
    }
}
