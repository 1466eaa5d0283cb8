//! Convenience re-exports for common types and traits.
//!
//! The prelude provides a single import to bring all commonly used items
//! into scope:
//!
//! ```rust
//! use balancer_maths::prelude::*;
//! ```
//!
//! This re-exports the request types, snapshots, core traits, the error
//! type and the vault, so that consumers don't need to import from
//! individual submodules.

// Re-export domain types
pub use crate::domain::{
    AddLiquidityInput, AddLiquidityKind, AddLiquidityResult, RemoveLiquidityInput,
    RemoveLiquidityKind, RemoveLiquidityResult, Rounding, SwapInput, SwapKind, TokenAddress,
};

// Re-export core traits
pub use crate::traits::{FromConfig, HookBase, HookFlags, HookOutcome, PoolBase};

// Re-export math utilities
pub use crate::math::{CheckedArithmetic, WAD};

// Re-export configuration
pub use crate::config::{BasePoolState, BufferState, HookState, PoolState, PoolStateOrBuffer};

// Re-export error types
pub use crate::error::{AmmError, Result};

// Re-export factory and registries
pub use crate::factory::{DefaultPoolFactory, HookRegistry, PoolRegistry};

// Re-export dispatch enums
pub use crate::hooks::HookBox;
pub use crate::pools::PoolBox;

// Re-export the orchestrator
pub use crate::vault::Vault;
