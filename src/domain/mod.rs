//! Value types shared by the vault, pools and hooks.
//!
//! This module contains the request and result shapes that cross the
//! public API: swap and liquidity inputs in raw token units, the resolved
//! [`SwapParams`] handed to pool math, and the explicit [`Rounding`]
//! direction threaded through every invariant computation.

mod liquidity_change;
mod rounding;
mod swap;
mod token_address;

pub use liquidity_change::{
    AddLiquidityInput, AddLiquidityKind, AddLiquidityResult, RemoveLiquidityInput,
    RemoveLiquidityKind, RemoveLiquidityResult,
};
pub use rounding::Rounding;
pub use swap::{MaxSingleTokenRemoveParams, MaxSwapParams, SwapInput, SwapKind, SwapParams};
pub use token_address::TokenAddress;
