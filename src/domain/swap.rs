//! Swap inputs and the resolved parameters handed to pool math.

use core::fmt;

use ethnum::U256;
use serde::{Deserialize, Serialize};

use super::TokenAddress;
use crate::error::AmmError;

/// Which side of a swap the caller fixes.
///
/// Serialized as its on-chain enum index (`0` / `1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum SwapKind {
    /// The input amount is fixed; the output is computed.
    GivenIn = 0,
    /// The output amount is fixed; the input is computed.
    GivenOut = 1,
}

impl TryFrom<u8> for SwapKind {
    type Error = AmmError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::GivenIn),
            1 => Ok(Self::GivenOut),
            _ => Err(AmmError::InvalidConfiguration("swap kind must be 0 or 1")),
        }
    }
}

impl From<SwapKind> for u8 {
    fn from(value: SwapKind) -> Self {
        value as u8
    }
}

impl fmt::Display for SwapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GivenIn => write!(f, "GivenIn"),
            Self::GivenOut => write!(f, "GivenOut"),
        }
    }
}

/// A user-facing swap request in raw token units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapInput {
    /// Given amount in the fixed token's native decimals.
    #[serde(with = "crate::config::big_int")]
    pub amount_raw: U256,
    /// Which side `amount_raw` fixes.
    pub swap_kind: SwapKind,
    /// Token sold to the pool.
    pub token_in: TokenAddress,
    /// Token bought from the pool.
    pub token_out: TokenAddress,
}

impl SwapInput {
    /// Builds a swap request.
    #[must_use]
    pub fn new(swap_kind: SwapKind, amount_raw: U256, token_in: &str, token_out: &str) -> Self {
        Self {
            amount_raw,
            swap_kind,
            token_in: TokenAddress::new(token_in),
            token_out: TokenAddress::new(token_out),
        }
    }
}

/// A swap resolved to token indices and the scaled-18 domain.
///
/// `balances_live_scaled18` is the vault's working copy for this call; the
/// caller's snapshot is never aliased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    /// Which side `amount_given_scaled18` fixes.
    pub swap_kind: SwapKind,
    /// Given amount, scaled to 18 decimals with the token rate applied.
    pub amount_given_scaled18: U256,
    /// Current balances in the scaled-18 domain.
    pub balances_live_scaled18: Vec<U256>,
    /// Index of the token sold.
    pub index_in: usize,
    /// Index of the token bought.
    pub index_out: usize,
}

/// Inputs for [`PoolBase::get_max_swap_amount`](crate::traits::PoolBase::get_max_swap_amount).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxSwapParams<'a> {
    /// Which side of the swap is bounded.
    pub swap_kind: SwapKind,
    /// Current balances in the scaled-18 domain.
    pub balances_live_scaled18: &'a [U256],
    /// Token rates (18 decimals).
    pub token_rates: &'a [U256],
    /// Decimal scaling factors.
    pub scaling_factors: &'a [U256],
    /// Index of the token sold.
    pub index_in: usize,
    /// Index of the token bought.
    pub index_out: usize,
}

/// Inputs for [`PoolBase::get_max_single_token_remove_amount`](crate::traits::PoolBase::get_max_single_token_remove_amount).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxSingleTokenRemoveParams {
    /// `true` for exact-BPT-in removals, `false` for exact-token-out.
    pub is_exact_in: bool,
    /// Pool share supply.
    pub total_supply: U256,
    /// Scaled-18 balance of the token withdrawn.
    pub token_out_balance: U256,
    /// Scaling factor of the token withdrawn.
    pub token_out_scaling_factor: U256,
    /// Rate of the token withdrawn.
    pub token_out_rate: U256,
}
