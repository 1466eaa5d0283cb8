//! Add and remove liquidity requests and their results.

use ethnum::U256;
use serde::{Deserialize, Serialize};

use crate::error::AmmError;

/// How an add-liquidity request is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum AddLiquidityKind {
    /// Exact token amounts in, shares out computed.
    Unbalanced = 0,
    /// Exact shares out, paid with a single token.
    SingleTokenExactOut = 1,
}

impl TryFrom<u8> for AddLiquidityKind {
    type Error = AmmError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unbalanced),
            1 => Ok(Self::SingleTokenExactOut),
            _ => Err(AmmError::UnsupportedAddKind),
        }
    }
}

impl From<AddLiquidityKind> for u8 {
    fn from(value: AddLiquidityKind) -> Self {
        value as u8
    }
}

/// How a remove-liquidity request is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum RemoveLiquidityKind {
    /// Exact shares in, every token out pro rata.
    Proportional = 0,
    /// Exact shares in, a single token out.
    SingleTokenExactIn = 1,
    /// Exact single-token amount out, shares in computed.
    SingleTokenExactOut = 2,
}

impl TryFrom<u8> for RemoveLiquidityKind {
    type Error = AmmError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Proportional),
            1 => Ok(Self::SingleTokenExactIn),
            2 => Ok(Self::SingleTokenExactOut),
            _ => Err(AmmError::UnsupportedRemoveKind),
        }
    }
}

impl From<RemoveLiquidityKind> for u8 {
    fn from(value: RemoveLiquidityKind) -> Self {
        value as u8
    }
}

/// An add-liquidity request in raw token units.
///
/// For [`AddLiquidityKind::Unbalanced`] `max_amounts_in_raw` holds the
/// exact amounts deposited.  For [`AddLiquidityKind::SingleTokenExactOut`]
/// exactly one entry is non-zero and marks the paying token;
/// `min_bpt_amount_out_raw` is the exact share amount minted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLiquidityInput {
    /// Pool address the request targets.
    #[serde(default)]
    pub pool: String,
    /// Per-token amounts in native decimals.
    #[serde(with = "crate::config::big_int::vec")]
    pub max_amounts_in_raw: Vec<U256>,
    /// Share amount bound.
    #[serde(with = "crate::config::big_int")]
    pub min_bpt_amount_out_raw: U256,
    /// Pricing mode.
    pub kind: AddLiquidityKind,
}

/// A remove-liquidity request in raw token units.
///
/// For single-token kinds exactly one entry of `min_amounts_out_raw` is
/// non-zero and marks the withdrawn token; for
/// [`RemoveLiquidityKind::SingleTokenExactOut`] that entry is the exact
/// amount withdrawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLiquidityInput {
    /// Pool address the request targets.
    #[serde(default)]
    pub pool: String,
    /// Per-token amounts in native decimals.
    #[serde(with = "crate::config::big_int::vec")]
    pub min_amounts_out_raw: Vec<U256>,
    /// Share amount bound.
    #[serde(with = "crate::config::big_int")]
    pub max_bpt_amount_in_raw: U256,
    /// Pricing mode.
    pub kind: RemoveLiquidityKind,
}

/// Outcome of an add-liquidity quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLiquidityResult {
    /// Shares minted.
    #[serde(with = "crate::config::big_int")]
    pub bpt_amount_out_raw: U256,
    /// Tokens deposited, native decimals.
    #[serde(with = "crate::config::big_int::vec")]
    pub amounts_in_raw: Vec<U256>,
}

/// Outcome of a remove-liquidity quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLiquidityResult {
    /// Shares burned.
    #[serde(with = "crate::config::big_int")]
    pub bpt_amount_in_raw: U256,
    /// Tokens withdrawn, native decimals.
    #[serde(with = "crate::config::big_int::vec")]
    pub amounts_out_raw: Vec<U256>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn kinds_from_index() {
        assert_eq!(AddLiquidityKind::try_from(1u8), Ok(AddLiquidityKind::SingleTokenExactOut));
        assert_eq!(AddLiquidityKind::try_from(7u8), Err(AmmError::UnsupportedAddKind));
        assert_eq!(RemoveLiquidityKind::try_from(2u8), Ok(RemoveLiquidityKind::SingleTokenExactOut));
        assert_eq!(RemoveLiquidityKind::try_from(3u8), Err(AmmError::UnsupportedRemoveKind));
    }

    #[test]
    fn add_input_from_json() {
        let json = r#"{"pool":"0xp","maxAmountsInRaw":["1","0"],"minBptAmountOutRaw":"5","kind":0}"#;
        let Ok(input) = serde_json::from_str::<AddLiquidityInput>(json) else {
            panic!("expected add input");
        };
        assert_eq!(input.kind, AddLiquidityKind::Unbalanced);
        assert_eq!(input.max_amounts_in_raw, vec![U256::ONE, U256::ZERO]);
        assert_eq!(input.min_bpt_amount_out_raw, U256::new(5));
    }

    #[test]
    fn unknown_remove_kind_is_rejected() {
        let json = r#"{"minAmountsOutRaw":[],"maxBptAmountInRaw":"1","kind":9}"#;
        assert!(serde_json::from_str::<RemoveLiquidityInput>(json).is_err());
    }
}
