//! Hook state snapshots.
//!
//! A pool that names a `hookType` must be quoted with a matching
//! [`HookState`].  The vault forwards the state untouched to every hook
//! callback; each hook reads only its own variant and rejects any other
//! with [`AmmError::InvalidConfiguration`].

use std::collections::BTreeMap;

use ethnum::U256;
use serde::{Deserialize, Serialize};

use crate::domain::TokenAddress;
use crate::error::AmmError;

/// Exit fee hook parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitFeeHookState {
    /// Pool tokens, in index order.
    #[serde(default)]
    pub tokens: Vec<TokenAddress>,
    /// Fee charged on every token withdrawn (18 decimals).
    #[serde(with = "super::big_int")]
    pub remove_liquidity_hook_fee_percentage: U256,
}

/// Directional fee hook parameters.  The fee is derived from the swap
/// alone, so the state carries nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalFeeHookState {}

/// Stable surge hook parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StableSurgeHookState {
    /// Amplification of the stable pool, including its precision.
    #[serde(with = "super::big_int")]
    pub amp: U256,
    /// Imbalance above which the fee surges.
    #[serde(with = "super::big_int")]
    pub surge_threshold_percentage: U256,
    /// Fee charged at full imbalance.
    #[serde(with = "super::big_int")]
    pub max_surge_fee_percentage: U256,
}

/// Akron loss-versus-rebalancing hook parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AkronHookState {
    /// Normalized weights of the underlying weighted pool.
    #[serde(with = "super::big_int::vec")]
    pub weights: Vec<U256>,
    /// Fee floor.
    #[serde(with = "super::big_int")]
    pub minimum_swap_fee_percentage: U256,
}

/// Liquidity bootstrapping hook parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityBootstrappingHookState {
    /// Only this address may add liquidity.
    pub lbp_owner: TokenAddress,
    /// Removals open at this time.
    #[serde(with = "super::big_int")]
    pub end_time: U256,
    /// Caller of the quoted operation.
    pub sender: TokenAddress,
    /// Time of the quote.
    #[serde(with = "super::big_int")]
    pub current_timestamp: U256,
}

/// State handed to a pool's hook, tagged by `hookType`.
///
/// The [`Custom`](HookState::Custom) variant is resolved against the
/// vault's hook registry by `hook_type` and is built in code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "hookType")]
pub enum HookState {
    ExitFee(ExitFeeHookState),
    DirectionalFee(DirectionalFeeHookState),
    StableSurge(StableSurgeHookState),
    Akron(AkronHookState),
    LiquidityBootstrapping(LiquidityBootstrappingHookState),
    /// Parameters for a hook implemented outside the crate.
    #[serde(skip)]
    Custom {
        /// Registry key.
        hook_type: String,
        /// Free-form numeric parameters.
        params: BTreeMap<String, U256>,
    },
}

impl HookState {
    /// The `hookType` tag of this state.
    #[must_use]
    pub fn hook_type(&self) -> &str {
        match self {
            Self::ExitFee(_) => "ExitFee",
            Self::DirectionalFee(_) => "DirectionalFee",
            Self::StableSurge(_) => "StableSurge",
            Self::Akron(_) => "Akron",
            Self::LiquidityBootstrapping(_) => "LiquidityBootstrapping",
            Self::Custom { hook_type, .. } => hook_type,
        }
    }
}

/// Error returned by a hook handed another hook's state.
pub(crate) const fn wrong_state() -> AmmError {
    AmmError::InvalidConfiguration("hook state does not match the hook type")
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn exit_fee_from_json() {
        let json = r#"{"hookType":"ExitFee","tokens":["0xA","0xB"],
            "removeLiquidityHookFeePercentage":"50000000000000000"}"#;
        let Ok(state) = serde_json::from_str::<HookState>(json) else {
            panic!("expected exit fee state");
        };
        assert_eq!(state.hook_type(), "ExitFee");
        let HookState::ExitFee(exit) = state else {
            panic!("expected exit fee variant");
        };
        assert_eq!(
            exit.remove_liquidity_hook_fee_percentage,
            U256::new(50_000_000_000_000_000)
        );
    }

    #[test]
    fn directional_fee_ignores_extra_fields() {
        let json = r#"{"hookType":"DirectionalFee","tokens":["0xa"],"balancesLiveScaled18":["1"]}"#;
        let Ok(state) = serde_json::from_str::<HookState>(json) else {
            panic!("expected directional fee state");
        };
        assert_eq!(state, HookState::DirectionalFee(DirectionalFeeHookState {}));
    }

    #[test]
    fn lbp_owner_is_case_insensitive() {
        let json = r#"{"hookType":"LiquidityBootstrapping","lbpOwner":"0xABC","endTime":"10",
            "sender":"0xabc","currentTimestamp":"5"}"#;
        let Ok(HookState::LiquidityBootstrapping(state)) = serde_json::from_str::<HookState>(json)
        else {
            panic!("expected lbp hook state");
        };
        assert_eq!(state.lbp_owner, state.sender);
    }

    #[test]
    fn unknown_hook_type_fails_to_parse() {
        assert!(serde_json::from_str::<HookState>(r#"{"hookType":"Mystery"}"#).is_err());
    }
}
