//! Pool state snapshots.
//!
//! [`PoolState`] is the declarative input for every quote.  Each variant
//! wraps a family-specific struct that flattens the shared
//! [`BasePoolState`] and adds the family's own parameters, so a snapshot
//! produced by a chain-state fetcher deserializes straight into the right
//! variant through its `poolType` tag:
//!
//! ```text
//! { "poolType": "WEIGHTED", "tokens": [...], ..., "weights": [...] }
//!     => PoolState::Weighted(WeightedState { base, weights, .. })
//! ```
//!
//! # Factory Integration
//!
//! [`DefaultPoolFactory`](crate::factory::DefaultPoolFactory) matches on
//! `PoolState` to build the pool:
//!
//! ```text
//! match state {
//!     PoolState::Weighted(s) => WeightedPool::from_config(s),
//!     PoolState::Stable(s)   => StablePool::from_config(s),
//!     ...
//! }
//! ```

use core::fmt;

use ethnum::U256;
use serde::{Deserialize, Serialize};

use super::{
    BufferState, Gyro2ClpState, GyroEclpState, LiquidityBootstrappingState, QuantAmmState,
    ReClammState, StableState, WeightedState,
};
use crate::domain::TokenAddress;
use crate::error::AmmError;
use crate::math::WAD;

/// State every pool shares, regardless of family.
///
/// Per-token arrays are index-aligned with `tokens`, whose order is the
/// on-chain registration order.  Rates, fees and `total_supply` are
/// 18-decimal fixed point.
///
/// # Validation
///
/// - `tokens`, `scaling_factors`, `token_rates` and
///   `balances_live_scaled18` have equal length, at least 2.
/// - No duplicate token addresses.
/// - `swap_fee` and `aggregate_swap_fee` lie in `[0, 1e18]`.
/// - Scaling factors and rates are non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasePoolState {
    /// On-chain pool address.
    #[serde(default)]
    pub pool_address: String,
    /// Registered tokens, in index order.
    pub tokens: Vec<TokenAddress>,
    /// `10^(18 - decimals)` per token.
    #[serde(with = "super::big_int::vec")]
    pub scaling_factors: Vec<U256>,
    /// Token rates (1e18 for plain tokens).
    #[serde(with = "super::big_int::vec")]
    pub token_rates: Vec<U256>,
    /// Live balances, scaled-18 with rates applied.
    #[serde(with = "super::big_int::vec")]
    pub balances_live_scaled18: Vec<U256>,
    /// Static swap fee percentage.
    #[serde(with = "super::big_int")]
    pub swap_fee: U256,
    /// Share of the swap fee kept by protocol and pool creator.
    #[serde(default, with = "super::big_int")]
    pub aggregate_swap_fee: U256,
    /// Pool share (BPT) supply.
    #[serde(with = "super::big_int")]
    pub total_supply: U256,
    /// Whether unbalanced and single-token operations are allowed.
    #[serde(default = "default_supports_unbalanced")]
    pub supports_unbalanced_liquidity: bool,
    /// Hook attached to the pool, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_type: Option<String>,
}

const fn default_supports_unbalanced() -> bool {
    true
}

impl BasePoolState {
    /// Number of registered tokens.
    #[must_use]
    #[inline]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Index of `token`, compared case-insensitively.
    #[must_use]
    pub fn token_index(&self, token: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t.matches(token))
    }

    /// Validates the structural invariants listed on the type.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] naming the first
    /// violated invariant.
    pub fn validate(&self) -> Result<(), AmmError> {
        let n = self.tokens.len();
        if n < 2 {
            return Err(AmmError::InvalidConfiguration(
                "at least 2 tokens are required",
            ));
        }
        if self.scaling_factors.len() != n
            || self.token_rates.len() != n
            || self.balances_live_scaled18.len() != n
        {
            return Err(AmmError::InvalidConfiguration(
                "tokens, scaling factors, rates and balances must have equal length",
            ));
        }

        // O(n²), pools hold at most 8 tokens.
        let mut iter = self.tokens.iter();
        while let Some(token) = iter.next() {
            if iter.clone().any(|other| other == token) {
                return Err(AmmError::InvalidConfiguration(
                    "duplicate token addresses are not allowed",
                ));
            }
        }

        if self.swap_fee > WAD || self.aggregate_swap_fee > WAD {
            return Err(AmmError::InvalidConfiguration(
                "fee percentages must not exceed 1e18",
            ));
        }
        if self.scaling_factors.iter().any(|sf| *sf == U256::ZERO) {
            return Err(AmmError::InvalidConfiguration(
                "scaling factors must be non-zero",
            ));
        }
        if self.token_rates.iter().any(|r| *r == U256::ZERO) {
            return Err(AmmError::InvalidConfiguration("token rates must be non-zero"));
        }
        Ok(())
    }
}

/// Checks that a family-specific array matches the token count.
pub(crate) fn ensure_len(
    base: &BasePoolState,
    len: usize,
    context: &'static str,
) -> Result<(), AmmError> {
    if len == base.tokens.len() {
        Ok(())
    } else {
        Err(AmmError::InvalidConfiguration(context))
    }
}

/// Snapshot of any pool the vault can quote.
///
/// Built-in families deserialize from their `poolType` tag.  The
/// [`Custom`](PoolState::Custom) variant carries only the base state and
/// is resolved against the vault's pool registry by `pool_type`; it is
/// constructed in code, never deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "poolType")]
pub enum PoolState {
    /// Balancer weighted pool.
    #[serde(rename = "WEIGHTED")]
    Weighted(WeightedState),
    /// StableSwap pool.
    #[serde(rename = "STABLE")]
    Stable(StableState),
    /// Gyro elliptic concentrated liquidity pool.
    #[serde(rename = "GYROE")]
    GyroEclp(GyroEclpState),
    /// Gyro two-asset concentrated liquidity pool.
    #[serde(rename = "GYRO")]
    Gyro2Clp(Gyro2ClpState),
    /// Range-tracking pool, first release.
    #[serde(rename = "RECLAMM")]
    ReClamm(ReClammState),
    /// Range-tracking pool, second release.
    #[serde(rename = "RECLAMM_V2")]
    ReClammV2(ReClammState),
    /// Time-weighted weighted pool.
    #[serde(rename = "QUANT_AMM_WEIGHTED")]
    QuantAmm(QuantAmmState),
    /// Liquidity bootstrapping pool.
    #[serde(rename = "LIQUIDITY_BOOTSTRAPPING")]
    LiquidityBootstrapping(LiquidityBootstrappingState),
    /// Pool implemented outside the crate.
    #[serde(skip)]
    Custom {
        /// Registry key.
        pool_type: String,
        /// Shared state.
        base: BasePoolState,
    },
}

impl PoolState {
    /// The `poolType` tag of this snapshot.
    #[must_use]
    pub fn pool_type(&self) -> &str {
        match self {
            Self::Weighted(_) => "WEIGHTED",
            Self::Stable(_) => "STABLE",
            Self::GyroEclp(_) => "GYROE",
            Self::Gyro2Clp(_) => "GYRO",
            Self::ReClamm(_) => "RECLAMM",
            Self::ReClammV2(_) => "RECLAMM_V2",
            Self::QuantAmm(_) => "QUANT_AMM_WEIGHTED",
            Self::LiquidityBootstrapping(_) => "LIQUIDITY_BOOTSTRAPPING",
            Self::Custom { pool_type, .. } => pool_type,
        }
    }

    /// The shared part of the snapshot.
    #[must_use]
    pub const fn base(&self) -> &BasePoolState {
        match self {
            Self::Weighted(s) => &s.base,
            Self::Stable(s) => &s.base,
            Self::GyroEclp(s) => &s.base,
            Self::Gyro2Clp(s) => &s.base,
            Self::ReClamm(s) | Self::ReClammV2(s) => &s.base,
            Self::QuantAmm(s) => &s.base,
            Self::LiquidityBootstrapping(s) => &s.base,
            Self::Custom { base, .. } => base,
        }
    }

    /// Validates the base state and the family parameters.
    ///
    /// # Errors
    ///
    /// Returns the first [`AmmError::InvalidConfiguration`] found.
    pub fn validate(&self) -> Result<(), AmmError> {
        match self {
            Self::Weighted(s) => s.validate(),
            Self::Stable(s) => s.validate(),
            Self::GyroEclp(s) => s.validate(),
            Self::Gyro2Clp(s) => s.validate(),
            Self::ReClamm(s) | Self::ReClammV2(s) => s.validate(),
            Self::QuantAmm(s) => s.validate(),
            Self::LiquidityBootstrapping(s) => s.validate(),
            Self::Custom { base, .. } => base.validate(),
        }
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pool_type())
    }
}

/// Either a pool snapshot or an ERC-4626 buffer snapshot.
///
/// Buffers have no pool math and take a separate path through the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PoolStateOrBuffer {
    /// A liquidity pool.
    Pool(PoolState),
    /// An ERC-4626 buffer.
    Buffer(BufferState),
}

impl From<PoolState> for PoolStateOrBuffer {
    fn from(value: PoolState) -> Self {
        Self::Pool(value)
    }
}

impl From<BufferState> for PoolStateOrBuffer {
    fn from(value: BufferState) -> Self {
        Self::Buffer(value)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn base(n: usize) -> BasePoolState {
        BasePoolState {
            pool_address: "0xpool".into(),
            tokens: (0..n).map(|i| TokenAddress::new(&format!("0x{i}"))).collect(),
            scaling_factors: vec![U256::ONE; n],
            token_rates: vec![WAD; n],
            balances_live_scaled18: vec![WAD * 100; n],
            swap_fee: U256::new(1_000_000_000_000_000),
            aggregate_swap_fee: U256::ZERO,
            total_supply: WAD * 100,
            supports_unbalanced_liquidity: true,
            hook_type: None,
        }
    }

    // -- validation -----------------------------------------------------------

    #[test]
    fn valid_base_passes() {
        assert!(base(2).validate().is_ok());
        assert!(base(8).validate().is_ok());
    }

    #[test]
    fn single_token_rejected() {
        assert!(matches!(
            base(1).validate(),
            Err(AmmError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn length_mismatch_rejected() {
        let mut state = base(3);
        state.token_rates.pop();
        assert!(matches!(
            state.validate(),
            Err(AmmError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn duplicate_tokens_rejected_case_insensitively() {
        let mut state = base(2);
        state.tokens = vec![TokenAddress::new("0xAA"), TokenAddress::new("0xaa")];
        assert!(matches!(
            state.validate(),
            Err(AmmError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn fee_above_one_rejected() {
        let mut state = base(2);
        state.swap_fee = WAD + 1;
        assert!(state.validate().is_err());
        state.swap_fee = WAD;
        assert!(state.validate().is_ok());
        state.aggregate_swap_fee = WAD + 1;
        assert!(state.validate().is_err());
    }

    #[test]
    fn zero_rate_rejected() {
        let mut state = base(2);
        state.token_rates[1] = U256::ZERO;
        assert!(state.validate().is_err());
    }

    #[test]
    fn token_index_ignores_case() {
        let mut state = base(2);
        state.tokens = vec![TokenAddress::new("0xAbC"), TokenAddress::new("0xdef")];
        assert_eq!(state.token_index("0xabc"), Some(0));
        assert_eq!(state.token_index("0xDEF"), Some(1));
        assert_eq!(state.token_index("0x123"), None);
    }

    // -- serde ----------------------------------------------------------------

    #[test]
    fn weighted_snapshot_from_json() {
        let json = r#"{
            "poolType": "WEIGHTED",
            "poolAddress": "0xPool",
            "tokens": ["0xA", "0xB"],
            "scalingFactors": ["1", "1000000000000"],
            "tokenRates": ["1000000000000000000", "1000000000000000000"],
            "balancesLiveScaled18": ["60000000000000000000", "40000000000000000000"],
            "swapFee": "1000000000000000",
            "aggregateSwapFee": "0",
            "totalSupply": "100000000000000000000",
            "weights": ["600000000000000000", "400000000000000000"]
        }"#;
        let Ok(state) = serde_json::from_str::<PoolState>(json) else {
            panic!("expected weighted state");
        };
        assert_eq!(state.pool_type(), "WEIGHTED");
        assert!(state.base().supports_unbalanced_liquidity);
        assert_eq!(state.base().hook_type, None);
        assert!(state.validate().is_ok());
        let PoolState::Weighted(weighted) = state else {
            panic!("expected weighted variant");
        };
        assert_eq!(weighted.weights[0], U256::new(600_000_000_000_000_000));
    }

    #[test]
    fn unknown_pool_type_fails_to_parse() {
        let json = r#"{"poolType":"COW_AMM","tokens":[],"scalingFactors":[],"tokenRates":[],
            "balancesLiveScaled18":[],"swapFee":"0","totalSupply":"0"}"#;
        assert!(serde_json::from_str::<PoolState>(json).is_err());
    }

    #[test]
    fn custom_reports_its_own_type() {
        let state = PoolState::Custom {
            pool_type: "CUSTOM_CP".into(),
            base: base(2),
        };
        assert_eq!(state.pool_type(), "CUSTOM_CP");
        assert_eq!(state.to_string(), "CUSTOM_CP");
        assert!(state.validate().is_ok());
    }

    #[test]
    fn buffer_snapshot_is_untagged_fallback() {
        let json = r#"{"poolType":"Buffer","poolAddress":"0xbuf","tokens":["0xa","0xb"],
            "rate":"1122761623535914092"}"#;
        let Ok(state) = serde_json::from_str::<PoolStateOrBuffer>(json) else {
            panic!("expected buffer state");
        };
        assert!(matches!(state, PoolStateOrBuffer::Buffer(_)));
    }
}
