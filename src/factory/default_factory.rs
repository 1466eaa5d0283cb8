//! Default pool factory implementation.

use crate::config::PoolState;
use crate::error::AmmError;
use crate::pools::PoolBox;

#[cfg(any(
    feature = "weighted",
    feature = "stable",
    feature = "gyro",
    feature = "reclamm",
    feature = "quantamm",
    feature = "liquidity-bootstrapping",
))]
use crate::traits::FromConfig;

/// Stateless factory for the built-in pool families.
///
/// `DefaultPoolFactory` matches on the [`PoolState`] variant, delegates to
/// the pool's [`FromConfig`] implementation (which validates the
/// snapshot) and wraps the result in a [`PoolBox`].
///
/// [`PoolState::Custom`] snapshots are not built here; the vault resolves
/// them through its [`PoolRegistry`](super::PoolRegistry).
///
/// # Example
///
/// ```rust
/// use balancer_maths::config::PoolState;
/// use balancer_maths::factory::DefaultPoolFactory;
///
/// let json = r#"{
///     "poolType": "STABLE",
///     "tokens": ["0xa", "0xb"],
///     "scalingFactors": ["1", "1"],
///     "tokenRates": ["1000000000000000000", "1000000000000000000"],
///     "balancesLiveScaled18": ["1000000000000000000000", "1000000000000000000000"],
///     "swapFee": "1000000000000000",
///     "totalSupply": "2000000000000000000000",
///     "amp": "1000000"
/// }"#;
/// let state: PoolState = serde_json::from_str(json).expect("valid snapshot");
/// let pool = DefaultPoolFactory::create(&state).expect("pool created");
/// assert_eq!(pool.pool_type(), "STABLE");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefaultPoolFactory;

impl DefaultPoolFactory {
    /// Builds the pool described by `state`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::UnsupportedPoolType`] for custom snapshots and for
    ///   families whose feature is disabled.
    /// - Any validation error from the pool's `from_config`.
    pub fn create(state: &PoolState) -> Result<PoolBox, AmmError> {
        match state {
            #[cfg(feature = "weighted")]
            PoolState::Weighted(s) => {
                let pool = crate::pools::weighted::WeightedPool::from_config(s)?;
                Ok(PoolBox::Weighted(Box::new(pool)))
            }

            #[cfg(feature = "stable")]
            PoolState::Stable(s) => {
                let pool = crate::pools::stable::StablePool::from_config(s)?;
                Ok(PoolBox::Stable(Box::new(pool)))
            }

            #[cfg(feature = "gyro")]
            PoolState::GyroEclp(s) => {
                let pool = crate::pools::gyro_eclp::GyroEclpPool::from_config(s)?;
                Ok(PoolBox::GyroEclp(Box::new(pool)))
            }

            #[cfg(feature = "gyro")]
            PoolState::Gyro2Clp(s) => {
                let pool = crate::pools::gyro_2clp::Gyro2ClpPool::from_config(s)?;
                Ok(PoolBox::Gyro2Clp(Box::new(pool)))
            }

            #[cfg(feature = "reclamm")]
            PoolState::ReClamm(s) => {
                let pool = crate::pools::reclamm::ReClammPool::from_config(s)?;
                Ok(PoolBox::ReClamm(Box::new(pool)))
            }

            #[cfg(feature = "reclamm")]
            PoolState::ReClammV2(s) => {
                let pool = crate::pools::reclamm_v2::ReClammV2Pool::from_config(s)?;
                Ok(PoolBox::ReClammV2(Box::new(pool)))
            }

            #[cfg(feature = "quantamm")]
            PoolState::QuantAmm(s) => {
                let pool = crate::pools::quantamm::QuantAmmPool::from_config(s)?;
                Ok(PoolBox::QuantAmm(Box::new(pool)))
            }

            #[cfg(feature = "liquidity-bootstrapping")]
            PoolState::LiquidityBootstrapping(s) => {
                let pool =
                    crate::pools::liquidity_bootstrapping::LiquidityBootstrappingPool::from_config(s)?;
                Ok(PoolBox::LiquidityBootstrapping(Box::new(pool)))
            }

            // Custom snapshots and families whose feature is disabled.
            #[allow(unreachable_patterns)]
            other => Err(AmmError::UnsupportedPoolType(other.pool_type().to_owned())),
        }
    }
}

#[cfg(all(test, feature = "all-pools"))]
#[allow(clippy::panic)]
mod tests {
    use ethnum::U256;

    use super::*;
    use crate::config::pool_state::tests::base;
    use crate::config::{StableState, WeightedState};
    use crate::domain::{SwapKind, SwapParams};
    use crate::math::WAD;
    use crate::traits::PoolBase;

    fn weighted() -> PoolState {
        PoolState::Weighted(WeightedState {
            base: base(2),
            weights: vec![WAD / 2, WAD / 2],
            version: 0,
        })
    }

    // -- dispatch -------------------------------------------------------------

    #[test]
    fn builds_matching_variant() {
        let Ok(pool) = DefaultPoolFactory::create(&weighted()) else {
            panic!("expected weighted pool");
        };
        assert!(matches!(pool, PoolBox::Weighted(_)));

        let stable = PoolState::Stable(StableState {
            base: base(3),
            amp: U256::new(200_000),
        });
        let Ok(pool) = DefaultPoolFactory::create(&stable) else {
            panic!("expected stable pool");
        };
        assert_eq!(pool.pool_type(), "STABLE");
    }

    #[test]
    fn built_pool_swaps() {
        let Ok(pool) = DefaultPoolFactory::create(&weighted()) else {
            panic!("expected weighted pool");
        };
        let params = SwapParams {
            swap_kind: SwapKind::GivenIn,
            amount_given_scaled18: WAD,
            balances_live_scaled18: vec![WAD * 100, WAD * 100],
            index_in: 0,
            index_out: 1,
        };
        let Ok(out) = pool.on_swap(&params) else {
            panic!("expected swap");
        };
        assert!(out < WAD);
    }

    // -- errors ---------------------------------------------------------------

    #[test]
    fn invalid_snapshot_rejected() {
        let PoolState::Weighted(mut s) = weighted() else {
            panic!("expected weighted state");
        };
        s.weights.pop();
        assert!(matches!(
            DefaultPoolFactory::create(&PoolState::Weighted(s)),
            Err(AmmError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn custom_state_is_unsupported() {
        let state = PoolState::Custom {
            pool_type: "MY_POOL".into(),
            base: base(2),
        };
        assert_eq!(
            DefaultPoolFactory::create(&state).err(),
            Some(AmmError::UnsupportedPoolType("MY_POOL".into()))
        );
    }
}
