//! Vault: the orchestrator behind every quote.
//!
//! The [`Vault`] resolves a pool snapshot to its math and its hook, moves
//! amounts between the raw and scaled-18 domains, charges swap and
//! aggregate fees and runs the hook lifecycle around the pool call.  It
//! keeps no state between calls: every operation takes the full snapshot
//! and works on its own copy of the balances.
//!
//! | Operation | Entry point |
//! |-----------|-------------|
//! | Swap (pool or ERC-4626 buffer) | [`Vault::swap`] |
//! | Add liquidity | [`Vault::add_liquidity`] |
//! | Remove liquidity | [`Vault::remove_liquidity`] |
//!
//! # Resolution
//!
//! Built-in families dispatch through [`PoolBox`] and [`HookBox`].  A
//! [`PoolState::Custom`] snapshot or an unknown `hookType` is looked up in
//! the vault's [`PoolRegistry`] / [`HookRegistry`].
//!
//! ```text
//! hookType = None             => no hook
//! hookType = Some(t), known   => hook t, hook state required
//! hookType = Some(t), unknown => UnsupportedHookType(t)
//! ```

mod add_liquidity;
pub mod base_pool_math;
mod remove_liquidity;
mod swap;

use ethnum::U256;
use tracing::{debug, warn};

pub use swap::MINIMUM_TRADE_AMOUNT;

use crate::config::{BasePoolState, HookState, PoolState};
use crate::error::AmmError;
use crate::factory::{DefaultPoolFactory, DynPool, HookRegistry, PoolRegistry};
use crate::hooks::HookBox;
use crate::math::compute_and_charge_aggregate_swap_fees;
use crate::pools::{at, PoolBox};
use crate::traits::{HookBase, HookFlags, PoolBase};

/// Stateless quoting engine with optional custom pool and hook registries.
///
/// # Example
///
/// ```rust
/// use balancer_maths::config::PoolState;
/// use balancer_maths::domain::{SwapInput, SwapKind};
/// use balancer_maths::vault::Vault;
/// use ethnum::U256;
///
/// let json = r#"{
///     "poolType": "WEIGHTED",
///     "tokens": ["0xa", "0xb"],
///     "scalingFactors": ["1", "1"],
///     "tokenRates": ["1000000000000000000", "1000000000000000000"],
///     "balancesLiveScaled18": ["64000000000000000000", "40000000000000000000"],
///     "swapFee": "0",
///     "totalSupply": "100000000000000000000",
///     "weights": ["500000000000000000", "500000000000000000"]
/// }"#;
/// let state: PoolState = serde_json::from_str(json).expect("valid snapshot");
///
/// let vault = Vault::new();
/// let input = SwapInput::new(SwapKind::GivenIn, U256::new(1_000_000_000_000_000_000), "0xa", "0xb");
/// let out = vault.swap(&input, &state.into(), None).expect("swap quoted");
/// assert!(out > U256::ZERO);
/// ```
#[derive(Debug, Default)]
pub struct Vault {
    pools: PoolRegistry,
    hooks: HookRegistry,
}

impl Vault {
    /// A vault that only knows the built-in pools and hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the custom pool registry.
    #[must_use]
    pub fn with_pool_registry(mut self, pools: PoolRegistry) -> Self {
        self.pools = pools;
        self
    }

    /// Replaces the custom hook registry.
    #[must_use]
    pub fn with_hook_registry(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    /// Registers a custom pool constructor under `pool_type`.
    pub fn register_pool<F>(&mut self, pool_type: impl Into<String>, constructor: F)
    where
        F: Fn(&BasePoolState) -> Result<DynPool, AmmError> + Send + Sync + 'static,
    {
        self.pools.register(pool_type, constructor);
    }

    /// Registers a custom hook under its own `hook_type`.
    pub fn register_hook<H>(&mut self, hook: H)
    where
        H: HookBase + Send + Sync + 'static,
    {
        self.hooks.register(hook);
    }

    /// Custom pool constructors consulted for unknown `poolType` tags.
    #[must_use]
    pub const fn pool_registry(&self) -> &PoolRegistry {
        &self.pools
    }

    /// Custom hooks consulted for unknown `hookType` tags.
    #[must_use]
    pub const fn hook_registry(&self) -> &HookRegistry {
        &self.hooks
    }

    fn resolve_pool(&self, state: &PoolState) -> Result<ResolvedPool, AmmError> {
        debug!(pool_type = state.pool_type(), "resolving pool");
        match state {
            PoolState::Custom { pool_type, base } => {
                base.validate()?;
                self.pools.create(pool_type, base).map(ResolvedPool::Custom)
            }
            _ => DefaultPoolFactory::create(state).map(ResolvedPool::Builtin),
        }
    }

    fn resolve_hook<'a>(
        &'a self,
        state: &'a PoolState,
        hook_state: Option<&'a HookState>,
    ) -> Result<Option<ActiveHook<'a>>, AmmError> {
        let Some(hook_type) = state.base().hook_type.as_deref() else {
            return Ok(None);
        };
        let hook = match HookBox::from_hook_type(hook_type) {
            Some(builtin) => ResolvedHook::Builtin(builtin),
            None => self
                .hooks
                .get(hook_type)
                .map(ResolvedHook::Registered)
                .ok_or_else(|| AmmError::UnsupportedHookType(hook_type.to_owned()))?,
        };
        let hook_state =
            hook_state.ok_or_else(|| AmmError::MissingHookState(hook_type.to_owned()))?;
        debug!(hook_type, pool_type = state.pool_type(), "resolved hook");
        Ok(Some(ActiveHook {
            hook,
            state: hook_state,
            pool_type: state.pool_type(),
        }))
    }
}

/// Pool math selected for one call.
enum ResolvedPool {
    Builtin(PoolBox),
    Custom(DynPool),
}

impl ResolvedPool {
    fn math(&self) -> &dyn PoolBase {
        match self {
            Self::Builtin(pool) => pool,
            Self::Custom(pool) => pool.as_ref(),
        }
    }
}

enum ResolvedHook<'a> {
    Builtin(HookBox),
    Registered(&'a (dyn HookBase + Send + Sync)),
}

/// A hook together with the state it is called with.
struct ActiveHook<'a> {
    hook: ResolvedHook<'a>,
    state: &'a HookState,
    pool_type: &'a str,
}

impl ActiveHook<'_> {
    fn get(&self) -> &dyn HookBase {
        match &self.hook {
            ResolvedHook::Builtin(hook) => hook,
            ResolvedHook::Registered(hook) => *hook,
        }
    }

    fn flags(&self) -> HookFlags {
        self.get().flags()
    }

    /// Builds a hook protocol error naming this pool and hook, and logs it.
    fn failure(&self, make: fn(String, String) -> AmmError) -> AmmError {
        let hook_type = self.get().hook_type().to_owned();
        warn!(pool_type = self.pool_type, hook_type = %hook_type, "hook rejected operation");
        make(self.pool_type.to_owned(), hook_type)
    }
}

fn flags_of(hook: Option<&ActiveHook<'_>>) -> HookFlags {
    hook.map_or(HookFlags::NONE, ActiveHook::flags)
}

/// Aggregate share of each per-token swap fee, raw units.
fn aggregate_fees(
    swap_fee_amounts_scaled18: &[U256],
    base: &BasePoolState,
) -> Result<Vec<U256>, AmmError> {
    swap_fee_amounts_scaled18
        .iter()
        .enumerate()
        .map(|(index, &fee)| {
            compute_and_charge_aggregate_swap_fees(
                fee,
                base.aggregate_swap_fee,
                &base.scaling_factors,
                &base.token_rates,
                index,
            )
        })
        .collect()
}

/// Converts every scaled-18 amount back to raw units with `convert`.
fn unscale_all(
    amounts_scaled18: &[U256],
    base: &BasePoolState,
    convert: fn(U256, U256, U256) -> Result<U256, AmmError>,
) -> Result<Vec<U256>, AmmError> {
    amounts_scaled18
        .iter()
        .enumerate()
        .map(|(index, &amount)| {
            convert(
                amount,
                at(&base.scaling_factors, index)?,
                at(&base.token_rates, index)?,
            )
        })
        .collect()
}

fn require_unbalanced_liquidity(base: &BasePoolState) -> Result<(), AmmError> {
    if base.supports_unbalanced_liquidity {
        Ok(())
    } else {
        Err(AmmError::DoesNotSupportUnbalancedLiquidity)
    }
}

/// Combines every working balance with its delta through `op`.
fn apply_to_balances(
    balances: &mut [U256],
    deltas: &[U256],
    op: fn(U256, U256) -> Result<U256, AmmError>,
) -> Result<(), AmmError> {
    if balances.len() != deltas.len() {
        return Err(AmmError::InvalidConfiguration(
            "amounts and balances differ in length",
        ));
    }
    for (balance, &delta) in balances.iter_mut().zip(deltas) {
        *balance = op(*balance, delta)?;
    }
    Ok(())
}

#[cfg(all(test, feature = "all-pools"))]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::config::pool_state::tests::base;
    use crate::config::{ExitFeeHookState, StableState};
    use crate::domain::Rounding;
    use crate::domain::SwapParams;
    use crate::math::WAD;

    /// A pool resolved through the custom registry of [`custom_vault`].
    pub(crate) fn constant_sum(base: BasePoolState) -> PoolState {
        PoolState::Custom {
            pool_type: "CONSTANT_SUM".into(),
            base,
        }
    }

    pub(crate) fn custom_vault() -> Vault {
        let mut vault = Vault::new();
        vault.register_pool("CONSTANT_SUM", |_| Ok(Box::new(ConstantSum) as DynPool));
        vault
    }

    pub(crate) fn stable_state() -> PoolState {
        PoolState::Stable(StableState {
            base: base(2),
            amp: U256::new(1_000_000),
        })
    }

    /// Sum invariant with unit prices.
    pub(crate) struct ConstantSum;

    impl PoolBase for ConstantSum {
        fn on_swap(&self, params: &SwapParams) -> Result<U256, AmmError> {
            Ok(params.amount_given_scaled18)
        }

        fn compute_invariant(&self, balances: &[U256], _: Rounding) -> Result<U256, AmmError> {
            Ok(balances.iter().fold(U256::ZERO, |acc, b| acc + *b))
        }

        fn compute_balance(
            &self,
            balances: &[U256],
            token_in_index: usize,
            invariant_ratio: U256,
        ) -> Result<U256, AmmError> {
            let invariant = self.compute_invariant(balances, Rounding::Up)?;
            let target = crate::math::mul_up(invariant, invariant_ratio)?;
            Ok(target - (invariant - balances[token_in_index]))
        }

        fn get_maximum_invariant_ratio(&self) -> U256 {
            WAD * 10
        }

        fn get_minimum_invariant_ratio(&self) -> U256 {
            WAD / 10
        }

        fn get_max_swap_amount(&self, _: &crate::domain::MaxSwapParams<'_>) -> Result<U256, AmmError> {
            Ok(U256::MAX)
        }
    }

    // -- resolution -----------------------------------------------------------

    #[test]
    fn builtin_pool_resolves() {
        let vault = Vault::new();
        let Ok(pool) = vault.resolve_pool(&stable_state()) else {
            panic!("expected stable pool");
        };
        assert!(matches!(pool, ResolvedPool::Builtin(PoolBox::Stable(_))));
    }

    #[test]
    fn unregistered_custom_pool_is_unsupported() {
        let state = constant_sum(base(2));
        assert!(matches!(
            Vault::new().resolve_pool(&state),
            Err(AmmError::UnsupportedPoolType(t)) if t == "CONSTANT_SUM"
        ));
        assert!(matches!(
            custom_vault().resolve_pool(&state),
            Ok(ResolvedPool::Custom(_))
        ));
    }

    #[test]
    fn registered_pool_is_visible_through_the_registry() {
        let vault = custom_vault();
        assert!(vault.pool_registry().contains("CONSTANT_SUM"));
        assert!(Vault::new().pool_registry().is_empty());
        assert!(Vault::new().hook_registry().is_empty());
    }

    #[test]
    fn pool_without_hook_type_has_no_hook() {
        let state = stable_state();
        let vault = Vault::new();
        let Ok(hook) = vault.resolve_hook(&state, None) else {
            panic!("expected no hook");
        };
        assert!(hook.is_none());
        assert_eq!(flags_of(hook.as_ref()), HookFlags::NONE);
    }

    #[test]
    fn known_hook_requires_state() {
        let mut state = stable_state();
        if let PoolState::Stable(s) = &mut state {
            s.base.hook_type = Some("ExitFee".into());
        }
        let vault = Vault::new();
        assert_eq!(
            vault.resolve_hook(&state, None).err(),
            Some(AmmError::MissingHookState("ExitFee".into()))
        );

        let hook_state = HookState::ExitFee(ExitFeeHookState {
            tokens: vec![],
            remove_liquidity_hook_fee_percentage: U256::ZERO,
        });
        let Ok(Some(hook)) = vault.resolve_hook(&state, Some(&hook_state)) else {
            panic!("expected exit fee hook");
        };
        assert!(hook.flags().should_call_after_remove_liquidity);
        assert_eq!(hook.get().hook_type(), "ExitFee");
    }

    #[test]
    fn unknown_hook_type_is_unsupported() {
        let mut state = stable_state();
        if let PoolState::Stable(s) = &mut state {
            s.base.hook_type = Some("Mystery".into());
        }
        assert_eq!(
            Vault::new().resolve_hook(&state, None).err(),
            Some(AmmError::UnsupportedHookType("Mystery".into()))
        );
    }

    #[test]
    fn balance_deltas_must_align() {
        let mut balances = vec![U256::ONE, U256::ONE];
        assert!(apply_to_balances(&mut balances, &[U256::ONE], |a, b| Ok(a + b)).is_err());
        assert!(apply_to_balances(&mut balances, &[U256::ONE, U256::new(2)], |a, b| Ok(a + b)).is_ok());
        assert_eq!(balances, vec![U256::new(2), U256::new(3)]);
    }
}
