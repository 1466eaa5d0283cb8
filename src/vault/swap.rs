//! Swap orchestration.
//!
//! | Kind | Given scaled with | Fee | Calculated unscaled with |
//! |------|-------------------|-----|--------------------------|
//! | GivenIn | token in, round down | `mul_up(given, fee)` taken off the given amount | token out, rate rounded up, round down |
//! | GivenOut | token out, round up | `calc * fee / (1 - fee)` added to the calculated amount | token in, round up |

use ethnum::U256;
use tracing::{debug, trace, warn};

use super::{flags_of, Vault};
use crate::config::{BufferState, HookState, PoolState, PoolStateOrBuffer};
use crate::domain::{SwapInput, SwapKind, SwapParams};
use crate::error::AmmError;
use crate::math::checked::CheckedArithmetic;
use crate::math::{
    complement, compute_and_charge_aggregate_swap_fees, compute_rate_round_up, mul_div_up,
    mul_up, to_raw_undo_rate_round_down, to_raw_undo_rate_round_up,
    to_scaled18_apply_rate_round_down, to_scaled18_apply_rate_round_up,
};
use crate::pools::at;
use crate::traits::AfterSwapParams;

/// Smallest scaled-18 amount a swap may give or calculate.
pub const MINIMUM_TRADE_AMOUNT: U256 = U256::new(1_000_000);

fn ensure_valid_trade_amount(amount_scaled18: U256) -> Result<(), AmmError> {
    if amount_scaled18 < MINIMUM_TRADE_AMOUNT {
        warn!(%amount_scaled18, "trade amount below minimum");
        return Err(AmmError::TradeAmountTooSmall);
    }
    Ok(())
}

#[cfg(feature = "buffer")]
fn swap_buffer(input: &SwapInput, buffer: &BufferState) -> Result<U256, AmmError> {
    debug!(buffer = %buffer.pool_address, "routing swap through buffer");
    crate::pools::buffer::erc4626_buffer_wrap_or_unwrap(input, buffer)
}

#[cfg(not(feature = "buffer"))]
fn swap_buffer(_: &SwapInput, _: &BufferState) -> Result<U256, AmmError> {
    Err(AmmError::UnsupportedPoolType("BUFFER".to_owned()))
}

impl Vault {
    /// Quotes a swap in raw token units.
    ///
    /// For `GivenIn` the result is the amount of `token_out` received, for
    /// `GivenOut` the amount of `token_in` paid, fees included.  A zero
    /// amount quotes zero without touching the pool.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InputTokenNotFound`] / [`AmmError::OutputTokenNotFound`].
    /// - [`AmmError::TradeAmountTooSmall`] when the post-fee given amount or
    ///   the calculated amount is below [`MINIMUM_TRADE_AMOUNT`].
    /// - [`AmmError::BeforeSwapHookFailed`] / [`AmmError::AfterSwapHookFailed`].
    /// - Resolution errors and any error of the pool or buffer math.
    pub fn swap(
        &self,
        input: &SwapInput,
        state: &PoolStateOrBuffer,
        hook_state: Option<&HookState>,
    ) -> Result<U256, AmmError> {
        if input.amount_raw == U256::ZERO {
            return Ok(U256::ZERO);
        }
        match state {
            PoolStateOrBuffer::Pool(pool) => self.swap_pool(input, pool, hook_state),
            PoolStateOrBuffer::Buffer(buffer) => swap_buffer(input, buffer),
        }
    }

    fn swap_pool(
        &self,
        input: &SwapInput,
        state: &PoolState,
        hook_state: Option<&HookState>,
    ) -> Result<U256, AmmError> {
        let pool = self.resolve_pool(state)?;
        let hook = self.resolve_hook(state, hook_state)?;
        let flags = flags_of(hook.as_ref());

        let base = state.base();
        let index_in = base
            .token_index(input.token_in.as_str())
            .ok_or(AmmError::InputTokenNotFound)?;
        let index_out = base
            .token_index(input.token_out.as_str())
            .ok_or(AmmError::OutputTokenNotFound)?;
        let factors = &base.scaling_factors;
        let rates = &base.token_rates;
        let kind = input.swap_kind;

        let amount_given_scaled18 = match kind {
            SwapKind::GivenIn => to_scaled18_apply_rate_round_down(
                input.amount_raw,
                at(factors, index_in)?,
                at(rates, index_in)?,
            )?,
            SwapKind::GivenOut => to_scaled18_apply_rate_round_up(
                input.amount_raw,
                at(factors, index_out)?,
                at(rates, index_out)?,
            )?,
        };

        let mut params = SwapParams {
            swap_kind: kind,
            amount_given_scaled18,
            balances_live_scaled18: base.balances_live_scaled18.clone(),
            index_in,
            index_out,
        };

        if let Some(hook) = hook.as_ref().filter(|_| flags.should_call_before_swap) {
            let outcome = hook.get().on_before_swap(&params, hook.state)?;
            if !outcome.success || outcome.value.len() != params.balances_live_scaled18.len() {
                return Err(hook.failure(|pool_type, hook_type| AmmError::BeforeSwapHookFailed {
                    pool_type,
                    hook_type,
                }));
            }
            params.balances_live_scaled18 = outcome.value;
        }

        let mut swap_fee = base.swap_fee;
        if let Some(hook) = hook
            .as_ref()
            .filter(|_| flags.should_call_compute_dynamic_swap_fee)
        {
            let outcome = hook.get().on_compute_dynamic_swap_fee(&params, swap_fee, hook.state)?;
            if outcome.success {
                swap_fee = outcome.value;
            } else {
                debug!(%swap_fee, "dynamic fee declined, static fee kept");
            }
        }

        let mut total_swap_fee_scaled18 = U256::ZERO;
        if kind == SwapKind::GivenIn {
            total_swap_fee_scaled18 = mul_up(amount_given_scaled18, swap_fee)?;
            params.amount_given_scaled18 = amount_given_scaled18.safe_sub(total_swap_fee_scaled18)?;
        }

        ensure_valid_trade_amount(params.amount_given_scaled18)?;
        let amount_calculated_scaled18 = pool.math().on_swap(&params)?;
        ensure_valid_trade_amount(amount_calculated_scaled18)?;

        let amount_calculated_raw = match kind {
            // leaves the vault: round down
            SwapKind::GivenIn => to_raw_undo_rate_round_down(
                amount_calculated_scaled18,
                at(factors, index_out)?,
                compute_rate_round_up(at(rates, index_out)?),
            )?,
            // enters the vault: round up
            SwapKind::GivenOut => {
                total_swap_fee_scaled18 =
                    mul_div_up(amount_calculated_scaled18, swap_fee, complement(swap_fee))?;
                to_raw_undo_rate_round_up(
                    amount_calculated_scaled18.safe_add(total_swap_fee_scaled18)?,
                    at(factors, index_in)?,
                    at(rates, index_in)?,
                )?
            }
        };

        let aggregate_swap_fee = compute_and_charge_aggregate_swap_fees(
            total_swap_fee_scaled18,
            base.aggregate_swap_fee,
            factors,
            rates,
            index_in,
        )?;
        trace!(
            %amount_given_scaled18,
            %amount_calculated_scaled18,
            %swap_fee,
            %total_swap_fee_scaled18,
            %aggregate_swap_fee,
            "swap computed"
        );

        let (amount_in_scaled18, amount_out_scaled18) = match kind {
            SwapKind::GivenIn => (amount_given_scaled18, amount_calculated_scaled18),
            SwapKind::GivenOut => (amount_calculated_scaled18, amount_given_scaled18),
        };
        let balances = &params.balances_live_scaled18;
        let token_in_balance_scaled18 = at(balances, index_in)?
            .safe_add(amount_in_scaled18)?
            .safe_sub(aggregate_swap_fee)?;
        let token_out_balance_scaled18 = at(balances, index_out)?.safe_sub(amount_out_scaled18)?;

        let Some(hook) = hook.as_ref().filter(|_| flags.should_call_after_swap) else {
            return Ok(amount_calculated_raw);
        };
        let after = AfterSwapParams {
            kind,
            token_in: &input.token_in,
            token_out: &input.token_out,
            amount_in_scaled18,
            amount_out_scaled18,
            token_in_balance_scaled18,
            token_out_balance_scaled18,
            amount_calculated_scaled18,
            amount_calculated_raw,
        };
        let outcome = hook.get().on_after_swap(&after, hook.state)?;
        if !outcome.success {
            return Err(hook.failure(|pool_type, hook_type| AmmError::AfterSwapHookFailed {
                pool_type,
                hook_type,
            }));
        }
        if flags.enable_hook_adjusted_amounts {
            debug!(adjusted = %outcome.value, "after swap hook adjusted amount");
            return Ok(outcome.value);
        }
        Ok(amount_calculated_raw)
    }
}

#[cfg(all(test, feature = "all-pools"))]
#[allow(clippy::panic)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::pool_state::tests::base;
    use crate::config::BasePoolState;
    use crate::math::WAD;
    use crate::traits::{HookBase, HookFlags, HookOutcome};
    use crate::vault::tests::{custom_vault, stable_state};

    const E18: U256 = WAD;

    fn constant_sum(base: BasePoolState) -> PoolStateOrBuffer {
        crate::vault::tests::constant_sum(base).into()
    }

    fn vault() -> Vault {
        let mut vault = custom_vault();
        vault.register_hook(Probe);
        vault.register_hook(Fixed);
        vault.register_hook(Refuse);
        vault
    }

    fn hooked(hook_type: &str, fee: u128) -> (BasePoolState, HookState) {
        let mut b = base(2);
        b.swap_fee = U256::new(fee);
        b.hook_type = Some(hook_type.into());
        let state = HookState::Custom {
            hook_type: hook_type.into(),
            params: BTreeMap::new(),
        };
        (b, state)
    }

    fn given_in(amount: U256) -> SwapInput {
        SwapInput::new(SwapKind::GivenIn, amount, "0x0", "0x1")
    }

    /// Reports the post-swap balance of token in as the swap result.
    struct Probe;

    impl HookBase for Probe {
        fn hook_type(&self) -> &str {
            "Probe"
        }

        fn flags(&self) -> HookFlags {
            HookFlags {
                should_call_after_swap: true,
                enable_hook_adjusted_amounts: true,
                ..HookFlags::NONE
            }
        }

        fn on_after_swap(
            &self,
            params: &AfterSwapParams<'_>,
            _: &HookState,
        ) -> Result<HookOutcome<U256>, AmmError> {
            Ok(HookOutcome::accept(params.token_in_balance_scaled18))
        }
    }

    /// Overrides every swap result with 42, applied or not per `enable`.
    struct Fixed;

    impl HookBase for Fixed {
        fn hook_type(&self) -> &str {
            "Fixed"
        }

        fn flags(&self) -> HookFlags {
            HookFlags {
                should_call_after_swap: true,
                should_call_compute_dynamic_swap_fee: true,
                enable_hook_adjusted_amounts: true,
                ..HookFlags::NONE
            }
        }

        fn on_compute_dynamic_swap_fee(
            &self,
            _: &SwapParams,
            _: U256,
            _: &HookState,
        ) -> Result<HookOutcome<U256>, AmmError> {
            Ok(HookOutcome::reject(WAD / 2))
        }

        fn on_after_swap(
            &self,
            _: &AfterSwapParams<'_>,
            _: &HookState,
        ) -> Result<HookOutcome<U256>, AmmError> {
            Ok(HookOutcome::accept(U256::new(42)))
        }
    }

    struct Refuse;

    impl HookBase for Refuse {
        fn hook_type(&self) -> &str {
            "Refuse"
        }

        fn flags(&self) -> HookFlags {
            HookFlags {
                should_call_before_swap: true,
                ..HookFlags::NONE
            }
        }

        fn on_before_swap(
            &self,
            params: &SwapParams,
            _: &HookState,
        ) -> Result<HookOutcome<Vec<U256>>, AmmError> {
            Ok(HookOutcome::reject(params.balances_live_scaled18.clone()))
        }
    }

    // -- guards ---------------------------------------------------------------

    #[test]
    fn zero_amount_quotes_zero() {
        let input = given_in(U256::ZERO);
        assert_eq!(Vault::new().swap(&input, &stable_state().into(), None), Ok(U256::ZERO));
    }

    #[test]
    fn unknown_tokens() {
        let vault = Vault::new();
        let state = stable_state().into();
        let bad_in = SwapInput::new(SwapKind::GivenIn, E18, "0x9", "0x1");
        assert_eq!(vault.swap(&bad_in, &state, None), Err(AmmError::InputTokenNotFound));
        let bad_out = SwapInput::new(SwapKind::GivenIn, E18, "0x0", "0x9");
        assert_eq!(vault.swap(&bad_out, &state, None), Err(AmmError::OutputTokenNotFound));
    }

    #[test]
    fn dust_trades_rejected() {
        let input = given_in(U256::new(999_999));
        assert_eq!(
            Vault::new().swap(&input, &stable_state().into(), None),
            Err(AmmError::TradeAmountTooSmall)
        );
    }

    // -- built-in pools -------------------------------------------------------

    #[test]
    fn stable_swap_charges_fee() {
        let vault = Vault::new();
        let state = stable_state().into();
        assert_eq!(
            vault.swap(&given_in(E18), &state, None),
            Ok(U256::new(998_990_029_066_447_138))
        );
        let out = SwapInput::new(SwapKind::GivenOut, E18, "0x0", "0x1");
        assert_eq!(
            vault.swap(&out, &state, None),
            Ok(U256::new(1_001_011_002_109_035_634))
        );
    }

    // -- scaling --------------------------------------------------------------

    #[test]
    fn fees_and_rates_on_constant_sum() {
        let mut b = base(2);
        b.swap_fee = U256::new(10_000_000_000_000_000);
        let state = constant_sum(b.clone());
        let vault = vault();
        assert_eq!(
            vault.swap(&given_in(E18 * 10), &state, None),
            Ok(U256::new(9_900_000_000_000_000_000))
        );
        let out = SwapInput::new(SwapKind::GivenOut, E18 * 10, "0x0", "0x1");
        assert_eq!(
            vault.swap(&out, &state, None),
            Ok(U256::new(10_101_010_101_010_101_011))
        );

        // six-decimal token in at rate 2, token out at a rate just above 1.5
        b.scaling_factors = vec![U256::new(1_000_000_000_000), U256::ONE];
        b.token_rates = vec![E18 * 2, U256::new(1_500_000_000_000_000_001)];
        let state = constant_sum(b);
        assert_eq!(
            vault.swap(&given_in(U256::new(10_000_000)), &state, None),
            Ok(U256::new(13_199_999_999_999_999_982))
        );
        assert_eq!(vault.swap(&out, &state, None), Ok(U256::new(7_575_758)));
    }

    // -- hooks ----------------------------------------------------------------

    #[test]
    fn after_swap_sees_balances_net_of_aggregate_fee() {
        let (mut b, hook_state) = hooked("Probe", 10_000_000_000_000_000);
        b.aggregate_swap_fee = E18 / 2;
        let state = constant_sum(b);
        assert_eq!(
            vault().swap(&given_in(E18 * 10), &state, Some(&hook_state)),
            Ok(U256::new(109_950_000_000_000_000_000))
        );
    }

    #[test]
    fn after_swap_override_replaces_result() {
        let (b, hook_state) = hooked("Fixed", 10_000_000_000_000_000);
        let state = constant_sum(b);
        // the rejected dynamic fee leaves the static fee in place
        assert_eq!(
            vault().swap(&given_in(E18 * 10), &state, Some(&hook_state)),
            Ok(U256::new(42))
        );
    }

    #[test]
    fn before_swap_rejection_names_pool_and_hook() {
        let (b, hook_state) = hooked("Refuse", 0);
        let state = constant_sum(b);
        assert_eq!(
            vault().swap(&given_in(E18), &state, Some(&hook_state)),
            Err(AmmError::BeforeSwapHookFailed {
                pool_type: "CONSTANT_SUM".into(),
                hook_type: "Refuse".into(),
            })
        );
    }

    #[test]
    fn hooked_pool_without_state() {
        let (b, _) = hooked("Probe", 0);
        let state = constant_sum(b);
        assert_eq!(
            vault().swap(&given_in(E18), &state, None),
            Err(AmmError::MissingHookState("Probe".into()))
        );
    }

    // -- buffers --------------------------------------------------------------

    #[test]
    fn buffer_bypasses_pool_path() {
        use crate::pools::buffer::tests::{state, UNDERLYING, WRAPPED};

        let input = SwapInput::new(SwapKind::GivenIn, U256::new(100_000_000), WRAPPED, UNDERLYING);
        assert_eq!(
            Vault::new().swap(&input, &state().into(), None),
            Ok(U256::new(112_276_162))
        );
    }
}
