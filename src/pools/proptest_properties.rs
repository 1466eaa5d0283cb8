//! Property-based tests using `proptest` for pool and vault math.
//!
//! Covers six properties:
//!
//! 1. **Swap reversibility**: trading the output of a weighted GivenIn
//!    swap back against the post-swap balances never returns more than
//!    the original input.
//! 2. **Invariant preservation**: a stable swap or an unbalanced add never
//!    shrinks the invariant of any pool family; a proportional remove
//!    never grows it, whichever rounding is held fixed.
//! 3. **Rounding direction**: the `Up` and `Down` fixed-point primitives
//!    bracket each other within one wei; every invariant rounded up is at
//!    least the one rounded down.
//! 4. **Scaling round trip**: raw → scaled-18 → raw never gains value.
//! 5. **Liquidity conservation**: a proportional add followed by a
//!    proportional remove of the minted shares returns at most the
//!    deposit.
//! 6. **Buffer round trip**: wrap then unwrap loses at most two wei.

use ethnum::U256;
use proptest::prelude::*;

use crate::config::pool_state::tests::base;
use crate::config::WeightedState;
use crate::domain::{Rounding, SwapKind, SwapParams};
use crate::factory::DynPool;
use crate::math::fixed_point::mul_div_down;
use crate::math::{
    div_down, div_up, mul_div_up, mul_down, mul_up, to_raw_undo_rate_round_down,
    to_raw_undo_rate_round_up, to_scaled18_apply_rate_round_down, to_scaled18_apply_rate_round_up,
    WAD,
};
use crate::pools::buffer::{calculate_buffer_amounts, WrappingDirection};
use crate::pools::gyro_eclp::tests::pool as eclp_pool;
use crate::pools::liquidity_bootstrapping::tests::state as lbp_state;
use crate::pools::quantamm::tests::pool as quantamm_pool;
use crate::pools::reclamm::tests::params as reclamm_params;
use crate::pools::{
    reclamm, stable, Gyro2ClpPool, LiquidityBootstrappingPool, StablePool, WeightedPool,
};
use crate::traits::{FromConfig, PoolBase};
use crate::vault::base_pool_math::{
    compute_add_liquidity_unbalanced, compute_proportional_amounts_out,
};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn make_weighted(weight_in: u64) -> WeightedPool {
    let w_in = U256::from(weight_in) * U256::new(10_000_000_000_000_000);
    let state = WeightedState {
        base: base(2),
        weights: vec![w_in, WAD - w_in],
        version: 0,
    };
    let Ok(pool) = WeightedPool::from_config(&state) else {
        panic!("valid weighted state");
    };
    pool
}

/// The same pool with its tokens listed in the opposite order.
fn pool_reversed(weight_in: u64) -> WeightedPool {
    make_weighted(100 - weight_in)
}

fn swap(kind: SwapKind, amount: U256, balances: &[U256]) -> SwapParams {
    SwapParams {
        swap_kind: kind,
        amount_given_scaled18: amount,
        balances_live_scaled18: balances.to_vec(),
        index_in: 0,
        index_out: 1,
    }
}

fn wad(units: u64) -> U256 {
    U256::from(units) * WAD
}

// ---------------------------------------------------------------------------
// Custom strategies
// ---------------------------------------------------------------------------

/// Balances between one thousand and ten million tokens.
fn balance_strategy() -> impl Strategy<Value = u64> {
    1_000u64..=10_000_000u64
}

/// Weight of the token sold, in percent.
fn weight_strategy() -> impl Strategy<Value = u64> {
    2u64..=98u64
}

/// Amplification in [1, 5000], times the amp precision.
fn amp_strategy() -> impl Strategy<Value = U256> {
    (1u64..=5_000u64).prop_map(|a| U256::from(a) * U256::new(1_000))
}

/// Any 18-decimal value up to one trillion tokens.
fn fixed_strategy() -> impl Strategy<Value = U256> {
    (0u128..=1_000_000_000_000u128 * 1_000_000_000_000_000_000u128).prop_map(U256::new)
}

/// Token rates between 0.5 and 2.
fn rate_strategy() -> impl Strategy<Value = U256> {
    (500_000_000_000_000_000u128..=2_000_000_000_000_000_000u128).prop_map(U256::new)
}

// ---------------------------------------------------------------------------
// Property 1: Swap Reversibility
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_swap_reversibility_weighted(
        b_in in balance_strategy(),
        b_out in balance_strategy(),
        weight in weight_strategy(),
        bps in 1u64..=2_500u64,
    ) {
        let pool = make_weighted(weight);
        let balances = [wad(b_in), wad(b_out)];
        let amount_in = wad(b_in) * U256::from(bps) / U256::new(10_000);

        let Ok(out) = pool.on_swap(&swap(SwapKind::GivenIn, amount_in, &balances)) else {
            return Ok(());
        };
        if out == U256::ZERO { return Ok(()); }

        // Trade back against the post-swap balances, token 1 in, token 0 out.
        let after = [balances[1] - out, balances[0] + amount_in];
        if let Ok(returned) = pool_reversed(weight).on_swap(&swap(SwapKind::GivenIn, out, &after)) {
            prop_assert!(
                returned <= amount_in,
                "selling back {} returned {} > original {}",
                out, returned, amount_in
            );
        }
        if let Ok(cost) = pool_reversed(weight).on_swap(&swap(SwapKind::GivenOut, amount_in, &after)) {
            prop_assert!(
                cost >= out,
                "buying back {} cost {} < received {}",
                amount_in, cost, out
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Property 2: Invariant Preservation
// ---------------------------------------------------------------------------

/// Every pool family whose invariant backs unbalanced liquidity, with a
/// fixed 70/30 or mid-schedule weight where one applies.
fn invariant_pools(amp: U256) -> Vec<(&'static str, DynPool)> {
    let Ok(gyro_2clp) = Gyro2ClpPool::new(
        U256::new(997_000_000_000_000_000),
        U256::new(1_003_000_000_000_000_000),
    ) else {
        panic!("valid 2-CLP params");
    };
    let Ok(lbp) = LiquidityBootstrappingPool::from_config(&lbp_state(1_500)) else {
        panic!("valid bootstrapping state");
    };
    vec![
        ("weighted", Box::new(make_weighted(70)) as DynPool),
        ("stable", Box::new(StablePool::new(amp)) as DynPool),
        ("gyro_eclp", Box::new(eclp_pool()) as DynPool),
        ("gyro_2clp", Box::new(gyro_2clp) as DynPool),
        ("quantamm", Box::new(quantamm_pool(2_000)) as DynPool),
        ("liquidity_bootstrapping", Box::new(lbp) as DynPool),
    ]
}

fn rounding_strategy() -> impl Strategy<Value = Rounding> {
    prop_oneof![Just(Rounding::Down), Just(Rounding::Up)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_invariant_preservation_stable_swap(
        b_in in balance_strategy(),
        b_out in balance_strategy(),
        amp in amp_strategy(),
        bps in 1u64..=100u64,
    ) {
        let balances = [wad(b_in), wad(b_out)];
        let amount_in = wad(b_in) * U256::from(bps) / U256::new(10_000);
        let Ok(before) = stable::compute_invariant(amp, &balances) else {
            return Ok(());
        };
        let Ok(out) =
            stable::compute_out_given_exact_in(amp, &balances, 0, 1, amount_in, before)
        else {
            return Ok(());
        };

        let after_balances = [balances[0] + amount_in, balances[1] - out];
        let Ok(after) = stable::compute_invariant(amp, &after_balances) else {
            return Ok(());
        };

        prop_assert!(
            after >= before,
            "stable invariant decreased: {} -> {}",
            before, after
        );
    }

    #[test]
    fn prop_invariant_grows_on_unbalanced_add(
        b0 in balance_strategy(),
        b1 in balance_strategy(),
        amp in amp_strategy(),
        bps0 in 0u64..=10_000u64,
        bps1 in 10u64..=10_000u64,
        rounding in rounding_strategy(),
    ) {
        let balances = [wad(b0), wad(b1)];
        let added = [
            balances[0] + balances[0] * U256::from(bps0) / U256::new(10_000),
            balances[1] + balances[1] * U256::from(bps1) / U256::new(10_000),
        ];
        for (name, pool) in invariant_pools(amp) {
            let (Ok(before), Ok(after)) = (
                pool.compute_invariant(&balances, rounding),
                pool.compute_invariant(&added, rounding),
            ) else {
                continue;
            };
            prop_assert!(
                after >= before,
                "{} add shrank invariant: {} -> {}",
                name, before, after
            );
        }

        let virtual_balances = reclamm_params().last_virtual_balances;
        let (Ok(before), Ok(after)) = (
            reclamm::compute_invariant(&balances, &virtual_balances, rounding),
            reclamm::compute_invariant(&added, &virtual_balances, rounding),
        ) else {
            return Ok(());
        };
        prop_assert!(after >= before, "reclamm add shrank invariant: {} -> {}", before, after);
    }

    #[test]
    fn prop_invariant_shrinks_on_proportional_remove(
        b0 in balance_strategy(),
        b1 in balance_strategy(),
        amp in amp_strategy(),
        bps in 10u64..=9_000u64,
        rounding in rounding_strategy(),
    ) {
        let balances = [wad(b0), wad(b1)];
        let supply = wad(b0 + b1);
        let bpt_in = supply * U256::from(bps) / U256::new(10_000);
        let Ok(out) = compute_proportional_amounts_out(&balances, supply, bpt_in) else {
            return Ok(());
        };
        let remaining = [balances[0] - out[0], balances[1] - out[1]];
        for (name, pool) in invariant_pools(amp) {
            let (Ok(before), Ok(after)) = (
                pool.compute_invariant(&balances, rounding),
                pool.compute_invariant(&remaining, rounding),
            ) else {
                continue;
            };
            prop_assert!(
                after <= before,
                "{} remove grew invariant: {} -> {}",
                name, before, after
            );
        }

        let virtual_balances = reclamm_params().last_virtual_balances;
        let (Ok(before), Ok(after)) = (
            reclamm::compute_invariant(&balances, &virtual_balances, rounding),
            reclamm::compute_invariant(&remaining, &virtual_balances, rounding),
        ) else {
            return Ok(());
        };
        prop_assert!(after <= before, "reclamm remove grew invariant: {} -> {}", before, after);
    }
}

// ---------------------------------------------------------------------------
// Property 3: Rounding Direction
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_mul_up_brackets_mul_down(a in fixed_strategy(), b in fixed_strategy()) {
        let (Ok(down), Ok(up)) = (mul_down(a, b), mul_up(a, b)) else {
            return Ok(());
        };
        prop_assert!(down <= up);
        prop_assert!(up - down <= U256::ONE);
    }

    #[test]
    fn prop_div_up_brackets_div_down(a in fixed_strategy(), b in fixed_strategy()) {
        if b == U256::ZERO {
            prop_assert!(div_down(a, b).is_err());
            return Ok(());
        }
        let (Ok(down), Ok(up)) = (div_down(a, b), div_up(a, b)) else {
            return Ok(());
        };
        prop_assert!(down <= up);
        prop_assert!(up - down <= U256::ONE);
    }

    #[test]
    fn prop_mul_div_up_brackets_mul_div_down(
        a in fixed_strategy(),
        b in fixed_strategy(),
        c in fixed_strategy(),
    ) {
        let (Ok(down), Ok(up)) = (mul_div_down(a, b, c), mul_div_up(a, b, c)) else {
            return Ok(());
        };
        prop_assert!(down <= up);
        prop_assert!(up - down <= U256::ONE);
    }

    #[test]
    fn prop_invariant_rounding_brackets(
        b0 in balance_strategy(),
        b1 in balance_strategy(),
        amp in amp_strategy(),
    ) {
        let balances = [wad(b0), wad(b1)];
        for (name, pool) in invariant_pools(amp) {
            let (Ok(down), Ok(up)) = (
                pool.compute_invariant(&balances, Rounding::Down),
                pool.compute_invariant(&balances, Rounding::Up),
            ) else {
                continue;
            };
            prop_assert!(down <= up, "{} rounds up below down: {} > {}", name, down, up);
        }

        let stable = StablePool::new(amp);
        let (Ok(down), Ok(up)) = (
            stable.compute_invariant(&balances, Rounding::Down),
            stable.compute_invariant(&balances, Rounding::Up),
        ) else {
            return Ok(());
        };
        prop_assert_eq!(up, down + U256::ONE);
    }
}

// ---------------------------------------------------------------------------
// Property 4: Scaling Round Trip
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_scaling_round_trip_favors_vault(
        amount in 0u128..=u128::from(u64::MAX),
        decimals in 0u32..=18u32,
        rate in rate_strategy(),
    ) {
        let amount = U256::new(amount);
        let factor = U256::from(10u64).pow(18 - decimals);

        let Ok(scaled) = to_scaled18_apply_rate_round_down(amount, factor, rate) else {
            return Ok(());
        };
        let Ok(raw) = to_raw_undo_rate_round_down(scaled, factor, rate) else {
            return Ok(());
        };
        prop_assert!(raw <= amount, "round down gained: {} -> {}", amount, raw);

        let Ok(scaled) = to_scaled18_apply_rate_round_up(amount, factor, rate) else {
            return Ok(());
        };
        let Ok(raw) = to_raw_undo_rate_round_up(scaled, factor, rate) else {
            return Ok(());
        };
        prop_assert!(raw >= amount, "round up lost: {} -> {}", amount, raw);
    }
}

// ---------------------------------------------------------------------------
// Property 5: Liquidity Conservation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_proportional_round_trip_returns_at_most_deposit(
        b0 in balance_strategy(),
        b1 in balance_strategy(),
        weight in weight_strategy(),
        percent in 1u64..=100u64,
    ) {
        let pool = make_weighted(weight);
        let balances = [wad(b0), wad(b1)];
        let amounts: Vec<U256> = balances
            .iter()
            .map(|b| *b * U256::from(percent) / U256::new(100))
            .collect();
        let supply = wad(b0);

        let Ok(added) = compute_add_liquidity_unbalanced(
            &balances,
            &amounts,
            supply,
            U256::new(10_000_000_000_000_000),
            pool.get_maximum_invariant_ratio(),
            &pool,
        ) else {
            return Ok(());
        };
        let new_balances: Vec<U256> =
            balances.iter().zip(&amounts).map(|(b, a)| *b + *a).collect();
        let Ok(out) = compute_proportional_amounts_out(
            &new_balances,
            supply + added.bpt_amount_out,
            added.bpt_amount_out,
        ) else {
            return Ok(());
        };

        for (got, deposited) in out.iter().zip(&amounts) {
            prop_assert!(
                got <= deposited,
                "withdrew {} after depositing {}",
                got, deposited
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Property 6: Buffer Round Trip
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_wrap_then_unwrap_loses_at_most_two_wei(
        amount in 1_000_000u128..=u128::from(u64::MAX),
        rate in (1_000_000_000_000_000_000u128..=2_000_000_000_000_000_000u128)
            .prop_map(U256::new),
    ) {
        let amount = U256::new(amount);
        let Ok(shares) = calculate_buffer_amounts(
            WrappingDirection::Wrap,
            SwapKind::GivenIn,
            amount,
            rate,
            None,
            None,
        ) else {
            return Ok(());
        };
        let Ok(assets) = calculate_buffer_amounts(
            WrappingDirection::Unwrap,
            SwapKind::GivenIn,
            shares,
            rate,
            None,
            None,
        ) else {
            return Ok(());
        };

        prop_assert!(assets <= amount);
        prop_assert!(amount - assets <= U256::new(2));
    }
}
