//! Liquidity math shared by every pool.
//!
//! Unbalanced and single-token operations are priced as a proportional
//! operation plus an implicit swap.  The swap part is charged the pool's
//! swap fee, which is reported per token so the vault can take the
//! aggregate share.  Everything here goes through the pool's
//! [`PoolBase::compute_invariant`] and [`PoolBase::compute_balance`], so
//! any pool gets these operations for free.

use ethnum::U256;
use tracing::trace;

use crate::domain::Rounding;
use crate::error::AmmError;
use crate::math::checked::CheckedArithmetic;
use crate::math::{complement, div_down, div_up, mul_div_up, mul_down, mul_up};
use crate::pools::at;
use crate::traits::PoolBase;

/// Shares minted by an unbalanced add and the fee charged per token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityUnbalancedResult {
    pub bpt_amount_out: U256,
    pub swap_fee_amounts: Vec<U256>,
}

/// Single-token amount paid for an exact share amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquiditySingleTokenExactOutResult {
    pub amount_in_with_fee: U256,
    pub swap_fee_amounts: Vec<U256>,
}

/// Single-token amount received for an exact share amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquiditySingleTokenExactInResult {
    pub amount_out_with_fee: U256,
    pub swap_fee_amounts: Vec<U256>,
}

/// Shares burnt for an exact single-token amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquiditySingleTokenExactOutResult {
    pub bpt_amount_in: U256,
    pub swap_fee_amounts: Vec<U256>,
}

fn fee_vector(len: usize, index: usize, fee: U256) -> Vec<U256> {
    let mut fees = vec![U256::ZERO; len];
    if let Some(slot) = fees.get_mut(index) {
        *slot = fee;
    }
    fees
}

fn set(values: &mut [U256], index: usize, value: U256) -> Result<(), AmmError> {
    let slot = values
        .get_mut(index)
        .ok_or(AmmError::InvalidConfiguration("token index out of range"))?;
    *slot = value;
    Ok(())
}

/// Shares minted for `exact_amounts`.
///
/// Each new balance is shaded down by one wei.  The part of each deposit
/// above the proportional share is taxed at `swap_fee_percentage`.
///
/// # Errors
///
/// - [`AmmError::InvariantRatioAboveMax`] if the deposit grows the
///   invariant past `max_invariant_ratio`.
/// - Invariant and arithmetic errors.
pub fn compute_add_liquidity_unbalanced<P: PoolBase + ?Sized>(
    current_balances: &[U256],
    exact_amounts: &[U256],
    total_supply: U256,
    swap_fee_percentage: U256,
    max_invariant_ratio: U256,
    pool: &P,
) -> Result<AddLiquidityUnbalancedResult, AmmError> {
    if exact_amounts.len() != current_balances.len() {
        return Err(AmmError::InvalidConfiguration(
            "amounts must match the token count",
        ));
    }
    let mut new_balances = current_balances
        .iter()
        .zip(exact_amounts)
        .map(|(balance, amount)| balance.safe_add(*amount)?.safe_sub(U256::ONE))
        .collect::<Result<Vec<_>, _>>()?;

    let current_invariant = pool.compute_invariant(current_balances, Rounding::Up)?;
    let new_invariant = pool.compute_invariant(&new_balances, Rounding::Down)?;
    let invariant_ratio = div_down(new_invariant, current_invariant)?;
    if invariant_ratio > max_invariant_ratio {
        return Err(AmmError::InvariantRatioAboveMax);
    }

    let mut swap_fee_amounts = vec![U256::ZERO; current_balances.len()];
    for ((balance, new_balance), fee) in current_balances
        .iter()
        .zip(new_balances.iter_mut())
        .zip(swap_fee_amounts.iter_mut())
    {
        let proportional = mul_down(invariant_ratio, *balance)?;
        if *new_balance > proportional {
            *fee = mul_up(*new_balance - proportional, swap_fee_percentage)?;
            *new_balance = new_balance.safe_sub(*fee)?;
        }
    }

    let invariant_with_fees = pool.compute_invariant(&new_balances, Rounding::Down)?;
    let bpt_amount_out = total_supply
        .safe_mul(invariant_with_fees.safe_sub(current_invariant)?)?
        .safe_div(current_invariant)?;
    trace!(%invariant_ratio, %bpt_amount_out, "unbalanced add");
    Ok(AddLiquidityUnbalancedResult {
        bpt_amount_out,
        swap_fee_amounts,
    })
}

/// Amount of `token_in_index` needed to mint exactly
/// `exact_bpt_amount_out` shares.
///
/// # Errors
///
/// - [`AmmError::InvariantRatioAboveMax`] past `max_invariant_ratio`.
/// - Balance solver and arithmetic errors.
pub fn compute_add_liquidity_single_token_exact_out<P: PoolBase + ?Sized>(
    current_balances: &[U256],
    token_in_index: usize,
    exact_bpt_amount_out: U256,
    total_supply: U256,
    swap_fee_percentage: U256,
    max_invariant_ratio: U256,
    pool: &P,
) -> Result<AddLiquiditySingleTokenExactOutResult, AmmError> {
    let new_supply = exact_bpt_amount_out.safe_add(total_supply)?;
    let invariant_ratio = div_up(new_supply, total_supply)?;
    if invariant_ratio > max_invariant_ratio {
        return Err(AmmError::InvariantRatioAboveMax);
    }

    let balance = at(current_balances, token_in_index)?;
    let new_balance = pool.compute_balance(current_balances, token_in_index, invariant_ratio)?;
    let amount_in = new_balance.safe_sub(balance)?;

    let non_taxable_balance = div_down(mul_down(new_supply, balance)?, total_supply)?;
    let taxable_amount = amount_in.safe_add(balance)?.safe_sub(non_taxable_balance)?;
    let fee = div_up(taxable_amount, complement(swap_fee_percentage))?.safe_sub(taxable_amount)?;

    Ok(AddLiquiditySingleTokenExactOutResult {
        amount_in_with_fee: amount_in.safe_add(fee)?,
        swap_fee_amounts: fee_vector(current_balances.len(), token_in_index, fee),
    })
}

/// Pro-rata share of every balance for `bpt_amount_in`, rounded down.
///
/// # Errors
///
/// [`AmmError::DivisionByZero`] for an empty supply; overflow.
pub fn compute_proportional_amounts_out(
    balances: &[U256],
    bpt_total_supply: U256,
    bpt_amount_in: U256,
) -> Result<Vec<U256>, AmmError> {
    balances
        .iter()
        .map(|balance| balance.safe_mul(bpt_amount_in)?.safe_div(bpt_total_supply))
        .collect()
}

/// Amount of `token_out_index` received for burning exactly
/// `exact_bpt_amount_in` shares.
///
/// # Errors
///
/// - [`AmmError::InvariantRatioBelowMin`] below `min_invariant_ratio`.
/// - Balance solver and arithmetic errors.
pub fn compute_remove_liquidity_single_token_exact_in<P: PoolBase + ?Sized>(
    current_balances: &[U256],
    token_out_index: usize,
    exact_bpt_amount_in: U256,
    total_supply: U256,
    swap_fee_percentage: U256,
    min_invariant_ratio: U256,
    pool: &P,
) -> Result<RemoveLiquiditySingleTokenExactInResult, AmmError> {
    let new_supply = total_supply.safe_sub(exact_bpt_amount_in)?;
    let invariant_ratio = div_up(new_supply, total_supply)?;
    if invariant_ratio < min_invariant_ratio {
        return Err(AmmError::InvariantRatioBelowMin);
    }

    let balance = at(current_balances, token_out_index)?;
    let new_balance = pool.compute_balance(current_balances, token_out_index, invariant_ratio)?;
    let amount_out = balance.safe_sub(new_balance)?;

    let new_balance_before_tax = mul_div_up(new_supply, balance, total_supply)?;
    let taxable_amount = new_balance_before_tax.safe_sub(new_balance)?;
    let fee = mul_up(taxable_amount, swap_fee_percentage)?;

    Ok(RemoveLiquiditySingleTokenExactInResult {
        amount_out_with_fee: amount_out.safe_sub(fee)?,
        swap_fee_amounts: fee_vector(current_balances.len(), token_out_index, fee),
    })
}

/// Shares burnt to withdraw exactly `exact_amount_out` of
/// `token_out_index`.
///
/// Every balance is shaded down by one wei before the invariant is taken.
///
/// # Errors
///
/// - [`AmmError::InvariantRatioBelowMin`] below `min_invariant_ratio`.
/// - Invariant and arithmetic errors.
pub fn compute_remove_liquidity_single_token_exact_out<P: PoolBase + ?Sized>(
    current_balances: &[U256],
    token_out_index: usize,
    exact_amount_out: U256,
    total_supply: U256,
    swap_fee_percentage: U256,
    min_invariant_ratio: U256,
    pool: &P,
) -> Result<RemoveLiquiditySingleTokenExactOutResult, AmmError> {
    let mut new_balances = current_balances
        .iter()
        .map(|balance| balance.safe_sub(U256::ONE))
        .collect::<Result<Vec<_>, _>>()?;
    let shaded = at(&new_balances, token_out_index)?.safe_sub(exact_amount_out)?;
    set(&mut new_balances, token_out_index, shaded)?;

    let current_invariant = pool.compute_invariant(current_balances, Rounding::Up)?;
    let invariant_ratio = div_up(
        pool.compute_invariant(&new_balances, Rounding::Up)?,
        current_invariant,
    )?;
    if invariant_ratio < min_invariant_ratio {
        return Err(AmmError::InvariantRatioBelowMin);
    }

    let taxable_amount = mul_up(invariant_ratio, at(current_balances, token_out_index)?)?
        .safe_sub(shaded)?;
    let fee = div_up(taxable_amount, complement(swap_fee_percentage))?.safe_sub(taxable_amount)?;
    set(&mut new_balances, token_out_index, shaded.safe_sub(fee)?)?;

    let invariant_with_fees = pool.compute_invariant(&new_balances, Rounding::Down)?;
    let bpt_amount_in = mul_div_up(
        total_supply,
        current_invariant.safe_sub(invariant_with_fees)?,
        current_invariant,
    )?;
    trace!(%invariant_ratio, %bpt_amount_in, "single token exact out remove");
    Ok(RemoveLiquiditySingleTokenExactOutResult {
        bpt_amount_in,
        swap_fee_amounts: fee_vector(current_balances.len(), token_out_index, fee),
    })
}
