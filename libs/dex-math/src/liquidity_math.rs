use crate::full_math::{mul_div_u256, to_u128, u256_div};
use crate::sqrt_price_math::{get_amount0_delta, get_amount1_delta};
use dex_types::{DexError, Q96_U256, U256};

/// 2^192, one in Q96 squared
const Q192: U256 = U256::from_words(1 << 64, 0);

fn order(sqrt_ratio_a: U256, sqrt_ratio_b: U256) -> (U256, U256) {
    if sqrt_ratio_a > sqrt_ratio_b {
        (sqrt_ratio_b, sqrt_ratio_a)
    } else {
        (sqrt_ratio_a, sqrt_ratio_b)
    }
}

/// Calculate the largest liquidity the given token amounts pay for
pub fn get_liquidity_for_amounts(
    sqrt_price: U256,
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    amount0: u128,
    amount1: u128,
) -> Result<u128, DexError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = order(sqrt_ratio_a, sqrt_ratio_b);

    if sqrt_price < sqrt_ratio_lower {
        // Current price below range - all token0
        get_liquidity_for_amount0(sqrt_ratio_lower, sqrt_ratio_upper, amount0)
    } else if sqrt_price < sqrt_ratio_upper {
        // Current price in range - both tokens
        let liquidity0 = get_liquidity_for_amount0(sqrt_price, sqrt_ratio_upper, amount0)?;
        let liquidity1 = get_liquidity_for_amount1(sqrt_ratio_lower, sqrt_price, amount1)?;
        Ok(liquidity0.min(liquidity1))
    } else {
        // Current price above range - all token1
        get_liquidity_for_amount1(sqrt_ratio_lower, sqrt_ratio_upper, amount1)
    }
}

/// L = amount0 * 2^96 / (2^192 / lower - 2^192 / upper)
///
/// The denominator is rounded up so the liquidity never asks for more than
/// `amount0`.
fn get_liquidity_for_amount0(
    sqrt_ratio_lower: U256,
    sqrt_ratio_upper: U256,
    amount0: u128,
) -> Result<u128, DexError> {
    if sqrt_ratio_lower == 0 {
        return Err(DexError::InvalidPrice);
    }
    if sqrt_ratio_lower == sqrt_ratio_upper {
        return Ok(0);
    }
    let inv_lower = u256_div(Q192, sqrt_ratio_lower, true)?;
    let inv_upper = u256_div(Q192, sqrt_ratio_upper, false)?;
    let width = inv_lower - inv_upper;
    to_u128(mul_div_u256(U256::new(amount0), Q96_U256, width)?)
}

/// L = amount1 * 2^96 / (upper - lower)
fn get_liquidity_for_amount1(
    sqrt_ratio_lower: U256,
    sqrt_ratio_upper: U256,
    amount1: u128,
) -> Result<u128, DexError> {
    if sqrt_ratio_lower == sqrt_ratio_upper {
        return Ok(0);
    }
    to_u128(mul_div_u256(
        U256::new(amount1),
        Q96_U256,
        sqrt_ratio_upper - sqrt_ratio_lower,
    )?)
}

/// Token amounts for `liquidity` in a range, using the three-region rule.
///
/// Below the range everything is token0, at or above the upper bound
/// everything is token1, inside the range both tokens split at `sqrt_price`.
pub fn get_amounts_for_liquidity(
    sqrt_price: U256,
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<(u128, u128), DexError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = order(sqrt_ratio_a, sqrt_ratio_b);

    if sqrt_price < sqrt_ratio_lower {
        let amount0 = get_amount0_delta(sqrt_ratio_lower, sqrt_ratio_upper, liquidity, round_up)?;
        Ok((amount0, 0))
    } else if sqrt_price < sqrt_ratio_upper {
        let amount0 = get_amount0_delta(sqrt_price, sqrt_ratio_upper, liquidity, round_up)?;
        let amount1 = get_amount1_delta(sqrt_ratio_lower, sqrt_price, liquidity, round_up)?;
        Ok((amount0, amount1))
    } else {
        let amount1 = get_amount1_delta(sqrt_ratio_lower, sqrt_ratio_upper, liquidity, round_up)?;
        Ok((0, amount1))
    }
}

/// Add signed liquidity delta to unsigned liquidity
pub fn add_delta(liquidity: u128, delta: i128) -> Result<u128, DexError> {
    if delta < 0 {
        liquidity
            .checked_sub(delta.unsigned_abs())
            .ok_or(DexError::InsufficientLiquidity)
    } else {
        liquidity
            .checked_add(delta as u128)
            .ok_or(DexError::MathOverflow)
    }
}
