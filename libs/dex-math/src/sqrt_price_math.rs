use crate::full_math::{mul_div_u256, mul_div_u256_rounding_up, to_u128, u256_div};
use dex_types::{DexError, Q96_RESOLUTION, Q96_U256, U256};

fn order(sqrt_ratio_a: U256, sqrt_ratio_b: U256) -> (U256, U256) {
    if sqrt_ratio_a > sqrt_ratio_b {
        (sqrt_ratio_b, sqrt_ratio_a)
    } else {
        (sqrt_ratio_a, sqrt_ratio_b)
    }
}

/// liquidity * 2^96, below 2^224
fn liquidity_x96(liquidity: u128) -> U256 {
    U256::new(liquidity) << Q96_RESOLUTION
}

/// Amount of token0 between two prices: L * 2^96 / lower - L * 2^96 / upper
///
/// Each quotient is rounded so that the difference rounds in the requested
/// direction; the result is never more than two units away from the exact value.
pub fn get_amount0_delta(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<u128, DexError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = order(sqrt_ratio_a, sqrt_ratio_b);
    if sqrt_ratio_lower == 0 {
        return Err(DexError::InvalidPrice);
    }
    if sqrt_ratio_lower == sqrt_ratio_upper || liquidity == 0 {
        return Ok(0);
    }

    let numerator = liquidity_x96(liquidity);
    let at_lower = u256_div(numerator, sqrt_ratio_lower, round_up)?;
    let at_upper = u256_div(numerator, sqrt_ratio_upper, !round_up)?;

    if at_upper >= at_lower {
        return Ok(0);
    }
    to_u128(at_lower - at_upper)
}

/// Amount of token1 between two prices: L * (upper - lower) / 2^96
pub fn get_amount1_delta(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<u128, DexError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = order(sqrt_ratio_a, sqrt_ratio_b);
    let width = sqrt_ratio_upper - sqrt_ratio_lower;

    let amount = if round_up {
        mul_div_u256_rounding_up(U256::new(liquidity), width, Q96_U256)?
    } else {
        mul_div_u256(U256::new(liquidity), width, Q96_U256)?
    };
    to_u128(amount)
}

/// Price after adding `amount_in` of the input token
pub fn get_next_sqrt_price_from_input(
    sqrt_price: U256,
    liquidity: u128,
    amount_in: u128,
    zero_for_one: bool,
) -> Result<U256, DexError> {
    if sqrt_price == 0 {
        return Err(DexError::InvalidPrice);
    }
    if liquidity == 0 {
        return Err(DexError::InsufficientLiquidity);
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount0_rounding_up(sqrt_price, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount1_rounding_down(sqrt_price, liquidity, amount_in, true)
    }
}

/// Price after removing `amount_out` of the output token
pub fn get_next_sqrt_price_from_output(
    sqrt_price: U256,
    liquidity: u128,
    amount_out: u128,
    zero_for_one: bool,
) -> Result<U256, DexError> {
    if sqrt_price == 0 {
        return Err(DexError::InvalidPrice);
    }
    if liquidity == 0 {
        return Err(DexError::InsufficientLiquidity);
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount1_rounding_down(sqrt_price, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount0_rounding_up(sqrt_price, liquidity, amount_out, false)
    }
}

/// new = L * 2^96 / (L * 2^96 / price ± amount), rounded up
fn get_next_sqrt_price_from_amount0_rounding_up(
    sqrt_price: U256,
    liquidity: u128,
    amount: u128,
    add: bool,
) -> Result<U256, DexError> {
    if amount == 0 {
        return Ok(sqrt_price);
    }

    let numerator = liquidity_x96(liquidity);
    let base = u256_div(numerator, sqrt_price, false)?;
    let amount = U256::new(amount);

    let denominator = if add {
        base.checked_add(amount).ok_or(DexError::MathOverflow)?
    } else {
        if base <= amount {
            return Err(DexError::InsufficientLiquidity);
        }
        base - amount
    };

    u256_div(numerator, denominator, true)
}

/// new = price ± amount * 2^96 / L, rounded down
fn get_next_sqrt_price_from_amount1_rounding_down(
    sqrt_price: U256,
    liquidity: u128,
    amount: u128,
    add: bool,
) -> Result<U256, DexError> {
    if add {
        let quotient = mul_div_u256(U256::new(amount), Q96_U256, U256::new(liquidity))?;
        sqrt_price.checked_add(quotient).ok_or(DexError::MathOverflow)
    } else {
        let quotient =
            mul_div_u256_rounding_up(U256::new(amount), Q96_U256, U256::new(liquidity))?;
        if sqrt_price <= quotient {
            return Err(DexError::InsufficientLiquidity);
        }
        Ok(sqrt_price - quotient)
    }
}
