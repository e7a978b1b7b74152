use dex_types::{DexError, U256};

/// Full 256x256 -> 512-bit product as (high, low) words
pub fn full_mul(a: U256, b: U256) -> (U256, U256) {
    let (a1, a0) = a.into_words();
    let (b1, b0) = b.into_words();

    // each partial product of two 128-bit words fits in 256 bits
    let p00 = U256::new(a0) * U256::new(b0);
    let p01 = U256::new(a0) * U256::new(b1);
    let p10 = U256::new(a1) * U256::new(b0);
    let p11 = U256::new(a1) * U256::new(b1);

    let (mid, mid_carry) = p01.overflowing_add(p10);
    let (mid_hi, mid_lo) = mid.into_words();
    let (low, low_carry) = p00.overflowing_add(U256::from_words(mid_lo, 0));

    let high = p11
        .wrapping_add(U256::new(mid_hi))
        .wrapping_add(U256::from_words(u128::from(mid_carry), 0))
        .wrapping_add(U256::from(low_carry));
    (high, low)
}

/// floor((a * b) / denominator) and the remainder, with a 512-bit intermediate
fn mul_div_rem(a: U256, b: U256, denominator: U256) -> Result<(U256, U256), DexError> {
    if denominator == 0 {
        return Err(DexError::MathOverflow);
    }
    let (high, low) = full_mul(a, b);
    if high == 0 {
        return Ok(low.div_rem(denominator));
    }
    if high >= denominator {
        return Err(DexError::MathOverflow);
    }

    // restoring long division of (high, low) by the denominator; high < denominator
    // keeps the quotient within 256 bits
    let mut remainder = high;
    let mut quotient = U256::ZERO;
    for bit in (0..256u32).rev() {
        let carry = remainder.leading_zeros() == 0;
        remainder = (remainder << 1u32) | ((low >> bit) & U256::ONE);
        quotient <<= 1u32;
        if carry || remainder >= denominator {
            remainder = remainder.wrapping_sub(denominator);
            quotient |= U256::ONE;
        }
    }
    Ok((quotient, remainder))
}

/// Multiply and divide with 512-bit intermediate precision (rounds down)
/// Returns floor((a * b) / denominator)
pub fn mul_div_u256(a: U256, b: U256, denominator: U256) -> Result<U256, DexError> {
    mul_div_rem(a, b, denominator).map(|(quotient, _)| quotient)
}

/// Multiply and divide with 512-bit intermediate precision (rounds up)
/// Returns ceil((a * b) / denominator)
pub fn mul_div_u256_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, DexError> {
    let (quotient, remainder) = mul_div_rem(a, b, denominator)?;
    if remainder == 0 {
        Ok(quotient)
    } else {
        quotient.checked_add(U256::ONE).ok_or(DexError::MathOverflow)
    }
}

/// Multiply and divide with 256-bit intermediate precision (rounds down)
/// Returns floor((a * b) / denominator)
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, DexError> {
    to_u128(mul_div_u256(U256::new(a), U256::new(b), U256::new(denominator))?)
}

/// Multiply and divide with 256-bit intermediate precision (rounds up)
/// Returns ceil((a * b) / denominator)
pub fn mul_div_rounding_up(a: u128, b: u128, denominator: u128) -> Result<u128, DexError> {
    to_u128(mul_div_u256_rounding_up(
        U256::new(a),
        U256::new(b),
        U256::new(denominator),
    )?)
}

/// Divide two U256 values, rounding up when `round_up` is set
pub fn u256_div(numerator: U256, denominator: U256, round_up: bool) -> Result<U256, DexError> {
    let (quotient, remainder) = numerator
        .checked_div_rem(denominator)
        .ok_or(DexError::MathOverflow)?;
    if round_up && remainder != 0 {
        quotient.checked_add(U256::ONE).ok_or(DexError::MathOverflow)
    } else {
        Ok(quotient)
    }
}

/// Narrow a U256 to u128
pub fn to_u128(value: U256) -> Result<u128, DexError> {
    u128::try_from(value).map_err(|_| DexError::MathOverflow)
}

/// Unsigned division with rounding up
pub fn div_rounding_up(a: u128, b: u128) -> Result<u128, DexError> {
    if b == 0 {
        return Err(DexError::MathOverflow);
    }
    if a == 0 {
        return Ok(0);
    }
    Ok((a - 1) / b + 1)
}
