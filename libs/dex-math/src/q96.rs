//! Q96 fixed-point arithmetic.
//!
//! A Q96 value `v` represents the rational `v / 2^96`. Every operation names its
//! rounding direction; the plain variants round down.

use crate::full_math::{mul_div_u256, mul_div_u256_rounding_up};
use dex_types::{DexError, Q96_RESOLUTION, Q96_U256, U256};
use soroban_sdk::{BytesN, Env};

/// 2^192, the square of one in Q96
const Q192: U256 = U256::from_words(1 << 64, 0);

pub fn add(a: U256, b: U256) -> Result<U256, DexError> {
    a.checked_add(b).ok_or(DexError::MathOverflow)
}

pub fn sub(a: U256, b: U256) -> Result<U256, DexError> {
    a.checked_sub(b).ok_or(DexError::MathOverflow)
}

/// a * b, rounded down
pub fn mul(a: U256, b: U256) -> Result<U256, DexError> {
    mul_div_u256(a, b, Q96_U256)
}

/// a * b, rounded up
pub fn mul_round_up(a: U256, b: U256) -> Result<U256, DexError> {
    mul_div_u256_rounding_up(a, b, Q96_U256)
}

/// a / b, rounded down
pub fn div(a: U256, b: U256) -> Result<U256, DexError> {
    mul_div_u256(a, Q96_U256, b)
}

/// a / b, rounded up
pub fn div_round_up(a: U256, b: U256) -> Result<U256, DexError> {
    mul_div_u256_rounding_up(a, Q96_U256, b)
}

/// 1 / a, rounded down
pub fn inv(a: U256) -> Result<U256, DexError> {
    mul_div_u256(Q96_U256, Q96_U256, a)
}

/// a^2, rounded down
pub fn square(a: U256) -> Result<U256, DexError> {
    mul(a, a)
}

/// 1 / a^2, rounded down
///
/// Both divisions floor, which equals a single floor of the exact quotient.
pub fn inv_square(a: U256) -> Result<U256, DexError> {
    let over_a = mul_div_u256(Q192, Q96_U256, a)?;
    over_a.checked_div(a).ok_or(DexError::MathOverflow)
}

/// Integer to Q96; any u128 fits
pub fn from_int(n: u128) -> U256 {
    U256::new(n) << Q96_RESOLUTION
}

/// Integer part of a Q96 value (floor)
pub fn round_down(v: U256) -> U256 {
    v >> Q96_RESOLUTION
}

/// Smallest integer not below a Q96 value (ceil)
pub fn round_up(v: U256) -> U256 {
    let fraction = v & (Q96_U256 - 1);
    round_down(v) + U256::from(fraction != 0)
}

/// Canonical 32-byte big-endian encoding
pub fn encode(env: &Env, v: U256) -> BytesN<32> {
    BytesN::from_array(env, &v.to_be_bytes())
}

pub fn decode(bytes: &BytesN<32>) -> U256 {
    U256::from_be_bytes(bytes.to_array())
}

/// Canonical 16-byte two's complement big-endian encoding of a signed value
pub fn encode_signed(env: &Env, v: i128) -> BytesN<16> {
    BytesN::from_array(env, &v.to_be_bytes())
}

pub fn decode_signed(bytes: &BytesN<16>) -> i128 {
    i128::from_be_bytes(bytes.to_array())
}
