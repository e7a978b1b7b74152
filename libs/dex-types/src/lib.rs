#![no_std]

mod error;
mod pool;
mod position;
pub mod price;
mod tick;

pub use error::*;
pub use pool::*;
pub use position::*;
pub use tick::*;

/// Native 256-bit integer for square-root prices and wide intermediates
pub use ethnum::U256;

use soroban_sdk::BytesN;

/// Q96 constant (2^96) for fixed-point math
pub const Q96: u128 = 1 << 96;

/// Q96 as a 256-bit value, the square-root price of tick 0
pub const Q96_U256: U256 = U256::new(Q96);

/// Number of fractional bits in a Q96 value
pub const Q96_RESOLUTION: u32 = 96;

/// Minimum tick index, the most negative tick covered by the 20-bit power table
pub const MIN_TICK: i32 = -887272;

/// Maximum tick index
pub const MAX_TICK: i32 = 887272;

/// Minimum sqrt price, equal to `tick_to_price(MIN_TICK)`
pub const MIN_SQRT_RATIO: U256 = U256::new(4295128738);

/// Maximum sqrt price, equal to `tick_to_price(MAX_TICK)`
/// 1461446703485210103244672773725514033858003249342
pub const MAX_SQRT_RATIO: U256 =
    U256::from_words(4294805859, 318775800583714077815730976566823528638);

/// Fees and fee parts are expressed in parts per million of this value
/// 500 = 0.05%, 3000 = 0.3%, 10000 = 1%
pub const FEE_PARTITION: u32 = 1_000_000;

/// Largest tick spacing accepted for a fee tier
pub const MAX_TICK_SPACING: i32 = 16384;

/// Maximum number of tick crossings allowed per swap (and per hop of a route).
/// Each crossing costs one tick read and one tick write; the limit keeps a
/// swap below the host's 50 write-entry budget with room for pool state,
/// tick bitmap words and token balances.
pub const MAX_NUMBER_CROSSED_TICKS: u32 = 40;

/// Fee tiers registered at initialization: (fee, tick spacing)
pub const DEFAULT_FEE_TIERS: [(u32, i32); 4] = [(100, 2), (500, 10), (3000, 60), (10000, 200)];

/// Fee amount in hundredths of a basis point (1e-6)
pub type Fee = u32;

/// 32-byte pool identifier derived from (token0, token1, fee tier)
pub type PoolId = BytesN<32>;

/// Pool id followed by the big-endian position counter
pub type PositionId = BytesN<40>;

/// Calculate maximum liquidity per tick for a given tick spacing
pub fn max_liquidity_per_tick(tick_spacing: i32) -> u128 {
    let min_tick = (MIN_TICK / tick_spacing) * tick_spacing;
    let max_tick = (MAX_TICK / tick_spacing) * tick_spacing;
    let num_ticks = ((max_tick - min_tick) / tick_spacing) as u128 + 1;
    u128::MAX / num_ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fee_tiers_are_valid() {
        for (fee, spacing) in DEFAULT_FEE_TIERS {
            assert!(fee < FEE_PARTITION);
            assert!(spacing > 0 && spacing <= MAX_TICK_SPACING);
        }
    }

    #[test]
    fn test_max_liquidity_per_tick_shrinks_with_density() {
        assert!(max_liquidity_per_tick(1) < max_liquidity_per_tick(10));
        assert!(max_liquidity_per_tick(10) < max_liquidity_per_tick(200));
    }

    #[test]
    fn test_sqrt_ratio_bounds_ordered() {
        assert!(MIN_SQRT_RATIO < Q96_U256);
        assert!(Q96_U256 < MAX_SQRT_RATIO);
        // the upper bound does not fit in 128 bits
        assert_eq!(MAX_SQRT_RATIO.leading_zeros(), 96);
    }
}
