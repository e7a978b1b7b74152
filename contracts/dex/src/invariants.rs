// ============================================================================
// INVARIANTS MODULE
// ============================================================================
//
// Properties of pool, tick and position state checked after every step of
// the contract-level tests.
//
// 1. PRICE: the pool price stays within [MIN_SQRT_RATIO, MAX_SQRT_RATIO]
// 2. LIQUIDITY: liquidity_net sums to zero over a pool's ticks, and the
//    active liquidity equals the net liquidity of every tick at or below
//    the price
// 3. TICK BITMAP: every set bit is a tick on the pool's spacing with a
//    record that some position still references
// 4. FEES: accumulators only move forward (modulo wrapping)
// 5. POSITIONS: ranges are ordered, on spacing and inside the tick range
//
// ============================================================================

use crate::storage::get_tick;
use crate::tick_bitmap::next_initialized_tick;
use dex_math::tick_to_price;
use dex_types::{Pool, PoolId, Position, MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
use soroban_sdk::{Env, Vec};

/// Ticks set in the pool's bitmap, in ascending order
fn initialized_ticks(env: &Env, pool_id: &PoolId, tick_spacing: i32) -> Vec<i32> {
    let mut ticks = Vec::new(env);
    let mut tick = MIN_TICK - 1;
    while let Some(next) = next_initialized_tick(env, pool_id, tick, tick_spacing, false) {
        ticks.push_back(next);
        tick = next;
    }
    ticks
}

// ============================================================================
// PRICE INVARIANTS
// ============================================================================

pub fn price_in_bounds(pool: &Pool) -> bool {
    (MIN_SQRT_RATIO..=MAX_SQRT_RATIO).contains(&pool.price())
}

// ============================================================================
// LIQUIDITY INVARIANTS
// ============================================================================

/// sum(tick.liquidity_net) == 0 over every tick of the pool
pub fn liquidity_net_sums_to_zero(env: &Env, pool_id: &PoolId, pool: &Pool) -> bool {
    let mut total: i128 = 0;
    for tick in initialized_ticks(env, pool_id, pool.tick_spacing).iter() {
        match get_tick(env, pool_id, tick) {
            Some(info) => total += info.liquidity_net,
            None => return false,
        }
    }
    total == 0
}

/// pool.liquidity == sum(liquidity_net) over ticks with tick_to_price(t) <= price
pub fn active_liquidity_consistent(env: &Env, pool_id: &PoolId, pool: &Pool) -> bool {
    let mut active: i128 = 0;
    for tick in initialized_ticks(env, pool_id, pool.tick_spacing).iter() {
        let Ok(price) = tick_to_price(tick) else {
            return false;
        };
        if price > pool.price() {
            break;
        }
        match get_tick(env, pool_id, tick) {
            Some(info) => active += info.liquidity_net,
            None => return false,
        }
    }
    active >= 0 && active as u128 == pool.liquidity
}

// ============================================================================
// TICK BITMAP INVARIANTS
// ============================================================================

/// Every bitmap tick is on spacing and has a record with liquidity_gross > 0
pub fn bitmap_matches_ticks(env: &Env, pool_id: &PoolId, pool: &Pool) -> bool {
    initialized_ticks(env, pool_id, pool.tick_spacing).iter().all(|tick| {
        tick % pool.tick_spacing == 0
            && get_tick(env, pool_id, tick).is_some_and(|info| info.liquidity_gross > 0)
    })
}

// ============================================================================
// FEE INVARIANTS
// ============================================================================

/// New growth is ahead of old growth by less than half the u128 range
pub fn fee_growth_monotonic(old_growth: u128, new_growth: u128) -> bool {
    new_growth.wrapping_sub(old_growth) < u128::MAX / 2
}

// ============================================================================
// POSITION INVARIANTS
// ============================================================================

pub fn position_range_valid(position: &Position, tick_spacing: i32) -> bool {
    position.tick_lower < position.tick_upper
        && position.tick_lower >= MIN_TICK
        && position.tick_upper <= MAX_TICK
        && position.tick_lower % tick_spacing == 0
        && position.tick_upper % tick_spacing == 0
}

/// Every invariant of a pool's stored state
pub fn pool_consistent(env: &Env, pool_id: &PoolId, pool: &Pool) -> bool {
    price_in_bounds(pool)
        && bitmap_matches_ticks(env, pool_id, pool)
        && liquidity_net_sums_to_zero(env, pool_id, pool)
        && active_liquidity_consistent(env, pool_id, pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_pool, with_contract};
    use crate::tick::update;
    use crate::tick::ensure_initialized;
    use dex_types::Q96_U256;
    use soroban_sdk::testutils::Address as _;
    use soroban_sdk::{Address, BytesN};

    #[test]
    fn test_price_in_bounds() {
        let env = Env::default();
        let mut pool = sample_pool(&env, Q96_U256);
        assert!(price_in_bounds(&pool));
        pool.set_price(MIN_SQRT_RATIO);
        assert!(price_in_bounds(&pool));
        pool.set_price(MAX_SQRT_RATIO);
        assert!(price_in_bounds(&pool));
        pool.set_price(MIN_SQRT_RATIO - 1);
        assert!(!price_in_bounds(&pool));
        pool.set_price(MAX_SQRT_RATIO + 1);
        assert!(!price_in_bounds(&pool));
    }

    #[test]
    fn test_liquidity_invariants() {
        let env = Env::default();
        with_contract(&env, || {
            let id = BytesN::from_array(&env, &[2u8; 32]);
            let mut pool = sample_pool(&env, Q96_U256);
            update(&env, &id, &pool, -20, 700, false).unwrap();
            update(&env, &id, &pool, 20, 700, true).unwrap();
            update(&env, &id, &pool, 30, 100, false).unwrap();

            // the open-ended range breaks the net sum
            assert!(!liquidity_net_sums_to_zero(&env, &id, &pool));
            update(&env, &id, &pool, 40, 100, true).unwrap();
            assert!(liquidity_net_sums_to_zero(&env, &id, &pool));
            assert!(bitmap_matches_ticks(&env, &id, &pool));

            assert!(!active_liquidity_consistent(&env, &id, &pool));
            pool.liquidity = 700;
            assert!(active_liquidity_consistent(&env, &id, &pool));
            assert!(pool_consistent(&env, &id, &pool));
        });
    }

    #[test]
    fn test_unreferenced_tick_breaks_bitmap_invariant() {
        let env = Env::default();
        with_contract(&env, || {
            let id = BytesN::from_array(&env, &[3u8; 32]);
            let pool = sample_pool(&env, Q96_U256);
            update(&env, &id, &pool, -20, 700, false).unwrap();
            update(&env, &id, &pool, 20, 700, true).unwrap();
            assert!(bitmap_matches_ticks(&env, &id, &pool));

            ensure_initialized(&env, &id, &pool, 100).unwrap();
            assert!(!bitmap_matches_ticks(&env, &id, &pool));
        });
    }

    #[test]
    fn test_fee_growth_monotonic() {
        assert!(fee_growth_monotonic(100, 200));
        assert!(fee_growth_monotonic(u128::MAX - 5, 10));
        assert!(!fee_growth_monotonic(200, 100));
    }

    #[test]
    fn test_position_range_valid() {
        let env = Env::default();
        let owner = Address::generate(&env);
        assert!(position_range_valid(&Position::new(owner.clone(), -60, 60), 60));
        assert!(!position_range_valid(&Position::new(owner.clone(), -60, 90), 60));
        assert!(!position_range_valid(&Position::new(owner, 60, -60), 60));
    }
}
