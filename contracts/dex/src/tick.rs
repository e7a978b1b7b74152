use crate::incentives::update_pool_incentives;
use crate::storage::{get_tick, remove_tick, set_tick};
use crate::tick_bitmap::flip_tick;
use dex_math::{add_delta, tick_to_price};
use dex_types::{max_liquidity_per_tick, DexError, Pool, PoolId, Tick};
use soroban_sdk::{log, Env};

/// Per-liquidity accumulators tracked on both sides of every tick
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Growth {
    pub fee_0: u128,
    pub fee_1: u128,
    pub incentives: u128,
}

impl Growth {
    pub fn global(pool: &Pool) -> Self {
        Self {
            fee_0: pool.fee_growth_global_0,
            fee_1: pool.fee_growth_global_1,
            incentives: pool.incentives_per_liquidity,
        }
    }

    pub fn outside(info: &Tick) -> Self {
        Self {
            fee_0: info.fee_growth_outside_0,
            fee_1: info.fee_growth_outside_1,
            incentives: info.incentives_per_liq_outside,
        }
    }

    /// Component-wise modular difference; accumulators are allowed to wrap
    pub fn wrapping_sub(self, other: Self) -> Self {
        Self {
            fee_0: self.fee_0.wrapping_sub(other.fee_0),
            fee_1: self.fee_1.wrapping_sub(other.fee_1),
            incentives: self.incentives.wrapping_sub(other.incentives),
        }
    }

    fn write_outside(self, info: &mut Tick) {
        info.fee_growth_outside_0 = self.fee_0;
        info.fee_growth_outside_1 = self.fee_1;
        info.incentives_per_liq_outside = self.incentives;
    }
}

/// Load a tick, creating it when absent.
///
/// A new tick at or below the current price starts with the pool's global
/// accumulators as its outside values; one above the price starts at zero.
pub fn ensure_initialized(
    env: &Env,
    pool_id: &PoolId,
    pool: &Pool,
    tick: i32,
) -> Result<Tick, DexError> {
    if let Some(info) = get_tick(env, pool_id, tick) {
        return Ok(info);
    }

    let mut info = Tick::default();
    if pool.price() >= tick_to_price(tick)? {
        Growth::global(pool).write_outside(&mut info);
    }
    set_tick(env, pool_id, tick, &info);
    flip_tick(env, pool_id, tick, pool.tick_spacing);
    Ok(info)
}

/// Apply a position's liquidity delta to one of its boundary ticks.
/// The tick is deleted once no liquidity references it.
pub fn update(
    env: &Env,
    pool_id: &PoolId,
    pool: &Pool,
    tick: i32,
    liquidity_delta: i128,
    upper: bool,
) -> Result<(), DexError> {
    let mut info = ensure_initialized(env, pool_id, pool, tick)?;

    let liquidity_gross_after = add_delta(info.liquidity_gross, liquidity_delta)?;
    if liquidity_gross_after > max_liquidity_per_tick(pool.tick_spacing) {
        return Err(DexError::MathOverflow);
    }

    // Net liquidity is added at the lower tick and removed at the upper tick
    info.liquidity_net = if upper {
        info.liquidity_net.checked_sub(liquidity_delta)
    } else {
        info.liquidity_net.checked_add(liquidity_delta)
    }
    .ok_or(DexError::MathOverflow)?;
    info.liquidity_gross = liquidity_gross_after;

    if liquidity_gross_after == 0 && liquidity_delta != 0 {
        remove_tick(env, pool_id, tick);
        flip_tick(env, pool_id, tick, pool.tick_spacing);
    } else {
        set_tick(env, pool_id, tick, &info);
    }
    Ok(())
}

/// Cross a tick during a swap: flip its outside accumulators and move the
/// pool's active liquidity by the tick's net liquidity.
pub fn cross(
    env: &Env,
    pool_id: &PoolId,
    pool: &mut Pool,
    tick: i32,
    zero_for_one: bool,
    height: u32,
) -> Result<(), DexError> {
    update_pool_incentives(env, pool_id, pool, height)?;

    let mut info = get_tick(env, pool_id, tick).ok_or(DexError::NoTick)?;
    Growth::global(pool)
        .wrapping_sub(Growth::outside(&info))
        .write_outside(&mut info);
    set_tick(env, pool_id, tick, &info);

    let liquidity_delta = if zero_for_one {
        info.liquidity_net.checked_neg().ok_or(DexError::MathOverflow)?
    } else {
        info.liquidity_net
    };
    pool.liquidity = add_delta(pool.liquidity, liquidity_delta)?;

    log!(env, "tick crossed", tick, pool.liquidity);
    Ok(())
}

/// Accumulator growth inside [tick_lower, tick_upper)
///
/// Growth below the lower tick is its outside value when the price is at or
/// above it, and the complement otherwise; growth above the upper tick is its
/// outside value when the price is below it, and the complement otherwise.
pub fn growth_inside(
    env: &Env,
    pool_id: &PoolId,
    pool: &Pool,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<Growth, DexError> {
    let lower = get_tick(env, pool_id, tick_lower).ok_or(DexError::NoTick)?;
    let upper = get_tick(env, pool_id, tick_upper).ok_or(DexError::NoTick)?;
    let global = Growth::global(pool);

    let price = pool.price();
    let below = if price >= tick_to_price(tick_lower)? {
        Growth::outside(&lower)
    } else {
        global.wrapping_sub(Growth::outside(&lower))
    };

    let above = if price < tick_to_price(tick_upper)? {
        Growth::outside(&upper)
    } else {
        global.wrapping_sub(Growth::outside(&upper))
    };

    Ok(global.wrapping_sub(below).wrapping_sub(above))
}
