use crate::custody;
use crate::fees::settle;
use crate::incentives::update_pool_incentives;
use crate::storage::{
    get_config, get_global, get_pool, get_position, remove_position, set_global, set_pool,
    set_position,
};
use crate::tick::{ensure_initialized, update as update_tick};
use dex_math::{add_delta, get_amounts_for_liquidity, tick_to_price};
use dex_types::{Collected, DexError, Pool, PoolId, Position, PositionId, MAX_TICK, MIN_TICK};
use soroban_sdk::{log, Address, BytesN, Env};

/// Position id: the pool id followed by the big-endian position counter
pub fn position_id(env: &Env, pool_id: &PoolId, counter: u64) -> PositionId {
    let mut bytes = [0u8; 40];
    bytes[..32].copy_from_slice(&pool_id.to_array());
    bytes[32..].copy_from_slice(&counter.to_be_bytes());
    BytesN::from_array(env, &bytes)
}

/// Pool a position belongs to (the 32-byte prefix of its id)
pub fn pool_id_of(env: &Env, position_id: &PositionId) -> PoolId {
    let bytes = position_id.to_array();
    let mut prefix = [0u8; 32];
    prefix.copy_from_slice(&bytes[..32]);
    BytesN::from_array(env, &prefix)
}

fn validate_ticks(tick_lower: i32, tick_upper: i32, tick_spacing: i32) -> Result<(), DexError> {
    if tick_lower >= tick_upper || tick_lower < MIN_TICK || tick_upper > MAX_TICK {
        return Err(DexError::InvalidTicks);
    }
    if tick_lower % tick_spacing != 0 || tick_upper % tick_spacing != 0 {
        return Err(DexError::InvalidTickSpacing);
    }
    Ok(())
}

/// Register a position record with no liquidity yet, creating both boundary
/// ticks if they do not exist.
fn open(
    env: &Env,
    owner: &Address,
    pool_id: &PoolId,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<PositionId, DexError> {
    let pool = get_pool(env, pool_id)?;
    validate_ticks(tick_lower, tick_upper, pool.tick_spacing)?;

    ensure_initialized(env, pool_id, &pool, tick_lower)?;
    ensure_initialized(env, pool_id, &pool, tick_upper)?;

    let mut global = get_global(env)?;
    let id = position_id(env, pool_id, global.position_counter);
    global.position_counter = global
        .position_counter
        .checked_add(1)
        .ok_or(DexError::MathOverflow)?;
    set_global(env, &global);

    set_position(env, &id, &Position::new(owner.clone(), tick_lower, tick_upper));
    Ok(id)
}

/// Open a position in `pool_id` owned by `owner` and deposit `liquidity` into it.
///
/// A position always carries liquidity, so ticks are never left behind with
/// nothing referencing them. Returns the new id and the token amounts paid in.
pub fn create_position(
    env: &Env,
    owner: &Address,
    pool_id: &PoolId,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
    height: u32,
) -> Result<(PositionId, u128, u128), DexError> {
    let liquidity_delta = i128::try_from(liquidity).map_err(|_| DexError::InvalidAmount)?;
    if liquidity_delta == 0 {
        return Err(DexError::InvalidAmount);
    }

    let id = open(env, owner, pool_id, tick_lower, tick_upper)?;
    log!(env, "position created", id.clone(), tick_lower, tick_upper);

    let (amount0, amount1) = update_position(env, owner, &id, liquidity_delta, height)?;
    Ok((id, amount0, amount1))
}

fn get_owned_position(
    env: &Env,
    caller: &Address,
    position_id: &PositionId,
) -> Result<Position, DexError> {
    let position = get_position(env, position_id)?;
    if position.owner != *caller {
        return Err(DexError::Unauthorized);
    }
    Ok(position)
}

/// Catch the position's pool up to `height` and pay out the position's
/// outstanding fees and incentives.
fn settle_position(
    env: &Env,
    position_id: &PositionId,
    position: &mut Position,
    height: u32,
) -> Result<(PoolId, Pool, Collected), DexError> {
    let pool_id = pool_id_of(env, position_id);
    let mut pool = get_pool(env, &pool_id)?;
    update_pool_incentives(env, &pool_id, &mut pool, height)?;

    let config = get_config(env)?;
    let collected = settle(env, &config, &pool_id, &pool, position)?;
    Ok((pool_id, pool, collected))
}

/// Add (positive delta) or remove (negative delta) liquidity.
///
/// Fees and incentives are settled against the current liquidity before the
/// delta is applied. Returns the token amounts paid in or out; deposits round
/// up, withdrawals round down. A zero delta only settles.
pub fn update_position(
    env: &Env,
    caller: &Address,
    position_id: &PositionId,
    liquidity_delta: i128,
    height: u32,
) -> Result<(u128, u128), DexError> {
    let mut position = get_owned_position(env, caller, position_id)?;
    if liquidity_delta < 0 && liquidity_delta.unsigned_abs() > position.liquidity {
        return Err(DexError::InsufficientLiquidity);
    }

    let (pool_id, mut pool, _) = settle_position(env, position_id, &mut position, height)?;
    if liquidity_delta == 0 {
        set_pool(env, &pool_id, &pool);
        set_position(env, position_id, &position);
        return Ok((0, 0));
    }

    let adding = liquidity_delta > 0;
    let price = pool.price();
    let sqrt_price_lower = tick_to_price(position.tick_lower)?;
    let sqrt_price_upper = tick_to_price(position.tick_upper)?;
    let (amount0, amount1) = get_amounts_for_liquidity(
        price,
        sqrt_price_lower,
        sqrt_price_upper,
        liquidity_delta.unsigned_abs(),
        adding,
    )?;

    // Only in-range liquidity is active
    if price >= sqrt_price_lower && price < sqrt_price_upper {
        pool.liquidity = add_delta(pool.liquidity, liquidity_delta)?;
    }

    position.liquidity = add_delta(position.liquidity, liquidity_delta)?;
    update_tick(env, &pool_id, &pool, position.tick_lower, liquidity_delta, false)?;
    update_tick(env, &pool_id, &pool, position.tick_upper, liquidity_delta, true)?;

    set_pool(env, &pool_id, &pool);
    if position.liquidity == 0 {
        remove_position(env, position_id);
    } else {
        set_position(env, position_id, &position);
    }

    if adding {
        custody::lock(env, &pool.token0, &position.owner, amount0)?;
        custody::lock(env, &pool.token1, &position.owner, amount1)?;
    } else {
        custody::unlock(env, &pool.token0, &position.owner, amount0)?;
        custody::unlock(env, &pool.token1, &position.owner, amount1)?;
    }

    log!(env, "position updated", position_id.clone(), liquidity_delta, amount0, amount1);
    Ok((amount0, amount1))
}

/// Pay out a position's accrued fees and incentives without touching its liquidity
pub fn collect_fees_and_incentives(
    env: &Env,
    caller: &Address,
    position_id: &PositionId,
    height: u32,
) -> Result<Collected, DexError> {
    let mut position = get_owned_position(env, caller, position_id)?;
    let (pool_id, pool, collected) = settle_position(env, position_id, &mut position, height)?;
    set_pool(env, &pool_id, &pool);
    set_position(env, position_id, &position);

    log!(
        env,
        "fees collected",
        position_id.clone(),
        collected.fees_0,
        collected.fees_1,
        collected.incentives
    );
    Ok(collected)
}
