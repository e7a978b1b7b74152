use crate::storage::{
    get_config, get_global, get_incentivized_pools, get_pool, set_global, set_incentivized_pools,
    set_pool,
};
use dex_math::mul_div;
use dex_types::{DexError, Pool, PoolId, Q96};
use soroban_fixed_point_math::FixedPoint;
use soroban_sdk::{log, Env};

/// Advance a pool's incentive accumulator to `height`.
///
/// Incentivized pools receive `incentive_per_block * multiplier /
/// total_incentives_multiplier` per elapsed ledger, spread over the pool's
/// active liquidity. Ledgers elapsed with no active liquidity release nothing.
pub fn update_pool_incentives(
    env: &Env,
    pool_id: &PoolId,
    pool: &mut Pool,
    height: u32,
) -> Result<(), DexError> {
    if height <= pool.height_incentives_update {
        return Ok(());
    }
    let elapsed = height - pool.height_incentives_update;
    pool.height_incentives_update = height;

    if pool.liquidity == 0 {
        return Ok(());
    }
    let Some(multiplier) = get_incentivized_pools(env).get(pool_id.clone()) else {
        return Ok(());
    };

    let total_multiplier = get_global(env)?.total_incentives_multiplier;
    if total_multiplier == 0 {
        return Ok(());
    }
    let per_block = get_config(env)?.incentive_per_block;

    let released = per_block
        .checked_mul(elapsed as i128)
        .and_then(|budget| budget.fixed_mul_floor(multiplier as i128, total_multiplier as i128))
        .ok_or(DexError::MathOverflow)?;
    if released <= 0 {
        return Ok(());
    }

    let per_liquidity = mul_div(released as u128, Q96, pool.liquidity)?;
    pool.incentives_per_liquidity = pool.incentives_per_liquidity.wrapping_add(per_liquidity);
    Ok(())
}

/// Set (or with a zero multiplier, remove) a pool's incentive multiplier.
///
/// Every listed pool is caught up to `height` first so past ledgers keep
/// the shares that applied while they elapsed.
pub fn set_incentivized_pool(
    env: &Env,
    pool_id: &PoolId,
    multiplier: u32,
    height: u32,
) -> Result<(), DexError> {
    let config = get_config(env)?;
    let pool = get_pool(env, pool_id)?;
    if multiplier > 0 && pool.token0 != config.reward_token && pool.token1 != config.reward_token {
        return Err(DexError::InvalidConfig);
    }

    let mut pools = get_incentivized_pools(env);
    for listed in pools.keys().iter().chain(core::iter::once(pool_id.clone())) {
        let mut listed_pool = get_pool(env, &listed)?;
        update_pool_incentives(env, &listed, &mut listed_pool, height)?;
        set_pool(env, &listed, &listed_pool);
    }

    if multiplier == 0 {
        pools.remove(pool_id.clone());
    } else {
        pools.set(pool_id.clone(), multiplier);
    }

    let mut total: u32 = 0;
    for (_, value) in pools.iter() {
        total = total.checked_add(value).ok_or(DexError::MathOverflow)?;
    }

    let mut global = get_global(env)?;
    global.total_incentives_multiplier = total;
    set_global(env, &global);
    set_incentivized_pools(env, &pools);

    log!(env, "incentive multiplier set", pool_id.clone(), multiplier, total);
    Ok(())
}
