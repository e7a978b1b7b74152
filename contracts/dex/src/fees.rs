use crate::custody;
use crate::storage::{get_global, set_global};
use crate::tick::growth_inside;
use dex_math::mul_div;
use dex_types::{Collected, DexConfig, DexError, GlobalState, Pool, PoolId, Position, FEE_PARTITION, Q96};
use soroban_sdk::Env;

/// Credit a swap fee to the pool.
///
/// When the fee is paid in the reward token, `validator_fee_part` of it is set
/// aside for validators. The rest grows the fee accumulator of active
/// liquidity (rounded down; dust stays in custody).
pub fn credit_fee(
    config: &DexConfig,
    pool: &mut Pool,
    global: &mut GlobalState,
    in_token0: bool,
    fee: u128,
) -> Result<(), DexError> {
    if fee == 0 || pool.liquidity == 0 {
        return Ok(());
    }

    let token = if in_token0 { &pool.token0 } else { &pool.token1 };
    let validator_part = if *token == config.reward_token {
        mul_div(fee, config.validator_fee_part as u128, FEE_PARTITION as u128)?
    } else {
        0
    };
    global.validator_incentives = global
        .validator_incentives
        .checked_add(validator_part)
        .ok_or(DexError::MathOverflow)?;

    let growth = mul_div(fee - validator_part, Q96, pool.liquidity)?;
    if in_token0 {
        pool.fee_growth_global_0 = pool.fee_growth_global_0.wrapping_add(growth);
    } else {
        pool.fee_growth_global_1 = pool.fee_growth_global_1.wrapping_add(growth);
    }
    Ok(())
}

/// (growth_now - growth_last) * liquidity, rounded down
fn owed(growth_now: u128, growth_last: u128, liquidity: u128) -> Result<u128, DexError> {
    mul_div(growth_now.wrapping_sub(growth_last), liquidity, Q96)
}

/// Collectable fees and incentives of a position at the pool's current state.
///
/// Incentives are only paid in pools holding the reward token and never exceed
/// the funded incentive reserve.
pub fn collectable(
    env: &Env,
    config: &DexConfig,
    pool_id: &PoolId,
    pool: &Pool,
    position: &Position,
) -> Result<Collected, DexError> {
    let inside = growth_inside(env, pool_id, pool, position.tick_lower, position.tick_upper)?;

    let fees_0 = owed(inside.fee_0, position.fee_growth_inside_last_0, position.liquidity)?;
    let fees_1 = owed(inside.fee_1, position.fee_growth_inside_last_1, position.liquidity)?;

    let incentivized = pool.token0 == config.reward_token || pool.token1 == config.reward_token;
    let incentives = if incentivized {
        owed(inside.incentives, position.incentives_per_liq_last, position.liquidity)?
            .min(get_global(env)?.incentive_reserve)
    } else {
        0
    };

    Ok(Collected {
        fees_0,
        fees_1,
        incentives,
    })
}

/// Pay a position's outstanding fees and incentives to its owner and move its
/// snapshots to the current inside growth.
pub fn settle(
    env: &Env,
    config: &DexConfig,
    pool_id: &PoolId,
    pool: &Pool,
    position: &mut Position,
) -> Result<Collected, DexError> {
    let collected = collectable(env, config, pool_id, pool, position)?;
    let inside = growth_inside(env, pool_id, pool, position.tick_lower, position.tick_upper)?;
    position.fee_growth_inside_last_0 = inside.fee_0;
    position.fee_growth_inside_last_1 = inside.fee_1;
    position.incentives_per_liq_last = inside.incentives;

    if collected.incentives > 0 {
        let mut global = get_global(env)?;
        global.incentive_reserve -= collected.incentives;
        set_global(env, &global);
    }

    custody::unlock(env, &pool.token0, &position.owner, collected.fees_0)?;
    custody::unlock(env, &pool.token1, &position.owner, collected.fees_1)?;
    custody::unlock(env, &config.reward_token, &position.owner, collected.incentives)?;
    Ok(collected)
}
