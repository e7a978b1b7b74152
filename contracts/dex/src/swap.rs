use crate::fees::credit_fee;
use crate::incentives::update_pool_incentives;
use crate::storage::{get_config, get_global, get_pool, set_global, set_pool};
use crate::tick::cross;
use crate::tick_bitmap::next_initialized_tick;
use dex_math::{compute_swap_step, fee_split, price_to_tick, tick_to_price};
use dex_types::{
    DexError, PoolId, SwapOutcome, U256, MAX_NUMBER_CROSSED_TICKS, MAX_SQRT_RATIO,
    MIN_SQRT_RATIO,
};
use soroban_sdk::{log, Env};

/// Execute a swap against a single pool.
///
/// `amount` is the input to spend (exact input) or the output wanted (exact
/// output); a zero `sqrt_price_limit` leaves the price unbounded. The swap stops when the amount is filled, the price reaches
/// `sqrt_price_limit`, or no initialized tick is left in the swap direction
/// (a partial fill). Crossing more than `MAX_NUMBER_CROSSED_TICKS` ticks fails
/// the whole swap.
///
/// Pool state is persisted; moving tokens is left to the caller.
pub fn swap(
    env: &Env,
    pool_id: &PoolId,
    zero_for_one: bool,
    sqrt_price_limit: U256,
    amount: u128,
    exact_input: bool,
    height: u32,
) -> Result<SwapOutcome, DexError> {
    let mut pool = get_pool(env, pool_id)?;
    // A zero limit means no limit in the swap direction
    let limit = match (sqrt_price_limit == U256::ZERO, zero_for_one) {
        (true, true) => MIN_SQRT_RATIO,
        (true, false) => MAX_SQRT_RATIO,
        (false, _) => sqrt_price_limit.clamp(MIN_SQRT_RATIO, MAX_SQRT_RATIO),
    };

    let mut outcome = SwapOutcome {
        amount_in: 0,
        amount_out: 0,
        fees_in: 0,
        fees_out: 0,
        ticks_crossed: 0,
        sqrt_price: pool.sqrt_price.clone(),
    };

    // A limit on the wrong side of the price is a no-op
    let price = pool.price();
    let wrong_side = if zero_for_one {
        limit >= price
    } else {
        limit <= price
    };
    if wrong_side || amount == 0 {
        return Ok(outcome);
    }

    let config = get_config(env)?;
    let mut global = get_global(env)?;
    update_pool_incentives(env, pool_id, &mut pool, height)?;

    let (token_in, token_out) = if zero_for_one {
        (&pool.token0, &pool.token1)
    } else {
        (&pool.token1, &pool.token0)
    };
    let (fee_in, fee_out) = fee_split(
        pool.fee_tier,
        *token_in == config.reward_token,
        *token_out == config.reward_token,
    );

    let mut remaining = amount;
    while remaining > 0 && pool.price() != limit {
        let current_tick = price_to_tick(pool.price())?;
        let Some(next_tick) =
            next_initialized_tick(env, pool_id, current_tick, pool.tick_spacing, zero_for_one)
        else {
            break;
        };
        let next_price = tick_to_price(next_tick)?;

        // The step target is the nearer of the next tick and the limit
        let (target, crosses_tick) = if zero_for_one {
            (next_price.max(limit), next_price > limit)
        } else {
            (next_price.min(limit), next_price <= limit)
        };

        if pool.liquidity == 0 {
            pool.set_price(target);
        } else {
            let step = compute_swap_step(
                pool.price(),
                target,
                pool.liquidity,
                remaining,
                exact_input,
                fee_in,
                fee_out,
            )?;

            remaining -= if exact_input {
                step.amount_in
            } else {
                step.amount_out
            };
            outcome.amount_in = outcome
                .amount_in
                .checked_add(step.amount_in)
                .ok_or(DexError::MathOverflow)?;
            outcome.amount_out = outcome
                .amount_out
                .checked_add(step.amount_out)
                .ok_or(DexError::MathOverflow)?;
            outcome.fees_in = outcome
                .fees_in
                .checked_add(step.fee_in)
                .ok_or(DexError::MathOverflow)?;
            outcome.fees_out = outcome
                .fees_out
                .checked_add(step.fee_out)
                .ok_or(DexError::MathOverflow)?;

            credit_fee(&config, &mut pool, &mut global, zero_for_one, step.fee_in)?;
            credit_fee(&config, &mut pool, &mut global, !zero_for_one, step.fee_out)?;
            pool.set_price(step.sqrt_price_next);

            // A step stopping short of its target has filled the whole amount
            if step.sqrt_price_next != target {
                break;
            }
        }

        if crosses_tick {
            outcome.ticks_crossed += 1;
            if outcome.ticks_crossed > MAX_NUMBER_CROSSED_TICKS {
                return Err(DexError::TooManyTicks);
            }
            cross(env, pool_id, &mut pool, next_tick, zero_for_one, height)?;
            // Just below a crossed tick, so the derived tick sits under it
            if zero_for_one {
                pool.set_price(next_price - 1);
            }
        }
    }

    outcome.sqrt_price = pool.sqrt_price.clone();
    set_pool(env, pool_id, &pool);
    set_global(env, &global);

    log!(
        env,
        "swap",
        pool_id.clone(),
        outcome.amount_in,
        outcome.amount_out,
        outcome.ticks_crossed
    );
    Ok(outcome)
}
