use crate::custody;
use crate::storage::get_pool;
use crate::swap::swap;
use dex_math::q96;
use dex_types::{
    price, DexError, PoolId, RouteOutcome, SwapOutcome, U256, MAX_SQRT_RATIO, MIN_SQRT_RATIO,
    Q96_U256,
};
use soroban_sdk::{log, Address, Env, Vec};

/// Swap direction of every hop (true = token0 in) and the route's output token.
///
/// Fails `InvalidRoute` for an empty route or a hop that does not hold the
/// token produced by the previous one.
pub fn resolve(
    env: &Env,
    route: &Vec<PoolId>,
    token_in: &Address,
) -> Result<(Vec<bool>, Address), DexError> {
    if route.is_empty() {
        return Err(DexError::InvalidRoute);
    }

    let mut directions = Vec::new(env);
    let mut token = token_in.clone();
    for pool_id in route.iter() {
        let pool = get_pool(env, &pool_id)?;
        if pool.token0 == token {
            directions.push_back(true);
            token = pool.token1;
        } else if pool.token1 == token {
            directions.push_back(false);
            token = pool.token0;
        } else {
            return Err(DexError::InvalidRoute);
        }
    }
    Ok((directions, token))
}

fn no_limit(zero_for_one: bool) -> U256 {
    if zero_for_one {
        MIN_SQRT_RATIO
    } else {
        MAX_SQRT_RATIO
    }
}

/// Run every hop of a route against pool state without moving tokens.
///
/// Exact input threads each hop's output into the next hop; exact output
/// works backwards from the last hop. A hop fed by another hop must be filled
/// completely, else `InsufficientLiquidity`; only the hop facing the trader
/// may fill partially.
pub fn execute_route(
    env: &Env,
    route: &Vec<PoolId>,
    token_in: &Address,
    amount: u128,
    exact_input: bool,
    height: u32,
) -> Result<RouteOutcome, DexError> {
    let (directions, token_out) = resolve(env, route, token_in)?;
    let hops_count = route.len();
    let mut hops: Vec<SwapOutcome> = Vec::new(env);

    if exact_input {
        let mut amount_next = amount;
        for i in 0..hops_count {
            let pool_id = route.get(i).ok_or(DexError::InvalidRoute)?;
            let zero_for_one = directions.get(i).ok_or(DexError::InvalidRoute)?;
            let hop = swap(env, &pool_id, zero_for_one, no_limit(zero_for_one), amount_next, true, height)?;
            if i > 0 && hop.amount_in < amount_next {
                return Err(DexError::InsufficientLiquidity);
            }
            amount_next = hop.amount_out;
            hops.push_back(hop);
        }
    } else {
        let mut amount_wanted = amount;
        for i in (0..hops_count).rev() {
            let pool_id = route.get(i).ok_or(DexError::InvalidRoute)?;
            let zero_for_one = directions.get(i).ok_or(DexError::InvalidRoute)?;
            let hop = swap(env, &pool_id, zero_for_one, no_limit(zero_for_one), amount_wanted, false, height)?;
            if i + 1 < hops_count && hop.amount_out < amount_wanted {
                return Err(DexError::InsufficientLiquidity);
            }
            amount_wanted = hop.amount_in;
            hops.push_front(hop);
        }
    }

    let first = hops.first().ok_or(DexError::InvalidRoute)?;
    let last = hops.last().ok_or(DexError::InvalidRoute)?;
    Ok(RouteOutcome {
        amount_in: first.amount_in,
        amount_out: last.amount_out,
        token_out,
        hops,
    })
}

/// Swap along a route on behalf of `trader`, settling only the route's input
/// and output tokens; intermediate amounts stay in custody.
pub fn swap_route(
    env: &Env,
    trader: &Address,
    route: &Vec<PoolId>,
    token_in: &Address,
    amount: u128,
    exact_input: bool,
    height: u32,
) -> Result<RouteOutcome, DexError> {
    let outcome = execute_route(env, route, token_in, amount, exact_input, height)?;
    custody::lock(env, token_in, trader, outcome.amount_in)?;
    custody::unlock(env, &outcome.token_out, trader, outcome.amount_out)?;

    log!(
        env,
        "route swap",
        route.len(),
        outcome.amount_in,
        outcome.amount_out
    );
    Ok(outcome)
}

/// Spot price of a route in Q96: units of the output token per unit of
/// `token_in`, rounded down at every hop.
///
/// Each hop's price is the square of its sqrt price, or the inverse square
/// when the hop sells token1. Fails `MathOverflow` only if the product leaves
/// 256 bits.
pub fn current_route_price(
    env: &Env,
    route: &Vec<PoolId>,
    token_in: &Address,
) -> Result<soroban_sdk::U256, DexError> {
    let (directions, _) = resolve(env, route, token_in)?;

    let mut route_price = Q96_U256;
    for (pool_id, zero_for_one) in route.iter().zip(directions.iter()) {
        let sqrt_price = get_pool(env, &pool_id)?.price();
        let hop_price = if zero_for_one {
            q96::square(sqrt_price)?
        } else {
            q96::inv_square(sqrt_price)?
        };
        route_price = q96::mul(route_price, hop_price)?;
    }
    Ok(price::to_host(env, route_price))
}
