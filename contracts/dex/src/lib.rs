#![no_std]

mod custody;
mod fees;
mod incentives;
#[cfg(test)]
mod invariants;
mod pool;
mod position;
mod route;
mod storage;
mod swap;
#[cfg(test)]
mod test_utils;
mod tick;
mod tick_bitmap;

use dex_types::{
    price, Collected, DexConfig, DexError, GlobalState, Pool, PoolId, Position, PositionId,
    RouteOutcome, SwapOutcome, Tick, DEFAULT_FEE_TIERS, FEE_PARTITION, MAX_TICK_SPACING,
};
use soroban_sdk::{contract, contractimpl, log, Address, Env, Map, Vec, U256};
use storage::{
    get_admin, get_config, get_global, get_incentivized_pools, get_pool, get_position, get_tick,
    has_admin, set_admin, set_config, set_fee_tier, set_global,
};

#[contract]
pub struct Dex;

fn require_admin(env: &Env) -> Result<Address, DexError> {
    let admin = get_admin(env)?;
    admin.require_auth();
    Ok(admin)
}

fn height(env: &Env) -> u32 {
    env.ledger().sequence()
}

#[contractimpl]
impl Dex {
    /// Initialize the DEX with its admin and settings, registering the
    /// default fee tiers
    pub fn initialize(env: Env, admin: Address, config: DexConfig) -> Result<(), DexError> {
        if has_admin(&env) {
            return Err(DexError::AlreadyInitialized);
        }
        if config.validator_fee_part >= FEE_PARTITION || config.incentive_per_block < 0 {
            return Err(DexError::InvalidConfig);
        }

        admin.require_auth();

        set_admin(&env, &admin);
        set_config(&env, &config);
        set_global(&env, &GlobalState::default());
        for (fee_tier, tick_spacing) in DEFAULT_FEE_TIERS {
            set_fee_tier(&env, fee_tier, tick_spacing);
        }

        log!(&env, "dex initialized", admin, config.reward_token);
        Ok(())
    }

    // === Admin ===

    /// Enable a fee tier (or change the tick spacing new pools of it get)
    pub fn set_fee_tier(env: Env, fee_tier: u32, tick_spacing: i32) -> Result<(), DexError> {
        require_admin(&env)?;
        if fee_tier >= FEE_PARTITION {
            return Err(DexError::InvalidFeeTier);
        }
        if !(1..=MAX_TICK_SPACING).contains(&tick_spacing) {
            return Err(DexError::InvalidTickSpacing);
        }

        set_fee_tier(&env, fee_tier, tick_spacing);
        log!(&env, "fee tier set", fee_tier, tick_spacing);
        Ok(())
    }

    /// Set a pool's share of the per-ledger incentives; a zero multiplier
    /// removes the pool from the incentivized set
    pub fn set_incentivized_pool(env: Env, pool_id: PoolId, multiplier: u32) -> Result<(), DexError> {
        require_admin(&env)?;
        incentives::set_incentivized_pool(&env, &pool_id, multiplier, height(&env))
    }

    /// Add reward tokens to the budget incentives are paid from
    pub fn fund_incentives(env: Env, from: Address, amount: u128) -> Result<(), DexError> {
        from.require_auth();
        if amount == 0 {
            return Err(DexError::InvalidAmount);
        }

        let config = get_config(&env)?;
        let mut global = get_global(&env)?;
        global.incentive_reserve = global
            .incentive_reserve
            .checked_add(amount)
            .ok_or(DexError::MathOverflow)?;
        set_global(&env, &global);
        custody::lock(&env, &config.reward_token, &from, amount)?;

        log!(&env, "incentives funded", from, amount);
        Ok(())
    }

    /// Pay the accumulated validator carve-out to `to`
    pub fn claim_validator_incentives(env: Env, to: Address) -> Result<u128, DexError> {
        require_admin(&env)?;
        let config = get_config(&env)?;
        let mut global = get_global(&env)?;
        let amount = global.validator_incentives;
        global.validator_incentives = 0;
        set_global(&env, &global);
        custody::unlock(&env, &config.reward_token, &to, amount)?;

        log!(&env, "validator incentives claimed", to, amount);
        Ok(amount)
    }

    // === Liquidity ===

    /// Create a pool for a sorted token pair at `sqrt_price` (Q96)
    pub fn create_pool(
        env: Env,
        token0: Address,
        token1: Address,
        fee_tier: u32,
        sqrt_price: U256,
    ) -> Result<PoolId, DexError> {
        let sqrt_price = price::from_host(&sqrt_price);
        pool::create_pool(&env, &token0, &token1, fee_tier, sqrt_price, height(&env))
    }

    /// Open a position on [tick_lower, tick_upper) holding `liquidity`
    ///
    /// # Returns
    /// (position_id, amount0, amount1) - The new id and the token amounts deposited
    pub fn create_position(
        env: Env,
        owner: Address,
        pool_id: PoolId,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(PositionId, u128, u128), DexError> {
        owner.require_auth();
        position::create_position(
            &env,
            &owner,
            &pool_id,
            tick_lower,
            tick_upper,
            liquidity,
            height(&env),
        )
    }

    /// Add or remove liquidity from a position
    ///
    /// # Returns
    /// (amount0, amount1) - Token amounts deposited (positive delta) or withdrawn
    pub fn update_position(
        env: Env,
        owner: Address,
        position_id: PositionId,
        liquidity_delta: i128,
    ) -> Result<(u128, u128), DexError> {
        owner.require_auth();
        position::update_position(&env, &owner, &position_id, liquidity_delta, height(&env))
    }

    /// Pay out a position's accrued fees and incentives
    pub fn collect_fees_and_incentives(
        env: Env,
        owner: Address,
        position_id: PositionId,
    ) -> Result<Collected, DexError> {
        owner.require_auth();
        position::collect_fees_and_incentives(&env, &owner, &position_id, height(&env))
    }

    // === Swaps ===

    /// Swap against a single pool
    ///
    /// # Arguments
    /// * `zero_for_one` - True if swapping token0 for token1
    /// * `amount` - Input to spend (exact input) or output wanted (exact output)
    /// * `sqrt_price_limit` - Price the swap may not move past; zero for none
    pub fn swap(
        env: Env,
        trader: Address,
        pool_id: PoolId,
        zero_for_one: bool,
        amount: u128,
        exact_input: bool,
        sqrt_price_limit: U256,
    ) -> Result<SwapOutcome, DexError> {
        trader.require_auth();
        if amount == 0 {
            return Err(DexError::InvalidAmount);
        }

        let pool = get_pool(&env, &pool_id)?;
        let outcome = swap::swap(
            &env,
            &pool_id,
            zero_for_one,
            price::from_host(&sqrt_price_limit),
            amount,
            exact_input,
            height(&env),
        )?;

        let (token_in, token_out) = if zero_for_one {
            (pool.token0, pool.token1)
        } else {
            (pool.token1, pool.token0)
        };
        custody::lock(&env, &token_in, &trader, outcome.amount_in)?;
        custody::unlock(&env, &token_out, &trader, outcome.amount_out)?;
        Ok(outcome)
    }

    /// Swap along an ordered list of pools starting from `token_in`
    pub fn swap_route(
        env: Env,
        trader: Address,
        route: Vec<PoolId>,
        token_in: Address,
        amount: u128,
        exact_input: bool,
    ) -> Result<RouteOutcome, DexError> {
        trader.require_auth();
        if amount == 0 {
            return Err(DexError::InvalidAmount);
        }
        route::swap_route(&env, &trader, &route, &token_in, amount, exact_input, height(&env))
    }

    // === View Functions ===

    pub fn get_pool(env: Env, pool_id: PoolId) -> Result<Pool, DexError> {
        get_pool(&env, &pool_id)
    }

    pub fn get_position(env: Env, position_id: PositionId) -> Result<Position, DexError> {
        get_position(&env, &position_id)
    }

    pub fn get_tick(env: Env, pool_id: PoolId, tick: i32) -> Result<Tick, DexError> {
        get_tick(&env, &pool_id, tick).ok_or(DexError::NoTick)
    }

    /// Ids of every pool in creation order
    pub fn get_all_pool_ids(env: Env) -> Result<Vec<PoolId>, DexError> {
        pool::get_all_pool_ids(&env)
    }

    /// Spot price (Q96) of a route: output token per unit of `token_in`
    pub fn current_route_price(env: Env, route: Vec<PoolId>, token_in: Address) -> Result<U256, DexError> {
        route::current_route_price(&env, &route, &token_in)
    }

    pub fn get_pool_id(env: Env, token0: Address, token1: Address, fee_tier: u32) -> PoolId {
        pool::pool_id(&env, &token0, &token1, fee_tier)
    }

    /// Tick spacing of an enabled fee tier
    pub fn get_fee_tier(env: Env, fee_tier: u32) -> Option<i32> {
        storage::get_fee_tier(&env, fee_tier)
    }

    /// Incentivized pools and their multipliers, sorted by pool id
    pub fn get_incentivized_pools(env: Env) -> Map<PoolId, u32> {
        get_incentivized_pools(&env)
    }

    pub fn get_config(env: Env) -> Result<DexConfig, DexError> {
        get_config(&env)
    }

    pub fn get_global_state(env: Env) -> Result<GlobalState, DexError> {
        get_global(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, DexError> {
        get_admin(&env)
    }
}
