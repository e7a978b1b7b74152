use crate::storage::{
    get_fee_tier, get_global, get_pool_at, has_pool, set_global, set_pool, set_pool_at,
};
use dex_math::price_to_tick;
use dex_types::{price, DexError, Pool, PoolId, U256};
use soroban_sdk::xdr::ToXdr;
use soroban_sdk::{log, Address, Bytes, Env, Vec};

/// Deterministic pool id: sha256 over both token addresses and the fee tier
pub fn pool_id(env: &Env, token0: &Address, token1: &Address, fee_tier: u32) -> PoolId {
    let mut preimage = Bytes::new(env);
    preimage.append(&token0.clone().to_xdr(env));
    preimage.append(&token1.clone().to_xdr(env));
    preimage.extend_from_array(&fee_tier.to_be_bytes());
    env.crypto().sha256(&preimage).to_bytes()
}

/// Create an empty pool at `sqrt_price`.
///
/// Tokens must already be sorted; the fee tier must be enabled.
pub fn create_pool(
    env: &Env,
    token0: &Address,
    token1: &Address,
    fee_tier: u32,
    sqrt_price: U256,
    height: u32,
) -> Result<PoolId, DexError> {
    if token0 >= token1 {
        return Err(DexError::InvalidTokenOrder);
    }
    let tick_spacing = get_fee_tier(env, fee_tier).ok_or(DexError::InvalidFeeTier)?;
    // Rejects prices outside [MIN_SQRT_RATIO, MAX_SQRT_RATIO]
    price_to_tick(sqrt_price)?;

    let id = pool_id(env, token0, token1, fee_tier);
    if has_pool(env, &id) {
        return Err(DexError::AlreadyExists);
    }

    let pool = Pool::new(
        token0.clone(),
        token1.clone(),
        fee_tier,
        tick_spacing,
        price::to_host(env, sqrt_price),
        height,
    );
    set_pool(env, &id, &pool);

    let mut global = get_global(env)?;
    set_pool_at(env, global.pool_count, &id);
    global.pool_count = global.pool_count.checked_add(1).ok_or(DexError::MathOverflow)?;
    set_global(env, &global);

    log!(env, "pool created", id.clone(), fee_tier, pool.sqrt_price);
    Ok(id)
}

/// Ids of every pool in creation order
pub fn get_all_pool_ids(env: &Env) -> Result<Vec<PoolId>, DexError> {
    let count = get_global(env)?.pool_count;
    let mut ids = Vec::new(env);
    for index in 0..count {
        if let Some(id) = get_pool_at(env, index) {
            ids.push_back(id);
        }
    }
    Ok(ids)
}
