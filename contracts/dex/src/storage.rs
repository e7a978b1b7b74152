use dex_types::{DexConfig, DexError, GlobalState, Pool, PoolId, Position, PositionId, Tick};
use soroban_sdk::{contracttype, Address, Env, Map};

// ============================================================================
// SOROBAN RESOURCE LIMITS - constraints the storage layout is designed around:
// ============================================================================
// - Ledger entry size: 128 KiB max per entry
// - Read entries per tx: 100 entries / 200 KB
// - Write entries per tx: 50 entries / 132 KB
//
// - DEX-wide settings, counters and the incentivized pool map live in
//   instance storage and travel with the contract instance
// - Pools, ticks, positions and tick bitmap words are separate persistent
//   entries; a bitmap word is a fixed 16 bytes however many ticks a pool has
// - A swap touches the pool, a few bitmap words and one tick per crossing,
//   which is what MAX_NUMBER_CROSSED_TICKS is sized against
// - Empty ticks, bitmap words and positions are removed rather than stored
//   as zeroes
// ============================================================================

/// Storage keys for the DEX contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Admin address (Instance storage)
    Admin,
    /// DEX-wide settings (Instance storage)
    Config,
    /// DEX-wide counters (Instance storage)
    Global,
    /// Fee tier -> tick spacing (Instance storage)
    FeeTier(u32),
    /// Incentivized pools: pool id -> multiplier, sorted by pool id (Instance storage)
    IncentivizedPools,
    /// Creation index -> pool id (Persistent storage)
    PoolAt(u32),
    /// Pool record (Persistent storage)
    Pool(PoolId),
    /// Tick record within a pool (Persistent storage)
    Tick(PoolId, i32),
    /// Tick bitmap word: (pool, level, word position) -> u128 (Persistent storage)
    TickBitmap(PoolId, u32, u32),
    /// Position record (Persistent storage)
    Position(PositionId),
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

/// Extend instance storage TTL
pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

/// Extend persistent storage TTL for a key
pub fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}

fn get_persistent<T: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>>(
    env: &Env,
    key: &DataKey,
) -> Option<T> {
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        extend_persistent_ttl(env, key);
    }
    value
}

fn set_persistent<T: soroban_sdk::IntoVal<Env, soroban_sdk::Val>>(env: &Env, key: &DataKey, value: &T) {
    env.storage().persistent().set(key, value);
    extend_persistent_ttl(env, key);
}

// === Admin & settings ===

pub fn has_admin(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

pub fn get_admin(env: &Env) -> Result<Address, DexError> {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(DexError::NotInitialized)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
    extend_instance_ttl(env);
}

pub fn get_config(env: &Env) -> Result<DexConfig, DexError> {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(DexError::NotInitialized)
}

pub fn set_config(env: &Env, config: &DexConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance_ttl(env);
}

pub fn get_global(env: &Env) -> Result<GlobalState, DexError> {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Global)
        .ok_or(DexError::NotInitialized)
}

pub fn set_global(env: &Env, global: &GlobalState) {
    env.storage().instance().set(&DataKey::Global, global);
    extend_instance_ttl(env);
}

pub fn get_fee_tier(env: &Env, fee_tier: u32) -> Option<i32> {
    env.storage().instance().get(&DataKey::FeeTier(fee_tier))
}

pub fn set_fee_tier(env: &Env, fee_tier: u32, tick_spacing: i32) {
    env.storage()
        .instance()
        .set(&DataKey::FeeTier(fee_tier), &tick_spacing);
    extend_instance_ttl(env);
}

pub fn get_incentivized_pools(env: &Env) -> Map<PoolId, u32> {
    env.storage()
        .instance()
        .get(&DataKey::IncentivizedPools)
        .unwrap_or_else(|| Map::new(env))
}

pub fn set_incentivized_pools(env: &Env, pools: &Map<PoolId, u32>) {
    env.storage()
        .instance()
        .set(&DataKey::IncentivizedPools, pools);
    extend_instance_ttl(env);
}

// === Pools ===

pub fn has_pool(env: &Env, pool_id: &PoolId) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Pool(pool_id.clone()))
}

pub fn get_pool(env: &Env, pool_id: &PoolId) -> Result<Pool, DexError> {
    get_persistent(env, &DataKey::Pool(pool_id.clone())).ok_or(DexError::NoPool)
}

pub fn set_pool(env: &Env, pool_id: &PoolId, pool: &Pool) {
    set_persistent(env, &DataKey::Pool(pool_id.clone()), pool);
}

pub fn get_pool_at(env: &Env, index: u32) -> Option<PoolId> {
    get_persistent(env, &DataKey::PoolAt(index))
}

pub fn set_pool_at(env: &Env, index: u32, pool_id: &PoolId) {
    set_persistent(env, &DataKey::PoolAt(index), pool_id);
}

// === Ticks ===

pub fn get_tick(env: &Env, pool_id: &PoolId, tick: i32) -> Option<Tick> {
    get_persistent(env, &DataKey::Tick(pool_id.clone(), tick))
}

pub fn set_tick(env: &Env, pool_id: &PoolId, tick: i32, info: &Tick) {
    set_persistent(env, &DataKey::Tick(pool_id.clone(), tick), info);
}

pub fn remove_tick(env: &Env, pool_id: &PoolId, tick: i32) {
    env.storage()
        .persistent()
        .remove(&DataKey::Tick(pool_id.clone(), tick));
}

pub fn get_tick_bitmap_word(env: &Env, pool_id: &PoolId, level: u32, word_pos: u32) -> u128 {
    get_persistent(env, &DataKey::TickBitmap(pool_id.clone(), level, word_pos)).unwrap_or(0)
}

pub fn set_tick_bitmap_word(env: &Env, pool_id: &PoolId, level: u32, word_pos: u32, word: u128) {
    let key = DataKey::TickBitmap(pool_id.clone(), level, word_pos);
    if word == 0 {
        env.storage().persistent().remove(&key);
    } else {
        set_persistent(env, &key, &word);
    }
}

// === Positions ===

pub fn get_position(env: &Env, position_id: &PositionId) -> Result<Position, DexError> {
    get_persistent(env, &DataKey::Position(position_id.clone())).ok_or(DexError::NoPosition)
}

pub fn set_position(env: &Env, position_id: &PositionId, position: &Position) {
    set_persistent(env, &DataKey::Position(position_id.clone()), position);
}

pub fn remove_position(env: &Env, position_id: &PositionId) {
    env.storage()
        .persistent()
        .remove(&DataKey::Position(position_id.clone()));
}
