use crate::storage::{set_config, set_global};
use dex_types::{price, DexConfig, GlobalState, Pool, U256};
use soroban_sdk::testutils::Address as _;
use soroban_sdk::{Address, Env};

/// Run `f` inside a freshly registered DEX contract so storage is reachable
pub fn with_contract<T>(env: &Env, f: impl FnOnce() -> T) -> T {
    let contract_id = env.register(crate::Dex, ());
    env.as_contract(&contract_id, f)
}

/// A 500 / 10 pool with no liquidity; token0 sorts below token1
pub fn sample_pool(env: &Env, sqrt_price: U256) -> Pool {
    let a = Address::generate(env);
    let b = Address::generate(env);
    let (token0, token1) = if a < b { (a, b) } else { (b, a) };
    Pool::new(token0, token1, 500, 10, price::to_host(env, sqrt_price), 0)
}

/// Store a config with a fresh reward token and zeroed counters
pub fn store_config(env: &Env, incentive_per_block: i128) -> DexConfig {
    let config = DexConfig {
        reward_token: Address::generate(env),
        incentive_per_block,
        validator_fee_part: 100_000,
    };
    set_config(env, &config);
    set_global(env, &GlobalState::default());
    config
}
