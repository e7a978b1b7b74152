#![no_std]

use dex_math::{get_liquidity_for_amounts, tick_to_price};
use dex_types::{DexError, Pool, PoolId, PositionId, RouteOutcome};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, Address, Env, IntoVal, Symbol,
    TryFromVal, Val, Vec,
};

#[contract]
pub struct DexRouter;

/// Storage keys
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Dex,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RouterError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    DeadlineExpired = 3,
    SlippageNotMet = 4,
    InvalidAmount = 5,

    // Failures reported by the DEX
    InvalidRoute = 6,
    InsufficientLiquidity = 7,
    TooManyTicks = 8,
    InvalidTicks = 9,
    NoPool = 10,
    NoPosition = 11,
    Unauthorized = 12,
    /// Any other DEX error, or a call that did not return a value
    DexFailure = 13,
}

impl From<DexError> for RouterError {
    fn from(err: DexError) -> Self {
        match err {
            DexError::InvalidAmount => RouterError::InvalidAmount,
            DexError::InvalidRoute => RouterError::InvalidRoute,
            DexError::InsufficientLiquidity => RouterError::InsufficientLiquidity,
            DexError::TooManyTicks => RouterError::TooManyTicks,
            DexError::InvalidTicks | DexError::InvalidTickSpacing | DexError::InvalidPrice => {
                RouterError::InvalidTicks
            }
            DexError::NoPool => RouterError::NoPool,
            DexError::NoPosition => RouterError::NoPosition,
            DexError::Unauthorized => RouterError::Unauthorized,
            _ => RouterError::DexFailure,
        }
    }
}

/// Result of a router deposit
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deposit {
    pub position_id: PositionId,
    pub liquidity: u128,
    pub amount0: u128,
    pub amount1: u128,
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280;
const INSTANCE_TTL_EXTEND: u32 = 518400;

#[contractimpl]
impl DexRouter {
    /// Initialize router with the DEX contract address
    pub fn initialize(env: Env, dex: Address) -> Result<(), RouterError> {
        if env.storage().instance().has(&DataKey::Dex) {
            return Err(RouterError::AlreadyInitialized);
        }
        env.storage().instance().set(&DataKey::Dex, &dex);
        extend_instance_ttl(&env);
        Ok(())
    }

    /// Spend exactly `amount_in` of `token_in` along `route`
    ///
    /// # Returns
    /// The amount of the route's output token received
    pub fn exact_input(
        env: Env,
        trader: Address,
        route: Vec<PoolId>,
        token_in: Address,
        amount_in: u128,
        amount_out_minimum: u128,
        deadline: u64,
    ) -> Result<u128, RouterError> {
        trader.require_auth();
        check_deadline(&env, deadline)?;
        if amount_in == 0 {
            return Err(RouterError::InvalidAmount);
        }

        let outcome =
            invoke_swap_route(&env, &get_dex(&env)?, &trader, &route, &token_in, amount_in, true)?;
        if outcome.amount_in < amount_in || outcome.amount_out < amount_out_minimum {
            return Err(RouterError::SlippageNotMet);
        }

        log!(&env, "exact input", outcome.amount_in, outcome.amount_out);
        Ok(outcome.amount_out)
    }

    /// Receive exactly `amount_out` of the route's output token
    ///
    /// # Returns
    /// The amount of `token_in` paid
    pub fn exact_output(
        env: Env,
        trader: Address,
        route: Vec<PoolId>,
        token_in: Address,
        amount_out: u128,
        amount_in_maximum: u128,
        deadline: u64,
    ) -> Result<u128, RouterError> {
        trader.require_auth();
        check_deadline(&env, deadline)?;
        if amount_out == 0 {
            return Err(RouterError::InvalidAmount);
        }

        let outcome =
            invoke_swap_route(&env, &get_dex(&env)?, &trader, &route, &token_in, amount_out, false)?;
        if outcome.amount_out < amount_out || outcome.amount_in > amount_in_maximum {
            return Err(RouterError::SlippageNotMet);
        }

        log!(&env, "exact output", outcome.amount_in, outcome.amount_out);
        Ok(outcome.amount_in)
    }

    /// Open a position with the most liquidity the desired amounts pay for
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity(
        env: Env,
        owner: Address,
        pool_id: PoolId,
        tick_lower: i32,
        tick_upper: i32,
        amount0_desired: u128,
        amount1_desired: u128,
        amount0_min: u128,
        amount1_min: u128,
        deadline: u64,
    ) -> Result<Deposit, RouterError> {
        owner.require_auth();
        check_deadline(&env, deadline)?;
        let dex = get_dex(&env)?;

        let pool: Pool = invoke(&env, &dex, "get_pool", (pool_id.clone(),).into_val(&env))?;
        let sqrt_price_lower = tick_to_price(tick_lower)?;
        let sqrt_price_upper = tick_to_price(tick_upper)?;
        let liquidity = get_liquidity_for_amounts(
            pool.price(),
            sqrt_price_lower,
            sqrt_price_upper,
            amount0_desired,
            amount1_desired,
        )?;
        if liquidity == 0 {
            return Err(RouterError::InvalidAmount);
        }

        let (position_id, amount0, amount1): (PositionId, u128, u128) = invoke(
            &env,
            &dex,
            "create_position",
            (owner, pool_id, tick_lower, tick_upper, liquidity).into_val(&env),
        )?;
        if amount0 < amount0_min || amount1 < amount1_min {
            return Err(RouterError::SlippageNotMet);
        }

        Ok(Deposit {
            position_id,
            liquidity,
            amount0,
            amount1,
        })
    }

    /// Withdraw `liquidity` from a position
    ///
    /// # Returns
    /// (amount0, amount1) - Token amounts withdrawn
    pub fn remove_liquidity(
        env: Env,
        owner: Address,
        position_id: PositionId,
        liquidity: u128,
        amount0_min: u128,
        amount1_min: u128,
        deadline: u64,
    ) -> Result<(u128, u128), RouterError> {
        owner.require_auth();
        check_deadline(&env, deadline)?;
        let liquidity_delta = i128::try_from(liquidity)
            .ok()
            .and_then(|l| l.checked_neg())
            .filter(|l| *l < 0)
            .ok_or(RouterError::InvalidAmount)?;

        let (amount0, amount1): (u128, u128) = invoke(
            &env,
            &get_dex(&env)?,
            "update_position",
            (owner, position_id, liquidity_delta).into_val(&env),
        )?;
        if amount0 < amount0_min || amount1 < amount1_min {
            return Err(RouterError::SlippageNotMet);
        }
        Ok((amount0, amount1))
    }

    /// Get DEX address
    pub fn get_dex(env: Env) -> Result<Address, RouterError> {
        get_dex(&env)
    }
}

fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

fn get_dex(env: &Env) -> Result<Address, RouterError> {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Dex)
        .ok_or(RouterError::NotInitialized)
}

fn check_deadline(env: &Env, deadline: u64) -> Result<(), RouterError> {
    if env.ledger().timestamp() > deadline {
        return Err(RouterError::DeadlineExpired);
    }
    Ok(())
}

/// Call the DEX, turning its errors into router errors instead of aborting
fn invoke<T>(env: &Env, dex: &Address, func: &str, args: Vec<Val>) -> Result<T, RouterError>
where
    T: TryFromVal<Env, Val>,
{
    match env.try_invoke_contract::<T, DexError>(dex, &Symbol::new(env, func), args) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) => Err(RouterError::DexFailure),
        Err(Ok(err)) => Err(err.into()),
        Err(Err(_)) => Err(RouterError::DexFailure),
    }
}

fn invoke_swap_route(
    env: &Env,
    dex: &Address,
    trader: &Address,
    route: &Vec<PoolId>,
    token_in: &Address,
    amount: u128,
    exact_input: bool,
) -> Result<RouteOutcome, RouterError> {
    invoke(
        env,
        dex,
        "swap_route",
        (trader, route.clone(), token_in, amount, exact_input).into_val(env),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex::{Dex, DexClient};
    use dex_types::{price, DexConfig, Q96_U256};
    use soroban_sdk::testutils::{Address as _, Ledger};
    use soroban_sdk::token::{StellarAssetClient, TokenClient};
    use soroban_sdk::{vec, BytesN};

    struct Setup<'a> {
        dex: DexClient<'a>,
        router: DexRouterClient<'a>,
        tokens: [Address; 3],
        route: Vec<PoolId>,
    }

    fn create_token(env: &Env) -> Address {
        env.register_stellar_asset_contract_v2(Address::generate(env))
            .address()
    }

    fn mint(env: &Env, token: &Address, to: &Address, amount: i128) {
        StellarAssetClient::new(env, token).mint(to, &amount);
    }

    fn balance(env: &Env, token: &Address, owner: &Address) -> i128 {
        TokenClient::new(env, token).balance(owner)
    }

    /// DEX and router with pools a/b and b/c, each funded through the router
    fn setup<'a>(env: &Env) -> Setup<'a> {
        env.mock_all_auths();
        env.cost_estimate().budget().reset_unlimited();
        env.ledger().set_timestamp(1_000);

        let dex = DexClient::new(env, &env.register(Dex, ()));
        dex.initialize(
            &Address::generate(env),
            &DexConfig {
                reward_token: Address::generate(env),
                incentive_per_block: 0,
                validator_fee_part: 0,
            },
        );
        let router = DexRouterClient::new(env, &env.register(DexRouter, ()));
        router.initialize(&dex.address);

        let mut tokens = [create_token(env), create_token(env), create_token(env)];
        tokens.sort();
        let one = price::to_host(env, Q96_U256);
        let ab = dex.create_pool(&tokens[0], &tokens[1], &3000, &one);
        let bc = dex.create_pool(&tokens[1], &tokens[2], &3000, &one);

        let lp = Address::generate(env);
        for token in tokens.iter() {
            mint(env, token, &lp, 20_000_000);
        }
        for pool_id in [&ab, &bc] {
            router.add_liquidity(
                &lp,
                pool_id,
                &-6_000,
                &6_000,
                &10_000_000,
                &10_000_000,
                &9_000_000,
                &9_000_000,
                &2_000,
            );
        }

        Setup {
            dex,
            router,
            tokens,
            route: vec![env, ab, bc],
        }
    }

    #[test]
    fn test_initialize_twice_fails() {
        let env = Env::default();
        let s = setup(&env);
        assert_eq!(s.router.get_dex(), s.dex.address);
        assert_eq!(
            s.router.try_initialize(&s.dex.address),
            Err(Ok(RouterError::AlreadyInitialized))
        );
    }

    #[test]
    fn test_exact_input() {
        let env = Env::default();
        let s = setup(&env);
        let trader = Address::generate(&env);
        mint(&env, &s.tokens[0], &trader, 100_000);

        let amount_out = s
            .router
            .exact_input(&trader, &s.route, &s.tokens[0], &100_000, &90_000, &2_000);
        assert!(amount_out >= 90_000 && amount_out < 100_000);
        assert_eq!(balance(&env, &s.tokens[0], &trader), 0);
        assert_eq!(balance(&env, &s.tokens[2], &trader), amount_out as i128);
    }

    #[test]
    fn test_exact_output() {
        let env = Env::default();
        let s = setup(&env);
        let trader = Address::generate(&env);
        mint(&env, &s.tokens[0], &trader, 100_000);

        let amount_in = s
            .router
            .exact_output(&trader, &s.route, &s.tokens[0], &50_000, &60_000, &2_000);
        assert!(amount_in > 50_000 && amount_in <= 60_000);
        assert_eq!(balance(&env, &s.tokens[0], &trader), 100_000 - amount_in as i128);
        assert_eq!(balance(&env, &s.tokens[2], &trader), 50_000);
    }

    #[test]
    fn test_slippage_not_met() {
        let env = Env::default();
        let s = setup(&env);
        let trader = Address::generate(&env);
        mint(&env, &s.tokens[0], &trader, 100_000);

        assert_eq!(
            s.router
                .try_exact_input(&trader, &s.route, &s.tokens[0], &100_000, &100_000, &2_000),
            Err(Ok(RouterError::SlippageNotMet))
        );
        assert_eq!(
            s.router
                .try_exact_output(&trader, &s.route, &s.tokens[0], &50_000, &50_000, &2_000),
            Err(Ok(RouterError::SlippageNotMet))
        );
        // nothing moved
        assert_eq!(balance(&env, &s.tokens[0], &trader), 100_000);
    }

    #[test]
    fn test_deadline_expired() {
        let env = Env::default();
        let s = setup(&env);
        let trader = Address::generate(&env);
        env.ledger().set_timestamp(3_000);

        assert_eq!(
            s.router
                .try_exact_input(&trader, &s.route, &s.tokens[0], &100, &0, &2_000),
            Err(Ok(RouterError::DeadlineExpired))
        );
    }

    #[test]
    fn test_add_and_remove_liquidity() {
        let env = Env::default();
        let s = setup(&env);
        let lp = Address::generate(&env);
        mint(&env, &s.tokens[0], &lp, 1_000_000);
        mint(&env, &s.tokens[1], &lp, 1_000_000);
        let pool_id = s.route.get(0).unwrap();

        let deposit = s.router.add_liquidity(
            &lp, &pool_id, &-600, &600, &1_000_000, &1_000_000, &0, &0, &2_000,
        );
        assert!(deposit.amount0 <= 1_000_000 && deposit.amount1 <= 1_000_000);
        assert_eq!(s.dex.get_position(&deposit.position_id).liquidity, deposit.liquidity);

        // a minimum above the deposit cannot be met
        assert_eq!(
            s.router.try_remove_liquidity(
                &lp,
                &deposit.position_id,
                &deposit.liquidity,
                &(deposit.amount0 + 1),
                &0,
                &2_000
            ),
            Err(Ok(RouterError::SlippageNotMet))
        );

        let (amount0, amount1) = s.router.remove_liquidity(
            &lp,
            &deposit.position_id,
            &deposit.liquidity,
            &0,
            &0,
            &2_000,
        );
        assert!(amount0 <= deposit.amount0 && amount1 <= deposit.amount1);
        assert_eq!(
            s.dex.try_get_position(&deposit.position_id),
            Err(Ok(DexError::NoPosition))
        );
        assert_eq!(
            s.router
                .try_remove_liquidity(&lp, &deposit.position_id, &0, &0, &0, &2_000),
            Err(Ok(RouterError::InvalidAmount))
        );
    }

    #[test]
    fn test_dex_errors_come_back_typed() {
        let env = Env::default();
        let s = setup(&env);
        let trader = Address::generate(&env);
        mint(&env, &s.tokens[0], &trader, 100_000);

        // tokens[2] is not held by the first pool of the route
        assert_eq!(
            s.router
                .try_exact_input(&trader, &s.route, &s.tokens[2], &1_000, &0, &2_000),
            Err(Ok(RouterError::InvalidRoute))
        );
        assert_eq!(
            s.router.try_exact_input(&trader, &Vec::new(&env), &s.tokens[0], &1_000, &0, &2_000),
            Err(Ok(RouterError::InvalidRoute))
        );

        let lp = Address::generate(&env);
        mint(&env, &s.tokens[0], &lp, 1_000_000);
        mint(&env, &s.tokens[1], &lp, 1_000_000);
        let pool_id = s.route.get(0).unwrap();
        let deposit = s.router.add_liquidity(
            &lp, &pool_id, &-600, &600, &1_000_000, &1_000_000, &0, &0, &2_000,
        );
        assert_eq!(
            s.router.try_remove_liquidity(&trader, &deposit.position_id, &1, &0, &0, &2_000),
            Err(Ok(RouterError::Unauthorized))
        );
        assert_eq!(
            s.router.try_add_liquidity(
                &lp, &pool_id, &-605, &600, &1_000, &1_000, &0, &0, &2_000,
            ),
            Err(Ok(RouterError::InvalidTicks))
        );
        let missing = BytesN::from_array(&env, &[0u8; 32]);
        assert_eq!(
            s.router.try_add_liquidity(&lp, &missing, &-600, &600, &1_000, &1_000, &0, &0, &2_000),
            Err(Ok(RouterError::NoPool))
        );

        // nothing moved for the failed swaps
        assert_eq!(balance(&env, &s.tokens[0], &trader), 100_000);
    }

    #[test]
    fn test_dex_error_mapping() {
        assert_eq!(RouterError::from(DexError::InvalidPrice), RouterError::InvalidTicks);
        assert_eq!(RouterError::from(DexError::InvalidAmount), RouterError::InvalidAmount);
        assert_eq!(RouterError::from(DexError::TooManyTicks), RouterError::TooManyTicks);
        assert_eq!(RouterError::from(DexError::MathOverflow), RouterError::DexFailure);
    }
}
