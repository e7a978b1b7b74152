use crate::{price, U256};
use soroban_sdk::{contracttype, Address, Vec};

/// Pool record, one per (token0, token1, fee tier)
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    /// Token0 address (lower address)
    pub token0: Address,
    /// Token1 address (higher address)
    pub token1: Address,
    /// Fee tier in parts per million
    pub fee_tier: u32,
    /// Tick spacing for this pool
    pub tick_spacing: i32,
    /// Liquidity currently in range
    pub liquidity: u128,
    /// Current sqrt(price) as Q96
    pub sqrt_price: soroban_sdk::U256,
    /// Fee growth global for token0 (Q96)
    pub fee_growth_global_0: u128,
    /// Fee growth global for token1 (Q96)
    pub fee_growth_global_1: u128,
    /// Incentives per unit of active liquidity (Q96)
    pub incentives_per_liquidity: u128,
    /// Ledger sequence the incentive accumulator was last advanced at
    pub height_incentives_update: u32,
}

impl Pool {
    pub fn new(
        token0: Address,
        token1: Address,
        fee_tier: u32,
        tick_spacing: i32,
        sqrt_price: soroban_sdk::U256,
        height: u32,
    ) -> Self {
        Self {
            token0,
            token1,
            fee_tier,
            tick_spacing,
            liquidity: 0,
            sqrt_price,
            fee_growth_global_0: 0,
            fee_growth_global_1: 0,
            incentives_per_liquidity: 0,
            height_incentives_update: height,
        }
    }

    /// Current sqrt price in native arithmetic
    pub fn price(&self) -> U256 {
        price::from_host(&self.sqrt_price)
    }

    pub fn set_price(&mut self, sqrt_price: U256) {
        self.sqrt_price = price::to_host(self.sqrt_price.env(), sqrt_price);
    }
}

/// DEX-wide settings, written at initialization
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DexConfig {
    /// Token incentives are paid in and the validator carve-out is taken from
    pub reward_token: Address,
    /// Incentives released per ledger across all incentivized pools
    pub incentive_per_block: i128,
    /// Share (ppm) of reward-token swap fees diverted to validators
    pub validator_fee_part: u32,
}

/// Mutable DEX-wide counters
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GlobalState {
    /// Next position counter, never reused
    pub position_counter: u64,
    /// Number of pools created
    pub pool_count: u32,
    /// Sum of all incentivized pool multipliers
    pub total_incentives_multiplier: u32,
    /// Reward tokens available for incentive payouts
    pub incentive_reserve: u128,
    /// Reward tokens set aside for validators
    pub validator_incentives: u128,
}

/// Result of a single-pool swap
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwapOutcome {
    /// Input paid by the trader, fees included
    pub amount_in: u128,
    /// Output received by the trader, fees excluded
    pub amount_out: u128,
    /// Fee charged in the input token
    pub fees_in: u128,
    /// Fee charged in the output token
    pub fees_out: u128,
    pub ticks_crossed: u32,
    /// Pool sqrt price after the swap
    pub sqrt_price: soroban_sdk::U256,
}

/// Result of a multi-hop swap
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteOutcome {
    /// Amount of the route's input token paid by the trader
    pub amount_in: u128,
    /// Amount of the route's output token received by the trader
    pub amount_out: u128,
    pub token_out: Address,
    /// Per-hop results in route order
    pub hops: Vec<SwapOutcome>,
}
