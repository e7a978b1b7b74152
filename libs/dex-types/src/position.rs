use soroban_sdk::{contracttype, Address};

/// Liquidity position inside a single pool
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    /// Fee growth inside the range (token0, Q96) at the last settlement
    pub fee_growth_inside_last_0: u128,
    /// Fee growth inside the range (token1, Q96) at the last settlement
    pub fee_growth_inside_last_1: u128,
    /// Incentives per liquidity inside the range (Q96) at the last settlement
    pub incentives_per_liq_last: u128,
    pub owner: Address,
}

impl Position {
    pub fn new(owner: Address, tick_lower: i32, tick_upper: i32) -> Self {
        Self {
            tick_lower,
            tick_upper,
            liquidity: 0,
            fee_growth_inside_last_0: 0,
            fee_growth_inside_last_1: 0,
            incentives_per_liq_last: 0,
            owner,
        }
    }
}

/// Amounts paid out by a fee and incentive settlement
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Collected {
    pub fees_0: u128,
    pub fees_1: u128,
    pub incentives: u128,
}
