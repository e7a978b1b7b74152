use soroban_sdk::contracttype;

/// Boundary record for a tick referenced by at least one position
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tick {
    /// Net liquidity change when tick is crossed upward
    pub liquidity_net: i128,
    /// Total liquidity referencing this tick
    pub liquidity_gross: u128,
    /// Fee growth per unit liquidity (token0, Q96) on the other side of this tick
    pub fee_growth_outside_0: u128,
    /// Fee growth per unit liquidity (token1, Q96) on the other side of this tick
    pub fee_growth_outside_1: u128,
    /// Incentives per unit liquidity (Q96) on the other side of this tick
    pub incentives_per_liq_outside: u128,
}
