use soroban_sdk::contracterror;

/// Errors returned by the DEX engine.
///
/// Grouped by kind: validation (1-19), not found (20-29), authorization (30),
/// liquidity (40), tick budget (50), routing (60).
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum DexError {
    // Validation
    InvalidFeeTier = 1,
    InvalidTicks = 2,
    InvalidTickSpacing = 3,
    InvalidPrice = 4,
    InvalidAmount = 5,
    InvalidTokenOrder = 6,
    AlreadyExists = 7,
    AlreadyInitialized = 8,
    InvalidConfig = 9,
    MathOverflow = 10,

    // Not found
    NotInitialized = 20,
    NoPool = 21,
    NoPosition = 22,
    NoTick = 23,

    Unauthorized = 30,

    InsufficientLiquidity = 40,

    TooManyTicks = 50,

    InvalidRoute = 60,
}
