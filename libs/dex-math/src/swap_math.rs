use crate::full_math::{mul_div, mul_div_rounding_up};
use crate::sqrt_price_math::{
    get_amount0_delta, get_amount1_delta, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};
use dex_types::{DexError, FEE_PARTITION, U256};

/// Result of a single swap step computation
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SwapStepResult {
    /// The sqrt price after this step
    pub sqrt_price_next: U256,
    /// Input consumed, input fee included
    pub amount_in: u128,
    /// Output released, output fee excluded
    pub amount_out: u128,
    /// Fee kept from the input token
    pub fee_in: u128,
    /// Fee kept from the output token
    pub fee_out: u128,
}

/// Split a fee tier into (input fee, output fee).
///
/// A fee on the reward token is charged entirely on that side; otherwise the
/// input side takes the larger half.
pub fn fee_split(fee_tier: u32, reward_in: bool, reward_out: bool) -> (u32, u32) {
    if reward_in {
        (fee_tier, 0)
    } else if reward_out {
        (0, fee_tier)
    } else {
        (fee_tier - fee_tier / 2, fee_tier / 2)
    }
}

/// Input token needed to move between two prices (rounded up)
fn amount_in_between(
    from: U256,
    to: U256,
    liquidity: u128,
    zero_for_one: bool,
) -> Result<u128, DexError> {
    if zero_for_one {
        get_amount0_delta(to, from, liquidity, true)
    } else {
        get_amount1_delta(from, to, liquidity, true)
    }
}

/// Output token released moving between two prices (rounded down)
fn amount_out_between(
    from: U256,
    to: U256,
    liquidity: u128,
    zero_for_one: bool,
) -> Result<u128, DexError> {
    if zero_for_one {
        get_amount1_delta(to, from, liquidity, false)
    } else {
        get_amount0_delta(from, to, liquidity, false)
    }
}

/// An amount too large for u128 can never be covered by the remaining amount,
/// so the step stops short of its target instead of failing.
fn beyond_u128_as_none(amount: Result<u128, DexError>) -> Result<Option<u128>, DexError> {
    match amount {
        Ok(amount) => Ok(Some(amount)),
        Err(DexError::MathOverflow) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Compute the result of swapping within a single tick range
///
/// # Arguments
/// * `sqrt_price_current` - Current sqrt price
/// * `sqrt_price_target` - Target sqrt price (next tick boundary or price limit)
/// * `liquidity` - Active liquidity in this range
/// * `amount_remaining` - Input still to be paid (exact input) or output still owed (exact output)
/// * `fee_in` / `fee_out` - Fee parts (ppm) charged on the input and output token
///
/// Exact input deducts the input fee before moving the price. The output fee is
/// taken from the gross output afterwards. Every rounding favors the pool.
pub fn compute_swap_step(
    sqrt_price_current: U256,
    sqrt_price_target: U256,
    liquidity: u128,
    amount_remaining: u128,
    exact_input: bool,
    fee_in: u32,
    fee_out: u32,
) -> Result<SwapStepResult, DexError> {
    if fee_in >= FEE_PARTITION || fee_out >= FEE_PARTITION {
        return Err(DexError::InvalidFeeTier);
    }

    let mut result = SwapStepResult {
        sqrt_price_next: sqrt_price_current,
        ..Default::default()
    };
    if sqrt_price_current == sqrt_price_target || amount_remaining == 0 {
        return Ok(result);
    }

    let zero_for_one = sqrt_price_current > sqrt_price_target;
    let partition = FEE_PARTITION as u128;
    let input_share = partition - fee_in as u128;
    let output_share = partition - fee_out as u128;

    let amount_in_net;
    let amount_out_gross;

    if exact_input {
        let available = mul_div(amount_remaining, input_share, partition)?;
        let max_in = beyond_u128_as_none(amount_in_between(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            zero_for_one,
        ))?;

        if let Some(max_in) = max_in.filter(|max_in| available >= *max_in) {
            result.sqrt_price_next = sqrt_price_target;
            amount_in_net = max_in;
        } else {
            result.sqrt_price_next = get_next_sqrt_price_from_input(
                sqrt_price_current,
                liquidity,
                available,
                zero_for_one,
            )?;
            amount_in_net = amount_in_between(
                sqrt_price_current,
                result.sqrt_price_next,
                liquidity,
                zero_for_one,
            )?;
        }
        amount_out_gross = amount_out_between(
            sqrt_price_current,
            result.sqrt_price_next,
            liquidity,
            zero_for_one,
        )?;
    } else {
        let needed = mul_div_rounding_up(amount_remaining, partition, output_share)?;
        let max_out = beyond_u128_as_none(amount_out_between(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            zero_for_one,
        ))?;

        if let Some(max_out) = max_out.filter(|max_out| needed >= *max_out) {
            result.sqrt_price_next = sqrt_price_target;
            amount_out_gross = max_out;
        } else {
            result.sqrt_price_next = get_next_sqrt_price_from_output(
                sqrt_price_current,
                liquidity,
                needed,
                zero_for_one,
            )?;
            amount_out_gross = amount_out_between(
                sqrt_price_current,
                result.sqrt_price_next,
                liquidity,
                zero_for_one,
            )?
            .min(needed);
        }
        amount_in_net = amount_in_between(
            sqrt_price_current,
            result.sqrt_price_next,
            liquidity,
            zero_for_one,
        )?;
    }

    // Input side: a step that stops short of its target consumes everything
    result.amount_in = if exact_input && result.sqrt_price_next != sqrt_price_target {
        amount_remaining
    } else {
        let gross = mul_div_rounding_up(amount_in_net, partition, input_share)?;
        if exact_input {
            gross.min(amount_remaining)
        } else {
            gross
        }
    };
    result.fee_in = result.amount_in - amount_in_net;

    // Output side
    result.amount_out = mul_div(amount_out_gross, output_share, partition)?;
    if !exact_input && result.amount_out > amount_remaining {
        result.amount_out = amount_remaining;
    }
    result.fee_out = amount_out_gross - result.amount_out;

    Ok(result)
}
