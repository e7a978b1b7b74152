use crate::full_math::mul_div_u256;
use dex_types::{DexError, MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, Q96_U256, U256};
use soroban_sdk::{BytesN, Env};

/// floor(sqrt(1.0001)^(2^i) * 2^96) for every bit i of |tick|
const SQRT_POWERS_X96: [U256; 20] = [
    U256::new(79232123823359799118286999567),
    U256::new(79236085330515764027303304731),
    U256::new(79244008939048815603706035061),
    U256::new(79259858533276714757314932305),
    U256::new(79291567232598584799939703904),
    U256::new(79355022692464371645785046466),
    U256::new(79482085999252804386437311141),
    U256::new(79736823300114093921829183326),
    U256::new(80248749790819932309965073892),
    U256::new(81282483887344747381513967011),
    U256::new(83390072131320151908154831281),
    U256::new(87770609709833776024991924138),
    U256::new(97234110755111693312479820773),
    U256::new(119332217159966728226237229890),
    U256::new(179736315981702064433883588727),
    U256::new(407748233172238350107850275304),
    U256::new(2098478828474011932436660412517),
    U256::new(55581415166113811149459800483533),
    U256::new(38992368544603139932233054999993551),
    // 19190206568837448476620805521939294697349
    U256::from_words(56, 134394021264894522671827505760274855813),
];

/// 2^192, one in Q96 squared
const Q192: U256 = U256::from_words(1 << 64, 0);

/// Calculate sqrt(1.0001^tick) * 2^96
///
/// Binary exponentiation over `SQRT_POWERS_X96`, rounding down after every
/// multiplication; negative ticks take the reciprocal (rounded down) of the
/// result for |tick|.
pub fn tick_to_price(tick: i32) -> Result<U256, DexError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(DexError::InvalidTicks);
    }

    let abs_tick = tick.unsigned_abs();
    let mut ratio = Q96_U256;
    for (bit, power) in SQRT_POWERS_X96.iter().enumerate() {
        if abs_tick & (1 << bit) != 0 {
            ratio = mul_div_u256(ratio, *power, Q96_U256)?;
        }
    }

    if tick < 0 {
        ratio = Q192.checked_div(ratio).ok_or(DexError::MathOverflow)?;
    }

    Ok(ratio)
}

/// Largest tick whose price is not above `sqrt_price`
///
/// Binary search over `tick_to_price`; only integer comparisons are used.
pub fn price_to_tick(sqrt_price: U256) -> Result<i32, DexError> {
    if !(MIN_SQRT_RATIO..=MAX_SQRT_RATIO).contains(&sqrt_price) {
        return Err(DexError::InvalidPrice);
    }

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;

    while low < high {
        let mid = low + (high - low + 1) / 2;
        if tick_to_price(mid)? <= sqrt_price {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Ok(low)
}

/// Fixed-width encoding of a tick whose byte order matches numeric order
pub fn encode_tick(env: &Env, tick: i32) -> BytesN<4> {
    BytesN::from_array(env, &((tick as u32) ^ 0x8000_0000).to_be_bytes())
}

pub fn decode_tick(bytes: &BytesN<4>) -> i32 {
    (u32::from_be_bytes(bytes.to_array()) ^ 0x8000_0000) as i32
}
