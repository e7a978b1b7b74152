//! Per-pool tick bitmap, stored as `u128` words of 128 bits.
//!
//! Level 0 holds one bit per usable tick (`tick / tick_spacing`). A bit of
//! level 1 marks a non-empty level-0 word and a bit of level 2 a non-empty
//! level-1 word. Compressed ticks are offset by 2^20 so every index is
//! non-negative and level 2 fits in a single word. A search reads at most two
//! words per level whatever the distance to the next tick.

use crate::storage::{get_tick_bitmap_word, set_tick_bitmap_word};
use dex_types::PoolId;
use soroban_sdk::Env;

const LEVELS: u32 = 3;

/// Larger than |MIN_TICK|; keeps compressed indices below 2^21
const INDEX_OFFSET: i32 = 1 << 20;

fn position(index: u32) -> (u32, u32) {
    (index >> 7, index & 127)
}

fn compress(tick: i32, tick_spacing: i32) -> Option<u32> {
    u32::try_from(tick.div_euclid(tick_spacing) + INDEX_OFFSET).ok()
}

fn decompress(index: u32, tick_spacing: i32) -> i32 {
    (index as i32 - INDEX_OFFSET) * tick_spacing
}

/// Highest set bit when searching down, lowest when searching up
fn extreme_bit(word: u128, lte: bool) -> u32 {
    if lte {
        127 - word.leading_zeros()
    } else {
        word.trailing_zeros()
    }
}

/// Flip a tick's bit. The parent levels change only when a word turns empty
/// or stops being empty.
pub fn flip_tick(env: &Env, pool_id: &PoolId, tick: i32, tick_spacing: i32) {
    let Some(mut index) = compress(tick, tick_spacing) else {
        return;
    };
    for level in 0..LEVELS {
        let (word_pos, bit) = position(index);
        let word = get_tick_bitmap_word(env, pool_id, level, word_pos);
        let flipped = word ^ (1u128 << bit);
        set_tick_bitmap_word(env, pool_id, level, word_pos, flipped);

        if word != 0 && flipped != 0 {
            break;
        }
        index = word_pos;
    }
}

/// Nearest set index of `level` at or below (`lte`) or at or above `index`
fn find(env: &Env, pool_id: &PoolId, level: u32, index: u32, lte: bool) -> Option<u32> {
    let (word_pos, bit) = position(index);
    let word = get_tick_bitmap_word(env, pool_id, level, word_pos);
    let mask = if lte {
        (1u128 << bit) - 1 + (1u128 << bit)
    } else {
        !((1u128 << bit) - 1)
    };

    let masked = word & mask;
    if masked != 0 {
        return Some((word_pos << 7) | extreme_bit(masked, lte));
    }
    if level + 1 == LEVELS {
        return None;
    }

    // Ask the level above for the nearest non-empty word past this one
    let next_word = if lte {
        word_pos.checked_sub(1)?
    } else {
        word_pos + 1
    };
    let word_pos = find(env, pool_id, level + 1, next_word, lte)?;
    let word = get_tick_bitmap_word(env, pool_id, level, word_pos);
    Some((word_pos << 7) | extreme_bit(word, lte))
}

/// Nearest initialized tick in the swap direction.
///
/// With `lte` the largest tick `<= tick` (price moving down), otherwise the
/// smallest tick `> tick` (price moving up).
pub fn next_initialized_tick(
    env: &Env,
    pool_id: &PoolId,
    tick: i32,
    tick_spacing: i32,
    lte: bool,
) -> Option<i32> {
    let compressed = compress(tick, tick_spacing)?;
    let start = if lte { compressed } else { compressed + 1 };
    find(env, pool_id, 0, start, lte).map(|index| decompress(index, tick_spacing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::with_contract;
    use dex_types::{MAX_TICK, MIN_TICK};
    use soroban_sdk::BytesN;

    fn pool_id(env: &Env) -> PoolId {
        BytesN::from_array(env, &[9u8; 32])
    }

    #[test]
    fn test_flip_sets_and_clears_every_level() {
        let env = Env::default();
        with_contract(&env, || {
            let id = pool_id(&env);
            flip_tick(&env, &id, 30, 10);

            let index = (3 + INDEX_OFFSET) as u32;
            assert_eq!(get_tick_bitmap_word(&env, &id, 0, index >> 7), 1 << (index & 127));
            assert_ne!(get_tick_bitmap_word(&env, &id, 1, index >> 14), 0);
            assert_ne!(get_tick_bitmap_word(&env, &id, 2, 0), 0);

            flip_tick(&env, &id, 30, 10);
            for level in 0..LEVELS {
                assert_eq!(get_tick_bitmap_word(&env, &id, level, index >> (7 * (level + 1))), 0);
            }
            assert_eq!(next_initialized_tick(&env, &id, 0, 10, false), None);
        });
    }

    #[test]
    fn test_parent_bit_survives_while_word_is_occupied() {
        let env = Env::default();
        with_contract(&env, || {
            let id = pool_id(&env);
            // same level-0 word
            flip_tick(&env, &id, 10, 10);
            flip_tick(&env, &id, 20, 10);
            flip_tick(&env, &id, 10, 10);
            assert_eq!(next_initialized_tick(&env, &id, 0, 10, false), Some(20));
            assert_eq!(next_initialized_tick(&env, &id, 1_000, 10, true), Some(20));
        });
    }

    #[test]
    fn test_next_initialized_tick_near() {
        let env = Env::default();
        with_contract(&env, || {
            let id = pool_id(&env);
            for tick in [-200, -20, 40, 300] {
                flip_tick(&env, &id, tick, 10);
            }

            assert_eq!(next_initialized_tick(&env, &id, 0, 10, true), Some(-20));
            assert_eq!(next_initialized_tick(&env, &id, 0, 10, false), Some(40));
            assert_eq!(next_initialized_tick(&env, &id, -20, 10, true), Some(-20));
            assert_eq!(next_initialized_tick(&env, &id, -20, 10, false), Some(40));
            assert_eq!(next_initialized_tick(&env, &id, 300, 10, false), None);
            assert_eq!(next_initialized_tick(&env, &id, -201, 10, true), None);
            assert_eq!(next_initialized_tick(&env, &id, 299, 10, false), Some(300));
            // ticks between multiples of the spacing round toward the search
            assert_eq!(next_initialized_tick(&env, &id, -15, 10, true), Some(-20));
            assert_eq!(next_initialized_tick(&env, &id, -25, 10, false), Some(-20));
        });
    }

    #[test]
    fn test_next_initialized_tick_across_words() {
        let env = Env::default();
        with_contract(&env, || {
            let id = pool_id(&env);
            // far apart: different level-0 and level-1 words
            flip_tick(&env, &id, MIN_TICK, 1);
            flip_tick(&env, &id, -300_000, 1);
            flip_tick(&env, &id, 5, 1);
            flip_tick(&env, &id, MAX_TICK, 1);

            assert_eq!(next_initialized_tick(&env, &id, 4, 1, true), Some(-300_000));
            assert_eq!(next_initialized_tick(&env, &id, -300_001, 1, true), Some(MIN_TICK));
            assert_eq!(next_initialized_tick(&env, &id, MIN_TICK - 1, 1, true), None);
            assert_eq!(next_initialized_tick(&env, &id, 5, 1, false), Some(MAX_TICK));
            assert_eq!(next_initialized_tick(&env, &id, MIN_TICK, 1, false), Some(-300_000));
            assert_eq!(next_initialized_tick(&env, &id, MAX_TICK, 1, false), None);
        });
    }

    #[test]
    fn test_word_boundaries() {
        let env = Env::default();
        with_contract(&env, || {
            let id = pool_id(&env);
            // last bit of one word and first bit of the next
            let last = 127 - (INDEX_OFFSET % 128);
            flip_tick(&env, &id, last, 1);
            flip_tick(&env, &id, last + 1, 1);

            assert_eq!(next_initialized_tick(&env, &id, last - 1, 1, false), Some(last));
            assert_eq!(next_initialized_tick(&env, &id, last, 1, false), Some(last + 1));
            assert_eq!(next_initialized_tick(&env, &id, last + 1, 1, true), Some(last + 1));
            assert_eq!(next_initialized_tick(&env, &id, last + 1000, 1, true), Some(last + 1));
            flip_tick(&env, &id, last + 1, 1);
            assert_eq!(next_initialized_tick(&env, &id, last + 1000, 1, true), Some(last));
        });
    }
}
