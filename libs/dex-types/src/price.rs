//! Conversions between host `U256` values carried in contract records and the
//! native `U256` the math runs on. Both use the same 32-byte big-endian layout.

use crate::U256;
use soroban_sdk::{Bytes, Env};

pub fn from_host(value: &soroban_sdk::U256) -> U256 {
    let mut bytes = [0u8; 32];
    value.to_be_bytes().copy_into_slice(&mut bytes);
    U256::from_be_bytes(bytes)
}

pub fn to_host(env: &Env, value: U256) -> soroban_sdk::U256 {
    soroban_sdk::U256::from_be_bytes(env, &Bytes::from_array(env, &value.to_be_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MAX_SQRT_RATIO, MIN_SQRT_RATIO};
    use soroban_sdk::Env;

    #[test]
    fn test_host_conversion_keeps_value() {
        let env = Env::default();
        for value in [U256::ZERO, MIN_SQRT_RATIO, MAX_SQRT_RATIO, U256::from_words(u128::MAX, 1)] {
            assert_eq!(from_host(&to_host(&env, value)), value);
        }
        let host = soroban_sdk::U256::from_parts(&env, 0, 1, 0, 7);
        assert_eq!(from_host(&host), U256::from_words(1, 7));
    }
}
