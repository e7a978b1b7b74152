use dex_types::DexError;
use soroban_sdk::{token, Address, Env};

// All pools share one custody account: the DEX contract itself.

fn to_i128(amount: u128) -> Result<i128, DexError> {
    i128::try_from(amount).map_err(|_| DexError::MathOverflow)
}

/// Move `amount` of `token` from `from` into DEX custody
pub fn lock(env: &Env, token: &Address, from: &Address, amount: u128) -> Result<(), DexError> {
    if amount == 0 {
        return Ok(());
    }
    let client = token::Client::new(env, token);
    client.transfer(from, &env.current_contract_address(), &to_i128(amount)?);
    Ok(())
}

/// Release `amount` of `token` from DEX custody to `to`
pub fn unlock(env: &Env, token: &Address, to: &Address, amount: u128) -> Result<(), DexError> {
    if amount == 0 {
        return Ok(());
    }
    let client = token::Client::new(env, token);
    client.transfer(&env.current_contract_address(), to, &to_i128(amount)?);
    Ok(())
}
