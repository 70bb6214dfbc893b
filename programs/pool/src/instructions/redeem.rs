//! Redeem / withdraw: settle admitted shares for their frozen assets
//!
//! Allowed in any lifecycle state: once shares are redeemable the assets are
//! already earmarked in the vault.

use super::Effect;
use crate::state::PoolLedger;
use pool_model::{redeem_assets, withdraw_shares};
use tranche_common::{Address, PoolError};

/// Redeemable shares of `owner`, history included
pub fn max_redeem(ledger: &PoolLedger, owner: &Address) -> u128 {
    ledger.withdraws.current_state(owner).redeemable_shares
}

/// Withdrawable assets of `owner`, history included
pub fn max_withdraw(ledger: &PoolLedger, owner: &Address) -> u128 {
    ledger.withdraws.current_state(owner).withdrawable_assets
}

/// Assets paid for redeeming `shares` (rounds down)
pub fn preview_redeem(ledger: &PoolLedger, owner: &Address, shares: u128) -> u128 {
    let state = ledger.withdraws.current_state(owner);
    if shares > state.redeemable_shares {
        return 0;
    }
    redeem_assets(&state, shares)
}

/// Shares burned for withdrawing `assets` (rounds up)
pub fn preview_withdraw(ledger: &PoolLedger, owner: &Address, assets: u128) -> u128 {
    let state = ledger.withdraws.current_state(owner);
    if assets > state.withdrawable_assets {
        return 0;
    }
    withdraw_shares(&state, assets)
}

fn check_self(caller: &Address, receiver: &Address, owner: &Address) -> Result<(), PoolError> {
    if caller != receiver || caller != owner {
        return Err(PoolError::Unauthorized);
    }
    Ok(())
}

fn pay_out(ledger: &mut PoolLedger, owner: &Address, shares: u128, assets: u128) -> Result<Effect, PoolError> {
    ledger.withdraws.settle(owner, shares, assets);
    ledger.shares.burn(owner, shares)?;
    ledger.vault.release_earmarked(assets)?;

    log::info!("Redeem: {} burned {} shares for {} assets", owner, shares, assets);

    Ok(Effect::Transfer {
        from: ledger.address,
        to: *owner,
        amount: assets,
    })
}

/// Process redeem instruction
///
/// # Arguments
/// * `shares` - Redeemable shares to burn
/// * `receiver`, `owner` - Both must be the caller
///
/// # Returns
/// Assets paid and the outbound transfer to execute
pub fn process_redeem(
    ledger: &mut PoolLedger,
    caller: &Address,
    shares: u128,
    receiver: &Address,
    owner: &Address,
) -> Result<(u128, Effect), PoolError> {
    check_self(caller, receiver, owner)?;

    let state = ledger.withdraws.catch_up(owner);
    if shares == 0 || shares > state.redeemable_shares {
        return Err(PoolError::InvalidAmount);
    }

    let assets = redeem_assets(&state, shares);
    let effect = pay_out(ledger, owner, shares, assets)?;
    Ok((assets, effect))
}

/// Process withdraw instruction: take exactly `assets`, burning the rounded-up share amount
pub fn process_withdraw(
    ledger: &mut PoolLedger,
    caller: &Address,
    assets: u128,
    receiver: &Address,
    owner: &Address,
) -> Result<(u128, Effect), PoolError> {
    check_self(caller, receiver, owner)?;

    let state = ledger.withdraws.catch_up(owner);
    if assets == 0 || assets > state.withdrawable_assets {
        return Err(PoolError::InvalidAmount);
    }

    let shares = withdraw_shares(&state, assets);
    let effect = pay_out(ledger, owner, shares, assets)?;
    Ok((shares, effect))
}
