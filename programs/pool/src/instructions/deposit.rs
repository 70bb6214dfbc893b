//! Deposit / mint: liquidity in, shares out

use super::Effect;
use crate::state::{Context, PoolLedger};
use pool_model::{assets_for_shares, shares_for_assets, LifecycleState, Rounding};
use tranche_common::{Address, PoolError};

/// Shares minted for depositing `assets` (rounds down)
pub fn preview_deposit(ledger: &PoolLedger, ctx: &Context, assets: u128) -> Result<u128, PoolError> {
    Ok(shares_for_assets(assets, &ledger.available_nav(ctx), Rounding::Down)?)
}

/// Assets charged for minting `shares` (rounds up)
pub fn preview_mint(ledger: &PoolLedger, ctx: &Context, shares: u128) -> Result<u128, PoolError> {
    Ok(assets_for_shares(shares, &ledger.available_nav(ctx), Rounding::Up)?)
}

pub fn max_mint(ledger: &PoolLedger, ctx: &Context) -> Result<u128, PoolError> {
    preview_deposit(ledger, ctx, ledger.max_deposit(ctx))
}

fn check_deposit(
    ledger: &PoolLedger,
    ctx: &Context,
    caller: &Address,
    receiver: &Address,
    assets: u128,
) -> Result<(), PoolError> {
    if caller != receiver {
        return Err(PoolError::Unauthorized);
    }
    ledger.require_state(ctx.now, LifecycleState::Active)?;
    if assets == 0 || assets > ledger.max_deposit(ctx) {
        return Err(PoolError::InvalidAmount);
    }
    Ok(())
}

fn credit(ledger: &mut PoolLedger, receiver: &Address, assets: u128, shares: u128) -> Effect {
    ledger.shares.mint(receiver, shares);
    ledger.vault.deposit(assets);
    log::info!("Deposit: {} assets -> {} shares for {}", assets, shares, receiver);
    Effect::Transfer {
        from: *receiver,
        to: ledger.address,
        amount: assets,
    }
}

/// Process deposit instruction
///
/// # Arguments
/// * `caller` - Depositor; must also be the receiver
/// * `assets` - Liquidity to deposit, bounded by remaining capacity
///
/// # Returns
/// Shares minted and the inbound transfer to execute
pub fn process_deposit(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    assets: u128,
    receiver: &Address,
) -> Result<(u128, Effect), PoolError> {
    check_deposit(ledger, ctx, caller, receiver, assets)?;

    let shares = preview_deposit(ledger, ctx, assets)?;
    if shares == 0 {
        return Err(PoolError::InvalidAmount);
    }

    Ok((shares, credit(ledger, receiver, assets, shares)))
}

/// Process mint instruction: buy exactly `shares`, paying the rounded-up asset amount
pub fn process_mint(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    shares: u128,
    receiver: &Address,
) -> Result<(u128, Effect), PoolError> {
    if shares == 0 {
        return Err(PoolError::InvalidAmount);
    }
    let assets = preview_mint(ledger, ctx, shares)?;
    check_deposit(ledger, ctx, caller, receiver, assets)?;

    Ok((assets, credit(ledger, receiver, assets, shares)))
}
