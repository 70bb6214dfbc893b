//! Withdrawal requests
//!
//! A request queues shares for the next period boundary. The request fee is
//! charged in shares and burned on the spot, so maximum requests leave room
//! for it.

use crate::state::{Context, PoolLedger};
use pool_model::math::{add_u128, fee_ceil};
use pool_model::{assets_for_shares, free_shares, max_redeem_request as max_request_shares};
use pool_model::{shares_for_assets, LifecycleState, Rounding};
use tranche_common::{Address, PoolError};

/// Shares booked by a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestReceipt {
    /// Shares queued for withdrawal
    pub shares: u128,
    /// Shares burned as the request fee
    pub fee_shares: u128,
    /// Period the request becomes eligible in
    pub eligible_period: u64,
}

/// Fee in shares for requesting `shares` (rounds up)
pub fn request_fee(ledger: &PoolLedger, shares: u128) -> u128 {
    fee_ceil(shares, ledger.settings.request_fee_bps)
}

/// Largest share request `owner` can make including the fee
pub fn max_redeem_request(ledger: &PoolLedger, owner: &Address) -> u128 {
    let state = ledger.withdraws.current_state(owner);
    max_request_shares(
        ledger.shares.balance_of(owner),
        &state,
        ledger.settings.request_fee_bps,
    )
}

/// Asset value of [`max_redeem_request`]
pub fn max_withdraw_request(ledger: &PoolLedger, ctx: &Context, owner: &Address) -> Result<u128, PoolError> {
    let shares = max_redeem_request(ledger, owner);
    Ok(assets_for_shares(shares, &ledger.available_nav(ctx), Rounding::Down)?)
}

/// Total shares debited (request plus fee) for a redeem request
pub fn preview_redeem_request(ledger: &PoolLedger, shares: u128) -> u128 {
    add_u128(shares, request_fee(ledger, shares))
}

/// Total shares debited (request plus fee) for a withdraw request of `assets`
pub fn preview_withdraw_request(ledger: &PoolLedger, ctx: &Context, assets: u128) -> Result<u128, PoolError> {
    let shares = shares_for_assets(assets, &ledger.available_nav(ctx), Rounding::Up)?;
    Ok(preview_redeem_request(ledger, shares))
}

/// Process redeem request instruction
///
/// # Arguments
/// * `caller` - Share owner making the request
/// * `shares` - Shares to queue (excluding the fee)
///
/// # Returns
/// Receipt with the queued shares, burned fee and target period
pub fn process_request_redeem(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    shares: u128,
) -> Result<RequestReceipt, PoolError> {
    ledger.require_state(ctx.now, LifecycleState::Active)?;
    if shares == 0 {
        return Err(PoolError::InvalidAmount);
    }

    let period = ledger.current_period(ctx.now).ok_or(PoolError::ClockAnomaly)?;
    let fee_shares = request_fee(ledger, shares);

    let state = ledger.withdraws.catch_up(caller);
    let free = free_shares(ledger.shares.balance_of(caller), &state);
    if add_u128(shares, fee_shares) > free {
        return Err(PoolError::InsufficientBalance);
    }

    ledger.shares.burn(caller, fee_shares)?;
    ledger.withdraws.request(caller, period, shares);

    log::info!(
        "Request: {} queued {} shares (fee {}) for period {}",
        caller,
        shares,
        fee_shares,
        period + 1
    );

    Ok(RequestReceipt {
        shares,
        fee_shares,
        eligible_period: period + 1,
    })
}

/// Process withdraw request instruction: request the shares worth `assets` (rounded up)
pub fn process_request_withdraw(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    assets: u128,
) -> Result<RequestReceipt, PoolError> {
    if assets == 0 {
        return Err(PoolError::InvalidAmount);
    }
    let shares = shares_for_assets(assets, &ledger.available_nav(ctx), Rounding::Up)?;
    process_request_redeem(ledger, ctx, caller, shares)
}
