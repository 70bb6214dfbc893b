//! Cancel pending withdrawal requests

use crate::state::{Context, PoolLedger};
use pool_model::math::fee_ceil;
use pool_model::{max_request_cancellation as pending_cancellable, shares_for_assets, CancelSplit};
use pool_model::{LifecycleState, Rounding};
use tranche_common::{Address, PoolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelReceipt {
    pub split: CancelSplit,
    /// Shares burned as the cancellation fee
    pub fee_shares: u128,
}

/// Fee in shares for cancelling `shares` (rounds up)
pub fn request_cancellation_fee(ledger: &PoolLedger, shares: u128) -> u128 {
    fee_ceil(shares, ledger.settings.request_cancellation_fee_bps)
}

/// Pending shares `owner` could cancel right now
pub fn max_request_cancellation(ledger: &PoolLedger, owner: &Address) -> u128 {
    pending_cancellable(&ledger.withdraws.current_state(owner))
}

/// Process cancel redeem request instruction
///
/// Takes shares out of requested first, then eligible. The cancellation fee
/// is burned from the shares released back to the owner.
pub fn process_cancel_redeem_request(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    shares: u128,
) -> Result<CancelReceipt, PoolError> {
    if ledger.lifecycle(ctx.now) == LifecycleState::Initialized {
        return Err(PoolError::InvalidLifecycleState);
    }
    if shares == 0 {
        return Err(PoolError::InvalidAmount);
    }

    let split = ledger.withdraws.cancel(caller, shares)?;
    let fee_shares = request_cancellation_fee(ledger, shares);
    ledger.shares.burn(caller, fee_shares)?;

    log::info!(
        "Cancel: {} released {} requested + {} eligible shares (fee {})",
        caller,
        split.from_requested,
        split.from_eligible,
        fee_shares
    );

    Ok(CancelReceipt { split, fee_shares })
}

/// Process cancel withdraw request instruction: cancel the shares worth `assets` (rounded up)
pub fn process_cancel_withdraw_request(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    assets: u128,
) -> Result<CancelReceipt, PoolError> {
    if assets == 0 {
        return Err(PoolError::InvalidAmount);
    }
    let shares = shares_for_assets(assets, &ledger.available_nav(ctx), Rounding::Up)?;
    process_cancel_redeem_request(ledger, ctx, caller, shares)
}
