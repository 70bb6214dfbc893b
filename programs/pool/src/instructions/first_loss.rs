//! First-loss capital in and out of the escrow

use super::Effect;
use crate::state::{Context, PoolLedger};
use pool_model::math::add_u128;
use pool_model::LifecycleState;
use tranche_common::{Address, PoolError};

/// Process first-loss deposit instruction
///
/// Activates the pool when the escrow reaches the configured minimum.
///
/// # Returns
/// Whether this deposit activated the pool, and the escrow deposit to execute
pub fn process_deposit_first_loss(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    amount: u128,
) -> Result<(bool, Effect), PoolError> {
    ledger.require_admin(caller)?;
    if ledger.lifecycle(ctx.now) == LifecycleState::Closed {
        return Err(PoolError::InvalidLifecycleState);
    }
    if amount == 0 {
        return Err(PoolError::InvalidAmount);
    }

    ledger.first_loss.record_deposit(amount);
    let activated = ledger.maybe_activate(add_u128(ctx.first_loss_balance, amount), ctx.now);

    log::info!("First loss: {} deposited {}", caller, amount);

    Ok((activated, Effect::FirstLossDeposit { from: *caller, amount }))
}

/// Process first-loss withdraw instruction: closed pools with no loans left only
pub fn process_withdraw_first_loss(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    amount: u128,
    receiver: &Address,
) -> Result<Effect, PoolError> {
    ledger.require_admin(caller)?;
    ledger.require_state(ctx.now, LifecycleState::Closed)?;
    if !ledger.loans.is_empty() {
        return Err(PoolError::InvalidLoanState);
    }
    if amount == 0 {
        return Err(PoolError::InvalidAmount);
    }
    if amount > ctx.first_loss_balance {
        return Err(PoolError::InsufficientBalance);
    }

    ledger.first_loss.record_withdrawal(amount);
    log::info!("First loss: {} withdrawn to {}", amount, receiver);

    Ok(Effect::FirstLossWithdraw { to: *receiver, amount })
}
