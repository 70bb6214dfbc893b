//! Admin settings updates

use crate::state::{Context, PoolLedger};
use pool_model::LifecycleState;
use tranche_common::{Address, Bps, PoolError, PoolSettings, Timestamp};

fn require_open(ledger: &PoolLedger, ctx: &Context, caller: &Address) -> Result<(), PoolError> {
    ledger.require_admin(caller)?;
    if ledger.lifecycle(ctx.now) == LifecycleState::Closed {
        return Err(PoolError::InvalidLifecycleState);
    }
    Ok(())
}

/// Fee terms are fixed once lenders can join
fn require_initialized(ledger: &PoolLedger, ctx: &Context, caller: &Address) -> Result<(), PoolError> {
    ledger.require_admin(caller)?;
    ledger.require_state(ctx.now, LifecycleState::Initialized)
}

pub fn process_set_request_fee(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    bps: Bps,
) -> Result<(), PoolError> {
    require_initialized(ledger, ctx, caller)?;
    PoolSettings::check_bps(bps)?;
    ledger.settings.request_fee_bps = bps;
    log::info!("Settings: request fee {} bps", bps);
    Ok(())
}

pub fn process_set_request_cancellation_fee(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    bps: Bps,
) -> Result<(), PoolError> {
    require_initialized(ledger, ctx, caller)?;
    PoolSettings::check_bps(bps)?;
    ledger.settings.request_cancellation_fee_bps = bps;
    log::info!("Settings: request cancellation fee {} bps", bps);
    Ok(())
}

pub fn process_set_withdraw_gate(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    bps: Bps,
) -> Result<(), PoolError> {
    require_open(ledger, ctx, caller)?;
    PoolSettings::check_bps(bps)?;
    ledger.settings.withdraw_gate_bps = bps;
    log::info!("Settings: withdraw gate {} bps", bps);
    Ok(())
}

/// Capacity may never drop below what the pool already holds
pub fn process_set_pool_capacity(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    capacity: u128,
) -> Result<(), PoolError> {
    require_open(ledger, ctx, caller)?;
    if capacity < ledger.total_assets(ctx) {
        return Err(PoolError::InvalidSettings);
    }
    ledger.settings.max_capacity = capacity;
    log::info!("Settings: capacity {}", capacity);
    Ok(())
}

/// Move the end date earlier; `end_date == ctx.now` closes the pool immediately
pub fn process_set_pool_end_date(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    end_date: Timestamp,
) -> Result<(), PoolError> {
    require_open(ledger, ctx, caller)?;
    if end_date >= ledger.settings.end_date || end_date < ctx.now {
        return Err(PoolError::InvalidSettings);
    }
    ledger.settings.end_date = end_date;
    log::info!("Settings: end date {}", end_date);
    Ok(())
}

pub fn process_set_service_fee_bps(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    bps: Bps,
) -> Result<(), PoolError> {
    require_open(ledger, ctx, caller)?;
    PoolSettings::check_bps(bps)?;
    ledger.settings.service_fee_bps = bps;
    log::info!("Settings: service fee {} bps", bps);
    Ok(())
}

/// Replace the fixed fee; an active pool restarts the schedule from `ctx.now`
pub fn process_set_fixed_fee(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    fee: u128,
    interval: u64,
) -> Result<(), PoolError> {
    require_open(ledger, ctx, caller)?;
    if fee > 0 && interval == 0 {
        return Err(PoolError::InvalidSettings);
    }
    ledger.settings.fixed_fee = fee;
    ledger.settings.fixed_fee_interval = interval;

    ledger.fees.fixed_fee_due_date = None;
    if ledger.activated_at.is_some() && fee > 0 {
        ledger.fees.start(ctx.now, interval);
    }
    log::info!("Settings: fixed fee {} every {}s", fee, interval);
    Ok(())
}
