//! Admin fee claims

use super::Effect;
use crate::state::{Context, PoolLedger};
use tranche_common::{Address, PoolError};

/// Process claim fixed fee instruction: pays one fee from the reserve per elapsed interval
pub fn process_claim_fixed_fee(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
) -> Result<(u128, Effect), PoolError> {
    ledger.require_admin(caller)?;

    let fee = ledger.fees.claim_fixed(
        ledger.settings.fixed_fee,
        ledger.settings.fixed_fee_interval,
        ctx.now,
    )?;
    if ledger.liquidity_pool_assets() < fee {
        return Err(PoolError::InsufficientLiquidity);
    }
    ledger.vault.withdraw(fee)?;

    log::info!("Fixed fee {} claimed", fee);

    Ok((
        fee,
        Effect::Transfer {
            from: ledger.address,
            to: *caller,
            amount: fee,
        },
    ))
}

/// Process withdraw fees instruction: pay out accumulated service fees
pub fn process_withdraw_fees(
    ledger: &mut PoolLedger,
    caller: &Address,
    amount: u128,
    receiver: &Address,
) -> Result<Effect, PoolError> {
    ledger.require_admin(caller)?;
    ledger.fees.withdraw_service_fees(amount)?;

    log::info!("Service fees: {} withdrawn to {}", amount, receiver);

    Ok(Effect::Transfer {
        from: ledger.address,
        to: *receiver,
        amount,
    })
}
