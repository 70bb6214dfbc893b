//! Loan payments flowing back into the pool

use super::Effect;
use crate::state::PoolLedger;
use pool_model::math::add_u128;
use tranche_common::{Address, PoolError};

/// Split of a received payment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub service_fee: u128,
    /// Interest credited to the liquid reserve
    pub interest_to_pool: u128,
    pub principal: u128,
    /// Loan has no principal left and was removed from the book
    pub retired: bool,
}

/// Process loan payment instruction
///
/// Only a funded loan may pay itself in. The service fee is held aside for
/// the admin; the remaining interest and all principal join the reserve.
pub fn process_loan_payment(
    ledger: &mut PoolLedger,
    caller: &Address,
    interest: u128,
    principal: u128,
) -> Result<(PaymentReceipt, Effect), PoolError> {
    let outstanding = ledger
        .loans
        .get(caller)
        .map(|l| l.outstanding)
        .ok_or(PoolError::Unauthorized)?;
    if principal > outstanding {
        return Err(PoolError::InvalidAmount);
    }
    let amount = add_u128(interest, principal);
    if amount == 0 {
        return Err(PoolError::InvalidAmount);
    }

    let (service_fee, interest_to_pool) = ledger
        .fees
        .take_service_fee(interest, ledger.settings.service_fee_bps);
    ledger.loans.repay(caller, principal)?;
    ledger.vault.deposit(add_u128(interest_to_pool, principal));
    let retired = !ledger.loans.contains(caller);

    log::info!(
        "Loan {} paid {} interest ({} service fee) and {} principal{}",
        caller,
        interest,
        service_fee,
        principal,
        if retired { ", retired" } else { "" }
    );

    let receipt = PaymentReceipt {
        service_fee,
        interest_to_pool,
        principal,
        retired,
    };
    let effect = Effect::Transfer {
        from: *caller,
        to: ledger.address,
        amount,
    };
    Ok((receipt, effect))
}
