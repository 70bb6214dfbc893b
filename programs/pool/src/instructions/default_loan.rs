//! Loan defaults
//!
//! Writing off principal is the one operation allowed to lower the share
//! price. First-loss capital is applied first and moved into the reserve in
//! the same operation.

use super::Effect;
use crate::state::{Context, PoolLedger};
use pool_model::{LifecycleState, LoanTerms};
use tranche_common::{Address, PoolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultReport {
    /// Principal removed from the book
    pub written_off: u128,
    /// Covered by the first-loss escrow
    pub first_loss_applied: u128,
    /// Absorbed by lenders through the share price
    pub uncovered: u128,
}

/// Process default loan instruction
///
/// Uses `ctx.first_loss_balance` as the escrow balance. Returns the escrow
/// release to execute when any first-loss capital was applied.
pub fn process_default_loan(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    loan: &Address,
    terms: &LoanTerms,
) -> Result<(DefaultReport, Option<Effect>), PoolError> {
    ledger.require_admin(caller)?;
    if ledger.lifecycle(ctx.now) == LifecycleState::Initialized {
        return Err(PoolError::InvalidLifecycleState);
    }
    if !ledger.loans.contains(loan) || !terms.state.is_defaultable() {
        return Err(PoolError::InvalidLoanState);
    }

    let written_off = ledger.loans.write_off(loan)?;
    let (applied, uncovered) = ledger
        .first_loss
        .settle_default(written_off, ctx.first_loss_balance);
    ledger.vault.deposit(applied);

    log::warn!(
        "Loan {} defaulted: {} written off, {} covered by first loss, {} uncovered",
        loan,
        written_off,
        applied,
        uncovered
    );

    let effect = (applied > 0).then(|| Effect::FirstLossWithdraw {
        to: ledger.address,
        amount: applied,
    });
    let report = DefaultReport {
        written_off,
        first_loss_applied: applied,
        uncovered,
    };
    Ok((report, effect))
}
