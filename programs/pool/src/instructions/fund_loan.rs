//! Fund a loan from unearmarked liquidity

use super::Effect;
use crate::state::{Context, PoolLedger};
use pool_model::{LifecycleState, LoanTerms};
use tranche_common::{Address, PoolError};

/// Process fund loan instruction
///
/// # Arguments
/// * `caller` - Must be the pool admin
/// * `loan` - Address of the loan instrument; receives the principal
/// * `terms` - Terms read from the loan at `ctx.now`
pub fn process_fund_loan(
    ledger: &mut PoolLedger,
    ctx: &Context,
    caller: &Address,
    loan: &Address,
    terms: &LoanTerms,
) -> Result<Effect, PoolError> {
    ledger.require_admin(caller)?;
    ledger.require_state(ctx.now, LifecycleState::Active)?;

    if !terms.state.is_fundable() || ledger.loans.contains(loan) {
        return Err(PoolError::InvalidLoanState);
    }
    let principal = terms.principal;
    if principal == 0 {
        return Err(PoolError::InvalidAmount);
    }
    // Earmarked assets belong to admitted withdrawals and are never lent out
    if ledger.liquidity_pool_assets() < principal {
        return Err(PoolError::InsufficientLiquidity);
    }

    ledger.vault.withdraw(principal)?;
    ledger.loans.fund(*loan, principal, ctx.now)?;

    log::info!("Loan {} funded with {}", loan, principal);

    Ok(Effect::Transfer {
        from: ledger.address,
        to: *loan,
        amount: principal,
    })
}
