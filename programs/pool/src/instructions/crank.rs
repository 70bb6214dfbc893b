//! Admission engine trigger and snapshot claims
//!
//! Both are permissionless: anyone may run the crank, and anyone may replay
//! history on behalf of any participant since a claim only moves shares
//! along the owner's own pipeline.

use crate::state::{Context, PoolLedger};
use pool_model::{ClaimOutcome, Snapshot};
use tranche_common::{Address, PoolError};

/// Process crank instruction: run the admission engine for the current period
pub fn process_crank(ledger: &mut PoolLedger, ctx: &Context) -> Result<Option<Snapshot>, PoolError> {
    ledger.run_admission(ctx)
}

/// Process claim snapshots instruction
///
/// # Arguments
/// * `owner` - Participant whose history is replayed
/// * `limit` - Maximum snapshots to apply; must be nonzero
pub fn process_claim_snapshots(
    ledger: &mut PoolLedger,
    owner: &Address,
    limit: u64,
) -> Result<ClaimOutcome, PoolError> {
    if limit == 0 {
        return Err(PoolError::InvalidAmount);
    }
    let outcome = ledger.withdraws.claim(owner, limit);
    log::debug!(
        "Claim: {} applied {} snapshots (claim required: {})",
        owner,
        outcome.applied,
        outcome.claim_required
    );
    Ok(outcome)
}

pub fn claim_required(ledger: &PoolLedger, owner: &Address) -> bool {
    ledger.withdraws.claim_required(owner)
}
