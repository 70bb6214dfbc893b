//! Bridge between the pool ledger and the pool_model invariant helpers
//!
//! The ledger keeps participants in a map keyed by address and the vault as
//! a balance/earmark pair; the model works on plain `(balance, state)` pairs
//! and a single liquid figure. This module maps one onto the other so the
//! same predicates the proofs and property tests use can be checked against
//! live state.
//!
//! | Ledger | Model | Notes |
//! |--------|-------|-------|
//! | `shares.balance_of(who)` | participant balance | |
//! | `withdraws.caught_up_states()` | participant `WithdrawState` | history folded in, in map order |
//! | `vault.balance` | `liquid` | |
//! | `withdraws.global` | `GlobalWithdrawState` | |

use super::PoolLedger;
use pool_model::{global_matches, no_over_allocation, within_balance, WithdrawState};
use tranche_common::Address;

/// Every queued participant with their share balance and caught-up state
pub fn participant_states(ledger: &PoolLedger) -> Vec<(Address, u128, WithdrawState)> {
    ledger
        .withdraws
        .caught_up_states()
        .into_iter()
        .map(|(who, state)| (who, ledger.shares.balance_of(&who), state))
        .collect()
}

/// Check the withdrawal invariants against the ledger
///
/// - no participant commits more shares than they hold
/// - withdrawable assets never exceed the liquid reserve
/// - the pool-wide counters equal the participants' sum
/// - the vault's earmark tracks the pool-wide withdrawable figure exactly
pub fn check_withdraw_invariants(ledger: &PoolLedger) -> bool {
    let states = participant_states(ledger);

    let balances_ok = states.iter().all(|(_, balance, s)| within_balance(*balance, s));
    let allocation_ok = no_over_allocation(states.iter().map(|(_, _, s)| s), ledger.vault.balance);
    let global_ok = global_matches(&ledger.withdraws.global, states.iter().map(|(_, _, s)| s));
    let earmark_ok = ledger.vault.earmarked == ledger.withdraws.global.withdrawable_assets
        && ledger.vault.earmarked <= ledger.vault.balance;

    balances_ok && allocation_ok && global_ok && earmark_ok
}
