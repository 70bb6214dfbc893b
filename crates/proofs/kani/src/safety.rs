//! Kani safety proofs for the withdrawal engine

use crate::{adversary::*, generators::*, sanitizer::*};
use kani::{any, assume};
use pool_model::math::*;
use pool_model::*;

/// Fees round up, by less than one unit
#[kani::proof]
fn fee_ceil_never_undercharges() {
    let amount = any::<u32>() as u128;
    let bps = (any::<u16>() as u128) % (BPS_DENOMINATOR + 1);

    let fee = fee_ceil(amount, bps);
    let exact = amount * bps;

    kani::assert(fee * BPS_DENOMINATOR >= exact, "fee below exact value");
    kani::assert(fee * BPS_DENOMINATOR < exact + BPS_DENOMINATOR, "fee rounded up by a whole unit");
}

/// Depositing then valuing the shares never creates assets
#[kani::proof]
fn deposit_conversion_favors_pool() {
    let nav = any_nav();
    let assets = any::<u32>() as u128;

    if let Ok(shares) = shares_for_assets(assets, &nav, Rounding::Down) {
        if let Ok(back) = assets_for_shares(shares, &nav, Rounding::Down) {
            kani::assert(back <= assets, "deposit round trip gained assets");
        }
    }
}

/// Minting charges at least the fair value of the shares
#[kani::proof]
fn mint_conversion_favors_pool() {
    let nav = any_nav();
    let shares = any::<u32>() as u128;

    if let Ok(cost) = assets_for_shares(shares, &nav, Rounding::Up) {
        if let Ok(bought) = shares_for_assets(cost, &nav, Rounding::Down) {
            kani::assert(bought >= shares, "mint charged less than share value");
        }
    }
}

/// The largest request still leaves room for its fee
#[kani::proof]
fn max_request_covers_fee() {
    let state = any_withdraw_state();
    let balance = any::<u32>() as u128;
    let bps = (any::<u16>() as u128) % (BPS_DENOMINATOR + 1);
    assume(within_balance(balance, &state));

    let max = max_redeem_request(balance, &state, bps);
    let free = free_shares(balance, &state);

    kani::assert(max + fee_ceil(max, bps) <= free, "request plus fee exceeds free shares");
}

/// Cancellation takes from requested before eligible and never more than pending
#[kani::proof]
fn cancel_split_is_exact() {
    let state = any_withdraw_state();
    let amount = any::<u32>() as u128;

    match cancel_split(&state, amount) {
        Ok(split) => {
            kani::assert(split.total() == amount, "split does not sum to amount");
            kani::assert(split.from_requested <= state.requested_shares, "over-cancelled requested");
            kani::assert(split.from_eligible <= state.eligible_shares, "over-cancelled eligible");
            kani::assert(
                split.from_eligible == 0 || split.from_requested == state.requested_shares,
                "eligible touched before requested emptied",
            );
        }
        Err(_) => kani::assert(amount > state.pending_shares(), "valid cancel rejected"),
    }
}

/// Admission never serves more than is eligible or more assets than are liquid
#[kani::proof]
fn admission_bounded_by_eligible_and_liquidity() {
    let mut global = any_withdraw_state();
    let params = AdmissionParams {
        period: any::<u8>() as u64,
        available_liquidity: any::<u32>() as u128,
        gate_bps: (any::<u16>() as u128) % (BPS_DENOMINATOR + 1),
        nav: any_nav(),
        full_release: any(),
    };
    let before = global;

    if let Ok(Some(snap)) = admit(&mut global, &params) {
        kani::assert(snap.served_shares <= snap.eligible_shares, "served above eligible");
        kani::assert(snap.served_assets <= params.available_liquidity, "served above liquidity");
        kani::assert(
            global.withdrawable_assets == before.withdrawable_assets + snap.served_assets,
            "earmark does not match snapshot",
        );
        kani::assert(
            global.claimed_snapshots == before.claimed_snapshots + 1,
            "snapshot count not advanced",
        );
    }
}

/// A participant's share of a snapshot is a pro-rata cut of what is left
#[kani::proof]
fn apply_snapshot_never_over_allocates() {
    let state = any_withdraw_state();
    let snap = any_snapshot(any::<u8>() as u64);

    let mut rolled = state;
    if snap.full_release || rolled.latest_request_period <= snap.period {
        rolled.roll_requested();
    }

    let mut after = state;
    let mut tally = snap;
    apply_snapshot(&mut after, &mut tally);

    let served = after.redeemable_shares - state.redeemable_shares;
    let assets = after.withdrawable_assets - state.withdrawable_assets;

    kani::assert(served + after.eligible_shares == rolled.eligible_shares, "shares created or lost");
    kani::assert(served <= snap.served_shares, "served above snapshot");
    kani::assert(assets <= snap.served_assets, "assets above snapshot");
    kani::assert(served + tally.unapplied_served == snap.unapplied_served, "served tally drifted");
    kani::assert(assets + tally.unapplied_assets == snap.unapplied_assets, "asset tally drifted");
    kani::assert(after.claimed_snapshots == state.claimed_snapshots + 1, "cursor not advanced");
}

/// Two participants replaying one snapshot receive exactly what it served
#[kani::proof]
fn last_replay_exhausts_snapshot() {
    let first = (any::<u32>() as u128) % 1_000_000;
    let second = (any::<u32>() as u128) % 1_000_000;
    let eligible = first + second;
    assume(eligible > 0);
    let served = (any::<u32>() as u128) % (eligible + 1);
    let assets = (any::<u32>() as u128) % 2_000_000;
    let mut snap = Snapshot::new(1, eligible, served, assets, false);

    let mut a = WithdrawState { eligible_shares: first, ..Default::default() };
    let mut b = WithdrawState { eligible_shares: second, ..Default::default() };
    apply_snapshot(&mut a, &mut snap);
    apply_snapshot(&mut b, &mut snap);

    kani::assert(a.redeemable_shares + b.redeemable_shares == served, "served shares not exhausted");
    kani::assert(a.withdrawable_assets + b.withdrawable_assets == assets, "served assets not exhausted");
    kani::assert(a.eligible_shares + b.eligible_shares == eligible - served, "remaining shares drifted");
    kani::assert(snap.is_fully_applied(), "snapshot still has unapplied shares");
}

/// One batched claim lands on the same state as two single claims
#[kani::proof]
fn batch_claim_matches_incremental() {
    let state = any_withdraw_state();
    let snapshots = [any_snapshot(0), any_snapshot(1)];

    let mut batch = state;
    let mut batch_history = snapshots;
    claim(&mut batch, &mut batch_history, 2);

    let mut stepwise = state;
    let mut step_history = snapshots;
    let first = claim(&mut stepwise, &mut step_history, 1);
    kani::assert(first.claim_required, "history left but not reported");
    claim(&mut stepwise, &mut step_history, 1);

    kani::assert(batch == stepwise, "batch and incremental claims diverge");
    kani::assert(batch_history == step_history, "batch and incremental tallies diverge");
}

/// Admission for a period runs at most once
#[kani::proof]
fn crank_is_idempotent() {
    let mut m = any_pool();
    assume(!m.participants.is_empty());
    let shares = any::<u32>() as u128;
    m.request(0, 0, shares);
    let period = 1 + (any::<u8>() as u64) % 4;

    let _ = m.crank(period);
    let once = m.clone();
    let again = m.crank(period);

    kani::assert(matches!(again, Ok(None)), "second crank produced a snapshot");
    kani::assert(m == once, "second crank mutated the pool");
}

/// Invariants survive short adversarial sequences
#[kani::proof]
#[kani::unwind(6)]
fn invariants_hold_across_adversary_sequences() {
    let mut m = any_pool();
    assume(model_ok(&m));
    let mut period = 0u64;

    let steps = (any::<u8>() % MAX_STEPS) + 1;
    for _ in 0..steps {
        let step: Step = any();
        adversary_step(&mut m, &mut period, step);
        kani::assert(model_ok(&m), "invariants broken by adversary step");
    }
}
