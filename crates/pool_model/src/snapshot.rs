//! Epoch admission engine
//!
//! Once per period the pool-wide eligible shares are admitted under the
//! withdraw gate and an immutable [`Snapshot`] is appended. Participants are
//! reconciled later by replaying snapshots in order from their own cursor, so
//! one large catch-up and many small ones land on the same numbers.

use crate::conversion::{assets_for_shares, shares_for_assets, MathError, Nav, Rounding};
use crate::math::*;
use crate::withdraw::{GlobalWithdrawState, WithdrawState};

/// Result of one admission run
///
/// The ratio applied to eligible shares is `served_shares / eligible_shares`;
/// the asset rate is `served_assets / served_shares`. Both are kept as exact
/// integer pairs instead of a fixed-point ratio.
///
/// The `unapplied_*` tallies count what participants have not replayed yet.
/// Each replay takes its pro-rata cut of the tallies, so the last participant
/// to replay picks up the rounding remainder and the per-participant totals
/// add up to exactly what was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Period this snapshot was taken in
    pub period: u64,
    /// Pool-wide eligible shares considered (after rolling requests)
    pub eligible_shares: u128,
    /// Shares admitted to redeemable
    pub served_shares: u128,
    /// Assets frozen for the admitted shares
    pub served_assets: u128,
    /// Pool was closed: every request rolled regardless of period
    pub full_release: bool,
    pub unapplied_eligible: u128,
    pub unapplied_served: u128,
    pub unapplied_assets: u128,
}

impl Snapshot {
    /// A snapshot nobody has replayed yet
    pub fn new(
        period: u64,
        eligible_shares: u128,
        served_shares: u128,
        served_assets: u128,
        full_release: bool,
    ) -> Self {
        Self {
            period,
            eligible_shares,
            served_shares,
            served_assets,
            full_release,
            unapplied_eligible: eligible_shares,
            unapplied_served: served_shares,
            unapplied_assets: served_assets,
        }
    }

    /// Everything eligible was admitted
    pub fn is_complete(&self) -> bool {
        self.served_shares == self.eligible_shares
    }

    /// Every participant in this snapshot has replayed it
    pub fn is_fully_applied(&self) -> bool {
        self.unapplied_eligible == 0
    }
}

/// Inputs sampled from the pool when the admission engine runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionParams {
    pub period: u64,
    /// Liquid reserve not already earmarked for withdrawals
    pub available_liquidity: u128,
    /// Withdraw gate in bps (10_000 once the pool is closed)
    pub gate_bps: u128,
    /// Available NAV (earmarked withdrawals removed)
    pub nav: Nav,
    pub full_release: bool,
}

/// Run admission for one period against the pool-wide counters
///
/// Returns `Ok(None)` when nothing is eligible; the global state is only
/// touched when a snapshot is produced.
pub fn admit(
    global: &mut GlobalWithdrawState,
    params: &AdmissionParams,
) -> Result<Option<Snapshot>, MathError> {
    let mut next = *global;
    if params.full_release || next.latest_request_period <= params.period {
        next.roll_requested();
    }

    let eligible = next.eligible_shares;
    if eligible == 0 {
        return Ok(None);
    }

    let gate_assets = bps_of(params.available_liquidity, params.gate_bps);
    let eligible_assets = assets_for_shares(eligible, &params.nav, Rounding::Down)?;

    let served_shares = if eligible_assets <= gate_assets {
        eligible
    } else {
        min_u128(shares_for_assets(gate_assets, &params.nav, Rounding::Down)?, eligible)
    };
    let served_assets = min_u128(
        assets_for_shares(served_shares, &params.nav, Rounding::Down)?,
        params.available_liquidity,
    );

    next.eligible_shares = sub_u128(eligible, served_shares);
    next.redeemable_shares = add_u128(next.redeemable_shares, served_shares);
    next.withdrawable_assets = add_u128(next.withdrawable_assets, served_assets);
    next.claimed_snapshots = next.claimed_snapshots.saturating_add(1);
    *global = next;

    Ok(Some(Snapshot::new(
        params.period,
        eligible,
        served_shares,
        served_assets,
        params.full_release,
    )))
}

/// Apply a single snapshot to a participant and advance their cursor
///
/// The participant's then-current eligible balance takes its cut of the
/// snapshot's unapplied tallies, which shrink by what was handed out. Shares
/// not served stay eligible.
pub fn apply_snapshot(state: &mut WithdrawState, snapshot: &mut Snapshot) {
    if snapshot.full_release || state.latest_request_period <= snapshot.period {
        state.roll_requested();
    }

    let eligible = state.eligible_shares;
    if eligible > 0 && snapshot.unapplied_eligible > 0 {
        let (served, assets) = if eligible >= snapshot.unapplied_eligible {
            (snapshot.unapplied_served, snapshot.unapplied_assets)
        } else {
            let served = mul_div_down(eligible, snapshot.unapplied_served, snapshot.unapplied_eligible);
            let assets = mul_div_down(served, snapshot.unapplied_assets, snapshot.unapplied_served);
            (served, assets)
        };
        let served = min_u128(served, eligible);

        state.eligible_shares = eligible - served;
        state.redeemable_shares = add_u128(state.redeemable_shares, served);
        state.withdrawable_assets = add_u128(state.withdrawable_assets, assets);

        snapshot.unapplied_eligible = sub_u128(snapshot.unapplied_eligible, eligible);
        snapshot.unapplied_served = sub_u128(snapshot.unapplied_served, served);
        snapshot.unapplied_assets = sub_u128(snapshot.unapplied_assets, assets);
    }

    state.claimed_snapshots = state.claimed_snapshots.saturating_add(1);
}

/// Outcome of a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClaimOutcome {
    /// Snapshots applied by this claim
    pub applied: u64,
    /// History is still left to replay
    pub claim_required: bool,
}

/// Replay up to `limit` unclaimed snapshots in order
pub fn claim(state: &mut WithdrawState, snapshots: &mut [Snapshot], limit: u64) -> ClaimOutcome {
    let start = state.claimed_snapshots;
    let total = snapshots.len() as u64;
    let end = start.saturating_add(limit).min(total);

    for snapshot in snapshots
        .iter_mut()
        .skip(start as usize)
        .take(end.saturating_sub(start) as usize)
    {
        apply_snapshot(state, snapshot);
    }

    ClaimOutcome {
        applied: end.saturating_sub(start),
        claim_required: end < total,
    }
}

/// Replay everything outstanding
pub fn claim_all(state: &mut WithdrawState, snapshots: &mut [Snapshot]) -> ClaimOutcome {
    claim(state, snapshots, u64::MAX)
}

/// Participant state with all unclaimed history folded in, without mutating
/// either the state or the history
pub fn caught_up(state: &WithdrawState, snapshots: &[Snapshot]) -> WithdrawState {
    let mut view = *state;
    for snapshot in snapshots.iter().skip(state.claimed_snapshots as usize) {
        let mut scratch = *snapshot;
        apply_snapshot(&mut view, &mut scratch);
    }
    view
}

/// Every participant caught up in turn against one shared copy of the history
///
/// Unlike calling [`caught_up`] per participant, the rounding remainders are
/// handed out exactly once, so the results sum to the pool-wide counters.
pub fn caught_up_all<'a, I>(states: I, snapshots: &[Snapshot]) -> Vec<WithdrawState>
where
    I: IntoIterator<Item = &'a WithdrawState>,
{
    let mut history = snapshots.to_vec();
    states
        .into_iter()
        .map(|s| {
            let mut view = *s;
            claim_all(&mut view, &mut history);
            view
        })
        .collect()
}

/// Snapshots a participant has not applied yet
pub fn unclaimed_count(state: &WithdrawState, snapshots: &[Snapshot]) -> u64 {
    (snapshots.len() as u64).saturating_sub(state.claimed_snapshots)
}
