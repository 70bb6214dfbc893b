//! Invariant checking helpers and a bounded pool model for fuzzing/proofs

use arrayvec::ArrayVec;

use crate::conversion::{MathError, Nav};
use crate::math::*;
use crate::snapshot::{admit, caught_up_all, claim, AdmissionParams, Snapshot};
use crate::withdraw::{self, GlobalWithdrawState, WithdrawState};

/// Participant bound for the model (small for Kani)
pub const MAX_PARTICIPANTS: usize = 4;

/// One lender in the model
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ModelParticipant {
    pub balance: u128,
    pub withdraw: WithdrawState,
}

/// Minimal pool: liquid assets only, no loans, no fees
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ModelPool {
    pub liquid: u128,
    pub total_supply: u128,
    pub gate_bps: u128,
    pub global: GlobalWithdrawState,
    pub participants: ArrayVec<ModelParticipant, MAX_PARTICIPANTS>,
    pub snapshots: Vec<Snapshot>,
    pub last_period: Option<u64>,
}

impl ModelPool {
    pub fn new(gate_bps: u128) -> Self {
        Self {
            gate_bps,
            ..Default::default()
        }
    }

    /// Add a participant holding `shares` backed 1:1; returns its index
    pub fn join(&mut self, shares: u128) -> Option<usize> {
        self.participants
            .try_push(ModelParticipant {
                balance: shares,
                withdraw: WithdrawState {
                    claimed_snapshots: self.snapshots.len() as u64,
                    ..Default::default()
                },
            })
            .ok()?;
        self.liquid = add_u128(self.liquid, shares);
        self.total_supply = add_u128(self.total_supply, shares);
        Some(self.participants.len() - 1)
    }

    /// Available NAV used by conversions
    pub fn nav(&self) -> Nav {
        Nav::new(self.liquid, self.total_supply)
            .available(self.global.withdrawable_assets, self.global.redeemable_shares)
    }

    /// Run admission for `period` (no-op if already processed)
    pub fn crank(&mut self, period: u64) -> Result<Option<Snapshot>, MathError> {
        if matches!(self.last_period, Some(p) if p >= period) {
            return Ok(None);
        }
        self.last_period = Some(period);
        let params = AdmissionParams {
            period,
            available_liquidity: sub_u128(self.liquid, self.global.withdrawable_assets),
            gate_bps: self.gate_bps,
            nav: self.nav(),
            full_release: false,
        };
        let snap = admit(&mut self.global, &params)?;
        if let Some(s) = snap {
            self.snapshots.push(s);
        }
        Ok(snap)
    }

    /// Request up to `shares` for participant `idx` (clamped to the free balance)
    pub fn request(&mut self, idx: usize, period: u64, shares: u128) -> u128 {
        let snapshots = &mut self.snapshots;
        let Some(p) = self.participants.get_mut(idx) else {
            return 0;
        };
        claim(&mut p.withdraw, snapshots, u64::MAX);
        let amount = min_u128(shares, withdraw::free_shares(p.balance, &p.withdraw));
        withdraw::request(&mut p.withdraw, period, amount);
        withdraw::request(&mut self.global, period, amount);
        amount
    }

    /// Claim up to `limit` snapshots for participant `idx`
    pub fn claim(&mut self, idx: usize, limit: u64) {
        let snapshots = &mut self.snapshots;
        if let Some(p) = self.participants.get_mut(idx) {
            claim(&mut p.withdraw, snapshots, limit);
        }
    }

    /// Redeem everything redeemable for participant `idx`; returns assets paid
    pub fn redeem_all(&mut self, idx: usize) -> u128 {
        let snapshots = &mut self.snapshots;
        let Some(p) = self.participants.get_mut(idx) else {
            return 0;
        };
        claim(&mut p.withdraw, snapshots, u64::MAX);
        let shares = p.withdraw.redeemable_shares;
        let assets = p.withdraw.withdrawable_assets;
        withdraw::settle(&mut p.withdraw, shares, assets);
        p.balance = sub_u128(p.balance, shares);
        withdraw::settle(&mut self.global, shares, assets);
        self.total_supply = sub_u128(self.total_supply, shares);
        self.liquid = sub_u128(self.liquid, assets);
        assets
    }

    /// Participant views with all history folded in
    pub fn caught_up_states(&self) -> ArrayVec<(u128, WithdrawState), MAX_PARTICIPANTS> {
        let views = caught_up_all(self.participants.iter().map(|p| &p.withdraw), &self.snapshots);
        self.participants
            .iter()
            .zip(views)
            .map(|(p, v)| (p.balance, v))
            .collect()
    }
}

/// Pipeline never holds more shares than the participant owns
pub fn within_balance(balance: u128, state: &WithdrawState) -> bool {
    state.committed_shares() <= balance
}

/// Sum of withdrawable assets fits in liquid reserve
pub fn no_over_allocation<'a, I>(states: I, liquid: u128) -> bool
where
    I: IntoIterator<Item = &'a WithdrawState>,
{
    let total = states
        .into_iter()
        .fold(0u128, |acc, s| add_u128(acc, s.withdrawable_assets));
    total <= liquid
}

/// Global counters equal the sum of the participants' caught-up counters
pub fn global_matches<'a, I>(global: &GlobalWithdrawState, states: I) -> bool
where
    I: IntoIterator<Item = &'a WithdrawState>,
{
    let mut sum = WithdrawState::default();
    for s in states {
        sum.requested_shares = add_u128(sum.requested_shares, s.requested_shares);
        sum.eligible_shares = add_u128(sum.eligible_shares, s.eligible_shares);
        sum.redeemable_shares = add_u128(sum.redeemable_shares, s.redeemable_shares);
        sum.withdrawable_assets = add_u128(sum.withdrawable_assets, s.withdrawable_assets);
    }
    sum.pending_shares() == global.pending_shares()
        && sum.redeemable_shares == global.redeemable_shares
        && sum.withdrawable_assets == global.withdrawable_assets
}

/// All model invariants at once
pub fn model_ok(m: &ModelPool) -> bool {
    let states = m.caught_up_states();
    states.iter().all(|(b, s)| within_balance(*b, s))
        && no_over_allocation(states.iter().map(|(_, s)| s), m.liquid)
        && global_matches(&m.global, states.iter().map(|(_, s)| s))
        && m.global.withdrawable_assets <= m.liquid
}
