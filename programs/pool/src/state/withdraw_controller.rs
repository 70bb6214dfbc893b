//! Withdraw controller: per-participant and pool-wide withdrawal state
//!
//! Holds the append-only snapshot history written by the admission engine.
//! Participants are created lazily on their first request and start their
//! cursor at the current end of history, so they never replay snapshots
//! taken before they joined the queue.

use pool_model::{
    self, caught_up, caught_up_all, unclaimed_count, AdmissionParams, CancelSplit, ClaimOutcome,
    GlobalWithdrawState, Snapshot, WithdrawState,
};
use std::collections::BTreeMap;
use tranche_common::{Address, PoolError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithdrawController {
    pub global: GlobalWithdrawState,
    participants: BTreeMap<Address, WithdrawState>,
    snapshots: Vec<Snapshot>,
    /// Last period the admission engine processed
    pub last_admission_period: Option<u64>,
}

impl WithdrawController {
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn participants(&self) -> impl Iterator<Item = (&Address, &WithdrawState)> {
        self.participants.iter()
    }

    fn fresh_state(&self) -> WithdrawState {
        WithdrawState {
            claimed_snapshots: self.snapshots.len() as u64,
            ..Default::default()
        }
    }

    /// Stored state, without folding in unclaimed snapshots
    pub fn stored_state(&self, who: &Address) -> WithdrawState {
        self.participants
            .get(who)
            .copied()
            .unwrap_or_else(|| self.fresh_state())
    }

    /// State as it will read after every pending snapshot is claimed
    pub fn current_state(&self, who: &Address) -> WithdrawState {
        caught_up(&self.stored_state(who), &self.snapshots)
    }

    /// Every participant caught up in address order against one copy of the history
    pub fn caught_up_states(&self) -> Vec<(Address, WithdrawState)> {
        let views = caught_up_all(self.participants.values(), &self.snapshots);
        self.participants.keys().copied().zip(views).collect()
    }

    pub fn claim_required(&self, who: &Address) -> bool {
        unclaimed_count(&self.stored_state(who), &self.snapshots) > 0
    }

    pub fn unclaimed_snapshots(&self, who: &Address) -> u64 {
        unclaimed_count(&self.stored_state(who), &self.snapshots)
    }

    fn entry(&mut self, who: &Address) -> &mut WithdrawState {
        let fresh = self.fresh_state();
        self.participants.entry(*who).or_insert(fresh)
    }

    /// Replay up to `limit` snapshots for `who`
    pub fn claim(&mut self, who: &Address, limit: u64) -> ClaimOutcome {
        let snapshots = &mut self.snapshots;
        match self.participants.get_mut(who) {
            Some(state) => pool_model::claim(state, snapshots, limit),
            None => ClaimOutcome::default(),
        }
    }

    /// Bring `who` fully up to date and return the stored state
    pub fn catch_up(&mut self, who: &Address) -> WithdrawState {
        self.claim(who, u64::MAX);
        self.stored_state(who)
    }

    /// Run the admission engine for `params.period`
    ///
    /// No-op if the period was already processed; a period earlier than the
    /// last processed one means the clock went backwards.
    pub fn run_admission(&mut self, params: &AdmissionParams) -> Result<Option<Snapshot>, PoolError> {
        match self.last_admission_period {
            Some(last) if params.period < last => return Err(PoolError::ClockAnomaly),
            Some(last) if params.period == last => return Ok(None),
            _ => {}
        }

        let snapshot = pool_model::admit(&mut self.global, params)?;
        self.last_admission_period = Some(params.period);
        if let Some(s) = snapshot {
            self.snapshots.push(s);
        }
        Ok(snapshot)
    }

    /// Queue `shares` for withdrawal on behalf of `who`
    pub fn request(&mut self, who: &Address, period: u64, shares: u128) {
        self.catch_up(who);
        pool_model::request(self.entry(who), period, shares);
        pool_model::request(&mut self.global, period, shares);
    }

    /// Cancel `shares` pending shares of `who`
    pub fn cancel(&mut self, who: &Address, shares: u128) -> Result<CancelSplit, PoolError> {
        let state = self.catch_up(who);
        let split = pool_model::cancel_split(&state, shares)?;
        pool_model::apply_cancel(self.entry(who), &split);
        pool_model::apply_cancel(&mut self.global, &split);
        Ok(split)
    }

    /// Remove settled shares/assets from `who` and the pool totals
    pub fn settle(&mut self, who: &Address, shares: u128, assets: u128) {
        pool_model::settle(self.entry(who), shares, assets);
        pool_model::settle(&mut self.global, shares, assets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pool_model::Nav;

    fn params(period: u64, liquidity: u128, gate_bps: u128) -> AdmissionParams {
        AdmissionParams {
            period,
            available_liquidity: liquidity,
            gate_bps,
            nav: Nav::new(liquidity, liquidity),
            full_release: false,
        }
    }

    #[test]
    fn test_new_participant_skips_old_history() {
        let alice = Address::new_unique();
        let bob = Address::new_unique();
        let mut wc = WithdrawController::default();

        wc.request(&alice, 0, 100);
        assert!(wc.run_admission(&params(1, 1_000, 10_000)).unwrap().is_some());

        wc.request(&bob, 1, 50);
        assert_eq!(wc.stored_state(&bob).claimed_snapshots, 1);
        assert!(!wc.claim_required(&bob));
        assert!(wc.claim_required(&alice));
        assert_eq!(wc.current_state(&alice).redeemable_shares, 100);
    }

    #[test]
    fn test_admission_idempotent_and_clock_checked() {
        let alice = Address::new_unique();
        let mut wc = WithdrawController::default();
        wc.request(&alice, 0, 100);

        assert!(wc.run_admission(&params(1, 1_000, 5_000)).unwrap().is_some());
        let once = wc.clone();
        assert_eq!(wc.run_admission(&params(1, 1_000, 5_000)), Ok(None));
        assert_eq!(wc, once);
        assert_eq!(wc.run_admission(&params(0, 1_000, 5_000)), Err(PoolError::ClockAnomaly));
    }

    #[test]
    fn test_cancel_updates_global() {
        let alice = Address::new_unique();
        let mut wc = WithdrawController::default();
        wc.request(&alice, 0, 100);

        let split = wc.cancel(&alice, 40).unwrap();
        assert_eq!(split.from_requested, 40);
        assert_eq!(wc.global.requested_shares, 60);
        assert_eq!(wc.stored_state(&alice).requested_shares, 60);
        assert_eq!(wc.cancel(&alice, 61), Err(PoolError::InvalidCancellation));
    }

    #[test]
    fn test_claim_for_unknown_participant_is_noop() {
        let mut wc = WithdrawController::default();
        let out = wc.claim(&Address::new_unique(), 5);
        assert_eq!(out, ClaimOutcome::default());
        assert_eq!(wc.participants().count(), 0);
    }
}
