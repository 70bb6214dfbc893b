//! Withdrawal state machine
//!
//! Shares move requested -> eligible -> redeemable. Requests always target
//! the next period boundary; the admission engine (see `snapshot`) is the
//! only thing that moves eligible shares to redeemable.

use crate::math::*;

/// Per-participant withdrawal counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WithdrawState {
    /// Requested, not yet considered by the admission engine
    pub requested_shares: u128,
    /// Waiting for rationed admission
    pub eligible_shares: u128,
    /// Period the last request targets
    pub latest_request_period: u64,
    /// Admitted and ready to redeem
    pub redeemable_shares: u128,
    /// Assets frozen for `redeemable_shares` at admission time
    pub withdrawable_assets: u128,
    /// Number of snapshots already applied (index of the next one)
    pub claimed_snapshots: u64,
}

/// Pool-wide mirror of [`WithdrawState`]; `claimed_snapshots` counts snapshots written
pub type GlobalWithdrawState = WithdrawState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawError {
    /// Cancel amount exceeds requested + eligible
    InvalidCancellation,
}

/// How a cancellation was taken out of the pending buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CancelSplit {
    pub from_requested: u128,
    pub from_eligible: u128,
}

impl CancelSplit {
    pub fn total(&self) -> u128 {
        add_u128(self.from_requested, self.from_eligible)
    }
}

impl WithdrawState {
    /// Shares still waiting for admission
    pub fn pending_shares(&self) -> u128 {
        add_u128(self.requested_shares, self.eligible_shares)
    }

    /// Shares locked anywhere in the withdrawal pipeline
    pub fn committed_shares(&self) -> u128 {
        add_u128(self.pending_shares(), self.redeemable_shares)
    }

    pub fn is_empty(&self) -> bool {
        self.committed_shares() == 0 && self.withdrawable_assets == 0
    }

    /// Move all requested shares into eligible
    pub fn roll_requested(&mut self) {
        self.eligible_shares = add_u128(self.eligible_shares, self.requested_shares);
        self.requested_shares = 0;
    }
}

/// Record a new request for `new_shares` made during `current_period`
///
/// Anything requested in an earlier period has already waited a boundary and
/// is rolled into eligible first.
pub fn request(state: &mut WithdrawState, current_period: u64, new_shares: u128) {
    let target = current_period.saturating_add(1);
    if state.latest_request_period < target {
        state.roll_requested();
    }
    state.latest_request_period = target;
    state.requested_shares = add_u128(state.requested_shares, new_shares);
}

/// Work out which buckets a cancellation of `amount` comes from
pub fn cancel_split(state: &WithdrawState, amount: u128) -> Result<CancelSplit, WithdrawError> {
    if state.pending_shares() < amount {
        return Err(WithdrawError::InvalidCancellation);
    }
    let from_requested = min_u128(state.requested_shares, amount);
    Ok(CancelSplit {
        from_requested,
        from_eligible: amount - from_requested,
    })
}

/// Apply a split computed by [`cancel_split`]
pub fn apply_cancel(state: &mut WithdrawState, split: &CancelSplit) {
    state.requested_shares = sub_u128(state.requested_shares, split.from_requested);
    state.eligible_shares = sub_u128(state.eligible_shares, split.from_eligible);
}

/// Cancel `amount` pending shares, requested first then eligible
pub fn cancel(state: &mut WithdrawState, amount: u128) -> Result<CancelSplit, WithdrawError> {
    let split = cancel_split(state, amount)?;
    apply_cancel(state, &split);
    Ok(split)
}

/// Shares not yet committed to any withdrawal
pub fn free_shares(balance: u128, state: &WithdrawState) -> u128 {
    sub_u128(balance, state.committed_shares())
}

/// Largest request whose shares plus request fee fit in the free balance
pub fn max_redeem_request(balance: u128, state: &WithdrawState, fee_bps: u128) -> u128 {
    mul_div_down(
        free_shares(balance, state),
        BPS_DENOMINATOR,
        add_u128(BPS_DENOMINATOR, fee_bps),
    )
}

/// Pending shares that can still be cancelled
pub fn max_request_cancellation(state: &WithdrawState) -> u128 {
    state.pending_shares()
}

/// Shares still earning interest (everything not yet frozen as redeemable)
pub fn interest_bearing_balance(balance: u128, state: &WithdrawState) -> u128 {
    sub_u128(balance, state.redeemable_shares)
}

/// Assets paid for redeeming `shares` of the redeemable balance (rounds down)
pub fn redeem_assets(state: &WithdrawState, shares: u128) -> u128 {
    if shares >= state.redeemable_shares {
        return if shares == state.redeemable_shares { state.withdrawable_assets } else { 0 };
    }
    mul_div_down(shares, state.withdrawable_assets, state.redeemable_shares)
}

/// Shares burned to withdraw `assets` of the withdrawable balance (rounds up)
pub fn withdraw_shares(state: &WithdrawState, assets: u128) -> u128 {
    if assets >= state.withdrawable_assets {
        return if assets == state.withdrawable_assets { state.redeemable_shares } else { 0 };
    }
    min_u128(
        mul_div_up(assets, state.redeemable_shares, state.withdrawable_assets),
        state.redeemable_shares,
    )
}

/// Remove settled shares and assets
pub fn settle(state: &mut WithdrawState, shares: u128, assets: u128) {
    state.redeemable_shares = sub_u128(state.redeemable_shares, shares);
    state.withdrawable_assets = sub_u128(state.withdrawable_assets, assets);
}
