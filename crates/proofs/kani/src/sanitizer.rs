//! State space sanitizer - bounds values for Kani exploration

use pool_model::math::{add_u128, min_u128};
use pool_model::{ModelPool, Snapshot, WithdrawState, MAX_PARTICIPANTS};

pub const N_PARTICIPANTS: usize = 3;
pub const MAX_STEPS: u8 = 4;

/// Bounds for tractable verification
const MAX_BALANCE: u128 = 1_000_000u128;
const MAX_LIQUID: u128 = 10_000_000u128;
const MAX_SNAPSHOT_SHARES: u128 = 1_000_000u128;

pub trait Sanitize {
    fn sanitize(self) -> Self;
}

fn clamp(v: u128, max: u128) -> u128 {
    if v > max {
        v % max
    } else {
        v
    }
}

impl Sanitize for WithdrawState {
    /// Keep the pipeline buckets small and the frozen assets proportional
    fn sanitize(mut self) -> WithdrawState {
        self.requested_shares = clamp(self.requested_shares, MAX_BALANCE);
        self.eligible_shares = clamp(self.eligible_shares, MAX_BALANCE);
        self.redeemable_shares = clamp(self.redeemable_shares, MAX_BALANCE);
        self.withdrawable_assets = min_u128(
            clamp(self.withdrawable_assets, MAX_BALANCE),
            self.redeemable_shares.saturating_mul(2),
        );
        self
    }
}

impl Sanitize for Snapshot {
    /// Served never exceeds eligible; assets are zero exactly when nothing is
    /// served. The result has not been replayed by anyone.
    fn sanitize(self) -> Snapshot {
        let eligible = clamp(self.eligible_shares, MAX_SNAPSHOT_SHARES).max(1);
        let served = min_u128(self.served_shares, eligible);
        let assets = if served == 0 {
            0
        } else {
            clamp(self.served_assets, MAX_SNAPSHOT_SHARES)
        };
        Snapshot::new(self.period, eligible, served, assets, self.full_release)
    }
}

impl Sanitize for ModelPool {
    /// Clamp participants and balances; supply and liquid follow the balances
    fn sanitize(mut self) -> ModelPool {
        let bound = N_PARTICIPANTS.min(MAX_PARTICIPANTS);
        while self.participants.len() > bound {
            self.participants.pop();
        }

        let mut supply = 0u128;
        for p in self.participants.iter_mut() {
            p.balance = clamp(p.balance, MAX_BALANCE);
            p.withdraw = WithdrawState::default();
            supply = add_u128(supply, p.balance);
        }

        self.total_supply = supply;
        self.liquid = min_u128(clamp(self.liquid, MAX_LIQUID), supply);
        if supply > 0 && self.liquid == 0 {
            self.liquid = supply;
        }
        self.global = WithdrawState::default();
        self.gate_bps = clamp(self.gate_bps, 10_001);
        self.snapshots.clear();
        self.last_period = None;
        self
    }
}
