//! Symbolic value generators

#[cfg(kani)]
use crate::sanitizer::{Sanitize, N_PARTICIPANTS};
#[cfg(kani)]
use kani::any;
#[cfg(kani)]
use pool_model::{ModelPool, Nav, Snapshot, WithdrawState};

/// Generate arbitrary withdraw state (bounded)
#[cfg(kani)]
pub fn any_withdraw_state() -> WithdrawState {
    WithdrawState {
        requested_shares: any::<u32>() as u128,
        eligible_shares: any::<u32>() as u128,
        latest_request_period: any::<u8>() as u64,
        redeemable_shares: any::<u32>() as u128,
        withdrawable_assets: any::<u32>() as u128,
        claimed_snapshots: 0,
    }
    .sanitize()
}

/// Generate arbitrary snapshot for `period`
#[cfg(kani)]
pub fn any_snapshot(period: u64) -> Snapshot {
    Snapshot::new(
        period,
        any::<u32>() as u128,
        any::<u32>() as u128,
        any::<u32>() as u128,
        any(),
    )
    .sanitize()
}

/// Generate arbitrary NAV with non-zero supply
#[cfg(kani)]
pub fn any_nav() -> Nav {
    let supply = (any::<u32>() as u128).max(1);
    let assets = any::<u32>() as u128;
    Nav::new(assets, supply)
}

/// Generate arbitrary pool with fresh participants
#[cfg(kani)]
pub fn any_pool() -> ModelPool {
    let mut m = ModelPool::new(any::<u16>() as u128);
    let n = (any::<u8>() as usize) % (N_PARTICIPANTS + 1);
    for _ in 0..n {
        m.join(any::<u32>() as u128);
    }
    m.liquid = any::<u32>() as u128;
    m.sanitize()
}
