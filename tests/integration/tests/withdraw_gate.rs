//! Gated withdrawals: geometric admission, closing release, claim ordering

use tranche_common::Address;
use tranche_integration_tests::*;

#[test]
fn test_quarter_gate_sequence() {
    println!("========================================");
    println!("25% gate: one lender exits 1,000,000");
    println!("========================================");

    let mut h = Harness::activated(settings(2_500));
    let a = h.lender(1_000_000);
    h.request(&a, 1_000_000);

    // The ratio is kept as an exact fraction of integers. A fixed-point ratio
    // applied per lender floors twice and serves 79,100 in period 5
    // (total 762,693); here period 5 serves 25% of the 316,407 still liquid.
    let expected = [250_000u128, 187_500, 140_625, 105_468, 79_101];
    for (period, want) in expected.iter().enumerate() {
        let snap = h.next_period().expect("snapshot each period");
        println!("  period {}: served {} assets", period + 1, snap.served_assets);
        assert_eq!(snap.served_assets, *want);
        assert_eq!(snap.served_shares, *want);
    }

    let state = h.pool.withdraw_state(h.now, &a);
    let served: u128 = expected.iter().sum();
    assert_eq!(served, 762_694);
    assert_eq!(state.redeemable_shares, served);
    assert_eq!(state.withdrawable_assets, served);
    assert_eq!(state.eligible_shares, 1_000_000 - served);
    assert!(h.pool.invariants_hold());
}

#[test]
fn test_half_gate_converges_then_closes() {
    let mut h = Harness::activated(settings(5_000));
    let a = h.lender(1_000_000);
    h.request(&a, 1_000_000);

    let mut paid = 0u128;
    for want in [500_000u128, 250_000, 125_000, 62_500] {
        let snap = h.next_period().expect("snapshot");
        assert_eq!(snap.served_assets, want);
        assert!(!snap.full_release);
        // Redeeming between periods must not disturb the next ration
        paid += h.redeem_all(&a);
        assert!(h.pool.invariants_hold());
    }
    assert_eq!(paid, 937_500);

    h.close();
    h.advance(1);
    let last = h.pool.crank(h.now).unwrap().expect("closing snapshot");
    assert!(last.full_release);
    assert_eq!(last.served_shares, 62_500);

    paid += h.redeem_all(&a);
    assert_eq!(paid, 1_000_000);
    assert_eq!(h.token.balance_of(&a), 1_000_000);
    assert_eq!(h.pool.balance_of(&a), 0);
    assert_eq!(h.pool.total_supply(), 0);
}

/// Two lenders queued for everything under a 25% gate
fn two_lender_queue() -> (Harness, Address, Address) {
    let mut h = Harness::activated(settings(2_500));
    let a = h.lender(1_000_000);
    let b = h.lender(1_000_000);
    h.request(&a, 1_000_000);
    h.request(&b, 1_000_000);
    (h, a, b)
}

#[test]
fn test_single_claims_match_one_batch() {
    let (mut stepped, a, b) = two_lender_queue();
    let (mut batched, a2, _) = two_lender_queue();

    for _ in 0..5 {
        stepped.next_period().expect("snapshot");
        let outcome = stepped.pool.claim_snapshots(stepped.now, &a, 1).unwrap();
        assert_eq!(outcome.applied, 1);
        assert!(!outcome.claim_required);

        batched.next_period().expect("snapshot");
    }

    assert_eq!(stepped.pool.unclaimed_snapshots(stepped.now, &a), 0);
    assert_eq!(stepped.pool.unclaimed_snapshots(stepped.now, &b), 5);
    assert!(stepped.pool.claim_required(stepped.now, &b));

    let outcome = batched.pool.claim_snapshots(batched.now, &a2, u64::MAX).unwrap();
    assert_eq!(outcome.applied, 5);
    assert!(!batched.pool.claim_required(batched.now, &a2));
    assert_eq!(
        stepped.pool.withdraw_state(stepped.now, &a),
        batched.pool.withdraw_state(batched.now, &a2)
    );

    // B replays last and picks up the rounding remainder of each period
    stepped.pool.claim_snapshots(stepped.now, &b, u64::MAX).unwrap();
    let sa = stepped.pool.withdraw_state(stepped.now, &a);
    let sb = stepped.pool.withdraw_state(stepped.now, &b);
    let global = stepped.pool.global_withdraw_state(stepped.now);
    assert_eq!(sa.redeemable_shares + sb.redeemable_shares, global.redeemable_shares);
    assert_eq!(sa.eligible_shares + sb.eligible_shares, global.eligible_shares);
    assert_eq!(sa.withdrawable_assets + sb.withdrawable_assets, global.withdrawable_assets);
    assert!(sb.redeemable_shares >= sa.redeemable_shares);
    assert!(sb.redeemable_shares - sa.redeemable_shares <= 5);
    assert!(stepped.pool.invariants_hold());
}

#[test]
fn test_uneven_splits_drain_on_close() {
    println!("========================================");
    println!("50% gate: three lenders of 3 shares each");
    println!("========================================");

    let mut h = Harness::activated(settings(5_000));
    let lenders: Vec<Address> = (0..3).map(|_| h.lender(3)).collect();
    for who in &lenders {
        h.request(who, 3);
    }

    for _ in 0..4 {
        let snap = h.next_period().expect("snapshot");
        println!("  served {} of {}", snap.served_shares, snap.eligible_shares);
        assert!(h.pool.invariants_hold());
    }

    h.close();
    h.advance(1);
    let last = h.pool.crank(h.now).unwrap().expect("closing snapshot");
    assert!(last.full_release);
    assert!(last.is_complete());

    let paid: u128 = lenders.iter().map(|who| h.redeem_all(who)).sum();
    assert_eq!(paid, 9);
    for who in &lenders {
        assert_eq!(h.pool.balance_of(who), 0);
        assert_eq!(h.token.balance_of(who), 3);
        assert_eq!(h.pool.withdraw_state(h.now, who).committed_shares(), 0);
    }

    let global = h.pool.global_withdraw_state(h.now);
    assert_eq!(global.redeemable_shares, 0);
    assert_eq!(global.withdrawable_assets, 0);
    assert_eq!(h.pool.ledger().vault.earmarked, 0);
    assert_eq!(h.pool.ledger().vault.balance, 0);
    assert_eq!(h.pool.total_supply(), 0);
    assert!(h.pool.invariants_hold());
}

#[test]
fn test_lazy_crank_matches_explicit_crank() {
    let mut explicit = Harness::activated(settings(5_000));
    let mut lazy = Harness::activated(settings(5_000));
    let a = explicit.lender(1_000_000);
    let b = lazy.lender(1_000_000);
    explicit.request(&a, 400_000);
    lazy.request(&b, 400_000);

    explicit.next_period();
    lazy.advance(PERIOD);

    // Views fold in the admission that would run on the next call
    assert_eq!(lazy.pool.snapshots().len(), 0);
    let viewed = lazy.pool.withdraw_state(lazy.now, &b);
    assert_eq!(viewed, explicit.pool.withdraw_state(explicit.now, &a));
    assert_eq!(lazy.pool.max_redeem(lazy.now, &b), 400_000);

    // Any entry point persists it
    lazy.pool.claim_snapshots(lazy.now, &b, 1).unwrap();
    assert_eq!(lazy.pool.snapshots(), explicit.pool.snapshots());
}

#[test]
fn test_request_waits_for_next_boundary() {
    let mut h = Harness::activated(settings(10_000));
    let a = h.lender(1_000_000);

    h.advance(PERIOD - 10);
    h.request(&a, 1_000);
    assert_eq!(h.pool.withdraw_state(h.now, &a).requested_shares, 1_000);
    assert_eq!(h.pool.max_redeem(h.now, &a), 0);

    h.advance(10);
    assert_eq!(h.pool.current_period(h.now), Some(1));
    assert_eq!(h.pool.max_redeem(h.now, &a), 1_000);

    // A second request in the same period lands one boundary later
    h.request(&a, 2_000);
    let state = h.pool.withdraw_state(h.now, &a);
    assert_eq!(state.requested_shares, 2_000);
    assert_eq!(state.latest_request_period, 2);
}

#[test]
fn test_crank_is_idempotent_within_a_period() {
    let mut h = Harness::activated(settings(5_000));
    let a = h.lender(1_000_000);
    h.request(&a, 1_000_000);

    assert!(h.next_period().is_some());
    for _ in 0..10 {
        assert!(h.pool.crank(h.now).unwrap().is_none());
    }
    assert_eq!(h.pool.snapshots().len(), 1);
    assert_eq!(h.pool.global_withdraw_state(h.now).redeemable_shares, 500_000);
}
