//! Conversion rounding always favors the pool

use tranche_common::{Address, LoanInstrument};
use tranche_integration_tests::*;

/// Pool whose share price fell to 0.6 after an uncovered default
fn discounted() -> (Harness, Address) {
    let mut h = Harness::activated(settings(10_000));
    let admin = h.admin;
    let a = h.lender(1_000_000);
    let loan = h.loan(500_000, 4_166, 6);
    h.advance(PERIOD);
    h.pool
        .default_loan(h.now, &admin, &loan.address())
        .unwrap();
    (h, a)
}

#[test]
fn test_deposit_and_mint_round_against_the_caller() {
    let (h, _) = discounted();
    assert_eq!(h.pool.available_nav(h.now), (600_000, 1_000_000));

    assert_eq!(h.pool.preview_deposit(h.now, 1_000), Ok(1_666));
    assert_eq!(h.pool.preview_mint(h.now, 1_666), Ok(1_000));
    assert_eq!(h.pool.preview_mint(h.now, 1_667), Ok(1_001));

    for assets in [1u128, 7, 999, 12_345, 600_001] {
        let shares = h.pool.convert_to_shares(h.now, assets).unwrap();
        let back = h.pool.convert_to_assets(h.now, shares).unwrap();
        assert!(back <= assets, "{} assets came back as {}", assets, back);

        let cost = h.pool.preview_mint(h.now, shares).unwrap();
        assert!(cost <= assets);
        assert!(h.pool.preview_deposit(h.now, cost).unwrap() >= shares.saturating_sub(1));
    }
}

#[test]
fn test_partial_withdraw_rounds_shares_up() {
    let (mut h, a) = discounted();
    h.request(&a, 300_000);
    let snap = h.next_period().expect("snapshot");
    assert_eq!(snap.served_shares, 300_000);
    assert_eq!(snap.served_assets, 180_000);

    assert_eq!(h.pool.max_withdraw(h.now, &a), 180_000);
    assert_eq!(h.pool.preview_withdraw(h.now, &a, 1_000), 1_667);
    assert_eq!(h.pool.preview_redeem(h.now, &a, 1_667), 1_000);
    assert_eq!(h.pool.preview_redeem(h.now, &a, 1), 0);
    assert_eq!(h.pool.preview_redeem(h.now, &a, 300_001), 0);

    let burned = h.pool.withdraw(h.now, &a, 1_000, &a, &a).unwrap();
    assert_eq!(burned, 1_667);

    let state = h.pool.withdraw_state(h.now, &a);
    assert_eq!(state.redeemable_shares, 300_000 - 1_667);
    assert_eq!(state.withdrawable_assets, 179_000);
    assert!(h.pool.invariants_hold());

    // Draining the rest pays exactly what was frozen
    assert_eq!(h.redeem_all(&a), 179_000);
    assert_eq!(h.pool.max_withdraw(h.now, &a), 0);
}

#[test]
fn test_request_withdraw_rounds_shares_up() {
    let (mut h, a) = discounted();
    assert_eq!(h.pool.preview_withdraw_request(h.now, 1_000), Ok(1_667));
    let receipt = h.pool.request_withdraw(h.now, &a, 1_000).unwrap();
    assert_eq!(receipt.shares, 1_667);
    assert_eq!(h.pool.max_withdraw_request(h.now, &a), Ok(598_999));
}
